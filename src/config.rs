use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use directories::BaseDirs;
use serde::Deserialize;

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_NAME: &str = "crmx";
const DB_FILE_NAME: &str = "crm.db";

pub const DEFAULT_FILTER_SETTLE_MS: u64 = 400;

#[derive(Debug, Clone)]
pub struct Config {
    pub config_path: PathBuf,
    pub db_path: PathBuf,
    /// Quiet period after the last filter keystroke before the list refreshes.
    pub filter_settle_ms: u64,
    pub form: FormConfig,
    pub ui: UiConfig,
    pub keys: Keys,
}

#[derive(Debug, Clone)]
pub struct FormConfig {
    /// When false, only the email-shape widget constraint applies.
    pub validate: bool,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self { validate: true }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UiConfig {
    pub colors: UiColors,
}

#[derive(Debug, Clone)]
pub struct UiColors {
    pub border: RgbColor,
    pub selection_bg: RgbColor,
    pub selection_fg: RgbColor,
    pub status_fg: RgbColor,
    pub status_bg: RgbColor,
    pub error_fg: RgbColor,
}

impl Default for UiColors {
    fn default() -> Self {
        Self {
            border: RgbColor::new(95, 135, 175),
            selection_bg: RgbColor::new(95, 135, 175),
            selection_fg: RgbColor::new(0, 0, 0),
            status_fg: RgbColor::new(95, 135, 175),
            status_bg: RgbColor::new(0, 0, 0),
            error_fg: RgbColor::new(215, 95, 95),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl<'de> serde::Deserialize<'de> for RgbColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_hex_color(&raw).map_err(serde::de::Error::custom)
    }
}

fn parse_hex_color(raw: &str) -> Result<RgbColor, String> {
    let hex = raw
        .trim()
        .strip_prefix('#')
        .ok_or_else(|| format!("color `{}` must be in #RRGGBB form", raw))?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("color `{}` must be in #RRGGBB form", raw));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|e| e.to_string())
    };
    Ok(RgbColor {
        r: channel(0..2)?,
        g: channel(2..4)?,
        b: channel(4..6)?,
    })
}

// =============================================================================
// Key Bindings - Context-aware with multiple bindings per action
// =============================================================================

/// All key bindings organized by context
#[derive(Debug, Clone, Default)]
pub struct Keys {
    /// Global keys (work outside text entry)
    pub global: GlobalKeys,
    /// Keys while the contact table has focus
    pub list: ListKeys,
    /// Keys while typing in the filter box
    pub filter: FilterKeys,
    /// Keys while the navigation drawer is open
    pub drawer: DrawerKeys,
    /// Keys while the contact form has focus
    pub form: FormKeys,
    /// Keys for the confirm modal
    pub modal: ModalKeys,
}

#[derive(Debug, Clone)]
pub struct GlobalKeys {
    pub quit: Vec<String>,
    pub drawer: Vec<String>,
    pub filter: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ListKeys {
    pub next: Vec<String>,
    pub prev: Vec<String>,
    pub edit: Vec<String>,
    pub add: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FilterKeys {
    pub cancel: Vec<String>,
    pub confirm: Vec<String>,
    pub next: Vec<String>,
    pub prev: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DrawerKeys {
    pub next: Vec<String>,
    pub prev: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FormKeys {
    pub next_field: Vec<String>,
    pub prev_field: Vec<String>,
    pub save: Vec<String>,
    pub cancel: Vec<String>,
    pub delete: Vec<String>,
    pub option_next: Vec<String>,
    pub option_prev: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ModalKeys {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

impl Default for GlobalKeys {
    fn default() -> Self {
        Self {
            quit: vec!["q".into()],
            drawer: vec!["F2".into()],
            filter: vec!["/".into()],
        }
    }
}

impl Default for ListKeys {
    fn default() -> Self {
        Self {
            next: vec!["j".into(), "Down".into()],
            prev: vec!["k".into(), "Up".into()],
            edit: vec!["Enter".into()],
            add: vec!["a".into()],
        }
    }
}

impl Default for FilterKeys {
    fn default() -> Self {
        Self {
            cancel: vec!["Escape".into()],
            confirm: vec!["Enter".into()],
            next: vec!["Down".into()],
            prev: vec!["Up".into()],
        }
    }
}

impl Default for DrawerKeys {
    fn default() -> Self {
        Self {
            next: vec!["j".into(), "Down".into(), "Tab".into()],
            prev: vec!["k".into(), "Up".into(), "Backtab".into()],
            confirm: vec!["Enter".into()],
            cancel: vec!["Escape".into()],
        }
    }
}

impl Default for FormKeys {
    fn default() -> Self {
        Self {
            next_field: vec!["Tab".into(), "Down".into()],
            prev_field: vec!["Backtab".into(), "Up".into()],
            save: vec!["Enter".into()],
            cancel: vec!["Escape".into()],
            delete: vec!["F8".into()],
            option_next: vec!["Right".into()],
            option_prev: vec!["Left".into()],
        }
    }
}

impl Default for ModalKeys {
    fn default() -> Self {
        Self {
            confirm: vec!["y".into(), "Enter".into()],
            cancel: vec!["n".into(), "Escape".into()],
        }
    }
}

/// Reject bindings assigned to more than one action within the same context.
fn validate_key_bindings(keys: &Keys) -> Result<()> {
    let contexts: [(&str, Vec<(&str, &[String])>); 6] = [
        (
            "global",
            vec![
                ("quit", keys.global.quit.as_slice()),
                ("drawer", keys.global.drawer.as_slice()),
                ("filter", keys.global.filter.as_slice()),
            ],
        ),
        (
            "list",
            vec![
                ("next", keys.list.next.as_slice()),
                ("prev", keys.list.prev.as_slice()),
                ("edit", keys.list.edit.as_slice()),
                ("add", keys.list.add.as_slice()),
            ],
        ),
        (
            "filter",
            vec![
                ("cancel", keys.filter.cancel.as_slice()),
                ("confirm", keys.filter.confirm.as_slice()),
                ("next", keys.filter.next.as_slice()),
                ("prev", keys.filter.prev.as_slice()),
            ],
        ),
        (
            "drawer",
            vec![
                ("next", keys.drawer.next.as_slice()),
                ("prev", keys.drawer.prev.as_slice()),
                ("confirm", keys.drawer.confirm.as_slice()),
                ("cancel", keys.drawer.cancel.as_slice()),
            ],
        ),
        (
            "form",
            vec![
                ("next_field", keys.form.next_field.as_slice()),
                ("prev_field", keys.form.prev_field.as_slice()),
                ("save", keys.form.save.as_slice()),
                ("cancel", keys.form.cancel.as_slice()),
                ("delete", keys.form.delete.as_slice()),
                ("option_next", keys.form.option_next.as_slice()),
                ("option_prev", keys.form.option_prev.as_slice()),
            ],
        ),
        (
            "modal",
            vec![
                ("confirm", keys.modal.confirm.as_slice()),
                ("cancel", keys.modal.cancel.as_slice()),
            ],
        ),
    ];

    for (context, actions) in contexts {
        let mut seen: std::collections::HashMap<String, &str> = Default::default();
        for (action, bindings) in actions {
            for binding in bindings {
                let normalized = binding.trim().to_ascii_lowercase();
                if normalized.is_empty() {
                    continue;
                }
                if let Some(other) = seen.insert(normalized, action) {
                    if other != action {
                        bail!(
                            "key binding `{}` is assigned to both `{}.{}` and `{}.{}`",
                            binding.trim(),
                            context,
                            other,
                            context,
                            action
                        );
                    }
                }
            }
        }
    }
    Ok(())
}

// =============================================================================
// File-level representation (permissive, serde defaults)
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    db_path: Option<PathBuf>,
    filter_settle_ms: Option<u64>,
    form: FormFile,
    ui: UiFile,
    keys: KeysFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FormFile {
    validate: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UiFile {
    colors: UiColorsFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UiColorsFile {
    border: Option<RgbColor>,
    selection_bg: Option<RgbColor>,
    selection_fg: Option<RgbColor>,
    status_fg: Option<RgbColor>,
    status_bg: Option<RgbColor>,
    error_fg: Option<RgbColor>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct KeysFile {
    global: GlobalKeysFile,
    list: ListKeysFile,
    filter: FilterKeysFile,
    drawer: DrawerKeysFile,
    form: FormKeysFile,
    modal: ModalKeysFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GlobalKeysFile {
    quit: Option<Vec<String>>,
    drawer: Option<Vec<String>>,
    filter: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListKeysFile {
    next: Option<Vec<String>>,
    prev: Option<Vec<String>>,
    edit: Option<Vec<String>>,
    add: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FilterKeysFile {
    cancel: Option<Vec<String>>,
    confirm: Option<Vec<String>>,
    next: Option<Vec<String>>,
    prev: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DrawerKeysFile {
    next: Option<Vec<String>>,
    prev: Option<Vec<String>>,
    confirm: Option<Vec<String>>,
    cancel: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FormKeysFile {
    next_field: Option<Vec<String>>,
    prev_field: Option<Vec<String>>,
    save: Option<Vec<String>>,
    cancel: Option<Vec<String>>,
    delete: Option<Vec<String>>,
    option_next: Option<Vec<String>>,
    option_prev: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ModalKeysFile {
    confirm: Option<Vec<String>>,
    cancel: Option<Vec<String>>,
}

impl From<KeysFile> for Keys {
    fn from(file: KeysFile) -> Self {
        let defaults = Keys::default();
        Self {
            global: GlobalKeys {
                quit: file.global.quit.unwrap_or(defaults.global.quit),
                drawer: file.global.drawer.unwrap_or(defaults.global.drawer),
                filter: file.global.filter.unwrap_or(defaults.global.filter),
            },
            list: ListKeys {
                next: file.list.next.unwrap_or(defaults.list.next),
                prev: file.list.prev.unwrap_or(defaults.list.prev),
                edit: file.list.edit.unwrap_or(defaults.list.edit),
                add: file.list.add.unwrap_or(defaults.list.add),
            },
            filter: FilterKeys {
                cancel: file.filter.cancel.unwrap_or(defaults.filter.cancel),
                confirm: file.filter.confirm.unwrap_or(defaults.filter.confirm),
                next: file.filter.next.unwrap_or(defaults.filter.next),
                prev: file.filter.prev.unwrap_or(defaults.filter.prev),
            },
            drawer: DrawerKeys {
                next: file.drawer.next.unwrap_or(defaults.drawer.next),
                prev: file.drawer.prev.unwrap_or(defaults.drawer.prev),
                confirm: file.drawer.confirm.unwrap_or(defaults.drawer.confirm),
                cancel: file.drawer.cancel.unwrap_or(defaults.drawer.cancel),
            },
            form: FormKeys {
                next_field: file.form.next_field.unwrap_or(defaults.form.next_field),
                prev_field: file.form.prev_field.unwrap_or(defaults.form.prev_field),
                save: file.form.save.unwrap_or(defaults.form.save),
                cancel: file.form.cancel.unwrap_or(defaults.form.cancel),
                delete: file.form.delete.unwrap_or(defaults.form.delete),
                option_next: file.form.option_next.unwrap_or(defaults.form.option_next),
                option_prev: file.form.option_prev.unwrap_or(defaults.form.option_prev),
            },
            modal: ModalKeys {
                confirm: file.modal.confirm.unwrap_or(defaults.modal.confirm),
                cancel: file.modal.cancel.unwrap_or(defaults.modal.cancel),
            },
        }
    }
}

impl From<UiFile> for UiConfig {
    fn from(file: UiFile) -> Self {
        let defaults = UiColors::default();
        Self {
            colors: UiColors {
                border: file.colors.border.unwrap_or(defaults.border),
                selection_bg: file.colors.selection_bg.unwrap_or(defaults.selection_bg),
                selection_fg: file.colors.selection_fg.unwrap_or(defaults.selection_fg),
                status_fg: file.colors.status_fg.unwrap_or(defaults.status_fg),
                status_bg: file.colors.status_bg.unwrap_or(defaults.status_bg),
                error_fg: file.colors.error_fg.unwrap_or(defaults.error_fg),
            },
        }
    }
}

/// Expand ~ to home directory in paths
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = home::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

fn config_root() -> Result<PathBuf> {
    let base = BaseDirs::new().context("unable to determine base directories")?;
    Ok(base.config_dir().join(APP_NAME))
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_root()?.join(CONFIG_FILE_NAME))
}

pub fn default_db_path() -> Result<PathBuf> {
    let base = BaseDirs::new().context("unable to determine base directories")?;
    Ok(base.data_dir().join(APP_NAME).join(DB_FILE_NAME))
}

pub fn load(path_override: Option<&Path>) -> Result<Config> {
    let path = match path_override {
        Some(path) => path.to_path_buf(),
        None => default_config_path()?,
    };
    if !path.exists() {
        bail!(
            "configuration file not found at {}. Run `crmx init` to create it.",
            path.display()
        );
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read configuration file at {}", path.display()))?;

    let value: toml::Value = toml::from_str(&raw)
        .with_context(|| format!("failed to parse {} as TOML", path.display()))?;

    warn_unknown_keys(&value);

    let cfg_file: ConfigFile = value
        .try_into()
        .with_context(|| format!("failed to deserialize config from {}", path.display()))?;

    let db_path = cfg_file
        .db_path
        .ok_or_else(|| anyhow!("`db_path` must be specified in configuration"))?;
    let db_path = expand_tilde(&db_path);

    let keys: Keys = cfg_file.keys.into();
    validate_key_bindings(&keys)?;

    Ok(Config {
        config_path: path,
        db_path,
        filter_settle_ms: cfg_file.filter_settle_ms.unwrap_or(DEFAULT_FILTER_SETTLE_MS),
        form: FormConfig {
            validate: cfg_file.form.validate.unwrap_or(true),
        },
        ui: cfg_file.ui.into(),
        keys,
    })
}

/// Write a fresh config file for `crmx init`.
pub fn write_default(path: &Path, db_path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Configuration already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config dir: {}", parent.display()))?;
    }
    fs::write(path, default_config_template(db_path))
        .with_context(|| format!("failed to write configuration to {}", path.display()))?;
    Ok(())
}

fn default_config_template(db_path: &Path) -> String {
    format!(
        r##"# crmx configuration

db_path = "{}"

# Quiet period (ms) after the last filter keystroke before the list refreshes.
filter_settle_ms = {}

[form]
# When false, saving only checks the email field shape.
validate = true

[ui.colors]
# Colors are "#RRGGBB".
# border = "#5F87AF"
# selection_bg = "#5F87AF"
# selection_fg = "#000000"
# status_fg = "#5F87AF"
# status_bg = "#000000"
# error_fg = "#D75F5F"

# Key bindings are lists of binding strings, grouped by context, e.g.
# [keys.list]
# next = ["j", "Down"]
"##,
        db_path.display(),
        DEFAULT_FILTER_SETTLE_MS
    )
}

// =============================================================================
// Unknown key warnings
// =============================================================================

fn warn_unknown_keys(value: &toml::Value) {
    let Some(table) = value.as_table() else {
        return;
    };

    let known = HashSet::from(["db_path", "filter_settle_ms", "form", "ui", "keys"]);
    for key in table.keys() {
        if !known.contains(key.as_str()) {
            eprintln!("warning: unknown configuration key `{}`", key);
        }
    }

    if let Some(form_val) = table.get("form") {
        warn_unknown_in_section(form_val, "form", &["validate"]);
    }

    if let Some(ui_val) = table.get("ui").and_then(|v| v.as_table()) {
        for key in ui_val.keys() {
            if key != "colors" {
                eprintln!("warning: unknown ui.* section `{}`", key);
            }
        }
        if let Some(colors_val) = ui_val.get("colors") {
            warn_unknown_in_section(
                colors_val,
                "ui.colors",
                &[
                    "border",
                    "selection_bg",
                    "selection_fg",
                    "status_fg",
                    "status_bg",
                    "error_fg",
                ],
            );
        }
    }

    if let Some(keys_val) = table.get("keys").and_then(|v| v.as_table()) {
        let known_contexts =
            HashSet::from(["global", "list", "filter", "drawer", "form", "modal"]);
        for key in keys_val.keys() {
            if !known_contexts.contains(key.as_str()) {
                eprintln!("warning: unknown keys.* context `{}`", key);
            }
        }
        if let Some(v) = keys_val.get("global") {
            warn_unknown_in_section(v, "keys.global", &["quit", "drawer", "filter"]);
        }
        if let Some(v) = keys_val.get("list") {
            warn_unknown_in_section(v, "keys.list", &["next", "prev", "edit", "add"]);
        }
        if let Some(v) = keys_val.get("filter") {
            warn_unknown_in_section(v, "keys.filter", &["cancel", "confirm", "next", "prev"]);
        }
        if let Some(v) = keys_val.get("drawer") {
            warn_unknown_in_section(v, "keys.drawer", &["next", "prev", "confirm", "cancel"]);
        }
        if let Some(v) = keys_val.get("form") {
            warn_unknown_in_section(
                v,
                "keys.form",
                &[
                    "next_field",
                    "prev_field",
                    "save",
                    "cancel",
                    "delete",
                    "option_next",
                    "option_prev",
                ],
            );
        }
        if let Some(v) = keys_val.get("modal") {
            warn_unknown_in_section(v, "keys.modal", &["confirm", "cancel"]);
        }
    }
}

fn warn_unknown_in_section(value: &toml::Value, section: &str, known: &[&str]) {
    let Some(table) = value.as_table() else {
        return;
    };
    for key in table.keys() {
        if !known.contains(&key.as_str()) {
            eprintln!("warning: unknown {} key `{}`", section, key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn load_from_str(content: &str) -> Result<Config> {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, content).unwrap();
        load(Some(&path))
    }

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config = load_from_str("db_path = \"/tmp/crm.db\"\n").unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/crm.db"));
        assert_eq!(config.filter_settle_ms, DEFAULT_FILTER_SETTLE_MS);
        assert!(config.form.validate);
        assert_eq!(config.keys.global.quit, vec!["q".to_string()]);
        assert_eq!(config.keys.form.save, vec!["Enter".to_string()]);
    }

    #[test]
    fn test_missing_db_path_rejected() {
        let err = load_from_str("filter_settle_ms = 100\n").unwrap_err();
        assert!(err.to_string().contains("db_path"));
    }

    #[test]
    fn test_overrides_applied() {
        let config = load_from_str(
            r##"
db_path = "/tmp/crm.db"
filter_settle_ms = 150

[form]
validate = false

[ui.colors]
border = "#1E90FF"

[keys.list]
add = ["n"]
"##,
        )
        .unwrap();
        assert_eq!(config.filter_settle_ms, 150);
        assert!(!config.form.validate);
        assert_eq!(config.ui.colors.border, RgbColor::new(0x1E, 0x90, 0xFF));
        assert_eq!(config.keys.list.add, vec!["n".to_string()]);
        // Untouched bindings keep their defaults
        assert_eq!(config.keys.list.edit, vec!["Enter".to_string()]);
    }

    #[test]
    fn test_bad_color_rejected() {
        let err = load_from_str("db_path = \"/tmp/a.db\"\n[ui.colors]\nborder = \"1E90FF\"\n")
            .unwrap_err();
        assert!(err.to_string().contains("failed to deserialize"));
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#000000").unwrap(), RgbColor::new(0, 0, 0));
        assert_eq!(
            parse_hex_color(" #D75F5F ").unwrap(),
            RgbColor::new(0xD7, 0x5F, 0x5F)
        );
        assert!(parse_hex_color("#FFF").is_err());
        assert!(parse_hex_color("#GGGGGG").is_err());
    }

    #[test]
    fn test_binding_collision_rejected() {
        let err = load_from_str(
            "db_path = \"/tmp/a.db\"\n[keys.list]\nnext = [\"j\"]\nprev = [\"j\"]\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("assigned to both"));
    }

    #[test]
    fn test_collision_check_is_case_insensitive_per_context() {
        let err = load_from_str(
            "db_path = \"/tmp/a.db\"\n[keys.form]\nsave = [\"ENTER\"]\ncancel = [\"enter\"]\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("assigned to both"));
    }

    #[test]
    fn test_same_binding_in_different_contexts_allowed() {
        // Enter confirms in several contexts; that is not a collision.
        let config = load_from_str("db_path = \"/tmp/a.db\"\n").unwrap();
        assert!(config.keys.filter.confirm.contains(&"Enter".to_string()));
        assert!(config.keys.form.save.contains(&"Enter".to_string()));
    }

    #[test]
    fn test_write_default_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let db_path = dir.path().join("crm.db");

        write_default(&path, &db_path, false).unwrap();
        let config = load(Some(&path)).unwrap();
        assert_eq!(config.db_path, db_path);
        assert!(config.form.validate);
    }

    #[test]
    fn test_write_default_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "existing").unwrap();

        let err = write_default(&path, Path::new("/tmp/a.db"), false).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        write_default(&path, Path::new("/tmp/a.db"), true).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("db_path"));
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_tilde(Path::new("~/crm.db"));
        assert!(!expanded.starts_with("~"));
        assert_eq!(
            expand_tilde(Path::new("/abs/crm.db")),
            PathBuf::from("/abs/crm.db")
        );
    }
}

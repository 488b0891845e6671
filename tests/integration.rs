//! Integration tests for crmx init, seed, and query commands

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command as AssertCommand;
use predicates::prelude::*;
use tempfile::TempDir;

// =============================================================================
// Test Helpers
// =============================================================================

/// Test environment with an initialized crmx config and database
struct TestEnv {
    temp_dir: TempDir,
    config_path: PathBuf,
    db_path: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let db_path = temp_dir.path().join("crm.db");

        crmx_cmd()
            .args([
                "init",
                "--config",
                config_path.to_str().unwrap(),
                "--db-path",
                db_path.to_str().unwrap(),
            ])
            .assert()
            .success();

        Self {
            temp_dir,
            config_path,
            db_path,
        }
    }

    /// Run crmx with this test env's config
    fn crmx(&self) -> AssertCommand {
        let mut cmd = crmx_cmd();
        cmd.args(["--config", self.config_path.to_str().unwrap()]);
        cmd
    }

    fn seed(&self) {
        self.crmx().arg("seed").assert().success();
    }
}

/// Get the crmx binary command
fn crmx_cmd() -> AssertCommand {
    AssertCommand::cargo_bin("crmx").unwrap()
}

// =============================================================================
// Init Tests
// =============================================================================

#[test]
fn test_init_creates_config_and_database() {
    let env = TestEnv::new();

    assert!(env.config_path.exists());
    assert!(env.db_path.exists());

    let config_content = fs::read_to_string(&env.config_path).unwrap();
    assert!(config_content.contains("db_path"));
    assert!(config_content.contains("filter_settle_ms"));
}

#[test]
fn test_init_fails_if_config_exists_without_force() {
    let env = TestEnv::new();

    crmx_cmd()
        .args([
            "init",
            "--config",
            env.config_path.to_str().unwrap(),
            "--db-path",
            env.db_path.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_init_force_overwrites_existing_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    let db_path = temp_dir.path().join("crm.db");

    fs::write(&config_path, "old config").unwrap();

    crmx_cmd()
        .args([
            "init",
            "--config",
            config_path.to_str().unwrap(),
            "--db-path",
            db_path.to_str().unwrap(),
            "--force",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized crmx configuration"));

    let config_content = fs::read_to_string(&config_path).unwrap();
    assert!(config_content.contains("db_path"));
}

#[test]
fn test_commands_fail_without_config() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.toml");

    crmx_cmd()
        .args(["--config", missing.to_str().unwrap(), "query", "ada"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration file not found"));
}

// =============================================================================
// Seed Tests
// =============================================================================

#[test]
fn test_seed_populates_database() {
    let env = TestEnv::new();

    env.crmx()
        .arg("seed")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Seeded 8 companies, 5 statuses, 50 contacts.",
        ));
}

#[test]
fn test_seed_skips_nonempty_database() {
    let env = TestEnv::new();
    env.seed();

    env.crmx()
        .arg("seed")
        .assert()
        .success()
        .stdout(predicate::str::contains("skipping seed"));
}

#[test]
fn test_seed_custom_count() {
    let env = TestEnv::new();

    env.crmx()
        .args(["seed", "--count", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("7 contacts."));
}

// =============================================================================
// Query Tests
// =============================================================================

#[test]
fn test_query_after_seed() {
    let env = TestEnv::new();
    env.seed();

    env.crmx()
        .args(["query", "lovelace"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 contact(s) matching \"lovelace\""))
        .stdout(predicate::str::contains("ada.lovelace@acmecorp.com"));
}

#[test]
fn test_query_matches_first_names_too() {
    let env = TestEnv::new();
    env.seed();

    env.crmx()
        .args(["query", "grace"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Grace"));
}

#[test]
fn test_query_no_matches() {
    let env = TestEnv::new();
    env.seed();

    env.crmx()
        .args(["query", "zzzzzz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No matches for \"zzzzzz\""));
}

#[test]
fn test_query_does_not_match_email_text() {
    let env = TestEnv::new();
    env.seed();

    // Every seeded email ends in .com, but the filter only covers names.
    env.crmx()
        .args(["query", "acmecorp"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No matches"));
}

#[test]
fn test_query_on_empty_database() {
    let env = TestEnv::new();

    env.crmx()
        .args(["query", "ada"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No matches for \"ada\""));

    // The database file stays where init put it
    assert!(env.temp_dir.path().join("crm.db").exists());
}

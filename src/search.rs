use deunicode::deunicode;

/// Fold a name for matching: transliterate to ASCII, then lowercase
/// ("Müller" -> "muller").
pub fn normalize(s: &str) -> String {
    deunicode(s).to_lowercase()
}

/// Prepare the list view's filter string for a lookup. Whitespace-only
/// input means "no filter".
pub fn normalize_filter(filter: &str) -> Option<String> {
    let trimmed = filter.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(normalize(trimmed))
    }
}

/// Wrap a normalized fragment in LIKE wildcards. Literal `%` and `_` are
/// escaped so they only match themselves.
pub fn like_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for c in fragment.chars() {
        if matches!(c, '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

//! Canonical line-code normalization.

use std::sync::OnceLock;

use regex::Regex;

/// Get the line-code regex pattern.
///
/// Matches a leading run of digits optionally followed by letters, with
/// whitespace tolerated in between ("Line 43X " → "43X", "14" → "14").
fn code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Pattern breakdown:
        // \d+\s*[A-Z]+ - digits, optional whitespace, letter suffix ("43 X")
        // \d+          - or digits alone
        Regex::new(r"(?i)(\d+\s*[A-Z]+|\d+)").unwrap()
    })
}

/// Normalize a raw line identifier to its canonical code.
///
/// Extracts the first digit run (with optional letter suffix) if one exists,
/// otherwise keeps the whole string; strips all whitespace and uppercases.
/// Idempotent: normalizing an already-canonical code returns it unchanged.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    let matched = code_pattern()
        .find(trimmed)
        .map(|m| m.as_str())
        .unwrap_or(trimmed);

    matched
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

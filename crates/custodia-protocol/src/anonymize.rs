//! Display anonymization using regex passes.
//!
//! Obscures names and numbers for casual display in logs. Not a privacy
//! guarantee: the transform is lossy but trivially recognizable.

use once_cell::sync::Lazy;
use regex::Regex;

// Compiled once, reused. Pass order matters: digits first, then letter runs,
// so "Bob5" masks to "Bob*" and only then to "****".
static DIGIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]").unwrap());
static ALPHA_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z]{3,}").unwrap());

/// Anonymize text for display: every digit becomes `*`, then every run of
/// three or more ASCII letters becomes `***`. Deterministic and stateless.
pub fn anonymize(text: &str) -> String {
    let digits_masked = DIGIT_RE.replace_all(text, "*");
    ALPHA_RUN_RE.replace_all(&digits_masked, "***").into_owned()
}

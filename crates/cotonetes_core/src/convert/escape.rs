//! LaTeX special-character escaping.
//!
//! Only the characters `& # % _ $ ^` are escaped. `unescape` is the general
//! inverse and strips the backslash from any `\X` pair, so it must only run
//! over isolated content, never over structural lines.

use once_cell::sync::Lazy;
use regex::Regex;

static SPECIAL_CHAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([&#%_])").expect("valid special char regex"));
static ESCAPED_CHAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\(.)").expect("valid escaped char regex"));

/// Escapes LaTeX special characters in one line of text.
pub fn escape(line: &str) -> String {
    let escaped = SPECIAL_CHAR_RE.replace_all(line, r"\${1}");
    escaped.replace('$', r"\$").replace('^', r"\^")
}

/// Reverses single-character escapes: every `\X` becomes `X`.
pub fn unescape(line: &str) -> String {
    ESCAPED_CHAR_RE.replace_all(line, "${1}").into_owned()
}

//! Inline markdown <-> LaTeX substitutions (bold spans and links).
//!
//! # Invariants
//! - Link targets are captured before escaping and reinserted unescaped.
//! - Link display text that differs from its target cannot be recovered by
//!   the reverse pass; it survives only as trailing plain text.

use super::escape::{escape, unescape};
use once_cell::sync::Lazy;
use regex::Regex;

static MD_BOLD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*([^*]*)\*\*").expect("valid bold regex"));
static MD_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.*\[([^\]]*)\]\(([^)]*)\)\.*").expect("valid link regex"));
static TEX_BOLD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\textbf\{([^}]*)\}").expect("valid textbf regex"));
static TEX_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\url\{([^}]*)\}").expect("valid url regex"));

/// Converts one markdown-like line into LaTeX.
///
/// Returns an empty string for an empty line; the block layer turns that into
/// a paragraph-break marker.
pub fn to_latex(line: &str) -> String {
    let line = MD_BOLD_RE.replace_all(line, r"\textbf{${1}}");

    let links: Vec<(String, String)> = MD_LINK_RE
        .captures_iter(&line)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect();

    let escaped = escape(&line);
    let line = if links.is_empty() {
        escaped
    } else {
        substitute_links(&escaped, &links)
    };

    line.replace(r"\*", "*")
}

/// Converts one LaTeX content line back into markdown-like text.
pub fn to_markdown(line: &str) -> String {
    let line = TEX_BOLD_RE.replace_all(line, "**${1}**");
    let line = TEX_URL_RE.replace_all(&line, "[${1}](${1})");
    unescape(&line)
}

// Escaping only inserts backslashes, so the escaped line holds the same link
// spans, in the same order, as the line the captures were taken from.
fn substitute_links(escaped: &str, links: &[(String, String)]) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut last = 0;
    for (span, (text, url)) in MD_LINK_RE.find_iter(escaped).zip(links) {
        out.push_str(&escaped[last..span.start()]);
        if text == url {
            out.push_str(&format!(r"\url{{{url}}}"));
        } else {
            out.push_str(&format!(r"\url{{{url}}} ({text})"));
        }
        last = span.end();
    }
    out.push_str(&escaped[last..]);
    out
}

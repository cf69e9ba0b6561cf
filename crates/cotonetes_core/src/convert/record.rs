//! Note record rendering and parsing.
//!
//! # Responsibility
//! - Render a `Note` as a LaTeX record: four metadata lines, a paragraph
//!   break, the converted body and an `\hrulefill` separator.
//! - Recover notes from LaTeX text by scanning for records.
//!
//! # Invariants
//! - The five fixed lines are emitted byte-for-byte as documented below.
//! - Each metadata field is parsed by its own pattern; a mismatch is a
//!   `RecordError`, never a panic.
//! - URLs are never escaped or unescaped.

use super::block::{body_to_latex, body_to_markdown, LINE_BREAK};
use super::escape::{escape, unescape};
use crate::model::note::{Note, NoteValidationError};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// First line prefix of every record.
pub const TITLE_PREFIX: &str = r"\textbf{Title:}";
/// Record separator prefix.
pub const SEPARATOR_PREFIX: &str = r"\hrulefill";

const TITLE_LABEL: &str = "Title:";
const URL_LABEL: &str = "URL:";
const CREATED_LABEL: &str = "Created:";
const UPDATED_LABEL: &str = "Last Updated:";

static FIELD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\\textbf\{([^}]*)\} (.*[^\\])?\\").expect("valid metadata field regex")
});
static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\\url\{(.*)\}$").expect("valid metadata url regex"));

pub type RecordResult<T> = Result<T, RecordError>;

/// Malformed record input. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// A metadata line does not match its field pattern.
    MalformedField {
        line: usize,
        field: &'static str,
        text: String,
    },
    /// The separator arrived before all metadata lines were read.
    MissingField { line: usize, field: &'static str },
    /// A record was opened but input ended before its separator.
    UnterminatedRecord { line: usize },
    /// Parsed fields violate `Note` invariants.
    InvalidNote {
        line: usize,
        source: NoteValidationError,
    },
}

impl Display for RecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedField { line, field, text } => {
                write!(f, "line {line}: malformed {field} field: `{text}`")
            }
            Self::MissingField { line, field } => {
                write!(f, "line {line}: record ends before its {field} field")
            }
            Self::UnterminatedRecord { line } => {
                write!(f, "line {line}: record is missing its `\\hrulefill` separator")
            }
            Self::InvalidNote { line, source } => write!(f, "line {line}: {source}"),
        }
    }
}

impl Error for RecordError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidNote { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Section header opening an exported file.
///
/// `depth` is the 0-based nesting of the category: 0 renders `\section`,
/// 1 renders `\subsection`, and so on.
pub fn render_section_header(name: &str, depth: usize) -> Vec<String> {
    vec![
        format!(r"\{}section{{{}}}", "sub".repeat(depth), escape(name)),
        String::new(),
    ]
}

/// Renders one note as record lines.
pub fn render_record(note: &Note) -> Vec<String> {
    let mut lines = vec![
        format!(r"{TITLE_PREFIX} {}\\", escape(&note.title)),
        format!(r"\textbf{{{URL_LABEL}}} \url{{{}}}\\", note.url),
        format!(r"\textbf{{{CREATED_LABEL}}} {}\\", note.created),
        format!(r"\textbf{{{UPDATED_LABEL}}} {}\\", note.updated),
        LINE_BREAK.to_string(),
    ];
    lines.extend(body_to_latex(&note.body));
    lines.push(SEPARATOR_PREFIX.to_string());
    lines.push(LINE_BREAK.to_string());
    lines.push(String::new());
    lines
}

/// Renders a full export file: section header followed by every record.
pub fn render_document(section: &str, depth: usize, notes: &[Note]) -> Vec<String> {
    let mut lines = render_section_header(section, depth);
    for note in notes {
        lines.extend(render_record(note));
    }
    lines
}

/// Parses every record found in LaTeX text.
pub fn parse_document(text: &str) -> RecordResult<Vec<Note>> {
    let lines: Vec<&str> = text.lines().collect();
    parse_records(&lines)
}

/// Parses every record found in a sequence of LaTeX lines.
///
/// Lines outside records (section headers, preamble) are ignored. A record
/// starts at a line beginning with `\textbf{Title:}` and ends at the next line
/// beginning with `\hrulefill`.
pub fn parse_records<S: AsRef<str>>(lines: &[S]) -> RecordResult<Vec<Note>> {
    let mut notes = Vec::new();
    let mut current: Option<(usize, Vec<&str>)> = None;

    for (index, line) in lines.iter().map(|line| line.as_ref()).enumerate() {
        let line_no = index + 1;
        match current.as_mut() {
            None => {
                if line.starts_with(TITLE_PREFIX) {
                    current = Some((line_no, vec![line]));
                }
            }
            Some((start, buffered)) => {
                if line.starts_with(SEPARATOR_PREFIX) {
                    notes.push(parse_record(*start, buffered, line_no)?);
                    current = None;
                } else {
                    buffered.push(line);
                }
            }
        }
    }

    if let Some((start, _)) = current {
        return Err(RecordError::UnterminatedRecord { line: start });
    }

    Ok(notes)
}

/// Fixed metadata prefix of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RecordHeader {
    title: String,
    url: String,
    created: String,
    updated: String,
}

impl RecordHeader {
    const LEN: usize = 4;

    fn parse(start: usize, lines: &[&str], separator_line: usize) -> RecordResult<Self> {
        let field = |offset: usize, label: &'static str| -> RecordResult<String> {
            let line = lines.get(offset).ok_or(RecordError::MissingField {
                line: separator_line,
                field: label,
            })?;
            field_value(line, label).ok_or_else(|| RecordError::MalformedField {
                line: start + offset,
                field: label,
                text: line.to_string(),
            })
        };

        let title = unescape(&field(0, TITLE_LABEL)?);
        let url_field = field(1, URL_LABEL)?;
        let url = URL_RE
            .captures(&url_field)
            .map(|caps| caps[1].to_string())
            .ok_or_else(|| RecordError::MalformedField {
                line: start + 1,
                field: URL_LABEL,
                text: lines[1].to_string(),
            })?;
        let created = field(2, CREATED_LABEL)?;
        let updated = field(3, UPDATED_LABEL)?;

        Ok(Self {
            title,
            url,
            created,
            updated,
        })
    }
}

fn field_value(line: &str, label: &str) -> Option<String> {
    let caps = FIELD_RE.captures(line)?;
    if &caps[1] != label {
        return None;
    }
    Some(caps.get(2).map_or("", |value| value.as_str()).to_string())
}

fn parse_record(start: usize, lines: &[&str], separator_line: usize) -> RecordResult<Note> {
    let header = RecordHeader::parse(start, lines, separator_line)?;

    let mut body_start = RecordHeader::LEN;
    if lines.get(body_start).map(|line| line.trim()) == Some(LINE_BREAK) {
        body_start += 1;
    }
    let mut body_end = lines.len().max(body_start);
    // The blank line closing the body's final block belongs to the record frame.
    if body_end > body_start && lines[body_end - 1].is_empty() {
        body_end -= 1;
    }
    let body = body_to_markdown(&lines[body_start..body_end]);

    debug!(
        "event=record_parse module=convert status=ok line={} body_lines={}",
        start,
        body.len()
    );

    Note::new(header.title, header.url, header.created, header.updated, body)
        .map_err(|source| RecordError::InvalidNote {
            line: start,
            source,
        })
}

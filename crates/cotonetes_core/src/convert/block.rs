//! Block-level state machines for note bodies.
//!
//! # Responsibility
//! - Forward: wrap bullet lists, numbered lists and fenced regions of a
//!   markdown-like body in LaTeX environments.
//! - Reverse: recognize the same environments in a LaTeX body and rebuild
//!   markdown-like lines.
//!
//! # Invariants
//! - Forward output never leaves an environment open: every
//!   `\begin{...}` emitted is matched by its `\end{...}` before another one
//!   opens or the body ends.
//! - Fenced content is emitted unchanged in both directions.
//! - Neither machine holds state across calls.

use super::inline;
use once_cell::sync::Lazy;
use regex::Regex;

/// Markdown fence line delimiting a verbatim region.
pub const FENCE: &str = "```";
/// LaTeX paragraph-break marker.
pub const LINE_BREAK: &str = r"\\";

const BEGIN_ITEMIZE: &str = r"\begin{itemize}";
const END_ITEMIZE: &str = r"\end{itemize}";
const BEGIN_ENUMERATE: &str = r"\begin{enumerate}";
const END_ENUMERATE: &str = r"\end{enumerate}";
const BEGIN_VERBATIM: &str = r"\begin{verbatim}";
const END_VERBATIM: &str = r"\end{verbatim}";

static BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ *\* +(.*)$").expect("valid bullet regex"));
static NUMBERED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ *[0-9]+\. +(.*)$").expect("valid numbered regex"));
static ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\\item (.*)$").expect("valid item regex"));
static LINE_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ *\\\\ *$").expect("valid line break regex"));

/// Environment the forward machine is currently inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    Normal,
    Itemize,
    Enumerate,
    Verbatim,
}

/// Structural category of one markdown-like input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Bullet,
    Numbered,
    Fence,
    Plain,
}

impl LineKind {
    /// Classifies a body line. Numbered items take precedence over bullets.
    pub fn of(line: &str) -> Self {
        if line.is_empty() {
            Self::Blank
        } else if line == FENCE {
            Self::Fence
        } else if NUMBERED_RE.is_match(line) {
            Self::Numbered
        } else if BULLET_RE.is_match(line) {
            Self::Bullet
        } else {
            Self::Plain
        }
    }
}

/// Result of feeding one line to the forward machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: BlockState,
    pub emitted: Vec<String>,
    /// Set when the machine must stop without emitting its closing lines.
    pub done: bool,
}

impl Transition {
    fn to(next: BlockState, emitted: Vec<String>) -> Self {
        Self {
            next,
            emitted,
            done: false,
        }
    }
}

/// Forward transition function: `(state, line) -> (new state, emitted lines)`.
///
/// `is_last` marks the final line of the body; a fence closing on the last
/// line suppresses the trailing paragraph-break marker.
pub fn step(state: BlockState, line: &str, is_last: bool) -> Transition {
    let kind = LineKind::of(line);

    if state == BlockState::Verbatim {
        return match kind {
            LineKind::Fence => Transition {
                next: BlockState::Normal,
                emitted: vec![END_VERBATIM.to_string()],
                done: is_last,
            },
            _ => Transition::to(BlockState::Verbatim, vec![line.to_string()]),
        };
    }

    let mut emitted = Vec::new();
    match (state, kind) {
        // blank lines inside lists are dropped
        (BlockState::Itemize | BlockState::Enumerate, LineKind::Blank) => {
            return Transition::to(state, emitted);
        }
        (BlockState::Enumerate, LineKind::Numbered) | (BlockState::Itemize, LineKind::Bullet) => {
            emitted.push(list_item(line, state));
            return Transition::to(state, emitted);
        }
        (BlockState::Enumerate, _) => close(&mut emitted, END_ENUMERATE),
        (BlockState::Itemize, _) => close(&mut emitted, END_ITEMIZE),
        _ => {}
    }

    match kind {
        LineKind::Numbered => {
            open(&mut emitted, BEGIN_ENUMERATE);
            emitted.push(list_item(line, BlockState::Enumerate));
            Transition::to(BlockState::Enumerate, emitted)
        }
        LineKind::Bullet => {
            open(&mut emitted, BEGIN_ITEMIZE);
            emitted.push(list_item(line, BlockState::Itemize));
            Transition::to(BlockState::Itemize, emitted)
        }
        LineKind::Fence => {
            emitted.push(BEGIN_VERBATIM.to_string());
            Transition::to(BlockState::Verbatim, emitted)
        }
        LineKind::Blank | LineKind::Plain => {
            push_content(&mut emitted, inline::to_latex(line));
            Transition::to(BlockState::Normal, emitted)
        }
    }
}

/// Lines closing whatever environment is still open once the body ends.
pub fn finish(state: BlockState) -> Vec<String> {
    let mut emitted = Vec::new();
    match state {
        BlockState::Enumerate => close(&mut emitted, END_ENUMERATE),
        BlockState::Itemize => close(&mut emitted, END_ITEMIZE),
        BlockState::Verbatim => emitted.push(END_VERBATIM.to_string()),
        BlockState::Normal => push_line_break(&mut emitted),
    }
    emitted
}

/// Renders a markdown-like body into LaTeX lines.
pub fn body_to_latex<S: AsRef<str>>(body: &[S]) -> Vec<String> {
    let mut state = BlockState::Normal;
    let mut out = Vec::new();

    for (index, line) in body.iter().enumerate() {
        let transition = step(state, line.as_ref(), index + 1 == body.len());
        out.extend(transition.emitted);
        if transition.done {
            return out;
        }
        state = transition.next;
    }

    out.extend(finish(state));
    out
}

/// Rebuilds markdown-like lines from a LaTeX body.
///
/// Blank lines are dropped unless they directly follow a `\\` marker, in
/// which case exactly one is kept. Numbered items are renumbered from 1.
pub fn body_to_markdown<S: AsRef<str>>(latex: &[S]) -> Vec<String> {
    let mut state = BlockState::Normal;
    let mut counter = 0u32;
    let mut break_pending = false;
    let mut out = Vec::new();

    for line in latex.iter().map(|line| line.as_ref()) {
        if state == BlockState::Verbatim {
            if line == END_VERBATIM {
                out.push(FENCE.to_string());
                state = BlockState::Normal;
            } else {
                out.push(line.to_string());
            }
            continue;
        }

        match line {
            BEGIN_ENUMERATE => {
                state = BlockState::Enumerate;
                counter = 0;
                continue;
            }
            BEGIN_ITEMIZE => {
                state = BlockState::Itemize;
                continue;
            }
            BEGIN_VERBATIM => {
                out.push(FENCE.to_string());
                state = BlockState::Verbatim;
                continue;
            }
            END_ENUMERATE | END_ITEMIZE => {
                state = BlockState::Normal;
                continue;
            }
            END_VERBATIM => {
                out.push(FENCE.to_string());
                continue;
            }
            _ => {}
        }

        if line.is_empty() && !break_pending {
            continue;
        }
        break_pending = false;

        if LINE_BREAK_RE.is_match(line) {
            break_pending = true;
            continue;
        }

        let line = match (state, ITEM_RE.captures(line)) {
            (BlockState::Enumerate, Some(caps)) => {
                counter += 1;
                format!("{counter}. {}", &caps[1])
            }
            (BlockState::Itemize, Some(caps)) => format!("* {}", &caps[1]),
            _ => line.to_string(),
        };

        out.push(inline::to_markdown(&line));
    }

    out
}

fn list_item(line: &str, state: BlockState) -> String {
    let re = match state {
        BlockState::Enumerate => &*NUMBERED_RE,
        _ => &*BULLET_RE,
    };
    let item = re.replace(line, "\t\\item ${1}");
    inline::to_latex(&item)
}

fn open(emitted: &mut Vec<String>, begin: &str) {
    emitted.push(String::new());
    emitted.push(begin.to_string());
}

fn close(emitted: &mut Vec<String>, end: &str) {
    emitted.push(end.to_string());
    emitted.push(String::new());
}

fn push_content(emitted: &mut Vec<String>, line: String) {
    if line.is_empty() {
        push_line_break(emitted);
    } else {
        emitted.push(line);
    }
}

fn push_line_break(emitted: &mut Vec<String>) {
    emitted.push(LINE_BREAK.to_string());
    emitted.push(String::new());
}

#[cfg(test)]
mod tests {
    use super::{
        body_to_latex, body_to_markdown, finish, step, BlockState, LineKind, Transition,
    };

    const PLAIN: &str = "text";
    const BULLET: &str = "* a";
    const NUMBER: &str = "1. a";
    const FENCE: &str = "```";
    const BLANK: &str = "";

    fn lines(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn assert_step(state: BlockState, line: &str, next: BlockState, emitted: &[&str]) {
        let transition = step(state, line, false);
        assert_eq!(
            transition,
            Transition {
                next,
                emitted: lines(emitted),
                done: false,
            },
            "state={state:?} line={line:?}"
        );
    }

    #[test]
    fn classifies_line_kinds() {
        assert_eq!(LineKind::of(PLAIN), LineKind::Plain);
        assert_eq!(LineKind::of(BULLET), LineKind::Bullet);
        assert_eq!(LineKind::of("   *   indented"), LineKind::Bullet);
        assert_eq!(LineKind::of(NUMBER), LineKind::Numbered);
        assert_eq!(LineKind::of("  12. twelve"), LineKind::Numbered);
        assert_eq!(LineKind::of(FENCE), LineKind::Fence);
        assert_eq!(LineKind::of(BLANK), LineKind::Blank);
        assert_eq!(LineKind::of("**bold** first"), LineKind::Plain);
        assert_eq!(LineKind::of(" ```"), LineKind::Plain);
    }

    #[test]
    fn transitions_from_normal() {
        let s = BlockState::Normal;
        assert_step(s, PLAIN, BlockState::Normal, &["text"]);
        assert_step(s, BULLET, BlockState::Itemize, &["", r"\begin{itemize}", "\t\\item a"]);
        assert_step(
            s,
            NUMBER,
            BlockState::Enumerate,
            &["", r"\begin{enumerate}", "\t\\item a"],
        );
        assert_step(s, FENCE, BlockState::Verbatim, &[r"\begin{verbatim}"]);
        assert_step(s, BLANK, BlockState::Normal, &[r"\\", ""]);
    }

    #[test]
    fn transitions_from_itemize() {
        let s = BlockState::Itemize;
        assert_step(s, PLAIN, BlockState::Normal, &[r"\end{itemize}", "", "text"]);
        assert_step(s, BULLET, BlockState::Itemize, &["\t\\item a"]);
        assert_step(
            s,
            NUMBER,
            BlockState::Enumerate,
            &[r"\end{itemize}", "", "", r"\begin{enumerate}", "\t\\item a"],
        );
        assert_step(
            s,
            FENCE,
            BlockState::Verbatim,
            &[r"\end{itemize}", "", r"\begin{verbatim}"],
        );
        assert_step(s, BLANK, BlockState::Itemize, &[]);
    }

    #[test]
    fn transitions_from_enumerate() {
        let s = BlockState::Enumerate;
        assert_step(s, PLAIN, BlockState::Normal, &[r"\end{enumerate}", "", "text"]);
        assert_step(
            s,
            BULLET,
            BlockState::Itemize,
            &[r"\end{enumerate}", "", "", r"\begin{itemize}", "\t\\item a"],
        );
        assert_step(s, NUMBER, BlockState::Enumerate, &["\t\\item a"]);
        assert_step(
            s,
            FENCE,
            BlockState::Verbatim,
            &[r"\end{enumerate}", "", r"\begin{verbatim}"],
        );
        assert_step(s, BLANK, BlockState::Enumerate, &[]);
    }

    #[test]
    fn transitions_from_verbatim() {
        let s = BlockState::Verbatim;
        assert_step(s, PLAIN, BlockState::Verbatim, &["text"]);
        assert_step(s, BULLET, BlockState::Verbatim, &["* a"]);
        assert_step(s, NUMBER, BlockState::Verbatim, &["1. a"]);
        assert_step(s, FENCE, BlockState::Normal, &[r"\end{verbatim}"]);
        assert_step(s, BLANK, BlockState::Verbatim, &[""]);
    }

    #[test]
    fn closing_fence_on_last_line_stops_the_machine() {
        let transition = step(BlockState::Verbatim, FENCE, true);
        assert!(transition.done);
        let transition = step(BlockState::Normal, PLAIN, true);
        assert!(!transition.done);
    }

    #[test]
    fn finish_closes_open_environments() {
        assert_eq!(finish(BlockState::Normal), lines(&[r"\\", ""]));
        assert_eq!(finish(BlockState::Itemize), lines(&[r"\end{itemize}", ""]));
        assert_eq!(finish(BlockState::Enumerate), lines(&[r"\end{enumerate}", ""]));
        assert_eq!(finish(BlockState::Verbatim), lines(&[r"\end{verbatim}"]));
    }

    #[test]
    fn plain_paragraphs_gain_a_single_trailing_marker() {
        let latex = body_to_latex(&["first line", "second line"]);
        assert_eq!(latex, lines(&["first line", "second line", r"\\", ""]));
    }

    #[test]
    fn empty_line_becomes_paragraph_break() {
        let latex = body_to_latex(&["a", "", "b"]);
        assert_eq!(latex, lines(&["a", r"\\", "", "b", r"\\", ""]));
    }

    #[test]
    fn bullets_produce_balanced_itemize() {
        let latex = body_to_latex(&["* a", "* b"]);
        assert_eq!(
            latex,
            lines(&[
                "",
                r"\begin{itemize}",
                "\t\\item a",
                "\t\\item b",
                r"\end{itemize}",
                "",
            ])
        );
        assert_eq!(body_to_markdown(&latex), lines(&["* a", "* b"]));
    }

    #[test]
    fn blank_lines_inside_lists_are_dropped() {
        let latex = body_to_latex(&["1. a", "", "2. b"]);
        assert_eq!(
            latex,
            lines(&[
                "",
                r"\begin{enumerate}",
                "\t\\item a",
                "\t\\item b",
                r"\end{enumerate}",
                "",
            ])
        );
    }

    #[test]
    fn list_followed_by_text_is_closed_before_the_text() {
        let latex = body_to_latex(&["* a", "after"]);
        assert_eq!(
            latex,
            lines(&[
                "",
                r"\begin{itemize}",
                "\t\\item a",
                r"\end{itemize}",
                "",
                "after",
                r"\\",
                "",
            ])
        );
        assert_eq!(body_to_markdown(&latex), lines(&["* a", "after"]));
    }

    #[test]
    fn list_items_get_inline_formatting() {
        let latex = body_to_latex(&["* **bold** [site](http://a_b)"]);
        assert_eq!(latex[2], "\t\\item \\textbf{bold} \\url{http://a_b} (site)");
    }

    #[test]
    fn numbered_items_are_renumbered_from_one() {
        let latex = body_to_latex(&["1. a", "2. b", "3. c"]);
        assert_eq!(body_to_markdown(&latex), lines(&["1. a", "2. b", "3. c"]));

        let latex = body_to_latex(&["7. a", "7. b", "42. c"]);
        assert_eq!(body_to_markdown(&latex), lines(&["1. a", "2. b", "3. c"]));
    }

    #[test]
    fn counter_restarts_for_each_enumerate_block() {
        let latex = body_to_latex(&["1. a", "2. b", "between", "5. c"]);
        assert_eq!(
            body_to_markdown(&latex),
            lines(&["1. a", "2. b", "between", "1. c"])
        );
    }

    #[test]
    fn verbatim_content_is_untouched_both_ways() {
        let body = ["```", r"raw <text> & % _ $ ^ \x", "", "* not a list", "```"];
        let latex = body_to_latex(&body);
        assert_eq!(
            latex,
            lines(&[
                r"\begin{verbatim}",
                r"raw <text> & % _ $ ^ \x",
                "",
                "* not a list",
                r"\end{verbatim}",
            ])
        );
        assert_eq!(body_to_markdown(&latex), lines(&body));
    }

    #[test]
    fn verbatim_in_the_middle_keeps_trailing_marker() {
        let latex = body_to_latex(&["```", "x", "```", "after"]);
        assert_eq!(
            latex,
            lines(&[
                r"\begin{verbatim}",
                "x",
                r"\end{verbatim}",
                "after",
                r"\\",
                "",
            ])
        );
    }

    #[test]
    fn unclosed_fence_is_closed_at_end_of_body() {
        let latex = body_to_latex(&["```", "code"]);
        assert_eq!(latex, lines(&[r"\begin{verbatim}", "code", r"\end{verbatim}"]));
    }

    #[test]
    fn switching_list_kinds_never_interleaves_environments() {
        let latex = body_to_latex(&["* a", "1. b", "* c"]);
        let mut depth = 0i32;
        for line in &latex {
            if line.starts_with(r"\begin{") {
                depth += 1;
                assert_eq!(depth, 1, "nested environment in {latex:?}");
            } else if line.starts_with(r"\end{") {
                depth -= 1;
            }
        }
        assert_eq!(depth, 0);
        assert_eq!(body_to_markdown(&latex), lines(&["* a", "1. b", "* c"]));
    }

    #[test]
    fn empty_body_renders_a_single_marker() {
        let body: [&str; 0] = [];
        assert_eq!(body_to_latex(&body), lines(&[r"\\", ""]));
    }

    #[test]
    fn reverse_keeps_one_blank_line_after_marker() {
        let markdown = body_to_markdown(&["a", r"\\", "", "", "b"]);
        assert_eq!(markdown, lines(&["a", "", "b"]));
    }

    #[test]
    fn reverse_drops_blank_lines_without_marker() {
        let markdown = body_to_markdown(&["a", "", "", "b"]);
        assert_eq!(markdown, lines(&["a", "b"]));
    }

    #[test]
    fn reverse_recognizes_indented_marker() {
        let markdown = body_to_markdown(&["a", r"  \\  ", "", "b"]);
        assert_eq!(markdown, lines(&["a", "", "b"]));
    }

    #[test]
    fn plain_paragraph_round_trip_surfaces_the_marker_blank() {
        let body = ["one", "", "two_three 50%"];
        let latex = body_to_latex(&body);
        let markdown = body_to_markdown(&latex[..latex.len() - 1]);
        assert_eq!(markdown, lines(&body));
    }
}

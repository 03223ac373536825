//! Format-toggle commands.
//!
//! Pure rewrites over the raw text: inline wraps around the selection, and
//! line prefixes (headings, list markers) on the cursor's line.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::buffer::Selection;
use crate::markup::lines::{clamp_to_boundary, line_range_at};
use crate::markup::{LineKind, classify_line, todo_marker_range};

static HEADING_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6} ").expect("heading prefix pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatCommand {
    Bold,
    Italic,
    Strikethrough,
    Heading1,
    Heading2,
    Heading3,
    Body,
    BulletList,
    NumberedList,
    Checklist,
}

impl FormatCommand {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bold => "Bold",
            Self::Italic => "Italic",
            Self::Strikethrough => "Strikethrough",
            Self::Heading1 => "Heading 1",
            Self::Heading2 => "Heading 2",
            Self::Heading3 => "Heading 3",
            Self::Body => "Body",
            Self::BulletList => "Bullet list",
            Self::NumberedList => "Numbered list",
            Self::Checklist => "Checklist",
        }
    }

    const fn inline_marker(self) -> Option<&'static str> {
        match self {
            Self::Bold => Some("**"),
            Self::Italic => Some("*"),
            Self::Strikethrough => Some("~~"),
            _ => None,
        }
    }

    const fn heading_prefix(self) -> Option<&'static str> {
        match self {
            Self::Heading1 => Some("# "),
            Self::Heading2 => Some("## "),
            Self::Heading3 => Some("### "),
            Self::Body => Some(""),
            _ => None,
        }
    }
}

/// Result of a command: the rewritten text and the new caret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub text: String,
    pub cursor: usize,
}

/// Apply `command` to `text` at `selection`.
///
/// Returns `None` when the command does not apply (inline wrap with an
/// empty selection).
pub fn apply_command(
    command: FormatCommand,
    text: &str,
    selection: Selection,
) -> Option<CommandOutcome> {
    let start = clamp_to_boundary(text, selection.start);
    let end = clamp_to_boundary(text, selection.end()).max(start);

    if let Some(marker) = command.inline_marker() {
        return wrap_inline(text, start..end, marker);
    }
    let line = line_range_at(text, start);
    let col = start - line.start;
    if let Some(prefix) = command.heading_prefix() {
        return Some(set_heading(text, line, col, prefix));
    }
    Some(toggle_list(text, line, col, command))
}

fn wrap_inline(text: &str, range: Range<usize>, marker: &str) -> Option<CommandOutcome> {
    if range.is_empty() {
        return None;
    }
    let mut out = String::with_capacity(text.len() + marker.len() * 2);
    out.push_str(&text[..range.start]);
    out.push_str(marker);
    out.push_str(&text[range.clone()]);
    out.push_str(marker);
    out.push_str(&text[range.end..]);
    Some(CommandOutcome {
        text: out,
        cursor: range.end + marker.len() * 2,
    })
}

fn set_heading(text: &str, line: Range<usize>, col: usize, prefix: &str) -> CommandOutcome {
    let current = &text[line.clone()];
    let old_prefix = HEADING_PREFIX_RE.find(current).map_or(0, |m| m.end());
    let body = &current[old_prefix..];
    replace_line(text, line, &format!("{prefix}{body}"), col, old_prefix, prefix.len())
}

fn toggle_list(
    text: &str,
    line: Range<usize>,
    col: usize,
    command: FormatCommand,
) -> CommandOutcome {
    let current = &text[line.clone()];
    let classified = classify_line(current);
    let indent = classified.indent;
    let same_type = matches!(
        (command, classified.kind),
        (FormatCommand::BulletList, LineKind::Bullet)
            | (FormatCommand::NumberedList, LineKind::Numbered(_))
            | (FormatCommand::Checklist, LineKind::Todo { .. })
    );

    // Text that follows the marker we keep or replace.
    let body = if classified.kind.is_list() {
        classified.content
    } else {
        &current[indent.len()..]
    };
    let old_prefix = current.len() - body.len();

    let marker = if same_type {
        String::new()
    } else {
        match command {
            FormatCommand::NumberedList => {
                format!("{}. ", next_number(text, line.start, indent))
            }
            FormatCommand::Checklist => "- [ ] ".to_string(),
            _ => "- ".to_string(),
        }
    };
    let new_prefix = indent.len() + marker.len();
    replace_line(
        text,
        line,
        &format!("{indent}{marker}{body}"),
        col,
        old_prefix,
        new_prefix,
    )
}

/// Number for a new numbered item: one past the previous line's number when
/// it is numbered at the same indent, else 1.
fn next_number(text: &str, line_start: usize, indent: &str) -> u64 {
    if line_start == 0 {
        return 1;
    }
    let previous = line_range_at(text, line_start - 1);
    let classified = classify_line(&text[previous]);
    match classified.kind {
        LineKind::Numbered(n) if classified.indent == indent => n.saturating_add(1),
        _ => 1,
    }
}

/// Swap a line's text, keeping the caret at the same place in the content.
fn replace_line(
    text: &str,
    line: Range<usize>,
    new_line: &str,
    col: usize,
    old_prefix: usize,
    new_prefix: usize,
) -> CommandOutcome {
    let mut out = String::with_capacity(text.len() + new_line.len());
    out.push_str(&text[..line.start]);
    out.push_str(new_line);
    out.push_str(&text[line.end..]);
    let content_col = col.saturating_sub(old_prefix);
    let cursor = clamp_to_boundary(&out, line.start + new_prefix + content_col);
    CommandOutcome { text: out, cursor }
}

/// Flip the todo marker starting at `marker_start` between `[ ]` and `[x]`.
///
/// Returns `None` when no todo marker starts there.
pub fn toggle_checkbox(text: &str, marker_start: usize) -> Option<String> {
    if marker_start > text.len() || !text.is_char_boundary(marker_start) {
        return None;
    }
    let line = line_range_at(text, marker_start);
    let classified = classify_line(&text[line.clone()]);
    let LineKind::Todo { checked } = classified.kind else {
        return None;
    };
    let marker = todo_marker_range(line, &classified);
    if marker.start != marker_start {
        return None;
    }
    let replacement = if checked { "- [ ]" } else { "- [x]" };
    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..marker.start]);
    out.push_str(replacement);
    out.push_str(&text[marker.end..]);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(command: FormatCommand, text: &str, start: usize, len: usize) -> CommandOutcome {
        apply_command(command, text, Selection::new(start, len)).expect("command applies")
    }

    // --- inline ---

    #[test]
    fn test_bold_wraps_selection() {
        let out = run(FormatCommand::Bold, "make this bold", 5, 4);
        assert_eq!(out.text, "make **this** bold");
        assert_eq!(out.cursor, 13);
    }

    #[test]
    fn test_italic_and_strike_wrap() {
        assert_eq!(run(FormatCommand::Italic, "ab", 0, 2).text, "*ab*");
        assert_eq!(run(FormatCommand::Strikethrough, "ab", 1, 1).text, "a~~b~~");
    }

    #[test]
    fn test_inline_wrap_with_empty_selection_is_noop() {
        assert!(apply_command(FormatCommand::Bold, "text", Selection::caret(2)).is_none());
    }

    // --- headings ---

    #[test]
    fn test_heading_replaces_existing_prefix() {
        let out = run(FormatCommand::Heading2, "intro\n# Title", 10, 0);
        assert_eq!(out.text, "intro\n## Title");
        assert_eq!(out.cursor, 11);
    }

    #[test]
    fn test_heading_strips_deeper_prefix() {
        let out = run(FormatCommand::Heading1, "###### deep", 8, 0);
        assert_eq!(out.text, "# deep");
        assert_eq!(out.cursor, 3);
    }

    #[test]
    fn test_body_removes_heading() {
        let out = run(FormatCommand::Body, "## Plan", 7, 0);
        assert_eq!(out.text, "Plan");
        assert_eq!(out.cursor, 4);
    }

    #[test]
    fn test_heading_on_plain_line() {
        let out = run(FormatCommand::Heading3, "note", 0, 0);
        assert_eq!(out.text, "### note");
        assert_eq!(out.cursor, 4);
    }

    // --- lists ---

    #[test]
    fn test_bullet_added_after_indent() {
        let out = run(FormatCommand::BulletList, "  item", 4, 0);
        assert_eq!(out.text, "  - item");
        assert_eq!(out.cursor, 6);
    }

    #[test]
    fn test_list_toggle_is_idempotent() {
        for command in [
            FormatCommand::BulletList,
            FormatCommand::NumberedList,
            FormatCommand::Checklist,
        ] {
            let original = "  groceries";
            let once = run(command, original, 5, 0);
            let twice = run(command, &once.text, once.cursor, 0);
            assert_eq!(twice.text, original, "{command:?}");
            assert_eq!(twice.cursor, 5, "{command:?}");
        }
    }

    #[test]
    fn test_list_type_is_replaced() {
        let out = run(FormatCommand::Checklist, "- milk", 6, 0);
        assert_eq!(out.text, "- [ ] milk");
        assert_eq!(out.cursor, 10);
        let out = run(FormatCommand::BulletList, "3. milk", 3, 0);
        assert_eq!(out.text, "- milk");
        assert_eq!(out.cursor, 2);
    }

    #[test]
    fn test_numbered_continues_previous_number() {
        let out = run(FormatCommand::NumberedList, "1. one\n2. two\nthree", 14, 0);
        assert_eq!(out.text, "1. one\n2. two\n3. three");
    }

    #[test]
    fn test_numbered_restarts_at_different_indent() {
        let out = run(FormatCommand::NumberedList, "4. one\n  sub", 7, 0);
        assert_eq!(out.text, "4. one\n  1. sub");
    }

    #[test]
    fn test_list_command_on_empty_line() {
        let out = run(FormatCommand::Checklist, "", 0, 0);
        assert_eq!(out.text, "- [ ] ");
        assert_eq!(out.cursor, 6);
    }

    // --- checkbox ---

    #[test]
    fn test_toggle_checkbox_flips_marker() {
        let text = "a\n  - [ ] task";
        let checked = toggle_checkbox(text, 4).unwrap();
        assert_eq!(checked, "a\n  - [x] task");
        assert_eq!(toggle_checkbox(&checked, 4).unwrap(), text);
    }

    #[test]
    fn test_toggle_checkbox_uppercase_x_unchecks() {
        assert_eq!(toggle_checkbox("- [X] a", 0).unwrap(), "- [ ] a");
    }

    #[test]
    fn test_toggle_checkbox_rejects_non_marker() {
        assert!(toggle_checkbox("- [ ] a", 2).is_none());
        assert!(toggle_checkbox("- a", 0).is_none());
        assert!(toggle_checkbox("- [ ] a", 99).is_none());
    }
}

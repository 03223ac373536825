//! List continuation on Enter and marker deletion on Backspace.
//!
//! [`intercept`] looks at a proposed edit before it reaches the buffer and
//! either lets it through or returns the full rewritten text.

use std::ops::Range;

use crate::markup::lines::{clamp_to_boundary, line_range_at};
use crate::markup::{LineKind, classify_line, is_empty_list_marker};

/// Decision for a proposed edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interception {
    /// Apply the edit unchanged.
    Default,
    /// Replace the whole text and put the caret at `cursor`.
    Rewrite { text: String, cursor: usize },
}

/// Decide how to apply replacing `change` in `text` with `replacement`.
pub fn intercept(text: &str, change: Range<usize>, replacement: &str) -> Interception {
    let start = clamp_to_boundary(text, change.start);
    let end = clamp_to_boundary(text, change.end).max(start);

    if replacement.is_empty() {
        return smart_backspace(text, start..end);
    }
    if replacement == "\n" && start == end {
        return continue_list(text, start);
    }
    Interception::Default
}

/// Deleting one character on a line that holds only a list marker removes
/// the whole line's content.
fn smart_backspace(text: &str, change: Range<usize>) -> Interception {
    let deleted = &text[change.clone()];
    let mut chars = deleted.chars();
    let single = matches!((chars.next(), chars.next()), (Some(ch), None) if ch != '\n');
    if !single {
        return Interception::Default;
    }

    let line = line_range_at(text, change.start);
    if !is_empty_list_marker(&text[line.clone()]) {
        return Interception::Default;
    }

    let mut rewritten = String::with_capacity(text.len());
    rewritten.push_str(&text[..line.start]);
    rewritten.push_str(&text[line.end..]);
    Interception::Rewrite {
        text: rewritten,
        cursor: line.start,
    }
}

/// Enter at the end of a list line starts the next item.
fn continue_list(text: &str, at: usize) -> Interception {
    let line = line_range_at(text, at);
    if at != line.end {
        return Interception::Default;
    }
    let classified = classify_line(&text[line]);
    let marker = match classified.kind {
        LineKind::Todo { .. } => "- [ ] ".to_string(),
        LineKind::Bullet => "- ".to_string(),
        LineKind::Numbered(n) => format!("{}. ", n.saturating_add(1)),
        LineKind::Heading(_) | LineKind::Plain => return Interception::Default,
    };

    let mut inserted = String::from("\n");
    inserted.push_str(classified.indent);
    if !classified.content.trim().is_empty() {
        inserted.push_str(&marker);
    }

    let mut rewritten = String::with_capacity(text.len() + inserted.len());
    rewritten.push_str(&text[..at]);
    rewritten.push_str(&inserted);
    rewritten.push_str(&text[at..]);
    Interception::Rewrite {
        text: rewritten,
        cursor: at + inserted.len(),
    }
}

//! The pattern catalog.
//!
//! Patterns are applied in the order of [`CATALOG`]. Inline patterns run as
//! regex (or delimiter) scans over the whole text; block patterns are
//! line-anchored and share [`classify_line`] with the editing commands.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use super::lines::line_spans;
use super::types::{
    ClaimedRanges, FontWeight, HeadingLevel, ListParagraph, Match, PatternId, SizeTier, StyleEdit,
    StyleOp,
};

/// Glyph drawn in place of a bullet marker.
pub const BULLET_GLYPH: char = '•';

static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*(\S(?:[^\n]*?\S)??)\*\*").expect("bold pattern is valid")
});
static STRIKE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"~~(\S(?:[^\n]*?\S)??)~~").expect("strike pattern is valid"));
static HEADING_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,3}) (.*)$").expect("heading pattern is valid"));
static TODO_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([ \t]*)(- \[([ xX])\][ \t]*)(.*)$").expect("todo pattern is valid")
});
static BULLET_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([ \t]*)(- )(.*)$").expect("bullet pattern is valid"));
static NUMBERED_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([ \t]*)(\d+)(\. )(.*)$").expect("numbered pattern is valid"));

/// A catalog entry: a detection rule and a render transform.
#[derive(Debug)]
pub struct Pattern {
    pub name: &'static str,
    pub matcher: fn(&str, &ClaimedRanges) -> Vec<Match>,
    pub transform: fn(&Match) -> Vec<StyleEdit>,
}

impl Pattern {
    pub fn find(&self, text: &str, claimed: &ClaimedRanges) -> Vec<Match> {
        (self.matcher)(text, claimed)
    }

    pub fn render(&self, m: &Match) -> Vec<StyleEdit> {
        (self.transform)(m)
    }
}

/// All patterns in priority order.
pub static CATALOG: [Pattern; 8] = [
    Pattern {
        name: "heading",
        matcher: heading_matches,
        transform: heading_transform,
    },
    Pattern {
        name: "bold",
        matcher: bold_matches,
        transform: bold_transform,
    },
    Pattern {
        name: "italic",
        matcher: italic_matches,
        transform: italic_transform,
    },
    Pattern {
        name: "strikethrough",
        matcher: strike_matches,
        transform: strike_transform,
    },
    Pattern {
        name: "todo-checked",
        matcher: todo_checked_matches,
        transform: list_transform,
    },
    Pattern {
        name: "todo-unchecked",
        matcher: todo_unchecked_matches,
        transform: list_transform,
    },
    Pattern {
        name: "bullet",
        matcher: bullet_matches,
        transform: list_transform,
    },
    Pattern {
        name: "numbered",
        matcher: numbered_matches,
        transform: list_transform,
    },
];

/// Block-level classification of a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Heading(HeadingLevel),
    Todo { checked: bool },
    Bullet,
    Numbered(u64),
    Plain,
}

impl LineKind {
    pub const fn is_list(self) -> bool {
        matches!(self, Self::Todo { .. } | Self::Bullet | Self::Numbered(_))
    }
}

/// A line split into `indent + marker + content`.
///
/// The marker includes the whitespace separating it from the content, so the
/// three parts always concatenate back to the original line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedLine<'a> {
    pub kind: LineKind,
    pub indent: &'a str,
    pub marker: &'a str,
    pub content: &'a str,
}

impl ClassifiedLine<'_> {
    /// Byte length of indent plus marker.
    pub const fn prefix_len(&self) -> usize {
        self.indent.len() + self.marker.len()
    }
}

/// Classify one line (without its newline).
pub fn classify_line(line: &str) -> ClassifiedLine<'_> {
    if let Some(caps) = HEADING_LINE_RE.captures(line)
        && let Some(level) = HeadingLevel::from_marker_len(caps[1].len())
    {
        let content = caps.get(2).map_or("", |m| m.as_str());
        return ClassifiedLine {
            kind: LineKind::Heading(level),
            indent: "",
            marker: &line[..line.len() - content.len()],
            content,
        };
    }
    if let Some(caps) = TODO_LINE_RE.captures(line) {
        let checked = &caps[3] != " ";
        return split_list_line(line, &caps, 2, 4, LineKind::Todo { checked });
    }
    if let Some(caps) = BULLET_LINE_RE.captures(line)
        && !caps[3].starts_with('[')
    {
        return split_list_line(line, &caps, 2, 3, LineKind::Bullet);
    }
    if let Some(caps) = NUMBERED_LINE_RE.captures(line)
        && let Ok(number) = caps[2].parse::<u64>()
    {
        let indent = caps.get(1).map_or("", |m| m.as_str());
        let content = caps.get(4).map_or("", |m| m.as_str());
        return ClassifiedLine {
            kind: LineKind::Numbered(number),
            indent,
            marker: &line[indent.len()..line.len() - content.len()],
            content,
        };
    }
    let content = line.trim_start_matches([' ', '\t']);
    ClassifiedLine {
        kind: LineKind::Plain,
        indent: &line[..line.len() - content.len()],
        marker: "",
        content,
    }
}

fn split_list_line<'a>(
    line: &'a str,
    caps: &regex::Captures<'a>,
    marker_group: usize,
    content_group: usize,
    kind: LineKind,
) -> ClassifiedLine<'a> {
    let indent = caps.get(1).map_or("", |m| m.as_str());
    let marker = caps.get(marker_group).map_or("", |m| m.as_str());
    let content = caps.get(content_group).map_or("", |m| m.as_str());
    debug_assert_eq!(indent.len() + marker.len() + content.len(), line.len());
    ClassifiedLine {
        kind,
        indent,
        marker,
        content,
    }
}

/// True for lines that, trimmed, are nothing but a list marker.
///
/// Accepts `- [ ]`, `- [x]`, `-` and `N.`.
pub fn is_empty_list_marker(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed == "-" {
        return true;
    }
    if let Some(check) = trimmed
        .strip_prefix("- [")
        .and_then(|rest| rest.strip_suffix(']'))
    {
        return matches!(check, " " | "x" | "X");
    }
    trimmed
        .strip_suffix('.')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Every match of every pattern, in catalog order, with claims applied.
pub fn collect_matches(text: &str) -> Vec<Match> {
    let mut claimed = ClaimedRanges::new();
    let mut all = Vec::new();
    for pattern in &CATALOG {
        let found = pattern.find(text, &claimed);
        for m in &found {
            for syntax in &m.syntax {
                claimed.claim(syntax.clone());
            }
        }
        all.extend(found);
    }
    all
}

/// Todo markers (checked and unchecked), in text order.
pub fn todo_matches(text: &str) -> Vec<Match> {
    block_matches(text, |kind| matches!(kind, LineKind::Todo { .. }))
}

// --- Matchers ---

fn heading_matches(text: &str, _claimed: &ClaimedRanges) -> Vec<Match> {
    block_matches(text, |kind| matches!(kind, LineKind::Heading(_)))
}

fn todo_checked_matches(text: &str, _claimed: &ClaimedRanges) -> Vec<Match> {
    block_matches(text, |kind| kind == LineKind::Todo { checked: true })
}

fn todo_unchecked_matches(text: &str, _claimed: &ClaimedRanges) -> Vec<Match> {
    block_matches(text, |kind| kind == LineKind::Todo { checked: false })
}

fn bullet_matches(text: &str, _claimed: &ClaimedRanges) -> Vec<Match> {
    block_matches(text, |kind| kind == LineKind::Bullet)
}

fn numbered_matches(text: &str, _claimed: &ClaimedRanges) -> Vec<Match> {
    block_matches(text, |kind| matches!(kind, LineKind::Numbered(_)))
}

fn block_matches(text: &str, accept: impl Fn(LineKind) -> bool) -> Vec<Match> {
    let mut found = Vec::new();
    for (range, line) in line_spans(text) {
        let classified = classify_line(line);
        if !accept(classified.kind) {
            continue;
        }
        let Some(pattern) = pattern_for_kind(classified.kind) else {
            continue;
        };
        let marker_start = range.start + classified.indent.len();
        let marker_text = classified.marker.trim_end_matches([' ', '\t']);
        let content_start = range.start + classified.prefix_len();
        found.push(Match {
            pattern,
            full: range.clone(),
            syntax: vec![marker_start..marker_start + marker_text.len()],
            content: content_start..range.end,
        });
    }
    found
}

const fn pattern_for_kind(kind: LineKind) -> Option<PatternId> {
    match kind {
        LineKind::Heading(level) => Some(PatternId::Heading(level)),
        LineKind::Todo { checked: true } => Some(PatternId::TodoChecked),
        LineKind::Todo { checked: false } => Some(PatternId::TodoUnchecked),
        LineKind::Bullet => Some(PatternId::Bullet),
        LineKind::Numbered(_) => Some(PatternId::Numbered),
        LineKind::Plain => None,
    }
}

fn bold_matches(text: &str, claimed: &ClaimedRanges) -> Vec<Match> {
    delimited_matches(&BOLD_RE, PatternId::Bold, 2, text, claimed)
}

fn strike_matches(text: &str, claimed: &ClaimedRanges) -> Vec<Match> {
    delimited_matches(&STRIKE_RE, PatternId::Strikethrough, 2, text, claimed)
}

fn delimited_matches(
    re: &Regex,
    pattern: PatternId,
    delimiter_len: usize,
    text: &str,
    claimed: &ClaimedRanges,
) -> Vec<Match> {
    re.find_iter(text)
        .filter_map(|found| {
            let full = found.range();
            let open = full.start..full.start + delimiter_len;
            let close = full.end - delimiter_len..full.end;
            if claimed.intersects(&open) || claimed.intersects(&close) {
                return None;
            }
            Some(Match {
                pattern,
                content: open.end..close.start,
                syntax: vec![open, close],
                full,
            })
        })
        .collect()
}

/// Single `*` emphasis.
///
/// Delimiters already claimed (the `**` of bold) are invisible to this scan,
/// so `**x**` never reads as italic. An opener must be followed by a
/// non-whitespace byte and a closer preceded by one.
fn italic_matches(text: &str, claimed: &ClaimedRanges) -> Vec<Match> {
    let bytes = text.as_bytes();
    let mut found = Vec::new();
    let mut open: Option<usize> = None;
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'\n' {
            open = None;
            continue;
        }
        if b != b'*' || claimed.contains(i) {
            continue;
        }
        let prev_is_space = i == 0 || bytes[i - 1].is_ascii_whitespace();
        let next_is_space = bytes.get(i + 1).is_none_or(u8::is_ascii_whitespace);
        if let Some(start) = open
            && i > start + 1
            && !prev_is_space
        {
            found.push(Match {
                pattern: PatternId::Italic,
                full: start..i + 1,
                syntax: vec![start..start + 1, i..i + 1],
                content: start + 1..i,
            });
            open = None;
            continue;
        }
        if !next_is_space {
            open = Some(i);
        }
    }
    found
}

// --- Transforms ---

fn heading_transform(m: &Match) -> Vec<StyleEdit> {
    let PatternId::Heading(level) = m.pattern else {
        return Vec::new();
    };
    let mut edits: Vec<StyleEdit> = m
        .syntax
        .iter()
        // The marker is hidden together with its separating space.
        .map(|r| StyleEdit::new(r.start..m.content.start, StyleOp::Hide))
        .collect();
    edits.push(StyleEdit::new(
        m.content.clone(),
        StyleOp::Weight(FontWeight::Bold),
    ));
    edits.push(StyleEdit::new(
        m.content.clone(),
        StyleOp::Size(SizeTier::from(level)),
    ));
    edits
}

fn bold_transform(m: &Match) -> Vec<StyleEdit> {
    inline_transform(m, StyleOp::Weight(FontWeight::Bold))
}

fn italic_transform(m: &Match) -> Vec<StyleEdit> {
    inline_transform(m, StyleOp::Italic)
}

fn strike_transform(m: &Match) -> Vec<StyleEdit> {
    inline_transform(m, StyleOp::Strikethrough)
}

fn inline_transform(m: &Match, content_op: StyleOp) -> Vec<StyleEdit> {
    let mut edits: Vec<StyleEdit> = m
        .syntax
        .iter()
        .map(|r| StyleEdit::new(r.clone(), StyleOp::Hide))
        .collect();
    edits.push(StyleEdit::new(m.content.clone(), content_op));
    edits
}

fn list_transform(m: &Match) -> Vec<StyleEdit> {
    let mut edits = Vec::new();
    let head_indent = m.content.start - m.full.start;
    edits.push(StyleEdit::new(
        m.full.clone(),
        StyleOp::Paragraph(ListParagraph { head_indent }),
    ));
    for marker in &m.syntax {
        match m.pattern {
            PatternId::TodoChecked | PatternId::TodoUnchecked => {
                edits.push(StyleEdit::new(marker.clone(), StyleOp::Placeholder));
            }
            PatternId::Bullet => {
                edits.push(StyleEdit::new(
                    marker.clone(),
                    StyleOp::Substitute(BULLET_GLYPH),
                ));
                edits.push(StyleEdit::new(marker.clone(), StyleOp::Muted));
            }
            _ => edits.push(StyleEdit::new(marker.clone(), StyleOp::Muted)),
        }
    }
    if m.pattern == PatternId::TodoChecked {
        edits.push(StyleEdit::new(m.content.clone(), StyleOp::Strikethrough));
        edits.push(StyleEdit::new(m.content.clone(), StyleOp::Muted));
    }
    edits
}

/// Byte range of the todo marker (`- [ ]` / `- [x]`) on the line at `line`.
pub fn todo_marker_range(line: Range<usize>, classified: &ClassifiedLine<'_>) -> Range<usize> {
    let start = line.start + classified.indent.len();
    let len = classified.marker.trim_end_matches([' ', '\t']).len();
    start..start + len
}

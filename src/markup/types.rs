//! Core markup types shared by the pattern catalog and the projector.

use std::ops::Range;

use serde::Serialize;

/// Heading level recognised by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// Map a `#` count to a level. Only 1-3 are supported.
    pub const fn from_marker_len(len: usize) -> Option<Self> {
        match len {
            1 => Some(Self::H1),
            2 => Some(Self::H2),
            3 => Some(Self::H3),
            _ => None,
        }
    }
}

/// Identifier of a catalog pattern, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PatternId {
    Heading(HeadingLevel),
    Bold,
    Italic,
    Strikethrough,
    TodoChecked,
    TodoUnchecked,
    Bullet,
    Numbered,
}

/// A single pattern match over the raw text.
///
/// All ranges are byte ranges on `char` boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub pattern: PatternId,
    /// Everything the pattern covers (markers and content).
    pub full: Range<usize>,
    /// Syntax marker sub-ranges.
    pub syntax: Vec<Range<usize>>,
    /// Styled content sub-range.
    pub content: Range<usize>,
}

/// Font weight of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// Relative font size of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum SizeTier {
    #[default]
    Body,
    Heading1,
    Heading2,
    Heading3,
}

impl From<HeadingLevel> for SizeTier {
    fn from(level: HeadingLevel) -> Self {
        match level {
            HeadingLevel::H1 => Self::Heading1,
            HeadingLevel::H2 => Self::Heading2,
            HeadingLevel::H3 => Self::Heading3,
        }
    }
}

/// How the characters of a run are drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Visibility {
    #[default]
    Visible,
    /// Zero visual weight: the characters take no space.
    Hidden,
    /// Keeps its geometry but draws nothing; an overlay widget sits on top.
    Placeholder,
    /// Drawn as a single replacement glyph.
    Substitute(char),
}

/// Paragraph metadata for list-like lines.
///
/// Wrapped continuation rows start `head_indent` columns in, so they align
/// under the item text rather than under the marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ListParagraph {
    pub head_indent: usize,
}

/// Visual attributes of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct RunStyle {
    pub weight: FontWeight,
    pub size: SizeTier,
    pub italic: bool,
    pub strikethrough: bool,
    pub muted: bool,
    pub visibility: Visibility,
    pub paragraph: Option<ListParagraph>,
}

impl RunStyle {
    pub const fn is_hidden(&self) -> bool {
        matches!(self.visibility, Visibility::Hidden)
    }

    pub const fn is_list_paragraph(&self) -> bool {
        self.paragraph.is_some()
    }
}

/// A contiguous range of the raw text with its visual attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyledRun {
    pub range: Range<usize>,
    pub style: RunStyle,
}

impl StyledRun {
    pub const fn new(range: Range<usize>, style: RunStyle) -> Self {
        Self { range, style }
    }

    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.range.clone()).unwrap_or_default()
    }
}

/// A single style operation emitted by a pattern's render transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleOp {
    Hide,
    Placeholder,
    Substitute(char),
    Weight(FontWeight),
    Size(SizeTier),
    Italic,
    Strikethrough,
    Muted,
    Paragraph(ListParagraph),
}

impl StyleOp {
    pub(crate) const fn apply(self, style: &mut RunStyle) {
        match self {
            Self::Hide => style.visibility = Visibility::Hidden,
            Self::Placeholder => style.visibility = Visibility::Placeholder,
            Self::Substitute(ch) => style.visibility = Visibility::Substitute(ch),
            Self::Weight(weight) => style.weight = weight,
            Self::Size(size) => style.size = size,
            Self::Italic => style.italic = true,
            Self::Strikethrough => style.strikethrough = true,
            Self::Muted => style.muted = true,
            Self::Paragraph(paragraph) => style.paragraph = Some(paragraph),
        }
    }
}

/// A style operation applied to a byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleEdit {
    pub range: Range<usize>,
    pub op: StyleOp,
}

impl StyleEdit {
    pub const fn new(range: Range<usize>, op: StyleOp) -> Self {
        Self { range, op }
    }
}

/// Ranges already consumed by higher-priority patterns during a projection.
#[derive(Debug, Clone, Default)]
pub struct ClaimedRanges {
    ranges: Vec<Range<usize>>,
}

impl ClaimedRanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, range: Range<usize>) {
        if !range.is_empty() {
            self.ranges.push(range);
        }
    }

    /// True if `range` shares at least one byte with a claimed range.
    pub fn intersects(&self, range: &Range<usize>) -> bool {
        self.ranges
            .iter()
            .any(|r| r.start < range.end && range.start < r.end)
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.ranges.iter().any(|r| r.contains(&offset))
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

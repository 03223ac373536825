//! Cell layout of a render pass.
//!
//! Every character of the note gets a cell position: hidden runs take no
//! cells, placeholders keep blank cells, substitutes draw one glyph, and
//! wrapped list lines continue under their item text. Lines that offer a
//! date chip get one extra row below them for the chip.
//!
//! [`TerminalLayout`] is also the [`LayoutOracle`] the overlay sync reads, so
//! widget frames are in the same document-row coordinates the renderer uses.

use std::ops::Range;

use unicode_width::UnicodeWidthChar;

use crate::markup::lines::line_spans;
use crate::markup::{RunStyle, StyledRun, Visibility};
use crate::overlay::{BoundingBox, LayoutOracle};

const TAB_WIDTH: u16 = 4;

/// What a cell draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellContent {
    Text(char),
    /// Replacement glyph for a substituted run.
    Glyph(char),
    /// Keeps its width but draws nothing.
    Blank,
    /// Takes no cells.
    Nothing,
}

/// One source character placed on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub offset: usize,
    pub len: usize,
    pub row: usize,
    pub col: u16,
    pub width: u16,
    pub content: CellContent,
    pub style: RunStyle,
}

/// What a layout row shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// A text row of source line `line`.
    Text { line: usize },
    /// The chip row under source line `line`.
    Chip { line: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LineLayout {
    range: Range<usize>,
    first_row: usize,
    text_rows: usize,
    glyphs: Range<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerminalLayout {
    generation: u64,
    width: u16,
    text_len: usize,
    glyphs: Vec<Glyph>,
    lines: Vec<LineLayout>,
    rows: Vec<RowKind>,
}

impl TerminalLayout {
    /// Lay out `text` styled by `runs` into rows `width` cells wide.
    ///
    /// `chip_lines` are the line ranges that get a chip row.
    pub fn build(
        text: &str,
        runs: &[StyledRun],
        chip_lines: &[Range<usize>],
        width: u16,
        generation: u64,
    ) -> Self {
        let _scope = crate::perf::scope("ui.layout");
        let width = width.max(1);
        let mut layout = Self {
            generation,
            width,
            text_len: text.len(),
            ..Self::default()
        };
        let mut run_idx = 0;

        for (line_idx, (range, line)) in line_spans(text).enumerate() {
            let first_row = layout.rows.len();
            let glyph_start = layout.glyphs.len();
            let indent = hanging_indent(runs, &range, width);
            let mut row = first_row;
            let mut col: u16 = 0;
            let mut row_indent: u16 = 0;

            for (rel, ch) in line.char_indices() {
                let offset = range.start + rel;
                while runs.get(run_idx).is_some_and(|run| run.range.end <= offset) {
                    run_idx += 1;
                }
                let run = runs.get(run_idx).filter(|run| run.range.start <= offset);
                let style = run.map(|run| run.style).unwrap_or_default();
                let run_start = run.map_or(offset, |run| run.range.start.max(range.start));
                let content = cell_content(ch, style.visibility, offset == run_start);
                let cell_width = content_width(content, ch);

                if cell_width > 0 && col + cell_width > width && col > row_indent {
                    row += 1;
                    col = indent;
                    row_indent = indent;
                }
                layout.glyphs.push(Glyph {
                    offset,
                    len: ch.len_utf8(),
                    row,
                    col,
                    width: cell_width,
                    content,
                    style,
                });
                col = col.saturating_add(cell_width);
            }

            let text_rows = row - first_row + 1;
            layout
                .rows
                .extend(std::iter::repeat_n(RowKind::Text { line: line_idx }, text_rows));
            if chip_lines.iter().any(|chip| chip.start == range.start) {
                layout.rows.push(RowKind::Chip { line: line_idx });
            }
            layout.lines.push(LineLayout {
                range,
                first_row,
                text_rows,
                glyphs: glyph_start..layout.glyphs.len(),
            });
        }
        layout
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub const fn width(&self) -> u16 {
        self.width
    }

    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn row_kind(&self, row: usize) -> Option<RowKind> {
        self.rows.get(row).copied()
    }

    /// Glyphs laid out on `row`, in text order.
    pub fn glyphs_in_row(&self, row: usize) -> &[Glyph] {
        let Some(RowKind::Text { line }) = self.row_kind(row) else {
            return &[];
        };
        let glyphs = &self.glyphs[self.lines[line].glyphs.clone()];
        let start = glyphs.partition_point(|g| g.row < row);
        let end = glyphs.partition_point(|g| g.row <= row);
        &glyphs[start..end]
    }

    /// Row and column of a caret placed before `offset`.
    pub fn caret(&self, offset: usize) -> (usize, u16) {
        let offset = offset.min(self.text_len);
        let line_idx = self
            .lines
            .partition_point(|line| line.range.end < offset)
            .min(self.lines.len().saturating_sub(1));
        let Some(line) = self.lines.get(line_idx) else {
            return (0, 0);
        };
        let glyphs = &self.glyphs[line.glyphs.clone()];
        let at = glyphs.partition_point(|g| g.offset < offset);
        match (glyphs.get(at), at.checked_sub(1).and_then(|i| glyphs.get(i))) {
            (Some(next), _) => (next.row, next.col),
            (None, Some(prev)) => (prev.row, prev.col + prev.width),
            (None, None) => (line.first_row, 0),
        }
    }

    /// Source offset under the cell at `row`/`col`; `None` off the text.
    pub fn offset_at(&self, row: usize, col: u16) -> Option<usize> {
        let RowKind::Text { line } = self.row_kind(row)? else {
            return None;
        };
        let line = &self.lines[line];
        let glyphs = self.glyphs_in_row(row);
        if let Some(hit) = glyphs
            .iter()
            .find(|g| g.width > 0 && col >= g.col && col < g.col + g.width)
        {
            return Some(hit.offset);
        }
        let Some(last) = glyphs.last() else {
            return Some(line.range.end);
        };
        if glyphs.first().is_some_and(|first| col < first.col) {
            return Some(glyphs[0].offset);
        }
        if row + 1 == line.first_row + line.text_rows {
            Some(line.range.end)
        } else {
            Some(last.offset + last.len)
        }
    }
}

impl LayoutOracle for TerminalLayout {
    fn bounding_box(&self, range: Range<usize>) -> Option<BoundingBox> {
        if range.start > range.end || range.end > self.text_len {
            return None;
        }
        let lo = self.glyphs.partition_point(|g| g.offset < range.start);
        let hi = self.glyphs.partition_point(|g| g.offset < range.end);
        let glyphs = &self.glyphs[lo..hi];
        let (Some(first), Some(last)) = (glyphs.first(), glyphs.last()) else {
            let (row, col) = self.caret(range.start);
            return Some(BoundingBox::new(f64::from(col), row as f64, 0.0, 1.0));
        };
        if first.row == last.row {
            let left = glyphs.iter().map(|g| g.col).min().unwrap_or(first.col);
            let right = glyphs
                .iter()
                .map(|g| g.col + g.width)
                .max()
                .unwrap_or(left);
            Some(BoundingBox::new(
                f64::from(left),
                first.row as f64,
                f64::from(right - left),
                1.0,
            ))
        } else {
            Some(BoundingBox::new(
                0.0,
                first.row as f64,
                f64::from(self.width),
                (last.row - first.row + 1) as f64,
            ))
        }
    }
}

fn hanging_indent(runs: &[StyledRun], line: &Range<usize>, width: u16) -> u16 {
    let indent = runs
        .iter()
        .filter(|run| run.range.start < line.end.max(line.start + 1) && run.range.end > line.start)
        .find_map(|run| run.style.paragraph)
        .map_or(0, |paragraph| paragraph.head_indent);
    let indent = u16::try_from(indent).unwrap_or(u16::MAX);
    if indent >= width / 2 { 0 } else { indent }
}

const fn cell_content(ch: char, visibility: Visibility, run_start: bool) -> CellContent {
    match visibility {
        Visibility::Visible if ch == '\t' => CellContent::Blank,
        Visibility::Visible => CellContent::Text(ch),
        Visibility::Hidden => CellContent::Nothing,
        Visibility::Placeholder => CellContent::Blank,
        Visibility::Substitute(glyph) if run_start => CellContent::Glyph(glyph),
        Visibility::Substitute(_) => CellContent::Nothing,
    }
}

fn content_width(content: CellContent, ch: char) -> u16 {
    let width = match content {
        CellContent::Nothing => 0,
        CellContent::Blank if ch == '\t' => return TAB_WIDTH,
        CellContent::Text(c) | CellContent::Glyph(c) => c.width().unwrap_or(0),
        CellContent::Blank => ch.width().unwrap_or(0),
    };
    u16::try_from(width).unwrap_or(1)
}

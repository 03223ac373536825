use std::ops::Range;

use ropey::Rope;
use serde::Serialize;

/// Selection in the note, as a byte offset and length.
///
/// A zero-length selection is a caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Selection {
    pub start: usize,
    pub len: usize,
}

impl Selection {
    pub const fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// A caret at `offset`.
    pub const fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            len: 0,
        }
    }

    pub const fn end(&self) -> usize {
        self.start + self.len
    }

    pub const fn range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }

    pub const fn is_caret(&self) -> bool {
        self.len == 0
    }
}

/// Direction for cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Note text backed by a rope, with a byte-offset selection.
///
/// The selection has an anchor and a moving head. Plain movement collapses
/// it to a caret; extending movement only moves the head. Offsets always
/// sit on `char` boundaries.
pub struct NoteBuffer {
    rope: Rope,
    anchor: usize,
    head: usize,
    /// Remembered column for vertical movement (sticky column).
    col_memory: usize,
    dirty: bool,
}

impl NoteBuffer {
    /// Create a buffer from a string, caret at the start.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            anchor: 0,
            head: 0,
            col_memory: 0,
            dirty: false,
        }
    }

    pub fn empty() -> Self {
        Self::from_text("")
    }

    /// Whether the buffer has been modified since creation or last save.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the buffer as clean (e.g., after saving).
    pub const fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_bytes() == 0
    }

    /// Text of a byte range (clamped).
    pub fn slice(&self, range: Range<usize>) -> String {
        let start = self.clamp(range.start);
        let end = self.clamp(range.end).max(start);
        self.rope
            .byte_slice(start..end)
            .to_string()
    }

    // --- Lines ---

    /// Total number of lines. An empty buffer has one line.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Content of a line, without its trailing newline.
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let line = self.rope.line(line_idx).to_string();
        Some(line.trim_end_matches('\n').to_string())
    }

    /// Length of a line in bytes, without its trailing newline.
    pub fn line_len(&self, line_idx: usize) -> usize {
        if line_idx >= self.rope.len_lines() {
            return 0;
        }
        let line = self.rope.line(line_idx);
        let len = line.len_bytes();
        if len > 0 && line.byte(len - 1) == b'\n' {
            len - 1
        } else {
            len
        }
    }

    /// Byte offset where a line starts (clamped to the last line).
    pub fn line_start(&self, line_idx: usize) -> usize {
        let line_idx = line_idx.min(self.line_count().saturating_sub(1));
        self.rope.line_to_byte(line_idx)
    }

    /// `(line, column)` of a byte offset, column in bytes.
    pub fn position_of(&self, offset: usize) -> (usize, usize) {
        let offset = self.clamp(offset);
        let line = self.rope.byte_to_line(offset);
        (line, offset - self.rope.line_to_byte(line))
    }

    /// Byte offset of a `(line, column)`, both clamped.
    pub fn offset_of(&self, line: usize, col: usize) -> usize {
        let line = line.min(self.line_count().saturating_sub(1));
        let start = self.rope.line_to_byte(line);
        self.clamp(start + col.min(self.line_len(line)))
    }

    // --- Selection ---

    pub const fn selection(&self) -> Selection {
        if self.anchor <= self.head {
            Selection::new(self.anchor, self.head - self.anchor)
        } else {
            Selection::new(self.head, self.anchor - self.head)
        }
    }

    /// The moving end of the selection.
    pub const fn head(&self) -> usize {
        self.head
    }

    /// `(line, column)` of the selection head.
    pub fn cursor_position(&self) -> (usize, usize) {
        self.position_of(self.head)
    }

    /// Replace the selection, clamping both ends into the text.
    pub fn set_selection(&mut self, selection: Selection) {
        self.anchor = self.clamp(selection.start);
        self.head = self.clamp(selection.end());
        self.remember_column();
    }

    /// Collapse the selection to a caret at `offset`.
    pub fn set_cursor(&mut self, offset: usize) {
        self.set_selection(Selection::caret(offset));
    }

    // --- Editing ---

    /// Replace a byte range with `replacement`.
    ///
    /// The selection is left where it was (clamped); callers place the caret.
    pub fn replace(&mut self, range: Range<usize>, replacement: &str) {
        let start = self.clamp(range.start);
        let end = self.clamp(range.end).max(start);
        let char_start = self.rope.byte_to_char(start);
        let char_end = self.rope.byte_to_char(end);
        if char_start != char_end {
            self.rope.remove(char_start..char_end);
        }
        if !replacement.is_empty() {
            self.rope.insert(char_start, replacement);
        }
        self.anchor = self.clamp(self.anchor);
        self.head = self.clamp(self.head);
        self.dirty = true;
    }

    /// Replace the whole text.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.anchor = self.clamp(self.anchor);
        self.head = self.clamp(self.head);
        self.dirty = true;
    }

    // --- Movement ---

    /// Move the head; with `extend` the anchor stays put.
    pub fn move_cursor(&mut self, direction: Direction, extend: bool) {
        match direction {
            Direction::Left => {
                let target = if !extend && !self.selection().is_caret() {
                    self.selection().start
                } else {
                    self.prev_char(self.head)
                };
                self.place_head(target, extend);
            }
            Direction::Right => {
                let target = if !extend && !self.selection().is_caret() {
                    self.selection().end()
                } else {
                    self.next_char(self.head)
                };
                self.place_head(target, extend);
            }
            Direction::Up => self.move_vertical(-1, extend),
            Direction::Down => self.move_vertical(1, extend),
        }
    }

    /// Move to the beginning of the line (Home).
    pub fn move_home(&mut self, extend: bool) {
        let (line, _) = self.cursor_position();
        self.place_head(self.rope.line_to_byte(line), extend);
    }

    /// Move to the end of the line (End).
    pub fn move_end(&mut self, extend: bool) {
        let (line, _) = self.cursor_position();
        let end = self.rope.line_to_byte(line) + self.line_len(line);
        self.place_head(end, extend);
    }

    /// Move one word to the left (Ctrl+Left).
    pub fn move_word_left(&mut self, extend: bool) {
        let (line, col) = self.cursor_position();
        if col == 0 {
            self.place_head(self.prev_char(self.head), extend);
            return;
        }
        let text = self.line_at(line).unwrap_or_default();
        let trimmed = text[..col].trim_end();
        let pos = trimmed
            .rfind(|c: char| !c.is_alphanumeric() && c != '_')
            .map_or(0, |i| i + trimmed[i..].chars().next().map_or(1, char::len_utf8));
        self.place_head(self.rope.line_to_byte(line) + pos, extend);
    }

    /// Move one word to the right (Ctrl+Right).
    pub fn move_word_right(&mut self, extend: bool) {
        let (line, col) = self.cursor_position();
        let len = self.line_len(line);
        if col >= len {
            self.place_head(self.next_char(self.head), extend);
            return;
        }
        let text = self.line_at(line).unwrap_or_default();
        let after = &text[col..];
        let word_end = after
            .find(|c: char| !c.is_alphanumeric() && c != '_')
            .unwrap_or(after.len());
        let rest = &after[word_end..];
        let space_end = rest
            .find(|c: char| c.is_alphanumeric() || c == '_')
            .unwrap_or(rest.len());
        self.place_head(self.head + word_end + space_end, extend);
    }

    /// Move to the start of the buffer (Ctrl+Home).
    pub fn move_to_start(&mut self, extend: bool) {
        self.place_head(0, extend);
    }

    /// Move to the end of the buffer (Ctrl+End).
    pub fn move_to_end(&mut self, extend: bool) {
        self.place_head(self.rope.len_bytes(), extend);
    }

    /// Collapse to a caret at a line and column (both clamped).
    pub fn move_to(&mut self, line: usize, col: usize) {
        let offset = self.offset_of(line, col);
        self.set_cursor(offset);
    }

    // --- Private helpers ---

    /// Clamp into the text and snap down to a `char` boundary.
    fn clamp(&self, offset: usize) -> usize {
        let offset = offset.min(self.rope.len_bytes());
        self.rope.char_to_byte(self.rope.byte_to_char(offset))
    }

    fn prev_char(&self, offset: usize) -> usize {
        let char_idx = self.rope.byte_to_char(offset);
        self.rope.char_to_byte(char_idx.saturating_sub(1))
    }

    fn next_char(&self, offset: usize) -> usize {
        let char_idx = self.rope.byte_to_char(offset);
        self.rope
            .char_to_byte((char_idx + 1).min(self.rope.len_chars()))
    }

    fn place_head(&mut self, offset: usize, extend: bool) {
        self.head = self.clamp(offset);
        if !extend {
            self.anchor = self.head;
        }
        self.remember_column();
    }

    fn remember_column(&mut self) {
        self.col_memory = self.cursor_position().1;
    }

    fn move_vertical(&mut self, delta: isize, extend: bool) {
        let (line, _) = self.cursor_position();
        let Some(target) = line.checked_add_signed(delta) else {
            return;
        };
        if target >= self.line_count() {
            return;
        }
        let start = self.rope.line_to_byte(target);
        let col = self.col_memory.min(self.line_len(target));
        self.head = self.clamp(start + col);
        if !extend {
            self.anchor = self.head;
        }
    }
}

impl Default for NoteBuffer {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for NoteBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteBuffer")
            .field(
                "rope",
                &format_args!("Rope({} lines)", self.rope.len_lines()),
            )
            .field("selection", &self.selection())
            .field("dirty", &self.dirty)
            .finish()
    }
}

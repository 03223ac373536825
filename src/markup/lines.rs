//! Line helpers over raw text.
//!
//! A line is the text between `\n` boundaries, excluding the newline itself.

use std::ops::Range;

/// Iterate over `(byte_range, line_text)` for every line of `text`.
///
/// An empty text yields a single empty line, and a trailing newline yields a
/// final empty line, matching how an editor counts lines.
pub fn line_spans(text: &str) -> impl Iterator<Item = (Range<usize>, &str)> {
    let mut offset = 0;
    text.split('\n').map(move |line| {
        let start = offset;
        offset += line.len() + 1;
        (start..start + line.len(), line)
    })
}

/// Byte range of the line containing `offset` (clamped to the text).
pub fn line_range_at(text: &str, offset: usize) -> Range<usize> {
    let offset = clamp_to_boundary(text, offset);
    let start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    let end = text[offset..].find('\n').map_or(text.len(), |i| offset + i);
    start..end
}

/// Clamp `offset` into `[0, text.len()]` and snap it down to a `char` boundary.
pub fn clamp_to_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Offset of the `char` boundary before `offset`, or `None` at the start.
pub fn prev_boundary(text: &str, offset: usize) -> Option<usize> {
    let offset = clamp_to_boundary(text, offset);
    text[..offset].char_indices().next_back().map(|(i, _)| i)
}

/// Offset of the `char` boundary after `offset`, or `None` at the end.
pub fn next_boundary(text: &str, offset: usize) -> Option<usize> {
    let offset = clamp_to_boundary(text, offset);
    text[offset..].chars().next().map(|ch| offset + ch.len_utf8())
}

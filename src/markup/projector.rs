//! Style projection: raw markdown text to a partition of styled runs.

use super::patterns::CATALOG;
use super::types::{ClaimedRanges, RunStyle, StyleEdit, StyledRun};

/// Project `text` into styled runs.
///
/// Pure and deterministic. The returned runs partition `0..text.len()` with no
/// gaps or overlaps, and adjacent runs always carry different styles. An empty
/// text yields no runs.
///
/// # Example
///
/// ```
/// use notemark::markup::project;
///
/// let runs = project("**hi**");
/// assert_eq!(runs.len(), 3);
/// assert!(runs[0].style.is_hidden());
/// ```
pub fn project(text: &str) -> Vec<StyledRun> {
    let mut styles = vec![RunStyle::default(); text.len()];
    let mut claimed = ClaimedRanges::new();

    for pattern in &CATALOG {
        let found = pattern.find(text, &claimed);
        for m in &found {
            for syntax in &m.syntax {
                claimed.claim(syntax.clone());
            }
            for edit in pattern.render(m) {
                apply_edit(&mut styles, &edit);
            }
        }
    }

    coalesce(&styles)
}

fn apply_edit(styles: &mut [RunStyle], edit: &StyleEdit) {
    let end = edit.range.end.min(styles.len());
    let start = edit.range.start.min(end);
    for style in &mut styles[start..end] {
        edit.op.apply(style);
    }
}

fn coalesce(styles: &[RunStyle]) -> Vec<StyledRun> {
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..=styles.len() {
        if i == styles.len() || styles[i] != styles[start] {
            runs.push(StyledRun::new(start..i, styles[start]));
            start = i;
        }
    }
    runs
}

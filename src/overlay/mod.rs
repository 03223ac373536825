//! Interactive overlay placement.
//!
//! Checkboxes sit over todo markers and date chips sit below lines with a
//! date candidate. Every widget is keyed by what it overlays, so a re-sync
//! after an edit adds new widgets, drops stale ones, and moves the rest.

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::dates::DateCandidate;
use crate::markup::{PatternId, todo_matches};

/// Rectangle in the host's layout coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.bottom()
    }
}

/// Maps a text range to its laid-out bounding box.
///
/// Returns `None` when the range is not laid out (scrolled away, stale
/// offsets). Closures of the right shape implement this trait.
pub trait LayoutOracle {
    fn bounding_box(&self, range: Range<usize>) -> Option<BoundingBox>;
}

impl<F> LayoutOracle for F
where
    F: Fn(Range<usize>) -> Option<BoundingBox>,
{
    fn bounding_box(&self, range: Range<usize>) -> Option<BoundingBox> {
        self(range)
    }
}

/// What an overlay widget is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WidgetKind {
    Checkbox {
        checked: bool,
    },
    DateChip {
        date: NaiveDateTime,
        context_line: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKindTag {
    Checkbox,
    DateChip,
}

/// Identity of a widget across syncs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct WidgetKey {
    pub kind: WidgetKindTag,
    pub anchor_start: usize,
}

/// A positioned overlay widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayWidget {
    pub kind: WidgetKind,
    /// Text range the widget is anchored to.
    pub anchor: Range<usize>,
    pub frame: BoundingBox,
}

impl OverlayWidget {
    pub const fn key(&self) -> WidgetKey {
        let kind = match self.kind {
            WidgetKind::Checkbox { .. } => WidgetKindTag::Checkbox,
            WidgetKind::DateChip { .. } => WidgetKindTag::DateChip,
        };
        WidgetKey {
            kind,
            anchor_start: self.anchor.start,
        }
    }
}

/// Tappable underline drawn under every accepted date mention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateUnderline {
    pub range: Range<usize>,
    pub context_line: String,
    /// Whether the line's chip is currently offered.
    pub chip_visible: bool,
}

/// Changes made by the last [`OverlaySynchronizer::reconcile`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayDiff {
    pub added: Vec<WidgetKey>,
    pub removed: Vec<WidgetKey>,
    /// Same widget, new frame.
    pub moved: Vec<WidgetKey>,
    /// Same widget, new payload (checked state, date).
    pub updated: Vec<WidgetKey>,
}

impl OverlayDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.moved.is_empty()
            && self.updated.is_empty()
    }
}

/// Date state the synchronizer needs for one pass.
#[derive(Debug, Clone, Copy)]
pub struct DateOverlays<'a> {
    /// All candidates, dismissed lines included.
    pub candidates: &'a [DateCandidate],
    /// Context lines whose chip the user dismissed.
    pub dismissed: &'a HashSet<String>,
    /// Context lines whose chip is hidden until the cursor returns.
    pub hidden: &'a HashSet<String>,
}

impl DateOverlays<'_> {
    fn chip_visible(&self, context_line: &str) -> bool {
        !self.dismissed.contains(context_line) && !self.hidden.contains(context_line)
    }
}

/// Keeps overlay widgets aligned with the text layout.
#[derive(Debug, Default)]
pub struct OverlaySynchronizer {
    widgets: Vec<OverlayWidget>,
    underlines: Vec<DateUnderline>,
    last_diff: OverlayDiff,
}

impl OverlaySynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring widgets in line with `text` and the current layout.
    ///
    /// Widgets whose anchor the oracle cannot place are omitted.
    pub fn reconcile(
        &mut self,
        text: &str,
        dates: DateOverlays<'_>,
        oracle: &dyn LayoutOracle,
    ) -> &OverlayDiff {
        let mut next = Vec::new();

        for m in todo_matches(text) {
            let Some(marker) = m.syntax.first().cloned() else {
                continue;
            };
            let Some(frame) = oracle.bounding_box(marker.clone()) else {
                continue;
            };
            next.push(OverlayWidget {
                kind: WidgetKind::Checkbox {
                    checked: m.pattern == PatternId::TodoChecked,
                },
                anchor: marker,
                frame,
            });
        }

        for candidate in dates.candidates {
            if !dates.chip_visible(&candidate.context_line) {
                continue;
            }
            let anchor = candidate.first_mention();
            let Some(mention) = oracle.bounding_box(anchor.clone()) else {
                continue;
            };
            let Some(line) = oracle.bounding_box(candidate.line_range.clone()) else {
                continue;
            };
            next.push(OverlayWidget {
                kind: WidgetKind::DateChip {
                    date: candidate.date,
                    context_line: candidate.context_line.clone(),
                },
                anchor,
                frame: BoundingBox::new(mention.x, line.bottom(), mention.width, line.height),
            });
        }

        next.sort_by_key(OverlayWidget::key);

        self.underlines = dates
            .candidates
            .iter()
            .flat_map(|candidate| {
                let chip_visible = dates.chip_visible(&candidate.context_line);
                candidate.mentions.iter().map(move |range| DateUnderline {
                    range: range.clone(),
                    context_line: candidate.context_line.clone(),
                    chip_visible,
                })
            })
            .collect();

        self.last_diff = diff(&self.widgets, &next);
        self.widgets = next;
        if !self.last_diff.is_empty() {
            tracing::debug!(
                added = self.last_diff.added.len(),
                removed = self.last_diff.removed.len(),
                moved = self.last_diff.moved.len(),
                updated = self.last_diff.updated.len(),
                "overlays reconciled"
            );
        }
        &self.last_diff
    }

    /// Drop one widget immediately, without waiting for the next sync.
    pub fn remove(&mut self, key: WidgetKey) -> Option<OverlayWidget> {
        let index = self.widgets.iter().position(|w| w.key() == key)?;
        Some(self.widgets.remove(index))
    }

    /// Drop every widget and underline.
    pub fn clear(&mut self) {
        self.widgets.clear();
        self.underlines.clear();
        self.last_diff = OverlayDiff::default();
    }

    pub fn widgets(&self) -> &[OverlayWidget] {
        &self.widgets
    }

    pub fn underlines(&self) -> &[DateUnderline] {
        &self.underlines
    }

    pub fn get(&self, key: WidgetKey) -> Option<&OverlayWidget> {
        self.widgets.iter().find(|w| w.key() == key)
    }

    /// Topmost widget containing the point.
    pub fn widget_at(&self, x: f64, y: f64) -> Option<&OverlayWidget> {
        self.widgets.iter().rev().find(|w| w.frame.contains(x, y))
    }

    /// Underline covering the byte offset.
    pub fn underline_at(&self, offset: usize) -> Option<&DateUnderline> {
        self.underlines.iter().find(|u| u.range.contains(&offset))
    }
}

fn diff(previous: &[OverlayWidget], next: &[OverlayWidget]) -> OverlayDiff {
    let before: HashMap<WidgetKey, &OverlayWidget> =
        previous.iter().map(|w| (w.key(), w)).collect();
    let after: HashSet<WidgetKey> = next.iter().map(OverlayWidget::key).collect();

    let mut result = OverlayDiff::default();
    for widget in next {
        let key = widget.key();
        match before.get(&key) {
            None => result.added.push(key),
            Some(old) => {
                if old.frame != widget.frame || old.anchor != widget.anchor {
                    result.moved.push(key);
                }
                if old.kind != widget.kind {
                    result.updated.push(key);
                }
            }
        }
    }
    result.removed = previous
        .iter()
        .map(OverlayWidget::key)
        .filter(|key| !after.contains(key))
        .collect();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    /// One text line per row, one column per byte.
    fn grid_oracle(text: &str) -> impl Fn(Range<usize>) -> Option<BoundingBox> + '_ {
        move |range: Range<usize>| {
            if range.end > text.len() {
                return None;
            }
            let row = text[..range.start].matches('\n').count();
            let line_start = text[..range.start].rfind('\n').map_or(0, |i| i + 1);
            Some(BoundingBox::new(
                (range.start - line_start) as f64,
                row as f64,
                range.len() as f64,
                1.0,
            ))
        }
    }

    fn no_dates() -> (Vec<DateCandidate>, HashSet<String>, HashSet<String>) {
        (Vec::new(), HashSet::new(), HashSet::new())
    }

    fn date_overlays<'a>(
        candidates: &'a [DateCandidate],
        dismissed: &'a HashSet<String>,
        hidden: &'a HashSet<String>,
    ) -> DateOverlays<'a> {
        DateOverlays {
            candidates,
            dismissed,
            hidden,
        }
    }

    fn candidate(text: &str, line: Range<usize>, mention: Range<usize>) -> DateCandidate {
        DateCandidate {
            date: NaiveDate::from_ymd_opt(2027, 1, 15)
                .unwrap()
                .and_hms_opt(15, 0, 0)
                .unwrap(),
            best_match_range: mention.clone(),
            context_line: text[line.clone()].trim().to_string(),
            line_range: line,
            mentions: vec![mention],
        }
    }

    // --- checkboxes ---

    #[test]
    fn test_checkbox_per_todo_line() {
        let text = "- [ ] a\nplain\n- [x] b";
        let (c, d, h) = no_dates();
        let mut sync = OverlaySynchronizer::new();
        let oracle = grid_oracle(text);
        let diff = sync.reconcile(text, date_overlays(&c, &d, &h), &oracle);
        assert_eq!(diff.added.len(), 2);

        let widgets = sync.widgets();
        assert_eq!(widgets.len(), 2);
        assert_eq!(widgets[0].kind, WidgetKind::Checkbox { checked: false });
        assert_eq!(widgets[0].anchor, 0..5);
        assert_eq!(widgets[1].kind, WidgetKind::Checkbox { checked: true });
        assert_eq!(widgets[1].frame.y, 2.0);
    }

    #[test]
    fn test_unplaceable_anchor_is_omitted() {
        let text = "- [ ] a";
        let (c, d, h) = no_dates();
        let mut sync = OverlaySynchronizer::new();
        let oracle = |_: Range<usize>| -> Option<BoundingBox> { None };
        sync.reconcile(text, date_overlays(&c, &d, &h), &oracle);
        assert!(sync.widgets().is_empty());
    }

    #[test]
    fn test_resync_moves_and_removes() {
        let (c, d, h) = no_dates();
        let mut sync = OverlaySynchronizer::new();

        let first = "- [ ] a\n- [ ] b";
        sync.reconcile(first, date_overlays(&c, &d, &h), &grid_oracle(first));
        assert_eq!(sync.widgets().len(), 2);

        // Toggle the first box and delete the second line.
        let second = "- [x] a";
        let diff = sync.reconcile(second, date_overlays(&c, &d, &h), &grid_oracle(second));
        let checkbox_at = |anchor_start| WidgetKey {
            kind: WidgetKindTag::Checkbox,
            anchor_start,
        };
        assert_eq!(diff.removed, vec![checkbox_at(8)]);
        assert_eq!(diff.updated, vec![checkbox_at(0)]);
        assert!(diff.added.is_empty());
        assert_eq!(sync.widgets().len(), 1);
    }

    #[test]
    fn test_unchanged_text_yields_empty_diff() {
        let text = "- [ ] a";
        let (c, d, h) = no_dates();
        let mut sync = OverlaySynchronizer::new();
        let oracle = grid_oracle(text);
        sync.reconcile(text, date_overlays(&c, &d, &h), &oracle);
        let diff = sync.reconcile(text, date_overlays(&c, &d, &h), &oracle);
        assert!(diff.is_empty());
    }

    // --- date chips ---

    #[test]
    fn test_chip_sits_below_its_line() {
        let text = "intro\nMeet Jan 15 at 3pm";
        let cand = candidate(text, 6..text.len(), 11..text.len());
        let candidates = vec![cand];
        let (_, d, h) = no_dates();
        let mut sync = OverlaySynchronizer::new();
        sync.reconcile(text, date_overlays(&candidates, &d, &h), &grid_oracle(text));

        let chip = &sync.widgets()[0];
        assert!(matches!(chip.kind, WidgetKind::DateChip { .. }));
        assert_eq!(chip.frame.x, 5.0);
        assert_eq!(chip.frame.y, 2.0);
        assert_eq!(sync.underlines().len(), 1);
        assert!(sync.underlines()[0].chip_visible);
    }

    #[test]
    fn test_dismissed_line_keeps_underline_without_chip() {
        let text = "Meet Jan 15 at 3pm";
        let candidates = vec![candidate(text, 0..text.len(), 5..text.len())];
        let dismissed: HashSet<String> = [text.to_string()].into();
        let hidden = HashSet::new();
        let mut sync = OverlaySynchronizer::new();
        sync.reconcile(text, date_overlays(&candidates, &dismissed, &hidden), &grid_oracle(text));
        assert!(sync.widgets().is_empty());
        let underline = sync.underline_at(7).unwrap();
        assert!(!underline.chip_visible);
        assert_eq!(underline.context_line, text);
    }

    #[test]
    fn test_hidden_line_suppresses_chip() {
        let text = "Meet Jan 15 at 3pm";
        let candidates = vec![candidate(text, 0..text.len(), 5..text.len())];
        let dismissed = HashSet::new();
        let hidden: HashSet<String> = [text.to_string()].into();
        let mut sync = OverlaySynchronizer::new();
        sync.reconcile(text, date_overlays(&candidates, &dismissed, &hidden), &grid_oracle(text));
        assert!(sync.widgets().is_empty());
    }

    // --- hit testing ---

    #[test]
    fn test_widget_at_and_remove() {
        let text = "- [ ] a";
        let (c, d, h) = no_dates();
        let mut sync = OverlaySynchronizer::new();
        sync.reconcile(text, date_overlays(&c, &d, &h), &grid_oracle(text));

        let key = sync.widget_at(1.0, 0.5).map(OverlayWidget::key).unwrap();
        assert!(sync.widget_at(6.0, 0.5).is_none());
        assert!(sync.remove(key).is_some());
        assert!(sync.get(key).is_none());
        assert!(sync.remove(key).is_none());
    }

    #[test]
    fn test_bounding_box_contains() {
        let b = BoundingBox::new(1.0, 1.0, 2.0, 1.0);
        assert!(b.contains(1.0, 1.0));
        assert!(b.contains(2.9, 1.9));
        assert!(!b.contains(3.0, 1.0));
        assert!((b.bottom() - 2.0).abs() < f64::EPSILON);
    }
}

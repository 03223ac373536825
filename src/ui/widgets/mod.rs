//! Overlay widgets drawn over the note text.
//!
//! This module contains:
//! - Checkbox glyphs drawn over todo markers
//! - Date chips (`[+ date] [x]`) drawn on the row below their line
//! - Hit testing shared by the mouse handler

use std::ops::Range;

use chrono::NaiveDateTime;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use crate::app::Model;
use crate::dates::DEFAULT_TIME;
use crate::overlay::{OverlayWidget, WidgetKey, WidgetKind};

pub const CHECKBOX_UNCHECKED: char = '☐';
pub const CHECKBOX_CHECKED: char = '☑';
const DISMISS_LABEL: &str = "[x]";

/// What a click on an overlay widget asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayHit {
    Checkbox { marker_start: usize },
    ChipAdd(WidgetKey),
    ChipDismiss(WidgetKey),
}

/// Cells a date chip occupies on its row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipCells {
    pub row: usize,
    pub add: Range<u16>,
    pub dismiss: Range<u16>,
}

/// Label of a chip's add button, e.g. `[+ Jan 15 15:00]`.
///
/// Dates that resolved to the default time show no time.
pub fn chip_label(date: NaiveDateTime) -> String {
    if date.time() == DEFAULT_TIME {
        format!("[+ {}]", date.format("%b %-d"))
    } else {
        format!("[+ {}]", date.format("%b %-d %H:%M"))
    }
}

/// Where a chip draws, shifted left if it would run past `width`.
pub fn chip_cells(widget: &OverlayWidget, width: u16) -> Option<ChipCells> {
    let WidgetKind::DateChip { date, .. } = &widget.kind else {
        return None;
    };
    let add_len = chip_label(*date).chars().count() as u16;
    let total = add_len + 1 + DISMISS_LABEL.len() as u16;
    let start = (widget.frame.x.max(0.0) as u16).min(width.saturating_sub(total));
    Some(ChipCells {
        row: widget.frame.y.max(0.0) as usize,
        add: start..start + add_len,
        dismiss: start + add_len + 1..start + total,
    })
}

/// The widget part under layout cell `col`/`row`, if any.
pub fn hit_test(
    widgets: &[OverlayWidget],
    width: u16,
    col: u16,
    row: usize,
) -> Option<OverlayHit> {
    widgets.iter().find_map(|widget| match &widget.kind {
        WidgetKind::Checkbox { .. } => widget
            .frame
            .contains(f64::from(col), row as f64)
            .then_some(OverlayHit::Checkbox {
                marker_start: widget.anchor.start,
            }),
        WidgetKind::DateChip { .. } => {
            let cells = chip_cells(widget, width)?;
            if cells.row != row {
                None
            } else if cells.add.contains(&col) {
                Some(OverlayHit::ChipAdd(widget.key()))
            } else if cells.dismiss.contains(&col) {
                Some(OverlayHit::ChipDismiss(widget.key()))
            } else {
                None
            }
        }
    })
}

/// Draw every overlay widget that falls inside the note area.
pub fn render_overlay_widgets(model: &Model, frame: &mut Frame, area: Rect) {
    let palette = &model.palette;
    let top = model.scroll_offset;
    let visible_row = |row: usize| -> Option<u16> {
        let rel = row.checked_sub(top)?;
        u16::try_from(rel).ok().filter(|rel| *rel < area.height)
    };

    for widget in model.session.overlays().widgets() {
        match &widget.kind {
            WidgetKind::Checkbox { checked } => {
                let Some(y) = visible_row(widget.frame.y as usize) else {
                    continue;
                };
                let x = widget.frame.x as u16;
                if x >= area.width {
                    continue;
                }
                let glyph = if *checked {
                    CHECKBOX_CHECKED
                } else {
                    CHECKBOX_UNCHECKED
                };
                frame.buffer_mut().set_string(
                    area.x + x,
                    area.y + y,
                    glyph.to_string(),
                    Style::default().fg(palette.checkbox),
                );
            }
            WidgetKind::DateChip { date, .. } => {
                let Some(cells) = chip_cells(widget, area.width) else {
                    continue;
                };
                let Some(y) = visible_row(cells.row) else {
                    continue;
                };
                let buf = frame.buffer_mut();
                buf.set_string(
                    area.x + cells.add.start,
                    area.y + y,
                    chip_label(*date),
                    palette.chip_add.add_modifier(Modifier::BOLD),
                );
                buf.set_string(
                    area.x + cells.dismiss.start,
                    area.y + y,
                    DISMISS_LABEL,
                    palette.chip_dismiss,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::{BoundingBox, WidgetKindTag};
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2027, 1, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn chip(x: f64, y: f64) -> OverlayWidget {
        OverlayWidget {
            kind: WidgetKind::DateChip {
                date: at(15, 0),
                context_line: "Meet Jan 15 at 3pm".to_string(),
            },
            anchor: 5..20,
            frame: BoundingBox::new(x, y, 15.0, 1.0),
        }
    }

    #[test]
    fn test_chip_label_formats() {
        assert_eq!(chip_label(at(15, 0)), "[+ Jan 15 15:00]");
        assert_eq!(chip_label(at(12, 0)), "[+ Jan 15]");
    }

    #[test]
    fn test_chip_cells_follow_frame() {
        let cells = chip_cells(&chip(5.0, 1.0), 80).unwrap();
        assert_eq!(cells.row, 1);
        assert_eq!(cells.add, 5..21);
        assert_eq!(cells.dismiss, 22..25);
    }

    #[test]
    fn test_chip_cells_shift_left_at_edge() {
        let cells = chip_cells(&chip(70.0, 1.0), 80).unwrap();
        assert_eq!(cells.dismiss.end, 80);
    }

    #[test]
    fn test_hit_test_parts() {
        let checkbox = OverlayWidget {
            kind: WidgetKind::Checkbox { checked: false },
            anchor: 0..5,
            frame: BoundingBox::new(0.0, 0.0, 5.0, 1.0),
        };
        let widgets = vec![checkbox, chip(5.0, 1.0)];
        assert_eq!(
            hit_test(&widgets, 80, 2, 0),
            Some(OverlayHit::Checkbox { marker_start: 0 })
        );
        let key = WidgetKey {
            kind: WidgetKindTag::DateChip,
            anchor_start: 5,
        };
        assert_eq!(hit_test(&widgets, 80, 6, 1), Some(OverlayHit::ChipAdd(key)));
        assert_eq!(
            hit_test(&widgets, 80, 23, 1),
            Some(OverlayHit::ChipDismiss(key))
        );
        assert_eq!(hit_test(&widgets, 80, 21, 1), None);
        assert_eq!(hit_test(&widgets, 80, 6, 0), None);
    }
}

use std::ops::Range;

use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph};

use crate::app::Model;

use super::layout::{CellContent, Glyph, RowKind};
use super::{overlays, status, widgets};

/// Render the entire UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    let toast_active = model.active_toast().is_some();
    let footer_rows = 1 + u16::from(toast_active);
    let note_area = Rect {
        height: area.height.saturating_sub(footer_rows),
        ..area
    };
    let toast_area = Rect {
        y: area.y + area.height.saturating_sub(footer_rows),
        height: 1,
        ..area
    };
    let status_area = Rect {
        y: area.y + area.height.saturating_sub(1),
        height: 1,
        ..area
    };

    render_note(model, frame, note_area);
    widgets::render_overlay_widgets(model, frame, note_area);
    place_cursor(model, frame, note_area);

    if toast_active {
        status::render_toast_bar(model, frame, toast_area);
    }
    status::render_status_bar(model, frame, status_area);

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    }
}

fn render_note(model: &Model, frame: &mut Frame, area: Rect) {
    let _scope = crate::perf::scope("ui.render_note");
    let selection = model.session.selection();
    let selected = (!selection.is_caret()).then(|| selection.range());
    let underlines: Vec<(Range<usize>, Style)> = model
        .session
        .overlays()
        .underlines()
        .iter()
        .map(|u| (u.range.clone(), model.palette.date_underline(u.chip_visible)))
        .collect();

    let lines: Vec<Line> = (0..usize::from(area.height))
        .map(|rel| {
            let row = model.scroll_offset + rel;
            match model.layout.row_kind(row) {
                Some(RowKind::Text { .. }) => row_line(
                    model,
                    model.layout.glyphs_in_row(row),
                    selected.as_ref(),
                    &underlines,
                ),
                Some(RowKind::Chip { .. }) | None => Line::default(),
            }
        })
        .collect();

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines), area);
}

/// One text row as spans, starting at the first glyph's column.
fn row_line(
    model: &Model,
    glyphs: &[Glyph],
    selected: Option<&Range<usize>>,
    underlines: &[(Range<usize>, Style)],
) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut current = String::new();
    let mut current_style = Style::default();

    if let Some(indent) = glyphs.iter().find(|g| g.width > 0).map(|g| g.col)
        && indent > 0
    {
        spans.push(Span::raw(" ".repeat(usize::from(indent))));
    }

    for glyph in glyphs.iter().filter(|g| g.width > 0) {
        let mut style = model.palette.run_style(&glyph.style);
        if let Some((_, underline)) = underlines
            .iter()
            .find(|(range, _)| range.contains(&glyph.offset))
        {
            style = style.patch(*underline);
        }
        if selected.is_some_and(|range| range.contains(&glyph.offset)) {
            style = style.bg(model.palette.selection);
        }
        let cell = match glyph.content {
            CellContent::Text(c) | CellContent::Glyph(c) => c.to_string(),
            CellContent::Blank => " ".repeat(usize::from(glyph.width)),
            CellContent::Nothing => continue,
        };
        if style != current_style && !current.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut current), current_style));
        }
        current_style = style;
        current.push_str(&cell);
    }
    if !current.is_empty() {
        spans.push(Span::styled(current, current_style));
    }
    Line::from(spans)
}

fn place_cursor(model: &Model, frame: &mut Frame, area: Rect) {
    if model.help_visible || !model.session.is_focused() {
        return;
    }
    let (row, col) = model.layout.caret(model.session.buffer().head());
    let Some(rel) = row.checked_sub(model.scroll_offset) else {
        return;
    };
    let Ok(rel) = u16::try_from(rel) else {
        return;
    };
    if rel < area.height {
        let col = col.min(area.width.saturating_sub(1));
        frame.set_cursor_position(Position::new(area.x + col, area.y + rel));
    }
}

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::app::Model;

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let lines = help_lines(model);
    let popup_width = area.width.saturating_sub(12).clamp(48, 72);
    let popup_height = u16::try_from(lines.len() + 4).unwrap_or(u16::MAX);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn help_lines(model: &Model) -> Vec<Line<'static>> {
    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(Color::Indexed(245));

    let global_cfg = model
        .config_global_path
        .as_ref()
        .map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string());
    let local_cfg = model
        .config_local_path
        .as_ref()
        .map_or_else(|| "<none>".to_string(), |p| p.display().to_string());

    vec![
        Line::styled("Formatting", section_style),
        Line::raw("  Ctrl-b / Ctrl-i / Ctrl-d   Bold / italic / strikethrough"),
        Line::raw("  Alt-1 / Alt-2 / Alt-3      Heading 1 / 2 / 3"),
        Line::raw("  Alt-0                      Body text"),
        Line::raw("  Ctrl-l / Ctrl-n / Ctrl-t   Bullet / numbered / checklist"),
        Line::raw("  Ctrl-k                     Toggle checkbox on this line"),
        Line::raw(""),
        Line::styled("Editing", section_style),
        Line::raw("  Enter                      Continue list (ends an empty item)"),
        Line::raw("  Backspace                  Remove an empty list marker"),
        Line::raw("  Arrows, Home/End           Move (Shift selects)"),
        Line::raw("  Ctrl+Left/Right            Word movement"),
        Line::raw("  Ctrl+Home/End              Note start / end"),
        Line::raw(""),
        Line::styled("Mouse", section_style),
        Line::raw("  Click checkbox             Toggle it"),
        Line::raw("  Click [+ date] / [x]       Add to calendar / dismiss"),
        Line::raw("  Click underlined date      Dismiss or restore its chip"),
        Line::raw(""),
        Line::styled("Other", section_style),
        Line::raw("  Ctrl-s                     Save"),
        Line::raw("  Ctrl-q                     Quit"),
        Line::raw("  F1                         Toggle help"),
        Line::raw(""),
        Line::styled("Config", section_style),
        Line::raw(format!("  Global: {global_cfg}")),
        Line::raw(format!("  Local override: {local_cfg}")),
        Line::styled("Esc closes", dim_style),
    ]
}

pub fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}

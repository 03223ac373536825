use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel};

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    frame.render_widget(
        Paragraph::new(status_text(model))
            .style(Style::default().bg(Color::DarkGray).fg(Color::White)),
        area,
    );
}

pub fn status_text(model: &Model) -> String {
    let dirty = if model.session.is_dirty() {
        " [modified]"
    } else {
        ""
    };
    let (line, col) = model.session.buffer().cursor_position();
    let dates = match model.session.date_candidates().len() {
        0 => String::new(),
        1 => "  1 date".to_string(),
        n => format!("  {n} dates"),
    };
    let focus = if model.session.is_focused() {
        ""
    } else {
        "  [unfocused]"
    };
    format!(
        " {}{dirty}  Ln {}, Col {}{dates}{focus}  F1:help",
        model.file_name(),
        line + 1,
        col + 1
    )
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    frame.render_widget(Paragraph::new(format!("{prefix} {message}")).style(style), area);
}

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::app::{App, Message, Model};
use crate::editor::{Direction, FormatCommand};
use crate::ui::widgets::{OverlayHit, hit_test};

use super::event_loop::ResizeDebouncer;

const WHEEL_ROWS: usize = 3;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Resize(w, h) => {
                crate::perf::log_event("event.resize.queue", format!("width={w} height={h}"));
                resize_debouncer.queue(*w, *h, now_ms);
                None
            }
            Event::FocusGained => Some(Message::FocusGained),
            Event::FocusLost => Some(Message::FocusLost(now_ms)),
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return match key.code {
                KeyCode::F(1) | KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
                    Some(Message::HideHelp)
                }
                _ => None,
            };
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);

        if ctrl {
            return match key.code {
                KeyCode::Char('q' | 'c') => Some(Message::Quit),
                KeyCode::Char('s') => Some(Message::Save),
                KeyCode::Char('b') => Some(Message::Format(FormatCommand::Bold)),
                KeyCode::Char('i') => Some(Message::Format(FormatCommand::Italic)),
                KeyCode::Char('d') => Some(Message::Format(FormatCommand::Strikethrough)),
                KeyCode::Char('l') => Some(Message::Format(FormatCommand::BulletList)),
                KeyCode::Char('n') => Some(Message::Format(FormatCommand::NumberedList)),
                KeyCode::Char('t') => Some(Message::Format(FormatCommand::Checklist)),
                KeyCode::Char('k') => Some(Message::ToggleCheckboxAtCursor),
                KeyCode::Left => Some(Message::MoveWordLeft(shift)),
                KeyCode::Right => Some(Message::MoveWordRight(shift)),
                KeyCode::Home => Some(Message::MoveToStart(shift)),
                KeyCode::End => Some(Message::MoveToEnd(shift)),
                _ => None,
            };
        }

        if alt {
            return match key.code {
                KeyCode::Char('1') => Some(Message::Format(FormatCommand::Heading1)),
                KeyCode::Char('2') => Some(Message::Format(FormatCommand::Heading2)),
                KeyCode::Char('3') => Some(Message::Format(FormatCommand::Heading3)),
                KeyCode::Char('0') => Some(Message::Format(FormatCommand::Body)),
                _ => None,
            };
        }

        match key.code {
            KeyCode::F(1) => Some(Message::ToggleHelp),
            KeyCode::Char(c) => Some(Message::InsertChar(c)),
            KeyCode::Tab => Some(Message::InsertChar('\t')),
            KeyCode::Enter => Some(Message::InsertNewline),
            KeyCode::Backspace => Some(Message::DeleteBackward),
            KeyCode::Delete => Some(Message::DeleteForward),
            KeyCode::Left => Some(Message::MoveCursor(Direction::Left, shift)),
            KeyCode::Right => Some(Message::MoveCursor(Direction::Right, shift)),
            KeyCode::Up => Some(Message::MoveCursor(Direction::Up, shift)),
            KeyCode::Down => Some(Message::MoveCursor(Direction::Down, shift)),
            KeyCode::Home => Some(Message::MoveHome(shift)),
            KeyCode::End => Some(Message::MoveEnd(shift)),
            KeyCode::PageUp => Some(Message::PageUp),
            KeyCode::PageDown => Some(Message::PageDown),
            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left))
                .then_some(Message::HideHelp);
        }

        match mouse.kind {
            MouseEventKind::ScrollUp => Some(Message::ScrollUp(WHEEL_ROWS)),
            MouseEventKind::ScrollDown => Some(Message::ScrollDown(WHEEL_ROWS)),
            MouseEventKind::Down(MouseButton::Left) => {
                let area = note_area(model);
                if !point_in_rect(mouse.column, mouse.row, area) {
                    return None;
                }
                let col = mouse.column - area.x;
                let row = model.scroll_offset + usize::from(mouse.row - area.y);
                Self::click_at(model, col, row)
            }
            _ => None,
        }
    }

    /// Route a click on layout cell `col`/`row` to a widget, an underlined
    /// date, or a caret move.
    fn click_at(model: &Model, col: u16, row: usize) -> Option<Message> {
        let widgets = model.session.overlays().widgets();
        if let Some(hit) = hit_test(widgets, model.layout.width(), col, row) {
            return Some(match hit {
                OverlayHit::Checkbox { marker_start } => Message::ToggleCheckbox(marker_start),
                OverlayHit::ChipAdd(key) => Message::AddDate(key),
                OverlayHit::ChipDismiss(key) => Message::DismissDate(key),
            });
        }
        let offset = model.layout.offset_at(row, col)?;
        let on_date = model
            .layout
            .glyphs_in_row(row)
            .iter()
            .any(|g| g.offset == offset && col >= g.col && col < g.col + g.width)
            && model.session.overlays().underline_at(offset).is_some();
        if on_date {
            Some(Message::ToggleDateUnderline(offset))
        } else {
            Some(Message::ClickText(offset))
        }
    }

    pub(super) fn view(model: &Model, frame: &mut Frame) {
        crate::ui::render(model, frame);
    }
}

fn note_area(model: &Model) -> Rect {
    let height = u16::try_from(model.content_height()).unwrap_or(u16::MAX);
    Rect::new(0, 0, model.terminal_size.0, height)
}

const fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

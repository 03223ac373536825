use crate::editor::{Direction, FormatCommand, Selection};
use crate::overlay::WidgetKey;

use super::model::{Model, ToastLevel};

/// All possible events and actions in the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Editing
    /// Type a character over the selection
    InsertChar(char),
    /// Enter (may continue or end a list)
    InsertNewline,
    /// Backspace
    DeleteBackward,
    /// Delete
    DeleteForward,
    /// Run a format command at the selection
    Format(FormatCommand),
    /// Flip the checkbox on the cursor line
    ToggleCheckboxAtCursor,

    // Cursor
    /// Move by one character or line; `true` extends the selection
    MoveCursor(Direction, bool),
    MoveHome(bool),
    MoveEnd(bool),
    MoveWordLeft(bool),
    MoveWordRight(bool),
    MoveToStart(bool),
    MoveToEnd(bool),
    /// Move the cursor up one screen
    PageUp,
    /// Move the cursor down one screen
    PageDown,
    /// Place the caret at a text offset (mouse click)
    ClickText(usize),

    // Overlay widgets
    /// Checkbox tapped; carries the todo marker start
    ToggleCheckbox(usize),
    /// "Add" part of a date chip
    AddDate(WidgetKey),
    /// "Dismiss" part of a date chip
    DismissDate(WidgetKey),
    /// Underlined date tapped at a text offset
    ToggleDateUnderline(usize),

    // Scrolling
    ScrollUp(usize),
    ScrollDown(usize),

    // Application
    /// Write the note to disk
    Save,
    /// Terminal gained focus
    FocusGained,
    /// Terminal lost focus at the given clock time (ms)
    FocusLost(u64),
    /// A focus loss outlived the blur delay
    BlurSettled,
    /// Terminal resized
    Resize(u16, u16),
    /// Toggle help overlay
    ToggleHelp,
    /// Hide help overlay
    HideHelp,
    /// Quit the application (asks again with unsaved changes)
    Quit,
    /// Force redraw
    Redraw,
}

impl Message {
    /// Whether the view should follow the caret after this message.
    const fn follows_cursor(&self) -> bool {
        !matches!(
            self,
            Self::ScrollUp(_)
                | Self::ScrollDown(_)
                | Self::FocusGained
                | Self::FocusLost(_)
                | Self::BlurSettled
                | Self::ToggleHelp
                | Self::HideHelp
                | Self::Quit
                | Self::Redraw
                | Self::AddDate(_)
                | Self::DismissDate(_)
                | Self::ToggleDateUnderline(_)
        )
    }
}

/// Apply a message to the model, returning the new state.
///
/// Side effects (disk and calendar I/O) run separately in
/// `App::handle_message_side_effects`.
pub fn update(mut model: Model, msg: Message) -> Model {
    // Reset confirmation on any action other than the confirmed one.
    // Save keeps it so Ctrl+S can complete a pending quit.
    if !matches!(msg, Message::Quit | Message::Save) {
        model.quit_confirmed = false;
    }
    let follow = msg.follows_cursor();

    match msg {
        // Editing
        Message::InsertChar(ch) => {
            let mut buf = [0_u8; 4];
            model.session.insert(ch.encode_utf8(&mut buf));
        }
        Message::InsertNewline => {
            model.session.insert("\n");
        }
        Message::DeleteBackward => {
            model.session.delete_backward();
        }
        Message::DeleteForward => {
            model.session.delete_forward();
        }
        Message::Format(command) => {
            if !model.session.apply_command(command) {
                model.show_toast(
                    ToastLevel::Info,
                    format!("{}: select some text first", command.label()),
                );
            }
        }
        Message::ToggleCheckboxAtCursor => {
            if !model.session.toggle_checkbox_on_cursor_line() {
                model.show_toast(ToastLevel::Info, "No checkbox on this line");
            }
        }

        // Cursor
        Message::MoveCursor(direction, extend) => {
            model
                .session
                .navigate(|buffer| buffer.move_cursor(direction, extend));
        }
        Message::MoveHome(extend) => model.session.navigate(|b| b.move_home(extend)),
        Message::MoveEnd(extend) => model.session.navigate(|b| b.move_end(extend)),
        Message::MoveWordLeft(extend) => model.session.navigate(|b| b.move_word_left(extend)),
        Message::MoveWordRight(extend) => model.session.navigate(|b| b.move_word_right(extend)),
        Message::MoveToStart(extend) => model.session.navigate(|b| b.move_to_start(extend)),
        Message::MoveToEnd(extend) => model.session.navigate(|b| b.move_to_end(extend)),
        Message::PageUp | Message::PageDown => {
            let direction = if msg == Message::PageUp {
                Direction::Up
            } else {
                Direction::Down
            };
            let lines = model.content_height().saturating_sub(1).max(1);
            model.session.navigate(|buffer| {
                for _ in 0..lines {
                    buffer.move_cursor(direction, false);
                }
            });
        }
        Message::ClickText(offset) => {
            model.session.set_selection(Selection::caret(offset));
        }

        // Overlay widgets
        Message::ToggleCheckbox(marker_start) => {
            model.session.toggle_checkbox_at(marker_start);
        }
        Message::DismissDate(key) => {
            if model.session.dismiss_date_at(key) {
                model.show_toast(ToastLevel::Info, "Date dismissed (click it to bring it back)");
            }
        }
        Message::ToggleDateUnderline(offset) => match model.session.toggle_date_underline(offset) {
            Some(true) => model.show_toast(ToastLevel::Info, "Date chip restored"),
            Some(false) => model.show_toast(ToastLevel::Info, "Date dismissed"),
            None => {}
        },

        // Scrolling
        Message::ScrollUp(n) => {
            model.scroll_offset = model.scroll_offset.saturating_sub(n);
        }
        Message::ScrollDown(n) => {
            let max = model
                .layout
                .total_rows()
                .saturating_sub(model.content_height());
            model.scroll_offset = (model.scroll_offset + n).min(max);
        }

        // Application
        Message::FocusGained => {
            model.session.focus_gained();
        }
        Message::FocusLost(now_ms) => model.session.focus_lost(now_ms),
        Message::Resize(width, height) => {
            model.terminal_size = (width, height);
        }
        Message::ToggleHelp => model.help_visible = !model.help_visible,
        Message::HideHelp => model.help_visible = false,
        Message::Quit => {
            if model.session.is_dirty() && !model.quit_confirmed {
                model.quit_confirmed = true;
                model.show_toast(
                    ToastLevel::Warning,
                    "Unsaved changes. Ctrl+Q again to quit, Ctrl+S to save",
                );
            } else {
                model.should_quit = true;
            }
        }
        // Handled as side effects
        Message::AddDate(_) | Message::Save | Message::BlurSettled | Message::Redraw => {}
    }

    model.refresh_layout();
    if follow {
        model.ensure_cursor_visible();
    }
    model
}

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use tempfile::tempdir;

use crate::editor::{Direction, EditorSession, FormatCommand, SessionConfig};
use crate::overlay::WidgetKindTag;

use super::event_loop::ResizeDebouncer;
use super::{App, Message, Model, ToastLevel, update};

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 15)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

fn create_test_model(text: &str) -> Model {
    let mut session = EditorSession::new(text, SessionConfig::default());
    session.set_clock(now());
    Model::new(PathBuf::from("test.md"), session, (80, 24))
}

fn apply(model: Model, messages: &[Message]) -> Model {
    messages
        .iter()
        .cloned()
        .fold(model, |model, msg| update(model, msg))
}

fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
    KeyEvent::new(code, modifiers)
}

fn click(column: u16, row: u16) -> MouseEvent {
    MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column,
        row,
        modifiers: KeyModifiers::NONE,
    }
}

// --- editing ---

#[test]
fn test_typing_inserts_text() {
    let model = create_test_model("");
    let model = apply(
        model,
        &[Message::InsertChar('h'), Message::InsertChar('é')],
    );
    assert_eq!(model.session.text(), "hé");
    assert!(model.session.is_dirty());
}

#[test]
fn test_enter_continues_list() {
    let mut model = create_test_model("- milk");
    model.session.navigate(|b| b.move_to_end(false));
    let model = update(model, Message::InsertNewline);
    assert_eq!(model.session.text(), "- milk\n- ");
}

#[test]
fn test_format_without_selection_shows_toast() {
    let model = create_test_model("word");
    let model = update(model, Message::Format(FormatCommand::Bold));
    assert_eq!(model.session.text(), "word");
    let (message, level) = model.active_toast().unwrap();
    assert_eq!(level, ToastLevel::Info);
    assert!(message.contains("Bold"));
}

#[test]
fn test_format_selection_wraps() {
    let model = create_test_model("word");
    let model = apply(
        model,
        &[
            Message::MoveEnd(true),
            Message::Format(FormatCommand::Italic),
        ],
    );
    assert_eq!(model.session.text(), "*word*");
}

#[test]
fn test_toggle_checkbox_at_cursor() {
    let model = create_test_model("- [ ] task");
    let model = update(model, Message::ToggleCheckboxAtCursor);
    assert_eq!(model.session.text(), "- [x] task");

    let model = create_test_model("plain");
    let model = update(model, Message::ToggleCheckboxAtCursor);
    assert_eq!(model.session.text(), "plain");
    assert!(model.active_toast().is_some());
}

// --- cursor and scrolling ---

#[test]
fn test_move_down_scrolls_to_cursor() {
    let text = (1..=60).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
    let mut model = create_test_model(&text);
    for _ in 0..40 {
        model = update(model, Message::MoveCursor(Direction::Down, false));
    }
    assert_eq!(model.session.buffer().cursor_position().0, 40);
    assert_eq!(model.scroll_offset, 40 + 1 - model.content_height());
}

#[test]
fn test_scroll_down_is_clamped() {
    let model = create_test_model("a\nb\nc");
    let model = update(model, Message::ScrollDown(10));
    assert_eq!(model.scroll_offset, 0);
}

#[test]
fn test_click_text_moves_caret() {
    let model = create_test_model("hello world");
    let model = update(model, Message::ClickText(6));
    assert_eq!(model.session.selection().start, 6);
}

// --- widgets ---

#[test]
fn test_clicking_checkbox_toggles_it() {
    let model = create_test_model("- [ ] task");
    let msg = App::handle_mouse(click(1, 0), &model).unwrap();
    assert_eq!(msg, Message::ToggleCheckbox(0));
    let model = update(model, msg);
    assert_eq!(model.session.text(), "- [x] task");
}

#[test]
fn test_clicking_chip_parts() {
    let model = create_test_model("Meet Jan 15 at 3pm");
    let chip = model.session.overlays().widgets()[0].key();
    assert_eq!(chip.kind, WidgetKindTag::DateChip);

    let add = App::handle_mouse(click(6, 1), &model);
    assert_eq!(add, Some(Message::AddDate(chip)));
    let dismiss = App::handle_mouse(click(23, 1), &model);
    assert_eq!(dismiss, Some(Message::DismissDate(chip)));
}

#[test]
fn test_clicking_underlined_date_toggles_chip() {
    let model = create_test_model("Meet Jan 15 at 3pm");
    let msg = App::handle_mouse(click(6, 0), &model).unwrap();
    assert_eq!(msg, Message::ToggleDateUnderline(6));

    let model = update(model, msg);
    assert!(model.session.is_dismissed("Meet Jan 15 at 3pm"));
    assert!(model.session.overlays().widgets().is_empty());

    let model = update(model, Message::ToggleDateUnderline(6));
    assert!(!model.session.is_dismissed("Meet Jan 15 at 3pm"));
    assert_eq!(model.session.overlays().widgets().len(), 1);
}

#[test]
fn test_dismiss_chip_removes_chip_row() {
    let model = create_test_model("Meet Jan 15 at 3pm\nnext");
    assert_eq!(model.layout.total_rows(), 3);
    let key = model.session.overlays().widgets()[0].key();
    let model = update(model, Message::DismissDate(key));
    assert_eq!(model.layout.total_rows(), 2);
}

#[test]
fn test_add_date_writes_calendar_file() {
    let dir = tempdir().unwrap();
    let calendar = dir.path().join("events.ics");
    let note = dir.path().join("note.md");
    std::fs::write(&note, "Meet Jan 15 at 3pm").unwrap();

    let app = App::new(note.clone()).with_calendar_file(Some(calendar.clone()));
    let mut session = app.load_session().unwrap();
    session.set_clock(now());
    let mut model = Model::new(note, session, (80, 24));
    let key = model.session.overlays().widgets()[0].key();

    let msg = Message::AddDate(key);
    model = update(model, msg.clone());
    app.handle_message_side_effects(&mut model, &msg);

    let content = std::fs::read_to_string(&calendar).unwrap();
    assert!(content.contains("DTSTART:20270115T150000"));
    let (message, _) = model.active_toast().unwrap();
    assert!(message.contains("events.ics"));
}

// --- save and quit ---

#[test]
fn test_save_writes_file_and_clears_dirty() {
    let dir = tempdir().unwrap();
    let note = dir.path().join("notes").join("today.md");
    let app = App::new(note.clone());
    let session = app.load_session().unwrap();
    let mut model = Model::new(note.clone(), session, (80, 24));
    model = update(model, Message::InsertChar('x'));
    assert!(model.session.is_dirty());

    app.handle_message_side_effects(&mut model, &Message::Save);
    assert_eq!(std::fs::read_to_string(&note).unwrap(), "x");
    assert!(!model.session.is_dirty());
}

#[test]
fn test_blur_autosaves_dirty_note() {
    let dir = tempdir().unwrap();
    let note = dir.path().join("note.md");
    let app = App::new(note.clone());
    let mut model = Model::new(note.clone(), app.load_session().unwrap(), (80, 24));
    model = update(model, Message::InsertChar('y'));
    model = update(model, Message::FocusLost(0));
    assert!(model.session.is_focused());
    assert!(model.session.poll_focus(500));

    app.handle_message_side_effects(&mut model, &Message::BlurSettled);
    assert_eq!(std::fs::read_to_string(&note).unwrap(), "y");
}

#[test]
fn test_quit_with_unsaved_changes_needs_confirmation() {
    let model = create_test_model("");
    let model = update(model, Message::InsertChar('a'));
    let model = update(model, Message::Quit);
    assert!(!model.should_quit);
    assert!(model.quit_confirmed);
    let model = update(model, Message::Quit);
    assert!(model.should_quit);
}

#[test]
fn test_other_message_resets_quit_confirmation() {
    let model = create_test_model("");
    let model = apply(
        model,
        &[Message::InsertChar('a'), Message::Quit, Message::InsertChar('b')],
    );
    assert!(!model.quit_confirmed);
    let model = update(model, Message::Quit);
    assert!(!model.should_quit);
}

#[test]
fn test_clean_quit_is_immediate() {
    let model = update(create_test_model("saved"), Message::Quit);
    assert!(model.should_quit);
}

// --- input mapping ---

#[test]
fn test_format_keys() {
    let model = create_test_model("");
    let cases = [
        (KeyCode::Char('b'), KeyModifiers::CONTROL, Message::Format(FormatCommand::Bold)),
        (KeyCode::Char('i'), KeyModifiers::CONTROL, Message::Format(FormatCommand::Italic)),
        (KeyCode::Char('d'), KeyModifiers::CONTROL, Message::Format(FormatCommand::Strikethrough)),
        (KeyCode::Char('2'), KeyModifiers::ALT, Message::Format(FormatCommand::Heading2)),
        (KeyCode::Char('0'), KeyModifiers::ALT, Message::Format(FormatCommand::Body)),
        (KeyCode::Char('t'), KeyModifiers::CONTROL, Message::Format(FormatCommand::Checklist)),
        (KeyCode::Char('k'), KeyModifiers::CONTROL, Message::ToggleCheckboxAtCursor),
    ];
    for (code, modifiers, expected) in cases {
        assert_eq!(App::handle_key(key(code, modifiers), &model), Some(expected));
    }
}

#[test]
fn test_shift_arrow_extends_selection() {
    let model = create_test_model("");
    assert_eq!(
        App::handle_key(key(KeyCode::Right, KeyModifiers::SHIFT), &model),
        Some(Message::MoveCursor(Direction::Right, true))
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Char('A'), KeyModifiers::SHIFT), &model),
        Some(Message::InsertChar('A'))
    );
}

#[test]
fn test_help_swallows_keys() {
    let mut model = create_test_model("");
    model.help_visible = true;
    assert_eq!(
        App::handle_key(key(KeyCode::Char('x'), KeyModifiers::NONE), &model),
        None
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Esc, KeyModifiers::NONE), &model),
        Some(Message::HideHelp)
    );
}

#[test]
fn test_focus_and_resize_events() {
    let model = create_test_model("");
    let mut debouncer = ResizeDebouncer::new(100);
    assert_eq!(
        App::handle_event(&Event::FocusLost, &model, 42, &mut debouncer),
        Some(Message::FocusLost(42))
    );
    assert_eq!(
        App::handle_event(&Event::Resize(100, 30), &model, 0, &mut debouncer),
        None
    );
    assert!(debouncer.is_pending());
    assert_eq!(debouncer.take_ready(50), None);
    assert_eq!(debouncer.take_ready(100), Some((100, 30)));
}

#[test]
fn test_resize_relayouts() {
    let model = create_test_model("abcdefghij");
    let model = update(model, Message::Resize(4, 10));
    assert_eq!(model.layout.total_rows(), 3);
}

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::style::Modifier;

use super::*;
use crate::app::Model;
use crate::editor::{EditorSession, SessionConfig};

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 15)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

fn create_test_model(text: &str) -> Model {
    let mut session = EditorSession::new(text, SessionConfig::default());
    session.set_clock(now());
    Model::new(PathBuf::from("note.md"), session, (60, 12))
}

fn create_test_terminal() -> Terminal<TestBackend> {
    Terminal::new(TestBackend::new(60, 12)).unwrap()
}

fn draw(model: &Model) -> Terminal<TestBackend> {
    let mut terminal = create_test_terminal();
    terminal.draw(|frame| render(model, frame)).unwrap();
    terminal
}

fn row_text(terminal: &Terminal<TestBackend>, y: u16) -> String {
    let buffer = terminal.backend().buffer();
    (0..buffer.area.width)
        .map(|x| buffer[(x, y)].symbol().to_string())
        .collect::<String>()
}

// --- text ---

#[test]
fn test_render_hides_inline_markers() {
    let model = create_test_model("a **bold** b");
    let terminal = draw(&model);
    assert!(row_text(&terminal, 0).starts_with("a bold b "));
    let cell = &terminal.backend().buffer()[(2, 0)];
    assert!(cell.modifier.contains(Modifier::BOLD));
}

#[test]
fn test_render_heading_without_hashes() {
    let model = create_test_model("# Title\nbody");
    let terminal = draw(&model);
    assert!(row_text(&terminal, 0).starts_with("Title"));
    assert!(row_text(&terminal, 1).starts_with("body"));
    assert!(
        terminal.backend().buffer()[(0, 0)]
            .modifier
            .contains(Modifier::BOLD)
    );
}

#[test]
fn test_render_bullet_glyph() {
    let model = create_test_model("- milk");
    let terminal = draw(&model);
    assert!(row_text(&terminal, 0).starts_with("• milk"));
}

// --- overlay widgets ---

#[test]
fn test_render_checkboxes_over_todo_markers() {
    let model = create_test_model("- [ ] open\n- [x] done");
    let terminal = draw(&model);
    let open = row_text(&terminal, 0);
    let done = row_text(&terminal, 1);
    assert!(open.starts_with('☐'), "{open}");
    assert!(open.contains("open"));
    assert!(done.starts_with('☑'), "{done}");
    assert!(
        terminal.backend().buffer()[(6, 1)]
            .modifier
            .contains(Modifier::CROSSED_OUT)
    );
}

#[test]
fn test_render_date_chip_below_line() {
    let model = create_test_model("Meet Jan 15 at 3pm\nnext line");
    let terminal = draw(&model);
    let chip_row = row_text(&terminal, 1);
    assert_eq!(chip_row.find("[+ Jan 15 15:00] [x]"), Some(5), "{chip_row}");
    assert!(row_text(&terminal, 2).starts_with("next line"));
    assert!(
        terminal.backend().buffer()[(5, 0)]
            .modifier
            .contains(Modifier::UNDERLINED)
    );
}

#[test]
fn test_dismissed_chip_leaves_no_row() {
    let mut model = create_test_model("Meet Jan 15 at 3pm\nnext line");
    let key = model.session.overlays().widgets()[0].key();
    assert!(model.session.dismiss_date_at(key));
    model.refresh_layout();
    let terminal = draw(&model);
    assert!(row_text(&terminal, 1).starts_with("next line"));
}

// --- chrome ---

#[test]
fn test_status_bar_shows_file_and_cursor() {
    let model = create_test_model("hello");
    let terminal = draw(&model);
    let status = row_text(&terminal, 11);
    assert!(status.contains("note.md"), "{status}");
    assert!(status.contains("Ln 1, Col 1"));
    assert!(!status.contains("[modified]"));
}

#[test]
fn test_status_text_counts_dates() {
    let model = create_test_model("Dentist Jan 15 at 3pm\nno plans");
    assert!(status_text(&model).contains("  1 date  "));
    let model = create_test_model("Call mom tomorrow at 5pm\nDentist Jan 15 at 3pm");
    assert!(status_text(&model).contains("2 dates"));
}

#[test]
fn test_help_overlay_renders() {
    let mut model = create_test_model("hello");
    model.help_visible = true;
    let terminal = draw(&model);
    let all: String = (0..12).map(|y| row_text(&terminal, y)).collect();
    assert!(all.contains("Help"));
    assert!(all.contains("Formatting"));
}

#[test]
fn test_centered_popup_rect_fits_area() {
    let area = ratatui::layout::Rect::new(0, 0, 40, 10);
    let popup = centered_popup_rect(60, 4, area);
    assert_eq!(popup.width, 40);
    assert_eq!(popup.y, 3);
}

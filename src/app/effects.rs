use std::io;
use std::path::Path;

use anyhow::{Context, Result};

use crate::app::{App, Message, Model, ToastLevel};
use crate::calendar::IcsCalendar;
use crate::editor::{EditorSession, TextChange, TextChangeListener};

/// Mirrors text changes into the render debug log.
#[derive(Debug, Default)]
pub(super) struct ChangeLog;

impl TextChangeListener for ChangeLog {
    fn text_changed(&mut self, change: &TextChange<'_>) {
        tracing::trace!(origin = ?change.origin, len = change.text.len(), "text changed");
        crate::perf::log_event(
            "text.change",
            format!(
                "origin={:?} len={} cursor={}",
                change.origin,
                change.text.len(),
                change.selection.start
            ),
        );
    }
}

impl App {
    /// Open the note as an editing session. A missing file is an empty note.
    pub(super) fn load_session(&self) -> Result<EditorSession> {
        let text = match std::fs::read_to_string(&self.file_path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read {}", self.file_path.display()));
            }
        };
        // Keep offsets LF-only; CRLF files are saved back with LF.
        let text = text.replace("\r\n", "\n");
        let mut session = EditorSession::new(&text, self.session_config);
        if let Some(path) = &self.calendar_file {
            session.set_calendar(Box::new(IcsCalendar::new(path)));
        }
        session.set_listener(Box::new(ChangeLog));
        Ok(session)
    }

    pub(super) fn handle_message_side_effects(&self, model: &mut Model, msg: &Message) {
        match msg {
            Message::Save => match save_note(model) {
                Ok(()) => {
                    model.show_toast(ToastLevel::Info, format!("Saved {}", model.file_name()));
                    if model.quit_confirmed {
                        model.should_quit = true;
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "save failed");
                    model.show_toast(ToastLevel::Error, format!("Save failed: {err}"));
                }
            },
            Message::BlurSettled => {
                if model.session.is_dirty() {
                    match save_note(model) {
                        Ok(()) => model.show_toast(ToastLevel::Info, "Saved (focus lost)"),
                        Err(err) => {
                            tracing::warn!(error = %err, "autosave failed");
                            model.show_toast(ToastLevel::Error, format!("Autosave failed: {err}"));
                        }
                    }
                }
            }
            Message::AddDate(key) => match model.session.add_date_at(*key) {
                Ok(Some(action)) => {
                    let when = action.date.format("%a %b %-d %Y %H:%M");
                    let message = match &self.calendar_file {
                        Some(path) => format!("Added {when} to {}", path.display()),
                        None => format!("Date: {when} \"{}\"", action.context_line),
                    };
                    model.show_toast(ToastLevel::Info, message);
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(error = %err, "calendar add failed");
                    model.show_toast(ToastLevel::Error, format!("Calendar: {err}"));
                }
            },
            _ => {}
        }
    }
}

fn save_note(model: &mut Model) -> Result<()> {
    write_note(&model.file_path, &model.session.text())?;
    model.session.mark_saved();
    crate::perf::log_event("note.save", format!("path={}", model.file_path.display()));
    Ok(())
}

fn write_note(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

//! Calendar collaborator.
//!
//! The session reports "add to calendar" through [`CalendarSink`]. The
//! terminal host ships [`IcsCalendar`], which keeps an iCalendar file with one
//! `VEVENT` per added date.

use std::fs;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::io;
use std::path::PathBuf;

use chrono::{Duration, Local, NaiveDateTime};
use thiserror::Error;

const CALENDAR_HEADER: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//notemark//EN\r\n";
const CALENDAR_FOOTER: &str = "END:VCALENDAR\r\n";
const ICS_TIME: &str = "%Y%m%dT%H%M%S";

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("failed to access calendar file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("calendar file {0} is not an iCalendar file")]
    Malformed(PathBuf),
}

/// Receives dates the user chose to add to their calendar.
pub trait CalendarSink {
    /// Called when the user taps "add" on a date chip.
    ///
    /// # Errors
    ///
    /// Returns an error if the event could not be recorded.
    fn date_detected(
        &mut self,
        date: NaiveDateTime,
        context_line: &str,
    ) -> Result<(), CalendarError>;
}

/// Appends one-hour events to an `.ics` file.
#[derive(Debug, Clone)]
pub struct IcsCalendar {
    path: PathBuf,
}

impl IcsCalendar {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_error(&self, source: io::Error) -> CalendarError {
        CalendarError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl CalendarSink for IcsCalendar {
    fn date_detected(
        &mut self,
        date: NaiveDateTime,
        context_line: &str,
    ) -> Result<(), CalendarError> {
        let existing = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
            Err(err) => return Err(self.io_error(err)),
        };

        let mut body = if existing.trim().is_empty() {
            CALENDAR_HEADER.to_string()
        } else {
            let trimmed = existing.trim_end();
            let Some(open) = trimmed.strip_suffix("END:VCALENDAR") else {
                return Err(CalendarError::Malformed(self.path.clone()));
            };
            open.to_string()
        };

        body.push_str(&render_event(date, context_line, Local::now().naive_local()));
        body.push_str(CALENDAR_FOOTER);
        fs::write(&self.path, body).map_err(|err| self.io_error(err))?;

        tracing::debug!(path = %self.path.display(), %date, "calendar event added");
        Ok(())
    }
}

fn render_event(date: NaiveDateTime, context_line: &str, stamp: NaiveDateTime) -> String {
    let mut hasher = DefaultHasher::new();
    context_line.hash(&mut hasher);
    let end = date + Duration::hours(1);
    format!(
        "BEGIN:VEVENT\r\nUID:{start}-{hash:016x}@notemark\r\nDTSTAMP:{stamp}\r\nDTSTART:{start}\r\nDTEND:{end}\r\nSUMMARY:{summary}\r\nEND:VEVENT\r\n",
        start = date.format(ICS_TIME),
        hash = hasher.finish(),
        stamp = stamp.format(ICS_TIME),
        end = end.format(ICS_TIME),
        summary = escape_text(context_line),
    )
}

/// Escape a value for an iCalendar TEXT property.
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(ch),
        }
    }
    out
}

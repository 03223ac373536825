//! Date candidate extraction.
//!
//! Scans note text line by line for concrete, future date mentions and picks
//! at most one candidate per line. Vague phrases (bare weekdays, `tomorrow`,
//! `next week`) are rejected, and lines the user dismissed are skipped.

mod detector;

use std::collections::HashSet;
use std::fmt;
use std::ops::Range;

use chrono::{Local, NaiveDateTime};
use serde::Serialize;

pub use detector::{DEFAULT_TIME, DatePhraseDetector, DetectedDate, EnglishDateDetector};

use crate::markup::lines::line_spans;
use detector::normalize_phrase;

/// Phrases too vague to offer as calendar entries on their own.
const VAGUE_PHRASES: &[&str] = &[
    "monday",
    "mon",
    "tuesday",
    "tue",
    "tues",
    "wednesday",
    "wed",
    "thursday",
    "thu",
    "thur",
    "thurs",
    "friday",
    "fri",
    "saturday",
    "sat",
    "sunday",
    "sun",
    "today",
    "tonight",
    "tomorrow",
    "next week",
    "this week",
];

/// A date worth offering to the user, one per line at most.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateCandidate {
    /// Resolved date and time.
    pub date: NaiveDateTime,
    /// Byte range of the winning phrase (may span a date and a later time).
    pub best_match_range: Range<usize>,
    /// Byte range of the whole line.
    pub line_range: Range<usize>,
    /// Trimmed line text; the key used for dismissal.
    pub context_line: String,
    /// Every accepted mention on the line, in text order.
    pub mentions: Vec<Range<usize>>,
}

impl DateCandidate {
    /// The first accepted mention on the line, where chips anchor.
    pub fn first_mention(&self) -> Range<usize> {
        self.mentions
            .first()
            .cloned()
            .unwrap_or_else(|| self.best_match_range.clone())
    }
}

/// Finds date candidates using a pluggable phrase detector.
///
/// With no detector every extraction yields nothing.
pub struct DateCandidateExtractor {
    detector: Option<Box<dyn DatePhraseDetector>>,
}

impl fmt::Debug for DateCandidateExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateCandidateExtractor")
            .field("enabled", &self.detector.is_some())
            .finish()
    }
}

impl Default for DateCandidateExtractor {
    fn default() -> Self {
        Self::new(EnglishDateDetector)
    }
}

impl DateCandidateExtractor {
    pub fn new(detector: impl DatePhraseDetector + 'static) -> Self {
        Self {
            detector: Some(Box::new(detector)),
        }
    }

    /// An extractor that never finds anything.
    pub const fn disabled() -> Self {
        Self { detector: None }
    }

    pub const fn is_enabled(&self) -> bool {
        self.detector.is_some()
    }

    /// Candidates relative to the local clock, skipping dismissed lines.
    pub fn extract(&self, text: &str, dismissed: &HashSet<String>) -> Vec<DateCandidate> {
        self.extract_at(text, dismissed, Local::now().naive_local())
    }

    /// Candidates relative to `now`, skipping lines whose trimmed text is in
    /// `dismissed`.
    pub fn extract_at(
        &self,
        text: &str,
        dismissed: &HashSet<String>,
        now: NaiveDateTime,
    ) -> Vec<DateCandidate> {
        self.extract_all_at(text, now)
            .into_iter()
            .filter(|candidate| !dismissed.contains(&candidate.context_line))
            .collect()
    }

    /// Candidates relative to `now`, dismissed lines included.
    pub fn extract_all_at(&self, text: &str, now: NaiveDateTime) -> Vec<DateCandidate> {
        let Some(detector) = &self.detector else {
            return Vec::new();
        };
        if text.is_empty() {
            return Vec::new();
        }

        let detected = detector.detect(text, now);
        let today = now.date();
        let mut candidates = Vec::new();

        for (line_range, line) in line_spans(text) {
            let context_line = line.trim();
            if context_line.is_empty() {
                continue;
            }
            let accepted: Vec<&DetectedDate> = detected
                .iter()
                .filter(|d| line_range.contains(&d.range.start))
                .filter(|d| d.date_time.date() >= today)
                .filter(|d| !is_vague(&text[d.range.clone()]))
                .collect();
            let Some((date, best_match_range)) = select_for_line(&accepted) else {
                continue;
            };
            candidates.push(DateCandidate {
                date,
                best_match_range,
                line_range: line_range.clone(),
                context_line: context_line.to_string(),
                mentions: accepted.iter().map(|d| d.range.clone()).collect(),
            });
        }

        tracing::trace!(count = candidates.len(), "extracted date candidates");
        candidates
    }
}

fn is_vague(phrase: &str) -> bool {
    let normalized = normalize_phrase(phrase);
    VAGUE_PHRASES.contains(&normalized.as_str())
}

/// Pick the line's candidate from its accepted mentions.
///
/// Noon stands in for "no time given", so a mention with a real time wins over
/// a bare date, and a bare date followed by a bare time is combined.
fn select_for_line(accepted: &[&DetectedDate]) -> Option<(NaiveDateTime, Range<usize>)> {
    let first = accepted.first()?;

    if let Some(timed) = accepted.iter().find(|d| d.has_date && !d.is_noon()) {
        return Some((timed.date_time, timed.range.clone()));
    }

    if let Some(day) = accepted.iter().find(|d| d.has_date && !d.has_time)
        && let Some(time) = accepted
            .iter()
            .find(|d| d.is_time_fragment() && d.range.start >= day.range.end)
    {
        let combined = day.date_time.date().and_time(time.date_time.time());
        return Some((combined, day.range.start..time.range.end));
    }

    if let Some(timed) = accepted.iter().find(|d| !d.is_noon()) {
        return Some((timed.date_time, timed.range.clone()));
    }

    Some((first.date_time, first.range.clone()))
}

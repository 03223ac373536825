use std::collections::HashSet;
use std::ops::Range;

use chrono::{Local, NaiveDateTime};

use super::buffer::{NoteBuffer, Selection};
use super::commands::{FormatCommand, apply_command, toggle_checkbox};
use super::continuation::{Interception, intercept};
use super::focus::{DEFAULT_BLUR_DELAY_MS, FocusDebouncer};
use crate::calendar::{CalendarError, CalendarSink};
use crate::dates::{DateCandidate, DateCandidateExtractor};
use crate::markup::lines::line_range_at;
use crate::markup::{StyledRun, project};
use crate::overlay::{
    DateOverlays, LayoutOracle, OverlayDiff, OverlaySynchronizer, WidgetKey, WidgetKind,
};

/// Engine settings chosen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Detect dates and offer calendar chips.
    pub dates_enabled: bool,
    /// Delay before a focus loss is reported.
    pub blur_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dates_enabled: true,
            blur_delay_ms: DEFAULT_BLUR_DELAY_MS,
        }
    }
}

/// Who caused a text change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOrigin {
    /// A keystroke applied as typed.
    User,
    /// A rewrite by the engine or a text load by the host.
    Programmatic,
}

/// Notification sent after every text change.
#[derive(Debug, Clone, Copy)]
pub struct TextChange<'a> {
    pub text: &'a str,
    pub selection: Selection,
    pub origin: EditOrigin,
}

/// Observer for text changes (autosave, word counts).
pub trait TextChangeListener {
    fn text_changed(&mut self, change: &TextChange<'_>);
}

/// A projection tagged with the text generation it was computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPass {
    pub generation: u64,
    pub runs: Vec<StyledRun>,
}

/// The date behind a chip the user chose to add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateAction {
    pub date: NaiveDateTime,
    pub context_line: String,
}

/// One editable note: text, selection, styling, overlays and date state.
///
/// Every text mutation re-projects and bumps the generation. The host lays
/// out the latest [`RenderPass`] and then calls
/// [`sync_overlays`](Self::sync_overlays) with that pass's generation.
pub struct EditorSession {
    buffer: NoteBuffer,
    config: SessionConfig,
    generation: u64,
    runs: Vec<StyledRun>,
    extractor: DateCandidateExtractor,
    /// Candidates for the current text, dismissed lines included.
    candidates: Vec<DateCandidate>,
    dismissed: HashSet<String>,
    /// Lines whose chip was hidden by Enter until the cursor comes back.
    hidden_chip_lines: HashSet<String>,
    overlays: OverlaySynchronizer,
    focus: FocusDebouncer,
    suppress_interception: bool,
    fixed_now: Option<NaiveDateTime>,
    calendar: Option<Box<dyn CalendarSink>>,
    listener: Option<Box<dyn TextChangeListener>>,
}

impl EditorSession {
    pub fn new(text: &str, config: SessionConfig) -> Self {
        let extractor = if config.dates_enabled {
            DateCandidateExtractor::default()
        } else {
            DateCandidateExtractor::disabled()
        };
        Self::with_extractor(text, config, extractor)
    }

    /// Create a session with a custom date extractor.
    pub fn with_extractor(
        text: &str,
        config: SessionConfig,
        extractor: DateCandidateExtractor,
    ) -> Self {
        let mut session = Self {
            buffer: NoteBuffer::from_text(text),
            config,
            generation: 0,
            runs: Vec::new(),
            extractor,
            candidates: Vec::new(),
            dismissed: HashSet::new(),
            hidden_chip_lines: HashSet::new(),
            overlays: OverlaySynchronizer::new(),
            focus: FocusDebouncer::new(config.blur_delay_ms),
            suppress_interception: false,
            fixed_now: None,
            calendar: None,
            listener: None,
        };
        session.refresh();
        session
    }

    pub fn set_calendar(&mut self, calendar: Box<dyn CalendarSink>) {
        self.calendar = Some(calendar);
    }

    pub fn set_listener(&mut self, listener: Box<dyn TextChangeListener>) {
        self.listener = Some(listener);
    }

    /// Resolve dates against a fixed time instead of the local clock.
    pub fn set_clock(&mut self, now: NaiveDateTime) {
        self.fixed_now = Some(now);
        self.refresh_candidates();
    }

    // --- Queries ---

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub const fn buffer(&self) -> &NoteBuffer {
        &self.buffer
    }

    pub const fn config(&self) -> SessionConfig {
        self.config
    }

    pub const fn selection(&self) -> Selection {
        self.buffer.selection()
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub fn runs(&self) -> &[StyledRun] {
        &self.runs
    }

    /// The latest projection, tagged with its generation.
    pub fn render_pass(&self) -> RenderPass {
        RenderPass {
            generation: self.generation,
            runs: self.runs.clone(),
        }
    }

    pub const fn overlays(&self) -> &OverlaySynchronizer {
        &self.overlays
    }

    /// Candidates whose line has not been dismissed.
    pub fn date_candidates(&self) -> Vec<&DateCandidate> {
        self.candidates
            .iter()
            .filter(|c| !self.dismissed.contains(&c.context_line))
            .collect()
    }

    /// Line ranges that currently offer a date chip.
    ///
    /// Hosts reserve room for the chip below these lines before laying out.
    pub fn offered_chip_lines(&self) -> Vec<Range<usize>> {
        self.candidates
            .iter()
            .filter(|c| {
                !self.dismissed.contains(&c.context_line)
                    && !self.hidden_chip_lines.contains(&c.context_line)
            })
            .map(|c| c.line_range.clone())
            .collect()
    }

    pub const fn dismissed(&self) -> &HashSet<String> {
        &self.dismissed
    }

    pub fn is_dismissed(&self, context_line: &str) -> bool {
        self.dismissed.contains(context_line)
    }

    pub const fn is_dirty(&self) -> bool {
        self.buffer.is_dirty()
    }

    pub const fn mark_saved(&mut self) {
        self.buffer.mark_clean();
    }

    /// Whether engine rewrites are in progress (edits skip interception).
    pub const fn is_suppressed(&self) -> bool {
        self.suppress_interception
    }

    // --- Editing ---

    /// Apply a user edit, letting list continuation rewrite it first.
    ///
    /// Returns `true` when the edit was rewritten.
    pub fn propose_edit(&mut self, range: Range<usize>, replacement: &str) -> bool {
        if replacement == "\n" {
            self.hide_visible_chips();
        }

        if !self.suppress_interception {
            let text = self.buffer.text();
            if let Interception::Rewrite { text, cursor } =
                intercept(&text, range.clone(), replacement)
            {
                tracing::debug!(cursor, "edit intercepted");
                self.rewrite(&text, cursor);
                return true;
            }
        }

        self.buffer.replace(range.clone(), replacement);
        self.buffer.set_cursor(range.start + replacement.len());
        self.after_text_change(EditOrigin::User);
        false
    }

    /// Type `replacement` over the current selection.
    pub fn insert(&mut self, replacement: &str) -> bool {
        let range = self.selection().range();
        self.propose_edit(range, replacement)
    }

    /// Backspace: delete the selection, or the character before the caret.
    pub fn delete_backward(&mut self) -> bool {
        let selection = self.selection();
        if !selection.is_caret() {
            return self.propose_edit(selection.range(), "");
        }
        let text = self.buffer.text();
        match crate::markup::lines::prev_boundary(&text, selection.start) {
            Some(prev) => self.propose_edit(prev..selection.start, ""),
            None => false,
        }
    }

    /// Delete: delete the selection, or the character after the caret.
    pub fn delete_forward(&mut self) -> bool {
        let selection = self.selection();
        if !selection.is_caret() {
            return self.propose_edit(selection.range(), "");
        }
        let text = self.buffer.text();
        match crate::markup::lines::next_boundary(&text, selection.start) {
            Some(next) => self.propose_edit(selection.start..next, ""),
            None => false,
        }
    }

    /// Run a format command at the current selection.
    ///
    /// Returns `false` when the command did not apply.
    pub fn apply_command(&mut self, command: FormatCommand) -> bool {
        let text = self.buffer.text();
        let Some(outcome) = apply_command(command, &text, self.selection()) else {
            return false;
        };
        tracing::debug!(command = command.label(), "format command applied");
        self.rewrite(&outcome.text, outcome.cursor);
        true
    }

    /// Flip the todo marker starting at `marker_start`.
    pub fn toggle_checkbox_at(&mut self, marker_start: usize) -> bool {
        let text = self.buffer.text();
        let Some(toggled) = toggle_checkbox(&text, marker_start) else {
            return false;
        };
        let cursor = self.selection().start;
        self.rewrite(&toggled, cursor);
        true
    }

    /// Flip the todo marker on the caret's line, if it has one.
    pub fn toggle_checkbox_on_cursor_line(&mut self) -> bool {
        let text = self.buffer.text();
        let line = line_range_at(&text, self.selection().start);
        let classified = crate::markup::classify_line(&text[line.clone()]);
        let marker = crate::markup::todo_marker_range(line, &classified);
        self.toggle_checkbox_at(marker.start)
    }

    /// Replace the whole text on behalf of the host.
    ///
    /// A replacement that strictly extends the current text moves the caret
    /// to the new end; otherwise the selection is kept and clamped.
    pub fn replace_text(&mut self, text: &str) {
        let old = self.buffer.text();
        let extends = text.len() > old.len() && text.starts_with(&old);
        let selection = self.selection();

        self.suppress_interception = true;
        self.buffer.set_text(text);
        if extends {
            self.buffer.set_cursor(text.len());
        } else {
            self.buffer.set_selection(selection);
        }
        self.after_text_change(EditOrigin::Programmatic);
        self.suppress_interception = false;
    }

    // --- Navigation ---

    /// Move the selection with a buffer movement.
    pub fn navigate(&mut self, movement: impl FnOnce(&mut NoteBuffer)) {
        movement(&mut self.buffer);
        self.reveal_chip_on_cursor_line();
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.buffer.set_selection(selection);
        self.reveal_chip_on_cursor_line();
    }

    // --- Overlays ---

    /// Place overlay widgets for the pass with `generation`.
    ///
    /// Returns `None` and leaves the widgets alone when the pass is stale.
    pub fn sync_overlays(
        &mut self,
        generation: u64,
        oracle: &dyn LayoutOracle,
    ) -> Option<&OverlayDiff> {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                "stale overlay sync ignored"
            );
            return None;
        }
        let text = self.buffer.text();
        let dates = DateOverlays {
            candidates: &self.candidates,
            dismissed: &self.dismissed,
            hidden: &self.hidden_chip_lines,
        };
        Some(self.overlays.reconcile(&text, dates, oracle))
    }

    /// "Add" on a date chip: hand the date to the calendar. The chip stays.
    ///
    /// Returns `Ok(None)` when `key` is not a date chip.
    ///
    /// # Errors
    ///
    /// Returns the calendar's error if it could not record the event.
    pub fn add_date_at(&mut self, key: WidgetKey) -> Result<Option<DateAction>, CalendarError> {
        let Some(action) = self.chip_action(key) else {
            return Ok(None);
        };
        if let Some(calendar) = self.calendar.as_mut() {
            calendar.date_detected(action.date, &action.context_line)?;
        }
        tracing::debug!(date = %action.date, "date added");
        Ok(Some(action))
    }

    /// "Dismiss" on a date chip: remember the line and drop the chip.
    pub fn dismiss_date_at(&mut self, key: WidgetKey) -> bool {
        let Some(action) = self.chip_action(key) else {
            return false;
        };
        self.overlays.remove(key);
        tracing::debug!(context = %action.context_line, "date dismissed");
        self.dismissed.insert(action.context_line);
        true
    }

    /// Tap on a date underline at `offset`: show the line's chip when it is
    /// dismissed or hidden, otherwise dismiss it.
    ///
    /// Returns whether the chip is now offered, or `None` without an
    /// underline at `offset`.
    pub fn toggle_date_underline(&mut self, offset: usize) -> Option<bool> {
        let context = self.overlays.underline_at(offset)?.context_line.clone();
        let was_dismissed = self.dismissed.remove(&context);
        let was_hidden = self.hidden_chip_lines.remove(&context);
        if was_dismissed || was_hidden {
            Some(true)
        } else {
            self.dismissed.insert(context);
            Some(false)
        }
    }

    // --- Focus ---

    pub const fn focus_gained(&mut self) -> bool {
        self.focus.focus_gained()
    }

    pub const fn focus_lost(&mut self, now_ms: u64) {
        self.focus.focus_lost(now_ms);
    }

    /// Report a debounced focus loss once it is due.
    pub fn poll_focus(&mut self, now_ms: u64) -> bool {
        self.focus.take_ready(now_ms)
    }

    pub const fn is_focused(&self) -> bool {
        self.focus.is_focused()
    }

    // --- Private helpers ---

    fn now(&self) -> NaiveDateTime {
        self.fixed_now.unwrap_or_else(|| Local::now().naive_local())
    }

    fn rewrite(&mut self, text: &str, cursor: usize) {
        self.suppress_interception = true;
        self.buffer.set_text(text);
        self.buffer.set_cursor(cursor);
        self.after_text_change(EditOrigin::Programmatic);
        self.suppress_interception = false;
    }

    fn after_text_change(&mut self, origin: EditOrigin) {
        self.generation += 1;
        self.refresh();
        if let Some(listener) = self.listener.as_mut() {
            let text = self.buffer.text();
            listener.text_changed(&TextChange {
                text: &text,
                selection: self.buffer.selection(),
                origin,
            });
        }
    }

    fn refresh(&mut self) {
        let _scope = crate::perf::scope("session.project");
        let text = self.buffer.text();
        self.runs = project(&text);
        self.refresh_candidates();
        tracing::trace!(
            generation = self.generation,
            runs = self.runs.len(),
            candidates = self.candidates.len(),
            "projected"
        );
    }

    fn refresh_candidates(&mut self) {
        let text = self.buffer.text();
        self.candidates = self.extractor.extract_all_at(&text, self.now());
    }

    fn chip_action(&self, key: WidgetKey) -> Option<DateAction> {
        match &self.overlays.get(key)?.kind {
            WidgetKind::DateChip { date, context_line } => Some(DateAction {
                date: *date,
                context_line: context_line.clone(),
            }),
            WidgetKind::Checkbox { .. } => None,
        }
    }

    fn hide_visible_chips(&mut self) {
        for candidate in &self.candidates {
            if !self.dismissed.contains(&candidate.context_line) {
                self.hidden_chip_lines.insert(candidate.context_line.clone());
            }
        }
    }

    fn reveal_chip_on_cursor_line(&mut self) {
        if self.hidden_chip_lines.is_empty() {
            return;
        }
        let text = self.buffer.text();
        let line = line_range_at(&text, self.buffer.head());
        self.hidden_chip_lines.remove(text[line].trim());
    }
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("buffer", &self.buffer)
            .field("generation", &self.generation)
            .field("runs", &self.runs.len())
            .field("candidates", &self.candidates.len())
            .field("dismissed", &self.dismissed.len())
            .field("calendar", &self.calendar.is_some())
            .field("listener", &self.listener.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::Direction;
    use crate::overlay::{BoundingBox, WidgetKindTag};
    use chrono::NaiveDate;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 15)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn session(text: &str) -> EditorSession {
        let mut session = EditorSession::new(text, SessionConfig::default());
        session.set_clock(now());
        session
    }

    /// One text line per row, one column per byte.
    fn grid(text: String) -> impl Fn(Range<usize>) -> Option<BoundingBox> {
        move |range: Range<usize>| {
            if range.end > text.len() {
                return None;
            }
            let row = text[..range.start].matches('\n').count();
            let line_start = text[..range.start].rfind('\n').map_or(0, |i| i + 1);
            Some(BoundingBox::new(
                (range.start - line_start) as f64,
                row as f64,
                range.len() as f64,
                1.0,
            ))
        }
    }

    fn sync(session: &mut EditorSession) {
        let pass = session.render_pass();
        let oracle = grid(session.text());
        session.sync_overlays(pass.generation, &oracle).unwrap();
    }

    fn chip_keys(session: &EditorSession) -> Vec<WidgetKey> {
        session
            .overlays()
            .widgets()
            .iter()
            .map(|w| w.key())
            .filter(|k| k.kind == WidgetKindTag::DateChip)
            .collect()
    }

    #[derive(Default)]
    struct Recorder {
        changes: Vec<(String, EditOrigin)>,
        dates: Vec<(NaiveDateTime, String)>,
    }

    struct SharedRecorder(Rc<RefCell<Recorder>>);

    impl TextChangeListener for SharedRecorder {
        fn text_changed(&mut self, change: &TextChange<'_>) {
            self.0
                .borrow_mut()
                .changes
                .push((change.text.to_string(), change.origin));
        }
    }

    impl CalendarSink for SharedRecorder {
        fn date_detected(
            &mut self,
            date: NaiveDateTime,
            context_line: &str,
        ) -> Result<(), CalendarError> {
            self.0
                .borrow_mut()
                .dates
                .push((date, context_line.to_string()));
            Ok(())
        }
    }

    // --- Editing ---

    #[test]
    fn test_typing_updates_text_runs_and_generation() {
        let mut s = session("");
        let before = s.generation();
        s.insert("**");
        s.insert("hi");
        s.insert("**");
        assert_eq!(s.text(), "**hi**");
        assert_eq!(s.generation(), before + 3);
        assert_eq!(s.runs().len(), 3);
        assert_eq!(s.selection(), Selection::caret(6));
    }

    #[test]
    fn test_enter_continues_list_through_session() {
        let mut s = session("- [ ] a");
        s.set_selection(Selection::caret(7));
        assert!(s.insert("\n"));
        assert_eq!(s.text(), "- [ ] a\n- [ ] ");
        assert_eq!(s.selection(), Selection::caret(14));

        assert!(s.delete_backward());
        assert_eq!(s.text(), "- [ ] a\n");
        assert_eq!(s.selection(), Selection::caret(8));
    }

    #[test]
    fn test_plain_backspace_and_delete() {
        let mut s = session("abc");
        s.set_selection(Selection::caret(3));
        assert!(!s.delete_backward());
        assert_eq!(s.text(), "ab");
        s.set_selection(Selection::caret(0));
        s.delete_forward();
        assert_eq!(s.text(), "b");
        s.set_selection(Selection::caret(0));
        assert!(!s.delete_backward());
        assert_eq!(s.text(), "b");
    }

    #[test]
    fn test_apply_command_moves_cursor() {
        let mut s = session("make this bold");
        s.set_selection(Selection::new(5, 4));
        assert!(s.apply_command(FormatCommand::Bold));
        assert_eq!(s.text(), "make **this** bold");
        assert_eq!(s.selection(), Selection::caret(13));
        s.set_selection(Selection::caret(0));
        assert!(!s.apply_command(FormatCommand::Italic));
    }

    #[test]
    fn test_toggle_checkbox_on_cursor_line() {
        let mut s = session("x\n- [ ] task");
        s.set_selection(Selection::caret(10));
        assert!(s.toggle_checkbox_on_cursor_line());
        assert_eq!(s.text(), "x\n- [x] task");
        assert_eq!(s.selection(), Selection::caret(10));
        s.set_selection(Selection::caret(0));
        assert!(!s.toggle_checkbox_on_cursor_line());
    }

    // --- Selection preservation ---

    #[test]
    fn test_replace_text_clamps_selection() {
        let mut s = session("hello world");
        s.set_selection(Selection::new(6, 5));
        s.replace_text("hi");
        assert_eq!(s.selection(), Selection::caret(2));
    }

    #[test]
    fn test_replace_text_prefix_extension_moves_to_end() {
        let mut s = session("hello");
        s.set_selection(Selection::caret(1));
        s.replace_text("hello world");
        assert_eq!(s.selection(), Selection::caret(11));
    }

    #[test]
    fn test_replace_text_snaps_to_char_boundary() {
        let mut s = session("abcd");
        s.set_selection(Selection::caret(2));
        s.replace_text("aé");
        assert_eq!(s.selection(), Selection::caret(1));
    }

    // --- Listener ---

    #[test]
    fn test_listener_sees_origins() {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let mut s = session("- a");
        s.set_listener(Box::new(SharedRecorder(Rc::clone(&recorder))));
        s.set_selection(Selection::caret(3));
        s.insert("b");
        s.insert("\n");
        s.replace_text("new");

        let recorder = recorder.borrow();
        let changes = &recorder.changes;
        assert_eq!(changes.len(), 3);
        assert_eq!(changes[0], ("- ab".to_string(), EditOrigin::User));
        assert_eq!(changes[1], ("- ab\n- ".to_string(), EditOrigin::Programmatic));
        assert_eq!(changes[2].1, EditOrigin::Programmatic);
        assert!(!s.is_suppressed());
    }

    // --- Overlays ---

    #[test]
    fn test_stale_sync_is_ignored() {
        let mut s = session("- [ ] a");
        let stale = s.render_pass();
        s.set_selection(Selection::caret(7));
        s.insert("b");
        let oracle = grid(s.text());
        assert!(s.sync_overlays(stale.generation, &oracle).is_none());
        assert!(s.overlays().widgets().is_empty());
        assert!(s.sync_overlays(s.generation(), &oracle).is_some());
        assert_eq!(s.overlays().widgets().len(), 1);
    }

    #[test]
    fn test_checkbox_widget_toggles_text() {
        let mut s = session("- [ ] a");
        sync(&mut s);
        let anchor = s.overlays().widgets()[0].anchor.start;
        assert!(s.toggle_checkbox_at(anchor));
        sync(&mut s);
        assert_eq!(
            s.overlays().widgets()[0].kind,
            WidgetKind::Checkbox { checked: true }
        );
    }

    // --- Dates ---

    #[test]
    fn test_date_chip_add_calls_calendar() {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let mut s = session("Dentist Oct 20 at 4pm");
        s.set_calendar(Box::new(SharedRecorder(Rc::clone(&recorder))));
        sync(&mut s);

        let key = chip_keys(&s)[0];
        let action = s.add_date_at(key).unwrap().unwrap();
        assert_eq!(action.context_line, "Dentist Oct 20 at 4pm");
        assert_eq!(recorder.borrow().dates.len(), 1);
        assert_eq!(chip_keys(&s).len(), 1);
    }

    #[test]
    fn test_dismiss_persists_across_edits() {
        let mut s = session("Dentist Oct 20 at 4pm\nnotes");
        sync(&mut s);
        let key = chip_keys(&s)[0];
        assert!(s.dismiss_date_at(key));
        assert!(chip_keys(&s).is_empty());

        // Editing another line does not bring the chip back.
        let end = s.text().len();
        s.set_selection(Selection::caret(end));
        s.insert(" more");
        sync(&mut s);
        assert!(chip_keys(&s).is_empty());
        assert!(s.date_candidates().is_empty());
        assert!(s.is_dismissed("Dentist Oct 20 at 4pm"));

        // The underline stays and restores the chip.
        assert!(!s.overlays().underline_at(9).unwrap().chip_visible);
        assert_eq!(s.toggle_date_underline(9), Some(true));
        sync(&mut s);
        assert_eq!(chip_keys(&s).len(), 1);
        assert_eq!(s.toggle_date_underline(9), Some(false));
        assert_eq!(s.toggle_date_underline(0), None);
    }

    #[test]
    fn test_enter_hides_chips_until_cursor_returns() {
        let mut s = session("Dentist Oct 20 at 4pm");
        let end = s.text().len();
        s.set_selection(Selection::caret(end));
        s.insert("\n");
        sync(&mut s);
        assert!(chip_keys(&s).is_empty());
        assert!(!s.is_dismissed("Dentist Oct 20 at 4pm"));

        s.navigate(|buffer| buffer.move_cursor(Direction::Up, false));
        sync(&mut s);
        assert_eq!(chip_keys(&s).len(), 1);
    }

    #[test]
    fn test_underline_tap_reveals_hidden_chip() {
        let mut s = session("Dentist Oct 20 at 4pm");
        let end = s.text().len();
        s.set_selection(Selection::caret(end));
        s.insert("\n");
        sync(&mut s);
        assert!(chip_keys(&s).is_empty());
        assert!(!s.overlays().underline_at(9).unwrap().chip_visible);

        assert_eq!(s.toggle_date_underline(9), Some(true));
        assert!(!s.is_dismissed("Dentist Oct 20 at 4pm"));
        sync(&mut s);
        assert_eq!(chip_keys(&s).len(), 1);
        assert!(s.overlays().underline_at(9).unwrap().chip_visible);
    }

    #[test]
    fn test_editing_dismissed_line_offers_chip_again() {
        let mut s = session("Dentist Oct 20 at 4pm\nnotes");
        sync(&mut s);
        assert!(s.dismiss_date_at(chip_keys(&s)[0]));

        s.set_selection(Selection::caret("Dentist Oct 20 at 4pm".len()));
        s.insert("!");
        sync(&mut s);
        assert_eq!(s.text(), "Dentist Oct 20 at 4pm!\nnotes");
        assert_eq!(chip_keys(&s).len(), 1);
        assert!(!s.is_dismissed("Dentist Oct 20 at 4pm!"));
    }

    #[test]
    fn test_vague_dates_offer_no_chip() {
        let mut s = session("Monday\ntomorrow");
        sync(&mut s);
        assert!(chip_keys(&s).is_empty());
        assert!(s.date_candidates().is_empty());
    }

    #[test]
    fn test_dates_disabled() {
        let config = SessionConfig {
            dates_enabled: false,
            ..SessionConfig::default()
        };
        let mut s = EditorSession::new("Dentist Oct 20 at 4pm", config);
        s.set_clock(now());
        sync(&mut s);
        assert!(s.date_candidates().is_empty());
        assert!(s.overlays().underlines().is_empty());
    }

    // --- Focus ---

    #[test]
    fn test_focus_debounce_through_session() {
        let mut s = session("");
        s.focus_lost(0);
        assert!(!s.poll_focus(100));
        assert!(s.is_focused());
        assert!(s.poll_focus(200));
        assert!(!s.is_focused());
        assert!(s.focus_gained());
    }
}

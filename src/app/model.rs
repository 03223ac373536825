use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::config::ThemeMode;
use crate::editor::{EditorSession, SessionConfig};
use crate::ui::TerminalLayout;
use crate::ui::style::Palette;

/// Rows reserved below the note for the status bar.
const FOOTER_ROWS: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// The complete application state.
///
/// All state lives here - no global or scattered state.
pub struct Model {
    pub session: EditorSession,
    pub file_path: PathBuf,
    /// Cell layout of the session's latest render pass.
    pub layout: TerminalLayout,
    /// First layout row shown at the top of the note area.
    pub scroll_offset: usize,
    pub terminal_size: (u16, u16),
    pub palette: Palette,
    pub theme: ThemeMode,
    pub help_visible: bool,
    pub should_quit: bool,
    pub quit_confirmed: bool,
    pub config_global_path: Option<PathBuf>,
    pub config_local_path: Option<PathBuf>,
    toast: Option<Toast>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("file_path", &self.file_path)
            .field("session", &self.session)
            .field("scroll_offset", &self.scroll_offset)
            .field("terminal_size", &self.terminal_size)
            .field("help_visible", &self.help_visible)
            .field("should_quit", &self.should_quit)
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Create a model around an editing session.
    pub fn new(file_path: PathBuf, session: EditorSession, terminal_size: (u16, u16)) -> Self {
        let mut model = Self {
            session,
            file_path,
            layout: TerminalLayout::default(),
            scroll_offset: 0,
            terminal_size,
            palette: Palette::default(),
            theme: ThemeMode::Auto,
            help_visible: false,
            should_quit: false,
            quit_confirmed: false,
            config_global_path: None,
            config_local_path: None,
            toast: None,
        };
        model.refresh_layout();
        model
    }

    pub fn with_theme(mut self, theme: ThemeMode) -> Self {
        self.theme = theme;
        self.palette = Palette::for_mode(theme);
        self
    }

    /// Cells available for note text.
    pub const fn content_width(&self) -> u16 {
        self.terminal_size.0
    }

    /// Rows available for note text.
    pub fn content_height(&self) -> usize {
        let footer = FOOTER_ROWS + u16::from(self.toast.is_some());
        usize::from(self.terminal_size.1.saturating_sub(footer))
    }

    /// Lay out the latest render pass and sync overlays against it.
    pub fn refresh_layout(&mut self) {
        let pass = self.session.render_pass();
        let text = self.session.text();
        let chip_lines = self.session.offered_chip_lines();
        self.layout = TerminalLayout::build(
            &text,
            &pass.runs,
            &chip_lines,
            self.content_width(),
            pass.generation,
        );
        let _scope = crate::perf::scope("app.sync_overlays");
        if let Some(diff) = self.session.sync_overlays(pass.generation, &self.layout)
            && !diff.is_empty()
        {
            crate::perf::log_event(
                "overlay.sync",
                format!(
                    "generation={} added={} removed={} moved={} updated={}",
                    pass.generation,
                    diff.added.len(),
                    diff.removed.len(),
                    diff.moved.len(),
                    diff.updated.len()
                ),
            );
        }
    }

    /// Scroll so the caret row is inside the note area.
    pub fn ensure_cursor_visible(&mut self) {
        let (row, _) = self.layout.caret(self.session.buffer().head());
        let height = self.content_height().max(1);
        if row < self.scroll_offset {
            self.scroll_offset = row;
        } else if row >= self.scroll_offset + height {
            self.scroll_offset = row + 1 - height;
        }
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }

    pub fn file_name(&self) -> String {
        self.file_path.file_name().map_or_else(
            || "untitled".to_string(),
            |name| name.to_string_lossy().to_string(),
        )
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(
            PathBuf::new(),
            EditorSession::new("", SessionConfig::default()),
            (80, 24),
        )
    }
}

// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. editor::EditorSession)
    clippy::module_name_repetitions
)]

//! # Notemark
//!
//! A live markdown note editor.
//!
//! Notemark keeps raw markdown as the single source of truth and styles it
//! in place as you type:
//! - Headings, emphasis and list markers styled with their syntax hidden
//! - Checkboxes over todo markers, toggled by click
//! - List continuation on Enter and marker removal on Backspace
//! - Date chips that offer to add detected dates to a calendar
//!
//! ## Architecture
//!
//! The editing engine (`markup`, `dates`, `overlay`, `editor`) is independent
//! of any UI. The terminal host uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`markup`]: Pattern catalog and style projection
//! - [`dates`]: Date phrase detection and candidate selection
//! - [`overlay`]: Checkbox and date chip placement
//! - [`editor`]: Buffer, list continuation, format commands, editing session
//! - [`calendar`]: Calendar collaborator and `.ics` writer
//! - [`app`]: Main application loop and state
//! - [`ui`]: Terminal layout and rendering

pub mod app;
pub mod calendar;
pub mod config;
pub mod dates;
pub mod editor;
pub mod markup;
pub mod overlay;
pub mod perf;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::dates::{DateCandidate, DateCandidateExtractor};
    pub use crate::editor::{EditorSession, FormatCommand, Selection, SessionConfig};
    pub use crate::markup::{RunStyle, StyledRun, project};
    pub use crate::overlay::{BoundingBox, LayoutOracle, OverlaySynchronizer, OverlayWidget};
}

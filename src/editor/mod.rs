//! Note editing: buffer, structural edit interception, format commands and
//! the session that ties them to projection and overlays.
//!
//! The session is designed for integration into the TEA architecture: the
//! host feeds it edits and layout, and reads back runs and widgets.

mod buffer;
mod commands;
mod continuation;
mod focus;
mod session;

pub use buffer::{Direction, NoteBuffer, Selection};
pub use commands::{CommandOutcome, FormatCommand, apply_command, toggle_checkbox};
pub use continuation::{Interception, intercept};
pub use focus::{DEFAULT_BLUR_DELAY_MS, FocusDebouncer};
pub use session::{
    DateAction, EditOrigin, EditorSession, RenderPass, SessionConfig, TextChange,
    TextChangeListener,
};

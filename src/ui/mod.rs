//! Terminal UI components.
//!
//! This module contains all UI-related code including:
//! - [`layout`]: Cell layout of render passes (the overlay layout oracle)
//! - [`widgets`]: Checkbox and date chip overlays
//! - [`style`]: Theming and colors

pub mod layout;
pub mod style;
pub mod widgets;

mod overlays;
mod render;
mod status;

pub use layout::TerminalLayout;
pub use overlays::centered_popup_rect;
pub use render::render;
pub use status::status_text;

#[cfg(test)]
mod tests;

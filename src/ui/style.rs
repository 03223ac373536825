//! Theming and color definitions.
//!
//! Maps engine run styles onto terminal styles. Uses ANSI colors that adapt
//! to the terminal's color palette, with darker indexed colors on light
//! backgrounds.

use ratatui::style::{Color, Modifier, Style};

use crate::config::ThemeMode;
use crate::markup::{FontWeight, RunStyle, SizeTier};

/// Colors for one background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub heading1: Color,
    pub heading2: Color,
    pub heading3: Color,
    pub muted: Color,
    pub underline: Color,
    pub checkbox: Color,
    pub chip_add: Style,
    pub chip_dismiss: Style,
    pub cursor: Style,
    pub selection: Color,
}

impl Palette {
    pub const fn dark() -> Self {
        Self {
            heading1: Color::Cyan,
            heading2: Color::Green,
            heading3: Color::Yellow,
            muted: Color::Indexed(245),
            underline: Color::Magenta,
            checkbox: Color::Cyan,
            chip_add: Style::new().bg(Color::Indexed(24)).fg(Color::White),
            chip_dismiss: Style::new().bg(Color::Indexed(238)).fg(Color::White),
            cursor: Style::new().bg(Color::White).fg(Color::Black),
            selection: Color::Indexed(238),
        }
    }

    pub const fn light() -> Self {
        Self {
            heading1: Color::Indexed(24),
            heading2: Color::Indexed(22),
            heading3: Color::Indexed(58),
            muted: Color::Indexed(244),
            underline: Color::Indexed(90),
            checkbox: Color::Indexed(24),
            chip_add: Style::new().bg(Color::Indexed(153)).fg(Color::Black),
            chip_dismiss: Style::new().bg(Color::Indexed(252)).fg(Color::Black),
            cursor: Style::new().bg(Color::Black).fg(Color::White),
            selection: Color::Indexed(153),
        }
    }

    /// Palette for `mode`; `Auto` reads `COLORFGBG`.
    pub fn for_mode(mode: ThemeMode) -> Self {
        let light = match mode {
            ThemeMode::Light => true,
            ThemeMode::Dark => false,
            ThemeMode::Auto => is_light_colorfgbg(std::env::var("COLORFGBG").ok().as_deref()),
        };
        if light { Self::light() } else { Self::dark() }
    }

    /// Terminal style for a projected run.
    pub fn run_style(&self, style: &RunStyle) -> Style {
        let mut out = Style::default();
        match style.size {
            SizeTier::Heading1 => {
                out = out
                    .fg(self.heading1)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
            }
            SizeTier::Heading2 => out = out.fg(self.heading2).add_modifier(Modifier::BOLD),
            SizeTier::Heading3 => out = out.fg(self.heading3).add_modifier(Modifier::BOLD),
            SizeTier::Body => {}
        }
        if style.weight == FontWeight::Bold {
            out = out.add_modifier(Modifier::BOLD);
        }
        if style.italic {
            out = out.add_modifier(Modifier::ITALIC);
        }
        if style.strikethrough {
            out = out.add_modifier(Modifier::CROSSED_OUT);
        }
        if style.muted {
            out = out.fg(self.muted);
        }
        out
    }

    /// Style added to text under a date underline.
    pub fn date_underline(&self, chip_visible: bool) -> Style {
        let style = Style::default()
            .add_modifier(Modifier::UNDERLINED)
            .underline_color(self.underline);
        if chip_visible {
            style.fg(self.underline)
        } else {
            style
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::dark()
    }
}

fn is_light_colorfgbg(colorfgbg: Option<&str>) -> bool {
    let Some(value) = colorfgbg else {
        return false;
    };
    let bg = value.rsplit(';').next().unwrap_or(value);
    bg.parse::<u8>().is_ok_and(|bg| bg >= 7)
}

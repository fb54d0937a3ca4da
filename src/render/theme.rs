//! Colors used by the frame composer.

use super::cell::{Modifiers, Rgb, Style};
use crate::editor::StatusSeverity;

/// Styles for each part of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Buffer text and the message row.
    pub text: Style,
    /// Line numbers.
    pub gutter: Style,
    /// The `>` marking the cursor line.
    pub cursor_marker: Style,
    /// `~` rows past the end of the buffer.
    pub tilde: Style,
    /// Normal status row.
    pub status_info: Style,
    /// Status row carrying a warning.
    pub status_warning: Style,
    /// Status row carrying an error.
    pub status_error: Style,
}

impl Default for Theme {
    fn default() -> Self {
        let background = Rgb::BLACK;
        Self {
            text: Style::new(Rgb::from_u32(0xE5_E5_E5), background),
            gutter: Style::new(Rgb::from_u32(0x7F_7F_7F), background),
            cursor_marker: Style::new(Rgb::from_u32(0xCD_CD_00), background)
                .with_modifiers(Modifiers::BOLD),
            tilde: Style::new(Rgb::from_u32(0x5C_5C_FF), background),
            status_info: Style::new(Rgb::BLACK, Rgb::from_u32(0xE5_E5_E5)),
            status_warning: Style::new(Rgb::BLACK, Rgb::from_u32(0xCD_CD_00)),
            status_error: Style::new(Rgb::WHITE, Rgb::from_u32(0xCD_00_00)),
        }
    }
}

impl Theme {
    /// Status row style for a severity.
    pub const fn status(&self, severity: StatusSeverity) -> Style {
        match severity {
            StatusSeverity::Warning => self.status_warning,
            StatusSeverity::Error => self.status_error,
            StatusSeverity::None | StatusSeverity::Info => self.status_info,
        }
    }
}

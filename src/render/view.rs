//! Frame composition: editor state to grid.
//!
//! The bottom two rows are the status row and the message row; everything
//! above is buffer content.
//!
//! ```text
//! > 1 first line
//!   2 second line
//!     ~
//! -- NORMAL -- notes.txt [+]  Ln 1, Col 3  Lines 2
//! :w
//! ```

use super::grid::Grid;
use super::theme::Theme;
use crate::editor::{byte_offset, EditorState, Mode, StatusSeverity};
use unicode_width::UnicodeWidthStr;

/// Rows reserved below the content area.
pub const INFO_ROWS: u16 = 2;

/// Row and column assignments for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Rows available for buffer lines.
    pub content_rows: u16,
    /// Row index of the status row.
    pub status_row: u16,
    /// Row index of the message row.
    pub message_row: u16,
    /// Digits in the largest line number.
    pub number_width: usize,
}

impl Layout {
    /// Lay out a grid of `height` rows showing `line_count` lines.
    pub fn new(height: u16, line_count: usize) -> Self {
        let content_rows = height.saturating_sub(INFO_ROWS);
        Self {
            content_rows,
            status_row: content_rows,
            message_row: content_rows + 1,
            number_width: line_count.max(1).to_string().len(),
        }
    }

    /// Columns before the text: marker, number, one space.
    pub const fn gutter_width(&self) -> usize {
        2 + self.number_width + 1
    }
}

/// Scroll offset that keeps `cursor_line` visible.
///
/// Moves the least from `offset`, then clamps to `[0, line_count - rows]`.
pub fn scroll_offset(offset: usize, cursor_line: usize, line_count: usize, rows: usize) -> usize {
    if rows == 0 || line_count == 0 {
        return 0;
    }
    let mut offset = offset.min(line_count - 1);
    if cursor_line < offset {
        offset = cursor_line;
    } else if cursor_line >= offset + rows {
        offset = cursor_line + 1 - rows;
    }
    offset.min(line_count.saturating_sub(rows))
}

/// Status row text when there is no warning or error to show.
pub fn status_text(state: &EditorState) -> String {
    let buffer = state.buffer();
    let name = buffer
        .file_path()
        .map_or_else(|| "[No Name]".to_string(), |p| p.display().to_string());
    let dirty = if buffer.is_dirty() { " [+]" } else { "" };
    let cursor = state.cursor();
    format!(
        "{} {name}{dirty}  Ln {}, Col {}  Lines {}",
        state.mode().label(),
        cursor.line + 1,
        cursor.column + 1,
        buffer.line_count()
    )
}

/// Draw `state` into `grid` and return where the terminal cursor goes.
///
/// `grid` is cleared first. `prefix` is drawn before `command_line` on
/// the message row while in command-line mode.
pub fn compose(
    grid: &mut Grid,
    theme: &Theme,
    state: &EditorState,
    scroll: usize,
    command_line: &str,
    prefix: char,
) -> (u16, u16) {
    grid.clear();
    let width = grid.width();
    let buffer = state.buffer();
    let layout = Layout::new(grid.height(), buffer.line_count());
    let cursor = state.cursor();

    for row in 0..layout.content_rows {
        grid.fill_row(row, 0, theme.text);
        let index = scroll + usize::from(row);
        match buffer.line(index) {
            Some(text) => {
                if index == cursor.line {
                    grid.put_str(0, row, "> ", theme.cursor_marker);
                } else {
                    grid.put_str(0, row, "  ", theme.text);
                }
                let number = format!("{:>w$} ", index + 1, w = layout.number_width);
                let col = grid.put_str(2, row, &number, theme.gutter);
                grid.put_str(col, row, text, theme.text);
            }
            None => {
                grid.put_str(layout.gutter_width() as u16, row, "~", theme.tilde);
            }
        }
    }

    let severity = state.status_severity();
    let status_style = theme.status(severity);
    grid.fill_row(layout.status_row, 0, status_style);
    if matches!(severity, StatusSeverity::Warning | StatusSeverity::Error) {
        grid.put_str(0, layout.status_row, state.status(), status_style);
    } else {
        grid.put_str(0, layout.status_row, &status_text(state), status_style);
    }

    grid.fill_row(layout.message_row, 0, theme.text);
    if state.mode() == Mode::CommandLine {
        let mut line = String::with_capacity(command_line.len() + 1);
        line.push(prefix);
        line.push_str(command_line);
        grid.put_str(0, layout.message_row, &line, theme.text);
        let x = 1 + command_line.width();
        return (clamp_to(x, width), layout.message_row);
    }
    if severity == StatusSeverity::Info {
        grid.put_str(0, layout.message_row, state.status(), theme.text);
    }

    let text = buffer.line(cursor.line).unwrap_or("");
    let before = &text[..byte_offset(text, cursor.column)];
    let x = layout.gutter_width() + before.width();
    let y = cursor
        .line
        .saturating_sub(scroll)
        .min(usize::from(layout.content_rows.saturating_sub(1)));
    (clamp_to(x, width), y as u16)
}

fn clamp_to(x: usize, width: u16) -> u16 {
    u16::try_from(x).unwrap_or(u16::MAX).min(width.saturating_sub(1))
}

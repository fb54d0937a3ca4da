//! Editor state: buffer, cursor, mode, status line and the running flag.

use super::buffer::TextBuffer;
use std::fmt;

/// Editing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Motions and operators.
    #[default]
    Normal,
    /// Text entry.
    Insert,
    /// Typing an ex-style command after `:`.
    CommandLine,
    /// Reserved; no key currently enters it.
    Visual,
}

impl Mode {
    /// Label shown on the status line.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "-- NORMAL --",
            Self::Insert => "-- INSERT --",
            Self::CommandLine => "-- COMMAND --",
            Self::Visual => "-- VISUAL --",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Severity of the status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum StatusSeverity {
    /// No message.
    #[default]
    None,
    /// Informational.
    Info,
    /// Something did not happen as asked.
    Warning,
    /// An operation failed.
    Error,
}

/// A cursor or motion target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based character column.
    pub column: usize,
}

impl Position {
    /// Create a position.
    #[inline]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Everything the modal engine mutates.
///
/// Owned by the frame loop thread; the cursor is re-clamped after every
/// mutation so it always addresses a valid line and a column no greater
/// than that line's length.
#[derive(Debug, Clone)]
pub struct EditorState {
    buffer: TextBuffer,
    cursor: Position,
    mode: Mode,
    running: bool,
    status: String,
    severity: StatusSeverity,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(TextBuffer::new())
    }
}

impl EditorState {
    /// Wrap a buffer, cursor at the origin, Normal mode, running.
    pub fn new(buffer: TextBuffer) -> Self {
        Self {
            buffer,
            cursor: Position::default(),
            mode: Mode::Normal,
            running: true,
            status: String::new(),
            severity: StatusSeverity::None,
        }
    }

    /// The text buffer.
    #[inline]
    pub const fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// Mutable text buffer. Call [`clamp_cursor`](Self::clamp_cursor) after
    /// removing text.
    #[inline]
    pub const fn buffer_mut(&mut self) -> &mut TextBuffer {
        &mut self.buffer
    }

    /// Current cursor.
    #[inline]
    pub const fn cursor(&self) -> Position {
        self.cursor
    }

    /// Move the cursor, clamping to the buffer.
    pub fn set_cursor(&mut self, line: usize, column: usize) {
        self.cursor = Position::new(line, column);
        self.clamp_cursor();
    }

    /// Move the cursor to a position, clamping to the buffer.
    pub fn set_position(&mut self, pos: Position) {
        self.set_cursor(pos.line, pos.column);
    }

    /// Move the cursor by whole lines.
    pub fn move_cursor_line(&mut self, delta: isize) {
        self.cursor.line = self.cursor.line.saturating_add_signed(delta);
        self.clamp_cursor();
    }

    /// Move the cursor within the current line.
    pub fn move_cursor_column(&mut self, delta: isize) {
        self.cursor.column = self.cursor.column.saturating_add_signed(delta);
        self.clamp_cursor();
    }

    /// Re-establish the cursor invariant after an external edit.
    pub fn clamp_cursor(&mut self) {
        self.cursor.line = self.cursor.line.min(self.buffer.last_line());
        let len = self.buffer.line_len(self.cursor.line).unwrap_or(0);
        self.cursor.column = self.cursor.column.min(len);
    }

    /// Current mode.
    #[inline]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Switch mode.
    #[inline]
    pub const fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Whether the frame loop should keep going.
    #[inline]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Ask the frame loop to exit after the current event.
    #[inline]
    pub const fn request_quit(&mut self) {
        self.running = false;
    }

    /// Set the status message.
    pub fn set_status(&mut self, message: impl Into<String>, severity: StatusSeverity) {
        self.status = message.into();
        self.severity = severity;
    }

    /// Clear the status message.
    pub fn clear_status(&mut self) {
        self.status.clear();
        self.severity = StatusSeverity::None;
    }

    /// Status text.
    #[inline]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Status severity.
    #[inline]
    pub const fn status_severity(&self) -> StatusSeverity {
        self.severity
    }
}

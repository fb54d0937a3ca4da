//! Message types passed from the input thread to the editor loop.

use std::fmt;

/// Key codes understood by the editor.
///
/// This is the subset of terminal keys the modal engine reacts to; anything
/// else is dropped by the key source before it reaches the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A printable character.
    Char(char),
    /// Enter/Return key.
    Enter,
    /// Escape key.
    Esc,
    /// Backspace key.
    Backspace,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
}

/// A single key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// The key that was pressed.
    pub code: KeyCode,
}

impl KeyEvent {
    /// Create a key event from a key code.
    #[inline]
    pub const fn new(code: KeyCode) -> Self {
        Self { code }
    }

    /// Create a key event for a printable character.
    #[inline]
    pub const fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c))
    }

    /// The character carried by this event, if any.
    #[inline]
    pub const fn as_char(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(c) => Some(c),
            _ => None,
        }
    }

    /// Check whether this is one of the four arrow keys.
    #[inline]
    pub const fn is_arrow(&self) -> bool {
        matches!(
            self.code,
            KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right
        )
    }

    /// The gesture string used for keybinding lookup.
    ///
    /// Characters map to themselves; named keys use angle-bracket notation
    /// (`<Enter>`, `<Esc>`, `<Backspace>`, `<Up>`, `<Down>`, `<Left>`,
    /// `<Right>`).
    pub fn gesture(&self) -> String {
        match self.code {
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Enter => "<Enter>".to_string(),
            KeyCode::Esc => "<Esc>".to_string(),
            KeyCode::Backspace => "<Backspace>".to_string(),
            KeyCode::Up => "<Up>".to_string(),
            KeyCode::Down => "<Down>".to_string(),
            KeyCode::Left => "<Left>".to_string(),
            KeyCode::Right => "<Right>".to_string(),
        }
    }

    /// Build a sequence of character events from a string.
    ///
    /// Handy for scripting input in tests and benchmarks.
    pub fn from_keys(keys: &str) -> Vec<Self> {
        keys.chars().map(Self::char).collect()
    }
}

impl From<KeyCode> for KeyEvent {
    fn from(code: KeyCode) -> Self {
        Self::new(code)
    }
}

impl From<char> for KeyEvent {
    fn from(c: char) -> Self {
        Self::char(c)
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.gesture())
    }
}

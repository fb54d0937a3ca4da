//! The unnamed yank register and paste.

use super::motion::first_non_blank;
use crate::editor::{byte_offset, char_len, EditorState};
use thiserror::Error;

/// Why a paste did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PasteError {
    /// The register is empty.
    #[error("Nothing to paste")]
    NothingToPaste,
    /// The buffer rejected the insertion.
    #[error("Paste failed")]
    PasteFailed,
}

/// Text captured by a yank (or a whole-line operator).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YankRegister {
    lines: Vec<String>,
    linewise: bool,
}

impl YankRegister {
    /// Empty register.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whole lines.
    pub fn set_linewise(&mut self, lines: Vec<String>) {
        self.lines = lines;
        self.linewise = true;
    }

    /// Store a character range, one fragment per line touched.
    pub fn set_charwise(&mut self, fragments: Vec<String>) {
        self.lines = fragments;
        self.linewise = false;
    }

    /// Whether anything has been yanked.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether the content is whole lines.
    pub const fn is_linewise(&self) -> bool {
        self.linewise
    }

    /// Stored lines or fragments.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Insert the register after (`p`) or before (`P`) the cursor.
    ///
    /// Linewise content goes below or above the cursor line and the cursor
    /// lands on the first non-blank of the first inserted line. Charwise
    /// content goes after or at the cursor column and the cursor lands on
    /// the last inserted character.
    pub fn paste(&self, state: &mut EditorState, before: bool) -> Result<(), PasteError> {
        if self.lines.is_empty() {
            return Err(PasteError::NothingToPaste);
        }
        state.clamp_cursor();
        if self.linewise {
            self.paste_lines(state, before)
        } else {
            self.paste_fragments(state, before)
        }
    }

    fn paste_lines(&self, state: &mut EditorState, before: bool) -> Result<(), PasteError> {
        let cursor = state.cursor();
        let at = if before { cursor.line } else { cursor.line + 1 };
        for (i, line) in self.lines.iter().enumerate() {
            state
                .buffer_mut()
                .insert_line(at + i, line.clone())
                .map_err(|_| PasteError::PasteFailed)?;
        }
        let column = first_non_blank(state.buffer(), at);
        state.set_cursor(at, column);
        Ok(())
    }

    fn paste_fragments(&self, state: &mut EditorState, before: bool) -> Result<(), PasteError> {
        let cursor = state.cursor();
        let line = cursor.line;
        let current = state
            .buffer()
            .line(line)
            .ok_or(PasteError::PasteFailed)?
            .to_string();
        let len = char_len(&current);
        let at = if before {
            cursor.column.min(len)
        } else {
            (cursor.column + 1).min(len)
        };
        let split = byte_offset(&current, at);
        let (prefix, suffix) = current.split_at(split);

        let (first, rest) = self
            .lines
            .split_first()
            .ok_or(PasteError::NothingToPaste)?;

        if rest.is_empty() {
            let inserted = char_len(first);
            state
                .buffer_mut()
                .set_line(line, format!("{prefix}{first}{suffix}"))
                .map_err(|_| PasteError::PasteFailed)?;
            let column = if inserted == 0 { at } else { at + inserted - 1 };
            state.set_cursor(line, column);
            return Ok(());
        }

        let buffer = state.buffer_mut();
        buffer
            .set_line(line, format!("{prefix}{first}"))
            .map_err(|_| PasteError::PasteFailed)?;
        let last_index = rest.len() - 1;
        for (i, fragment) in rest.iter().enumerate() {
            let text = if i == last_index {
                format!("{fragment}{suffix}")
            } else {
                fragment.clone()
            };
            buffer
                .insert_line(line + 1 + i, text)
                .map_err(|_| PasteError::PasteFailed)?;
        }

        let last_line = line + rest.len();
        let column = char_len(&rest[last_index]).saturating_sub(1);
        state.set_cursor(last_line, column);
        Ok(())
    }
}

//! Text buffer: the lines being edited.
//!
//! Lines are stored as owned `String`s without their terminators. Columns
//! are character indices, never byte offsets. The buffer always holds at
//! least one (possibly empty) line.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors returned by buffer mutations and file I/O.
#[derive(Debug, Error)]
pub enum BufferError {
    /// A line index past the end of the buffer.
    #[error("line {index} out of range ({len} lines)")]
    LineOutOfRange {
        /// Requested index.
        index: usize,
        /// Current line count.
        len: usize,
    },
    /// A column past the end of a line.
    #[error("column {column} out of range on line {line}")]
    ColumnOutOfRange {
        /// Line index.
        line: usize,
        /// Requested column.
        column: usize,
    },
    /// Save requested with no path given and none associated.
    #[error("no file path associated with buffer")]
    NoPath,
    /// Underlying filesystem failure.
    #[error("{}: {source}", path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Cause.
        #[source]
        source: io::Error,
    },
}

/// Number of characters in a string.
#[inline]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset of the character at `column`, or `s.len()` past the end.
#[inline]
pub fn byte_offset(s: &str, column: usize) -> usize {
    s.char_indices().nth(column).map_or(s.len(), |(i, _)| i)
}

/// Line-oriented text storage with a dirty flag and an optional file path.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    lines: Vec<String>,
    file_path: Option<PathBuf>,
    dirty: bool,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuffer {
    /// Create a buffer holding a single empty line.
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            file_path: None,
            dirty: false,
        }
    }

    /// Create a clean buffer from existing lines.
    ///
    /// An empty list yields a single empty line.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }
        Self {
            lines,
            file_path: None,
            dirty: false,
        }
    }

    /// Number of lines (always at least one).
    #[inline]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Index of the last line.
    #[inline]
    pub fn last_line(&self) -> usize {
        self.lines.len().saturating_sub(1)
    }

    /// Text of a line.
    #[inline]
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Length of a line in characters.
    #[inline]
    pub fn line_len(&self, index: usize) -> Option<usize> {
        self.line(index).map(char_len)
    }

    /// Mutable access to a line. Marks the buffer dirty.
    pub fn line_mut(&mut self, index: usize) -> Option<&mut String> {
        let line = self.lines.get_mut(index)?;
        self.dirty = true;
        Some(line)
    }

    /// All lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Characters of a line, for motions that index by column.
    pub fn line_chars(&self, index: usize) -> Vec<char> {
        self.line(index)
            .map(|l| l.chars().collect())
            .unwrap_or_default()
    }

    /// Replace the text of a line.
    pub fn set_line(&mut self, index: usize, text: impl Into<String>) -> Result<(), BufferError> {
        let len = self.lines.len();
        let line = self
            .lines
            .get_mut(index)
            .ok_or(BufferError::LineOutOfRange { index, len })?;
        *line = text.into();
        self.dirty = true;
        Ok(())
    }

    /// Insert a character before `column` (which may equal the line length).
    pub fn insert_char(&mut self, line: usize, column: usize, ch: char) -> Result<(), BufferError> {
        let len = self.lines.len();
        let text = self
            .lines
            .get_mut(line)
            .ok_or(BufferError::LineOutOfRange { index: line, len })?;
        if column > char_len(text) {
            return Err(BufferError::ColumnOutOfRange { line, column });
        }
        let at = byte_offset(text, column);
        text.insert(at, ch);
        self.dirty = true;
        Ok(())
    }

    /// Delete the character before `column`.
    pub fn delete_char(&mut self, line: usize, column: usize) -> Result<(), BufferError> {
        let len = self.lines.len();
        let text = self
            .lines
            .get_mut(line)
            .ok_or(BufferError::LineOutOfRange { index: line, len })?;
        if column == 0 || column > char_len(text) {
            return Err(BufferError::ColumnOutOfRange { line, column });
        }
        let at = byte_offset(text, column - 1);
        text.remove(at);
        self.dirty = true;
        Ok(())
    }

    /// Insert a new line at `index` (which may equal the line count).
    pub fn insert_line(&mut self, index: usize, text: impl Into<String>) -> Result<(), BufferError> {
        if index > self.lines.len() {
            return Err(BufferError::LineOutOfRange {
                index,
                len: self.lines.len(),
            });
        }
        self.lines.insert(index, text.into());
        self.dirty = true;
        Ok(())
    }

    /// Delete the line at `index`.
    ///
    /// Deleting the only line leaves a single empty line behind.
    pub fn delete_line(&mut self, index: usize) -> Result<(), BufferError> {
        if index >= self.lines.len() {
            return Err(BufferError::LineOutOfRange {
                index,
                len: self.lines.len(),
            });
        }
        self.lines.remove(index);
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.dirty = true;
        Ok(())
    }

    /// Whether the buffer has unsaved changes.
    #[inline]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Flag the buffer as modified.
    #[inline]
    pub const fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Path the buffer is associated with.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Associate the buffer with a path without touching the disk.
    pub fn set_file_path(&mut self, path: impl Into<PathBuf>) {
        self.file_path = Some(path.into());
    }

    /// Replace the contents with a file's lines.
    ///
    /// A trailing `\r` on each line is stripped. On failure the buffer is
    /// left untouched.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<(), BufferError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| BufferError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut lines: Vec<String> = text
            .lines()
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect();
        if lines.is_empty() {
            lines.push(String::new());
        }

        self.lines = lines;
        self.file_path = Some(path.to_path_buf());
        self.dirty = false;
        tracing::info!(path = %path.display(), lines = self.lines.len(), "loaded file");
        Ok(())
    }

    /// Write the buffer to `path`, or to its associated path when `None`.
    ///
    /// Lines are joined with `\n` and no trailing newline is written. On
    /// success the path becomes the buffer's path and the dirty flag clears.
    pub fn save_to_file(&mut self, path: Option<&Path>) -> Result<(), BufferError> {
        let target = match path {
            Some(p) => p.to_path_buf(),
            None => self.file_path.clone().ok_or(BufferError::NoPath)?,
        };

        fs::write(&target, self.lines.join("\n")).map_err(|source| BufferError::Io {
            path: target.clone(),
            source,
        })?;

        tracing::info!(path = %target.display(), lines = self.lines.len(), "wrote file");
        self.file_path = Some(target);
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_buffer_has_one_empty_line() {
        let buffer = TextBuffer::new();
        assert_eq!(buffer.line_count(), 1);
        assert_eq!(buffer.line(0), Some(""));
        assert_eq!(buffer.line(1), None);
        assert!(!buffer.is_dirty());
    }

    #[test]
    fn test_insert_and_delete_char() {
        let mut buffer = TextBuffer::from_lines(["hllo"]);
        buffer.insert_char(0, 1, 'e').unwrap();
        assert_eq!(buffer.line(0), Some("hello"));
        assert!(buffer.is_dirty());

        buffer.delete_char(0, 5).unwrap();
        assert_eq!(buffer.line(0), Some("hell"));

        assert!(matches!(
            buffer.delete_char(0, 0),
            Err(BufferError::ColumnOutOfRange { .. })
        ));
        assert!(matches!(
            buffer.insert_char(0, 9, 'x'),
            Err(BufferError::ColumnOutOfRange { .. })
        ));
        assert!(matches!(
            buffer.insert_char(3, 0, 'x'),
            Err(BufferError::LineOutOfRange { index: 3, len: 1 })
        ));
    }

    #[test]
    fn test_columns_are_characters() {
        let mut buffer = TextBuffer::from_lines(["héllo"]);
        assert_eq!(buffer.line_len(0), Some(5));
        buffer.insert_char(0, 2, 'X').unwrap();
        assert_eq!(buffer.line(0), Some("héXllo"));
        buffer.delete_char(0, 2).unwrap();
        assert_eq!(buffer.line(0), Some("hXllo"));
    }

    #[test]
    fn test_delete_last_line_keeps_one() {
        let mut buffer = TextBuffer::from_lines(["only"]);
        buffer.delete_line(0).unwrap();
        assert_eq!(buffer.lines(), &[String::new()]);
        assert!(buffer.delete_line(4).is_err());
    }

    #[test]
    fn test_insert_line_bounds() {
        let mut buffer = TextBuffer::from_lines(["a", "c"]);
        buffer.insert_line(1, "b").unwrap();
        buffer.insert_line(3, "d").unwrap();
        assert_eq!(buffer.lines(), &["a", "b", "c", "d"]);
        assert!(buffer.insert_line(9, "z").is_err());
    }

    #[test]
    fn test_load_and_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "one\r\ntwo\nthree\n").unwrap();

        let mut buffer = TextBuffer::new();
        buffer.load_from_file(&path).unwrap();
        assert_eq!(buffer.lines(), &["one", "two", "three"]);
        assert_eq!(buffer.file_path(), Some(path.as_path()));
        assert!(!buffer.is_dirty());

        buffer.set_line(1, "TWO").unwrap();
        assert!(buffer.is_dirty());
        buffer.save_to_file(None).unwrap();
        assert!(!buffer.is_dirty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "one\nTWO\nthree");
    }

    #[test]
    fn test_load_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut buffer = TextBuffer::from_lines(["stale"]);
        buffer.load_from_file(file.path()).unwrap();
        assert_eq!(buffer.lines(), &[String::new()]);
    }

    #[test]
    fn test_load_missing_file_leaves_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let mut buffer = TextBuffer::from_lines(["keep"]);
        let err = buffer.load_from_file(dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, BufferError::Io { .. }));
        assert_eq!(buffer.lines(), &["keep"]);
    }

    #[test]
    fn test_save_without_path() {
        let mut buffer = TextBuffer::new();
        assert!(matches!(buffer.save_to_file(None), Err(BufferError::NoPath)));
    }
}

//! Range and insert-mode edits on the buffer.

use crate::editor::{byte_offset, BufferError, EditorState, Position, TextBuffer};

/// Order two positions and clamp both into the buffer.
fn normalize(buffer: &TextBuffer, a: Position, b: Position) -> (Position, Position) {
    let (start, end) = if a <= b { (a, b) } else { (b, a) };
    let clamp = |p: Position| {
        let line = p.line.min(buffer.last_line());
        let len = buffer.line_len(line).unwrap_or(0);
        Position::new(line, p.column.min(len))
    };
    (clamp(start), clamp(end))
}

/// Text between two positions, end exclusive, one entry per line touched.
///
/// Returns `None` when the range is empty.
pub fn copy_char_range(buffer: &TextBuffer, a: Position, b: Position) -> Option<Vec<String>> {
    let (start, end) = normalize(buffer, a, b);
    if start == end {
        return None;
    }

    let slice = |line: usize, from: usize, to: Option<usize>| -> String {
        let chars = buffer.line(line).unwrap_or("").chars().skip(from);
        match to {
            Some(to) => chars.take(to.saturating_sub(from)).collect(),
            None => chars.collect(),
        }
    };

    if start.line == end.line {
        return Some(vec![slice(start.line, start.column, Some(end.column))]);
    }

    let mut out = Vec::with_capacity(end.line - start.line + 1);
    out.push(slice(start.line, start.column, None));
    for line in start.line + 1..end.line {
        out.push(buffer.line(line).unwrap_or("").to_string());
    }
    out.push(slice(end.line, 0, Some(end.column)));
    Some(out)
}

/// Remove the text between two positions, end exclusive.
///
/// Across lines the start line keeps its prefix and takes the end line's
/// suffix. Returns `false` when the range is empty.
pub fn delete_char_range(buffer: &mut TextBuffer, a: Position, b: Position) -> bool {
    let (start, end) = normalize(buffer, a, b);
    if start == end {
        return false;
    }

    let head = buffer.line(start.line).unwrap_or("");
    let head = &head[..byte_offset(head, start.column)];
    let tail = buffer.line(end.line).unwrap_or("");
    let tail = &tail[byte_offset(tail, end.column)..];
    let joined = format!("{head}{tail}");

    if buffer.set_line(start.line, joined).is_err() {
        return false;
    }
    for _ in start.line..end.line {
        if buffer.delete_line(start.line + 1).is_err() {
            return false;
        }
    }
    true
}

/// Copy up to `count` whole lines starting at `start`.
pub fn copy_lines(buffer: &TextBuffer, start: usize, count: usize) -> Option<Vec<String>> {
    if count == 0 || start >= buffer.line_count() {
        return None;
    }
    let end = start.saturating_add(count).min(buffer.line_count());
    Some(buffer.lines()[start..end].to_vec())
}

/// Delete up to `count` whole lines starting at `start`.
///
/// # Returns
///
/// Number of lines removed. The buffer never drops below one line.
pub fn delete_lines(buffer: &mut TextBuffer, start: usize, count: usize) -> usize {
    if start >= buffer.line_count() {
        return 0;
    }
    let available = buffer.line_count() - start;
    let mut deleted = 0;
    for _ in 0..count.min(available) {
        if buffer.delete_line(start).is_err() {
            break;
        }
        deleted += 1;
    }
    deleted
}

/// Insert a character at the cursor and step past it.
pub fn insert_char(state: &mut EditorState, ch: char) -> Result<(), BufferError> {
    let cursor = state.cursor();
    state.buffer_mut().insert_char(cursor.line, cursor.column, ch)?;
    state.set_cursor(cursor.line, cursor.column + 1);
    Ok(())
}

/// Split the cursor line at the cursor; the cursor moves to the new line.
pub fn split_line(state: &mut EditorState) -> Result<(), BufferError> {
    let cursor = state.cursor();
    let buffer = state.buffer_mut();
    let len = buffer.line_count();
    let text = buffer
        .line_mut(cursor.line)
        .ok_or(BufferError::LineOutOfRange {
            index: cursor.line,
            len,
        })?;
    let tail = text.split_off(byte_offset(text, cursor.column));
    buffer.insert_line(cursor.line + 1, tail)?;
    state.set_cursor(cursor.line + 1, 0);
    Ok(())
}

/// Open an empty line below the cursor line and move onto it.
pub fn open_line_below(state: &mut EditorState) -> Result<(), BufferError> {
    let line = state.cursor().line + 1;
    state.buffer_mut().insert_line(line, "")?;
    state.set_cursor(line, 0);
    Ok(())
}

/// Open an empty line above the cursor line and move onto it.
pub fn open_line_above(state: &mut EditorState) -> Result<(), BufferError> {
    let line = state.cursor().line;
    state.buffer_mut().insert_line(line, "")?;
    state.set_cursor(line, 0);
    Ok(())
}

/// Delete before the cursor, joining with the previous line at column 0.
///
/// Does nothing at the start of the buffer.
pub fn backspace(state: &mut EditorState) -> Result<(), BufferError> {
    let Position { line, column } = state.cursor();
    if column > 0 {
        state.buffer_mut().delete_char(line, column)?;
        state.set_cursor(line, column - 1);
        return Ok(());
    }
    if line == 0 {
        return Ok(());
    }

    let buffer = state.buffer_mut();
    let current = buffer.line(line).unwrap_or("").to_string();
    let joined_at = buffer.line_len(line - 1).unwrap_or(0);
    buffer.delete_line(line)?;
    if let Some(previous) = buffer.line_mut(line - 1) {
        previous.push_str(&current);
    }
    state.set_cursor(line - 1, joined_at);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn buf(lines: &[&str]) -> TextBuffer {
        TextBuffer::from_lines(lines.iter().copied())
    }

    fn p(line: usize, column: usize) -> Position {
        Position::new(line, column)
    }

    #[test]
    fn test_delete_range_single_line() {
        let mut b = buf(&["hello world"]);
        assert!(delete_char_range(&mut b, p(0, 0), p(0, 6)));
        assert_eq!(b.lines(), &["world"]);
        assert!(!delete_char_range(&mut b, p(0, 2), p(0, 2)));
    }

    #[test]
    fn test_delete_range_splices_lines() {
        let mut b = buf(&["abc", "middle", "xyz"]);
        assert!(delete_char_range(&mut b, p(2, 1), p(0, 2)));
        assert_eq!(b.lines(), &["abyz"]);
    }

    #[test]
    fn test_delete_range_clamps_columns() {
        let mut b = buf(&["héllo", "x"]);
        assert!(delete_char_range(&mut b, p(0, 1), p(0, 99)));
        assert_eq!(b.lines(), &["h", "x"]);
    }

    #[test]
    fn test_copy_range() {
        let b = buf(&["abc", "def", "ghi"]);
        assert_eq!(copy_char_range(&b, p(0, 1), p(0, 3)), Some(vec!["bc".to_string()]));
        assert_eq!(
            copy_char_range(&b, p(0, 2), p(2, 1)),
            Some(vec!["c".to_string(), "def".to_string(), "g".to_string()])
        );
        assert_eq!(copy_char_range(&b, p(1, 1), p(1, 1)), None);
    }

    #[test]
    fn test_line_ranges() {
        let mut b = buf(&["a", "b", "c"]);
        assert_eq!(copy_lines(&b, 1, 5), Some(vec!["b".to_string(), "c".to_string()]));
        assert_eq!(copy_lines(&b, 3, 1), None);
        assert_eq!(delete_lines(&mut b, 1, 5), 2);
        assert_eq!(b.lines(), &["a"]);
        assert_eq!(delete_lines(&mut b, 0, 3), 1);
        assert_eq!(b.lines(), &[""]);
        assert_eq!(delete_lines(&mut b, 4, 1), 0);
    }

    #[test]
    fn test_split_and_backspace_merge() {
        let mut state = EditorState::new(buf(&["hello"]));
        state.set_cursor(0, 2);
        split_line(&mut state).unwrap();
        assert_eq!(state.buffer().lines(), &["he", "llo"]);
        assert_eq!(state.cursor(), p(1, 0));

        backspace(&mut state).unwrap();
        assert_eq!(state.buffer().lines(), &["hello"]);
        assert_eq!(state.cursor(), p(0, 2));

        backspace(&mut state).unwrap();
        assert_eq!(state.buffer().lines(), &["hllo"]);
        assert_eq!(state.cursor(), p(0, 1));
    }

    #[test]
    fn test_backspace_at_buffer_start_is_noop() {
        let mut state = EditorState::new(buf(&["abc"]));
        backspace(&mut state).unwrap();
        assert_eq!(state.buffer().lines(), &["abc"]);
        assert!(!state.buffer().is_dirty());
    }

    #[test]
    fn test_open_lines() {
        let mut state = EditorState::new(buf(&["one", "two"]));
        open_line_below(&mut state).unwrap();
        assert_eq!(state.buffer().lines(), &["one", "", "two"]);
        assert_eq!(state.cursor(), p(1, 0));
        open_line_above(&mut state).unwrap();
        assert_eq!(state.buffer().lines(), &["one", "", "", "two"]);
        assert_eq!(state.cursor(), p(1, 0));
    }

    #[test]
    fn test_insert_char_advances() {
        let mut state = EditorState::default();
        insert_char(&mut state, 'h').unwrap();
        insert_char(&mut state, 'i').unwrap();
        assert_eq!(state.buffer().lines(), &["hi"]);
        assert_eq!(state.cursor(), p(0, 2));
    }
}

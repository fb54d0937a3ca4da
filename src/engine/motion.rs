//! Cursor motions over a [`TextBuffer`]: words, paragraphs, in-line finds.
//!
//! All functions are pure. Forward motions that run off the end of the
//! buffer land on `(last_line, len)`; motions that cannot move at all
//! return their input.

use super::pending::FindSpec;
use crate::editor::{Position, TextBuffer};

/// Word-motion flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordMotion {
    /// `w` / `W`
    NextStart,
    /// `b` / `B`
    PreviousStart,
    /// `e` / `E`
    End,
}

impl WordMotion {
    /// Whether the motion moves toward the start of the buffer.
    pub const fn is_backward(self) -> bool {
        matches!(self, Self::PreviousStart)
    }
}

/// Keyword characters: alphanumerics and `_`.
#[inline]
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Blank,
    Word,
    Punct,
}

fn class_of(c: char, big: bool) -> CharClass {
    if c.is_whitespace() {
        CharClass::Blank
    } else if big || is_word_char(c) {
        CharClass::Word
    } else {
        CharClass::Punct
    }
}

/// Walks the buffer one character at a time, treating each line end as a
/// position of its own.
struct Scanner<'a> {
    buffer: &'a TextBuffer,
    line: usize,
    col: usize,
    chars: Vec<char>,
}

impl<'a> Scanner<'a> {
    fn new(buffer: &'a TextBuffer, pos: Position) -> Self {
        let line = pos.line.min(buffer.last_line());
        let chars = buffer.line_chars(line);
        let col = pos.column.min(chars.len());
        Self {
            buffer,
            line,
            col,
            chars,
        }
    }

    const fn pos(&self) -> Position {
        Position::new(self.line, self.col)
    }

    /// Character under the scanner; `None` at a line end.
    fn current(&self) -> Option<char> {
        self.chars.get(self.col).copied()
    }

    fn on_empty_line(&self) -> bool {
        self.chars.is_empty()
    }

    fn load(&mut self, line: usize) {
        self.line = line;
        self.chars = self.buffer.line_chars(line);
    }

    fn advance(&mut self) -> bool {
        if self.col < self.chars.len() {
            self.col += 1;
            true
        } else if self.line < self.buffer.last_line() {
            self.load(self.line + 1);
            self.col = 0;
            true
        } else {
            false
        }
    }

    fn retreat(&mut self) -> bool {
        if self.col > 0 {
            self.col -= 1;
            true
        } else if self.line > 0 {
            self.load(self.line - 1);
            self.col = self.chars.len();
            true
        } else {
            false
        }
    }
}

/// Start of the next word (`w`) or WORD (`W`).
///
/// Leaves the current run, skips whitespace across lines and stops on the
/// next run or on an empty line.
pub fn next_word_start(buffer: &TextBuffer, pos: Position, big: bool) -> Position {
    let mut s = Scanner::new(buffer, pos);
    let start = s.pos();

    if let Some(c) = s.current() {
        let class = class_of(c, big);
        if class != CharClass::Blank {
            while s.current().is_some_and(|c| class_of(c, big) == class) {
                s.advance();
            }
        }
    }

    loop {
        match s.current() {
            Some(c) if !c.is_whitespace() => return s.pos(),
            None if s.on_empty_line() && s.pos() != start => return s.pos(),
            _ => {
                if !s.advance() {
                    return s.pos();
                }
            }
        }
    }
}

/// Start of the current or previous word (`b`) or WORD (`B`).
pub fn previous_word_start(buffer: &TextBuffer, pos: Position, big: bool) -> Position {
    let mut s = Scanner::new(buffer, pos);
    if !s.retreat() {
        return s.pos();
    }

    loop {
        match s.current() {
            Some(c) if !c.is_whitespace() => break,
            None if s.on_empty_line() => return s.pos(),
            _ => {
                if !s.retreat() {
                    return s.pos();
                }
            }
        }
    }

    let Some(c) = s.current() else {
        return s.pos();
    };
    let class = class_of(c, big);
    while s.col > 0 && class_of(s.chars[s.col - 1], big) == class {
        s.col -= 1;
    }
    s.pos()
}

/// Last character of the current or next word (`e`) or WORD (`E`).
///
/// Always advances at least one character first, so repeated calls walk
/// from word end to word end. Returns `pos` unchanged when no word follows.
pub fn word_end(buffer: &TextBuffer, pos: Position, big: bool) -> Position {
    let mut s = Scanner::new(buffer, pos);
    let start = s.pos();
    if !s.advance() {
        return start;
    }

    loop {
        match s.current() {
            Some(c) if !c.is_whitespace() => break,
            _ => {
                if !s.advance() {
                    return start;
                }
            }
        }
    }

    let Some(c) = s.current() else {
        return start;
    };
    let class = class_of(c, big);
    while s
        .chars
        .get(s.col + 1)
        .is_some_and(|&next| class_of(next, big) == class)
    {
        s.col += 1;
    }
    s.pos()
}

/// One step of a word motion.
pub fn word_motion(buffer: &TextBuffer, pos: Position, motion: WordMotion, big: bool) -> Position {
    match motion {
        WordMotion::NextStart => next_word_start(buffer, pos, big),
        WordMotion::PreviousStart => previous_word_start(buffer, pos, big),
        WordMotion::End => word_end(buffer, pos, big),
    }
}

/// Apply a word motion up to `count` times, stopping early when a step
/// makes no progress.
///
/// # Returns
///
/// The final position and the number of steps that moved.
pub fn repeat_word_motion(
    buffer: &TextBuffer,
    pos: Position,
    motion: WordMotion,
    big: bool,
    count: usize,
) -> (Position, usize) {
    let mut current = pos;
    let mut completed = 0;
    for _ in 0..count {
        let next = word_motion(buffer, current, motion, big);
        if next == current {
            break;
        }
        current = next;
        completed += 1;
    }
    (current, completed)
}

/// Whether a line is empty or whitespace only. Missing lines count as blank.
pub fn is_blank_line(buffer: &TextBuffer, line: usize) -> bool {
    buffer
        .line(line)
        .is_none_or(|text| text.chars().all(char::is_whitespace))
}

/// Column of the first non-whitespace character, or 0 for blank lines.
pub fn first_non_blank(buffer: &TextBuffer, line: usize) -> usize {
    buffer
        .line(line)
        .and_then(|text| text.chars().position(|c| !c.is_whitespace()))
        .unwrap_or(0)
}

/// Position just past the last character of a line.
pub fn line_end(buffer: &TextBuffer, line: usize) -> Position {
    Position::new(line, buffer.line_len(line).unwrap_or(0))
}

fn buffer_end(buffer: &TextBuffer) -> Position {
    line_end(buffer, buffer.last_line())
}

/// `}`: the `count`-th blank line below that follows a block of text, or the
/// end of the buffer.
pub fn next_paragraph(buffer: &TextBuffer, pos: Position, count: usize) -> Position {
    let total = buffer.line_count();
    let mut line = pos.line;
    for _ in 0..count {
        let mut probe = line;
        while probe < total && is_blank_line(buffer, probe) {
            probe += 1;
        }
        while probe < total && !is_blank_line(buffer, probe) {
            probe += 1;
        }
        if probe >= total {
            return buffer_end(buffer);
        }
        line = probe;
    }
    Position::new(line, 0)
}

/// `{`: the `count`-th blank line above that precedes a block of text, or
/// the start of the buffer.
pub fn previous_paragraph(buffer: &TextBuffer, pos: Position, count: usize) -> Position {
    let mut line = pos.line.min(buffer.last_line());
    for _ in 0..count {
        let mut probe = Some(line);
        while let Some(l) = probe.filter(|&l| is_blank_line(buffer, l)) {
            probe = l.checked_sub(1);
        }
        while let Some(l) = probe.filter(|&l| !is_blank_line(buffer, l)) {
            probe = l.checked_sub(1);
        }
        match probe {
            Some(l) => line = l,
            None => return Position::default(),
        }
    }
    Position::new(line, 0)
}

/// Column a find motion lands on within `chars`, starting from `column`.
///
/// Searches strictly after (or before) the cursor, the `count`-th
/// occurrence, without wrapping. Till finds land one cell short of the
/// match. A landing on the starting column counts as not found.
pub fn find_in_line(
    chars: &[char],
    column: usize,
    target: char,
    find: FindSpec,
    count: usize,
) -> Option<usize> {
    let len = chars.len();
    if len == 0 {
        return None;
    }
    let start = column.min(len - 1);
    let mut probe = start;

    for _ in 0..count.max(1) {
        probe = if find.backward {
            (0..probe).rev().find(|&i| chars[i] == target)?
        } else {
            (probe + 1..len).find(|&i| chars[i] == target)?
        };
    }

    let landing = match (find.till, find.backward) {
        (false, _) => probe,
        (true, false) => probe.checked_sub(1)?,
        (true, true) => (probe + 1).min(len),
    };
    (landing != start).then_some(landing)
}

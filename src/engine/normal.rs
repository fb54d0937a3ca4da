//! Normal-mode grammar: counts, operators, motions, finds.

use super::bindings::{self, signed};
use super::edit;
use super::motion::{
    find_in_line, first_non_blank, line_end, next_paragraph, previous_paragraph,
    repeat_word_motion, WordMotion,
};
use super::pending::{FindSpec, LastFind, Operator, PendingCommand};
use super::ModeEngine;
use crate::actor::{KeyCode, KeyEvent};
use crate::editor::{EditorState, Mode, Position, StatusSeverity};

/// `1 word`, `3 words`.
fn counted(n: usize, unit: &str) -> String {
    if n == 1 {
        format!("{n} {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

fn line_message(op: Operator, n: usize) -> String {
    match op {
        Operator::Yank if n == 1 => "Yanked line".to_string(),
        _ => format!("{} {}", op.past_tense(), counted(n, "line")),
    }
}

/// ` (n)` when a count above one was used.
fn count_suffix(count: usize) -> String {
    if count > 1 {
        format!(" ({count})")
    } else {
        String::new()
    }
}

impl ModeEngine {
    pub(super) fn handle_normal(&mut self, state: &mut EditorState, event: KeyEvent) {
        if event.code == KeyCode::Esc {
            self.pending.clear();
            state.clear_status();
            return;
        }

        if event.is_arrow() && self.pending.has_command() {
            self.pending_arrow(state, event.code);
            return;
        }

        if let Some(c) = event.as_char() {
            if c == '0' && !self.pending.has_count() && self.line_start_motion(state) {
                return;
            }
            if let Some(digit) = c.to_digit(10) {
                self.pending.push_digit(digit);
                state.set_status(self.pending.status_text(), StatusSeverity::Info);
                return;
            }
        }

        if !self.pending.has_command() && self.try_binding(state, event) {
            return;
        }

        let c = match event.code {
            KeyCode::Char(c) => c,
            code if event.is_arrow() => {
                let count = self.pending.take_count(1);
                self.pending.clear();
                move_by_arrow(state, code, count);
                state.clear_status();
                return;
            }
            _ => {
                self.pending.clear();
                state.clear_status();
                return;
            }
        };

        match self.pending.command() {
            PendingCommand::None => self.start_command(state, c),
            PendingCommand::Operator(op) => self.operator_motion(state, op, c),
            PendingCommand::Goto => self.goto(state, c),
            PendingCommand::Find { find, operator } => {
                let count = self.pending.take_count(1);
                self.pending.clear();
                self.run_find(state, find, operator, c, count, true);
            }
        }
    }

    fn show_pending(&self, state: &mut EditorState) {
        state.set_status(self.pending.status_text(), StatusSeverity::Info);
    }

    /// `0` as a motion. Returns `false` when it should count as a digit.
    fn line_start_motion(&mut self, state: &mut EditorState) -> bool {
        match self.pending.command() {
            PendingCommand::None => {
                self.pending.clear();
                state.set_cursor(state.cursor().line, 0);
                state.clear_status();
                true
            }
            PendingCommand::Operator(op) => {
                self.pending.clear();
                let cursor = state.cursor();
                if cursor.column == 0 {
                    let message = match op {
                        Operator::Delete => "Already at line start",
                        Operator::Yank => op.nothing_message(),
                    };
                    state.set_status(message, StatusSeverity::Warning);
                } else if self.apply_operator(state, op, Position::new(cursor.line, 0), cursor) {
                    let message = format!("{} to line start", op.past_tense());
                    state.set_status(message, StatusSeverity::Info);
                } else {
                    state.set_status(failed(op), StatusSeverity::Warning);
                }
                true
            }
            PendingCommand::Goto | PendingCommand::Find { .. } => false,
        }
    }

    fn pending_arrow(&mut self, state: &mut EditorState, code: KeyCode) {
        let command = self.pending.command();
        match (command, code) {
            (PendingCommand::Operator(Operator::Delete), KeyCode::Down) => {
                self.linewise_span(state, Operator::Delete, true);
            }
            (PendingCommand::Operator(Operator::Delete), KeyCode::Up) => {
                self.linewise_span(state, Operator::Delete, false);
            }
            _ => {
                let count = self.pending.take_count(1);
                self.pending.clear();
                move_by_arrow(state, code, count);
                state.clear_status();
            }
        }
    }

    fn start_command(&mut self, state: &mut EditorState, c: char) {
        if let Some(handler) = bindings::fallback(c) {
            let count = self.pending.take_count(1);
            self.pending.clear();
            bindings::run(handler, state, count);
            return;
        }

        match c {
            ':' => {
                self.pending.clear();
                self.command_line.clear();
                state.set_mode(Mode::CommandLine);
                state.set_status(Mode::CommandLine.label(), StatusSeverity::Info);
            }
            'x' => {
                let count = self.pending.take_count(1);
                self.pending.clear();
                let start = state.cursor();
                let end = Position::new(start.line, start.column.saturating_add(count));
                if edit::delete_char_range(state.buffer_mut(), start, end) {
                    state.set_position(start);
                    state.set_status("Deleted characters", StatusSeverity::Info);
                } else {
                    state.set_status("Delete failed", StatusSeverity::Warning);
                }
            }
            'G' => {
                let lines = state.buffer().line_count();
                let target = self
                    .pending
                    .take_explicit_count()
                    .map_or(lines, |n| n.clamp(1, lines));
                self.pending.clear();
                state.set_cursor(target - 1, 0);
                state.clear_status();
            }
            '$' => {
                let count = self.pending.take_count(1);
                self.pending.clear();
                let line = state.cursor().line.saturating_add(count.saturating_sub(1));
                let line = line.min(state.buffer().last_line());
                let end = line_end(state.buffer(), line);
                state.set_cursor(line, end.column.saturating_sub(1));
                state.clear_status();
            }
            '{' | '}' => {
                let count = self.pending.take_count(1);
                self.pending.clear();
                let cursor = state.cursor();
                let (target, edge) = if c == '}' {
                    (next_paragraph(state.buffer(), cursor, count), "End of buffer")
                } else {
                    (previous_paragraph(state.buffer(), cursor, count), "Start of buffer")
                };
                if target == cursor {
                    state.set_status(edge, StatusSeverity::Warning);
                } else {
                    state.set_position(target);
                    state.clear_status();
                }
            }
            'w' | 'W' | 'b' | 'B' | 'e' | 'E' => {
                let count = self.pending.take_count(1);
                self.pending.clear();
                let (motion, big) = word_motion_for(c);
                let (target, moved) =
                    repeat_word_motion(state.buffer(), state.cursor(), motion, big, count);
                if moved == 0 {
                    let edge = if motion.is_backward() {
                        "Start of buffer"
                    } else {
                        "End of buffer"
                    };
                    state.set_status(edge, StatusSeverity::Warning);
                } else {
                    state.set_position(target);
                    state.clear_status();
                }
            }
            'f' | 'F' | 't' | 'T' => {
                if let Some(find) = FindSpec::from_key(c) {
                    self.pending.set_command(PendingCommand::Find {
                        find,
                        operator: None,
                    });
                    self.show_pending(state);
                }
            }
            ';' | ',' => self.repeat_find(state, c == ',', None),
            'd' => {
                self.pending
                    .set_command(PendingCommand::Operator(Operator::Delete));
                self.show_pending(state);
            }
            'y' => {
                self.pending
                    .set_command(PendingCommand::Operator(Operator::Yank));
                self.show_pending(state);
            }
            'g' => {
                self.pending.set_command(PendingCommand::Goto);
                self.show_pending(state);
            }
            'p' | 'P' => {
                self.pending.clear();
                match self.register.paste(state, c == 'P') {
                    Ok(()) => state.clear_status(),
                    Err(err) => state.set_status(err.to_string(), StatusSeverity::Warning),
                }
            }
            'u' => {
                self.pending.clear();
                state.set_status("Nothing to undo", StatusSeverity::Warning);
            }
            'r' => {
                self.pending.clear();
                state.set_status("Nothing to redo", StatusSeverity::Warning);
            }
            _ => {
                self.pending.clear();
                state.set_status("Not mapped in normal mode", StatusSeverity::Warning);
            }
        }
    }

    fn goto(&mut self, state: &mut EditorState, c: char) {
        self.pending.clear();
        if c == 'g' {
            state.set_cursor(0, 0);
            state.clear_status();
        } else {
            state.set_status("Unknown command", StatusSeverity::Warning);
        }
    }

    fn operator_motion(&mut self, state: &mut EditorState, op: Operator, c: char) {
        match c {
            _ if c == op.key() => self.whole_lines(state, op),
            'j' => self.linewise_span(state, op, true),
            'k' => self.linewise_span(state, op, false),
            'w' | 'W' | 'b' | 'B' | 'e' | 'E' => self.word_operator(state, op, c),
            '$' => {
                let count = self.pending.take_count(1);
                self.pending.clear();
                let cursor = state.cursor();
                let line = cursor
                    .line
                    .saturating_add(count.saturating_sub(1))
                    .min(state.buffer().last_line());
                let end = line_end(state.buffer(), line);
                if self.apply_operator(state, op, cursor, end) {
                    let spanned = line - cursor.line + 1;
                    let suffix = if spanned > 1 {
                        format!(" ({spanned} lines)")
                    } else {
                        String::new()
                    };
                    let message = format!("{} to line end{suffix}", op.past_tense());
                    state.set_status(message, StatusSeverity::Info);
                } else {
                    state.set_status(op.nothing_message(), StatusSeverity::Warning);
                }
            }
            '{' | '}' => {
                let count = self.pending.take_count(1);
                self.pending.clear();
                let cursor = state.cursor();
                let (target, none) = if c == '}' {
                    (next_paragraph(state.buffer(), cursor, count), "No paragraph ahead")
                } else {
                    (previous_paragraph(state.buffer(), cursor, count), "No paragraph before")
                };
                if target == cursor {
                    state.set_status(none, StatusSeverity::Warning);
                } else if self.apply_operator(state, op, cursor, target) {
                    let message =
                        format!("{} to paragraph{}", op.past_tense(), count_suffix(count));
                    state.set_status(message, StatusSeverity::Info);
                } else {
                    state.set_status(op.nothing_message(), StatusSeverity::Warning);
                }
            }
            'f' | 'F' | 't' | 'T' => {
                if let Some(find) = FindSpec::from_key(c) {
                    self.pending.set_command(PendingCommand::Find {
                        find,
                        operator: Some(op),
                    });
                    self.show_pending(state);
                }
            }
            ';' | ',' => self.repeat_find(state, c == ',', Some(op)),
            _ => {
                self.pending.clear();
                let message = format!("{} command requires motion", op.key());
                state.set_status(message, StatusSeverity::Warning);
            }
        }
    }

    /// `dd`, `yy`.
    fn whole_lines(&mut self, state: &mut EditorState, op: Operator) {
        let count = self.pending.take_count(1);
        self.pending.clear();
        let line = state.cursor().line;
        self.line_operator(state, op, line, count);
    }

    /// `dj`, `dk`, `d<Down>`, `d<Up>`: the cursor line plus neighbours,
    /// two lines unless a count says otherwise.
    fn linewise_span(&mut self, state: &mut EditorState, op: Operator, down: bool) {
        let count = self.pending.take_count(2).max(1);
        self.pending.clear();
        let line = state.cursor().line;
        if down {
            self.line_operator(state, op, line, count);
        } else {
            let start = (line + 1).saturating_sub(count);
            if self.line_operator(state, op, start, line - start + 1) {
                state.set_cursor(start, 0);
            }
        }
    }

    fn line_operator(
        &mut self,
        state: &mut EditorState,
        op: Operator,
        start: usize,
        count: usize,
    ) -> bool {
        let Some(lines) = edit::copy_lines(state.buffer(), start, count) else {
            state.set_status(failed(op), StatusSeverity::Warning);
            return false;
        };
        let n = match op {
            Operator::Delete => edit::delete_lines(state.buffer_mut(), start, count),
            Operator::Yank => lines.len(),
        };
        if n == 0 {
            state.set_status(failed(op), StatusSeverity::Warning);
            return false;
        }
        self.register.set_linewise(lines);
        state.clamp_cursor();
        state.set_status(line_message(op, n), StatusSeverity::Info);
        true
    }

    fn word_operator(&mut self, state: &mut EditorState, op: Operator, c: char) {
        let count = self.pending.take_count(1);
        self.pending.clear();
        let (motion, big) = word_motion_for(c);
        let unit = if big { "WORD" } else { "word" };
        let start = state.cursor();
        let (target, moved) = repeat_word_motion(state.buffer(), start, motion, big, count);
        if moved == 0 {
            let direction = if motion.is_backward() { "before" } else { "ahead" };
            state.set_status(format!("No {unit} {direction}"), StatusSeverity::Warning);
            return;
        }

        let end = match motion {
            WordMotion::End => Position::new(target.line, target.column + 1),
            WordMotion::NextStart
                if target.line > start.line
                    && target.column <= first_non_blank(state.buffer(), target.line) =>
            {
                line_end(state.buffer(), target.line - 1)
            }
            _ => target,
        };

        if self.apply_operator(state, op, start, end) {
            let message = format!("{} {}", op.past_tense(), counted(moved, unit));
            state.set_status(message, StatusSeverity::Info);
        } else {
            state.set_status(op.nothing_message(), StatusSeverity::Warning);
        }
    }

    /// Delete or yank `[a, b)` charwise. The cursor lands on the start of
    /// the range. Returns `false` for an empty range.
    fn apply_operator(
        &mut self,
        state: &mut EditorState,
        op: Operator,
        a: Position,
        b: Position,
    ) -> bool {
        let Some(fragments) = edit::copy_char_range(state.buffer(), a, b) else {
            return false;
        };
        if op == Operator::Delete && !edit::delete_char_range(state.buffer_mut(), a, b) {
            return false;
        }
        self.register.set_charwise(fragments);
        state.set_position(a.min(b));
        true
    }

    /// `;` and `,`, alone or after an operator. The remembered find is
    /// left as it was.
    fn repeat_find(
        &mut self,
        state: &mut EditorState,
        reverse: bool,
        operator: Option<Operator>,
    ) {
        let count = self.pending.take_count(1);
        self.pending.clear();
        let Some(last) = self.pending.last_find() else {
            state.set_status("No previous find", StatusSeverity::Warning);
            return;
        };
        let find = if reverse { last.find.reversed() } else { last.find };
        self.run_find(state, find, operator, last.target, count, false);
    }

    fn run_find(
        &mut self,
        state: &mut EditorState,
        find: FindSpec,
        operator: Option<Operator>,
        target: char,
        count: usize,
        remember: bool,
    ) {
        let cursor = state.cursor();
        let chars = state.buffer().line_chars(cursor.line);
        let Some(column) = find_in_line(&chars, cursor.column, target, find, count) else {
            state.set_status("Target not found", StatusSeverity::Warning);
            return;
        };

        if let Some(op) = operator {
            let landing = Position::new(cursor.line, column);
            let (a, b) = if find.backward {
                (landing, cursor)
            } else {
                (cursor, Position::new(cursor.line, column + 1))
            };
            if !self.apply_operator(state, op, a, b) {
                state.set_status(failed(op), StatusSeverity::Warning);
                return;
            }
            let message = format!("{} to '{target}'{}", op.past_tense(), count_suffix(count));
            state.set_status(message, StatusSeverity::Info);
        } else {
            state.set_cursor(cursor.line, column);
            state.clear_status();
        }

        if remember {
            self.pending.set_last_find(LastFind { target, find });
        }
    }
}

const fn failed(op: Operator) -> &'static str {
    match op {
        Operator::Delete => "Delete failed",
        Operator::Yank => "Yank failed",
    }
}

const fn word_motion_for(c: char) -> (WordMotion, bool) {
    match c {
        'b' => (WordMotion::PreviousStart, false),
        'B' => (WordMotion::PreviousStart, true),
        'e' => (WordMotion::End, false),
        'E' => (WordMotion::End, true),
        'W' => (WordMotion::NextStart, true),
        _ => (WordMotion::NextStart, false),
    }
}

fn move_by_arrow(state: &mut EditorState, code: KeyCode, count: usize) {
    let delta = signed(count);
    match code {
        KeyCode::Up => state.move_cursor_line(-delta),
        KeyCode::Down => state.move_cursor_line(delta),
        KeyCode::Left => state.move_cursor_column(-delta),
        KeyCode::Right => state.move_cursor_column(delta),
        _ => {}
    }
}

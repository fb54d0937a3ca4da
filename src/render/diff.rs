//! Frame diffing: turn the change between two grids into ANSI output.
//!
//! Changed cells are found by a linear scan. Cursor moves are skipped when
//! the next changed cell is exactly where the previous write left the
//! cursor, and SGR sequences are only emitted when the style differs from
//! what the terminal already has.

use super::cell::{Cell, Modifiers, Rgb, Style};
use super::grid::Grid;
use std::io::Write;

/// What the terminal is believed to have after the last write.
#[derive(Debug, Clone, Default)]
pub struct DiffState {
    cursor_x: u16,
    cursor_y: u16,
    style: Option<Style>,
}

impl DiffState {
    /// Terminal state at the top-left with unknown attributes.
    pub const fn new() -> Self {
        Self {
            cursor_x: 0,
            cursor_y: 0,
            style: None,
        }
    }

    /// Forget everything, forcing the next write to move and restyle.
    pub const fn reset(&mut self) {
        self.style = None;
        self.cursor_x = u16::MAX;
        self.cursor_y = u16::MAX;
    }

    /// Record a cursor move made outside the diff.
    pub const fn set_cursor(&mut self, x: u16, y: u16) {
        self.cursor_x = x;
        self.cursor_y = y;
    }
}

/// Counters from one diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffResult {
    /// Cells rewritten.
    pub cells_changed: usize,
    /// Cursor positioning sequences emitted.
    pub cursor_moves: usize,
    /// SGR sequences emitted.
    pub style_changes: usize,
}

/// Append the sequences that turn `current` into `next` to `output`.
///
/// Both grids must have the same dimensions.
pub fn render_diff(
    current: &Grid,
    next: &Grid,
    output: &mut Vec<u8>,
    state: &mut DiffState,
) -> DiffResult {
    debug_assert_eq!(current.width(), next.width());
    debug_assert_eq!(current.height(), next.height());

    let mut result = DiffResult::default();
    let width = next.width();

    for (y, (old_row, new_row)) in (0u16..).zip(current.rows().zip(next.rows())) {
        for (x, (old, new)) in (0u16..).zip(old_row.iter().zip(new_row)) {
            // Overflow cells compare by index, so compare their text too.
            if old == new && old.overflow_index().is_none() {
                continue;
            }
            if old == new && current.symbol_at(x, y) == next.symbol_at(x, y) {
                continue;
            }
            if new.is_wide_continuation() {
                continue;
            }

            result.cells_changed += 1;
            if state.cursor_x != x || state.cursor_y != y {
                emit_cursor_move(output, x, y);
                state.cursor_x = x;
                state.cursor_y = y;
                result.cursor_moves += 1;
            }
            if state.style != Some(new.style()) {
                emit_style(output, new.style(), state.style);
                state.style = Some(new.style());
                result.style_changes += 1;
            }

            emit_symbol(output, new, next);
            state.cursor_x = state
                .cursor_x
                .saturating_add(u16::from(new.width().max(1)))
                .min(width);
        }
    }

    result
}

/// Redraw a whole grid without reference to what is on screen.
pub fn render_full(grid: &Grid, output: &mut Vec<u8>) {
    output.extend_from_slice(b"\x1b[?25l\x1b[H");

    let mut last: Option<Style> = None;
    for (y, row) in (0u16..).zip(grid.rows()) {
        if y > 0 {
            output.extend_from_slice(b"\r\n");
        }
        for (x, cell) in (0u16..).zip(row) {
            if cell.is_wide_continuation() {
                continue;
            }
            if last != Some(cell.style()) {
                emit_style(output, cell.style(), last);
                last = Some(cell.style());
            }
            match grid.symbol_at(x, y) {
                Some(symbol) => output.extend_from_slice(symbol.as_bytes()),
                None => output.push(b' '),
            }
        }
    }

    output.extend_from_slice(b"\x1b[0m\x1b[?25h");
}

/// Position the cursor, using the short forms for home and column one.
#[inline]
fn emit_cursor_move(output: &mut Vec<u8>, x: u16, y: u16) {
    let row = y + 1;
    let col = x + 1;
    if row == 1 && col == 1 {
        output.extend_from_slice(b"\x1b[H");
    } else if col == 1 {
        let _ = write!(output, "\x1b[{row}H");
    } else {
        let _ = write!(output, "\x1b[{row};{col}H");
    }
}

/// Switch from `old` to `new`.
///
/// Attributes can only be turned off by a full reset, which also drops
/// the colors, so a removal re-emits everything.
fn emit_style(output: &mut Vec<u8>, new: Style, old: Option<Style>) {
    let (old, reset) = match old {
        Some(old) if old.modifiers.difference(new.modifiers).is_empty() => (Some(old), false),
        _ => (None, true),
    };
    if reset {
        output.extend_from_slice(b"\x1b[0m");
    }
    if old.is_none_or(|o| o.fg != new.fg) {
        emit_color(output, 38, new.fg);
    }
    if old.is_none_or(|o| o.bg != new.bg) {
        emit_color(output, 48, new.bg);
    }
    let added = old.map_or(new.modifiers, |o| new.modifiers.difference(o.modifiers));
    emit_modifiers(output, added);
}

#[inline]
fn emit_color(output: &mut Vec<u8>, layer: u8, color: Rgb) {
    let _ = write!(output, "\x1b[{layer};2;{};{};{}m", color.r, color.g, color.b);
}

fn emit_modifiers(output: &mut Vec<u8>, modifiers: Modifiers) {
    const CODES: [(Modifiers, &[u8]); 5] = [
        (Modifiers::BOLD, b"\x1b[1m"),
        (Modifiers::DIM, b"\x1b[2m"),
        (Modifiers::ITALIC, b"\x1b[3m"),
        (Modifiers::UNDERLINE, b"\x1b[4m"),
        (Modifiers::REVERSED, b"\x1b[7m"),
    ];
    for (flag, code) in CODES {
        if modifiers.contains(flag) {
            output.extend_from_slice(code);
        }
    }
}

#[inline]
fn emit_symbol(output: &mut Vec<u8>, cell: &Cell, grid: &Grid) {
    if let Some(symbol) = cell.symbol() {
        output.extend_from_slice(symbol.as_bytes());
        return;
    }
    match cell.overflow_index().and_then(|i| grid.overflow(i)) {
        Some(symbol) => output.extend_from_slice(symbol.as_bytes()),
        None => output.push(b' '),
    }
}

//! Render module: double-buffered terminal output.
//!
//! Each frame is composed into a back [`Grid`], diffed against the grid
//! that was last written, and sent to the terminal in a single write.
//!
//! - [`Renderer`]: owns both grids, the scroll offset and the statistics
//! - [`Grid`] / [`Cell`]: screen storage
//! - [`Theme`]: styles for each part of the screen

mod cell;
pub mod diff;
mod grid;
mod theme;
pub mod view;

pub use cell::{Cell, CellFlags, Modifiers, ParseColorError, Rgb, Style};
pub use diff::{DiffResult, DiffState};
pub use grid::Grid;
pub use theme::Theme;

use crate::editor::EditorState;
use std::io::{self, Write};
use std::time::Instant;

/// Smallest height that still leaves one content row.
const MIN_HEIGHT: u16 = view::INFO_ROWS + 1;

/// Counters kept across frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames rendered.
    pub frames: u64,
    /// Cells rewritten across all frames.
    pub cells_changed: u64,
    /// Bytes written to the terminal.
    pub bytes_written: u64,
    /// Duration of the last frame in microseconds.
    pub last_render_us: u64,
    /// Smoothed frame duration in microseconds.
    pub avg_render_us: u64,
}

/// Terminal renderer writing to `W`.
pub struct Renderer<W: Write> {
    out: W,
    current: Grid,
    next: Grid,
    diff_state: DiffState,
    output: Vec<u8>,
    theme: Theme,
    scroll_offset: usize,
    needs_full_redraw: bool,
    stats: RenderStats,
}

impl<W: Write> Renderer<W> {
    /// Create a renderer for a `width` x `height` terminal.
    pub fn new(out: W, width: u16, height: u16) -> Self {
        let height = height.max(MIN_HEIGHT);
        Self {
            out,
            current: Grid::new(width, height),
            next: Grid::new(width, height),
            diff_state: DiffState::new(),
            output: Vec::with_capacity(16 * 1024),
            theme: Theme::default(),
            scroll_offset: 0,
            needs_full_redraw: true,
            stats: RenderStats::default(),
        }
    }

    /// Replace the theme and schedule a full redraw.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.needs_full_redraw = true;
    }

    /// Current theme.
    pub const fn theme(&self) -> &Theme {
        &self.theme
    }

    /// First buffer line on screen.
    pub const fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Statistics so far.
    pub const fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Grid size as `(width, height)`.
    pub const fn size(&self) -> (u16, u16) {
        (self.next.width(), self.next.height())
    }

    /// Adopt a new terminal size. The next frame is a full redraw.
    pub fn resize(&mut self, width: u16, height: u16) {
        let height = height.max(MIN_HEIGHT);
        if (width, height) == self.size() {
            return;
        }
        self.current.resize(width, height);
        self.next.resize(width, height);
        self.needs_full_redraw = true;
    }

    /// Forget what is on screen; the next frame redraws everything.
    pub fn invalidate(&mut self) {
        self.needs_full_redraw = true;
    }

    /// The underlying writer.
    pub const fn writer(&self) -> &W {
        &self.out
    }

    /// Consume the renderer and return the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Draw one frame.
    ///
    /// `command_line` and `prefix` fill the message row in command-line
    /// mode. Only cells that differ from the previous frame are sent,
    /// followed by the cursor position.
    pub fn render(
        &mut self,
        state: &EditorState,
        command_line: &str,
        prefix: char,
    ) -> io::Result<()> {
        let start = Instant::now();
        self.output.clear();

        let content_rows = usize::from(self.next.height() - view::INFO_ROWS);
        self.scroll_offset = view::scroll_offset(
            self.scroll_offset,
            state.cursor().line,
            state.buffer().line_count(),
            content_rows,
        );
        let (cursor_x, cursor_y) = view::compose(
            &mut self.next,
            &self.theme,
            state,
            self.scroll_offset,
            command_line,
            prefix,
        );

        let cells_changed = if self.needs_full_redraw {
            diff::render_full(&self.next, &mut self.output);
            self.needs_full_redraw = false;
            self.diff_state.reset();
            self.next.cells().len()
        } else {
            diff::render_diff(
                &self.current,
                &self.next,
                &mut self.output,
                &mut self.diff_state,
            )
            .cells_changed
        };

        let _ = write!(
            &mut self.output,
            "\x1b[{};{}H\x1b[?25h",
            cursor_y + 1,
            cursor_x + 1
        );
        self.diff_state.set_cursor(cursor_x, cursor_y);

        self.out.write_all(&self.output)?;
        self.out.flush()?;

        self.current.copy_from(&self.next);

        let elapsed = start.elapsed();
        self.stats.frames += 1;
        self.stats.cells_changed += cells_changed as u64;
        self.stats.bytes_written += self.output.len() as u64;
        self.stats.last_render_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.stats.avg_render_us = if self.stats.avg_render_us == 0 {
            self.stats.last_render_us
        } else {
            (self.stats.avg_render_us * 15 + self.stats.last_render_us) / 16
        };
        tracing::trace!(
            frame = self.stats.frames,
            cells = cells_changed,
            bytes = self.output.len(),
            us = self.stats.last_render_us,
            "frame rendered"
        );

        Ok(())
    }
}

impl<W: Write> std::fmt::Debug for Renderer<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("size", &self.size())
            .field("scroll_offset", &self.scroll_offset)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

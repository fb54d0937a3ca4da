//! Grid: a row-major block of cells the size of the terminal.

use super::cell::{Cell, Style};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Screen-sized cell storage.
///
/// Cells live in one `Vec` indexed `y * width + x`. Grapheme clusters too
/// long to store inline are appended to `overflow`, which is cleared along
/// with the cells at the start of every frame.
#[derive(Clone)]
pub struct Grid {
    cells: Vec<Cell>,
    width: u16,
    height: u16,
    overflow: Vec<String>,
}

impl Grid {
    /// Create a grid of blank cells. Zero dimensions are raised to one.
    pub fn new(width: u16, height: u16) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            cells: vec![Cell::EMPTY; usize::from(width) * usize::from(height)],
            width,
            height,
            overflow: Vec::new(),
        }
    }

    /// Width in columns.
    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in rows.
    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// All cells, row-major.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Linear index of `(x, y)`, or `None` when outside the grid.
    #[inline]
    pub fn index_of(&self, x: u16, y: u16) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(usize::from(y) * usize::from(self.width) + usize::from(x))
        } else {
            None
        }
    }

    /// Cell at `(x, y)`.
    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index_of(x, y).map(|i| &self.cells[i])
    }

    /// Replace the cell at `(x, y)`. Returns `false` when out of bounds.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        match self.index_of(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Text of an overflow cell.
    pub fn overflow(&self, index: u32) -> Option<&str> {
        self.overflow.get(index as usize).map(String::as_str)
    }

    /// Full text of the cell at `(x, y)`, resolving overflow.
    pub fn symbol_at(&self, x: u16, y: u16) -> Option<&str> {
        let cell = self.get(x, y)?;
        match cell.overflow_index() {
            Some(index) => self.overflow(index),
            None => cell.symbol(),
        }
    }

    /// Put one grapheme cluster at `(x, y)`.
    ///
    /// A double-width glyph also claims `(x + 1, y)`; if that column is
    /// off the grid a blank is drawn instead. Returns the columns used.
    pub fn put_grapheme(&mut self, x: u16, y: u16, grapheme: &str, style: Style) -> u16 {
        let Some(idx) = self.index_of(x, y) else {
            return 0;
        };
        let width = grapheme.width().min(2) as u16;
        if width == 0 {
            return 0;
        }
        if width == 2 && x + 1 >= self.width {
            self.cells[idx] = Cell::blank(style);
            return 1;
        }

        self.cells[idx] = match Cell::from_grapheme(grapheme, style) {
            Some(cell) => cell,
            None => {
                let index = self.overflow.len() as u32;
                self.overflow.push(grapheme.to_string());
                Cell::overflow(index, width as u8, style)
            }
        };
        if width == 2 {
            self.cells[idx + 1] = Cell::wide_continuation(style);
        }
        width
    }

    /// Draw `text` from `(x, y)` rightwards, clipped at the row end.
    ///
    /// Returns the column after the last glyph drawn.
    pub fn put_str(&mut self, x: u16, y: u16, text: &str, style: Style) -> u16 {
        let mut col = x;
        for grapheme in text.graphemes(true) {
            if col >= self.width {
                break;
            }
            col += self.put_grapheme(col, y, grapheme, style);
        }
        col
    }

    /// Blank the columns `from..` of row `y` in `style`.
    pub fn fill_row(&mut self, y: u16, from: u16, style: Style) {
        let Some(start) = self.index_of(from, y) else {
            return;
        };
        let end = usize::from(y + 1) * usize::from(self.width);
        self.cells[start..end].fill(Cell::blank(style));
    }

    /// Blank every cell and drop the overflow list.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
        self.overflow.clear();
    }

    /// Change dimensions. Content is discarded.
    pub fn resize(&mut self, width: u16, height: u16) {
        let width = width.max(1);
        let height = height.max(1);
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.cells = vec![Cell::EMPTY; usize::from(width) * usize::from(height)];
        self.overflow.clear();
    }

    /// Become a copy of `other`, reusing allocations.
    pub fn copy_from(&mut self, other: &Self) {
        if self.cells.len() == other.cells.len() {
            self.cells.copy_from_slice(&other.cells);
        } else {
            self.cells.clone_from(&other.cells);
        }
        self.width = other.width;
        self.height = other.height;
        self.overflow.clone_from(&other.overflow);
    }

    /// Rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(usize::from(self.width))
    }

    /// Row `y` as plain text with trailing blanks trimmed.
    pub fn row_text(&self, y: u16) -> String {
        let mut text = String::new();
        for x in 0..self.width {
            if let Some(symbol) = self.symbol_at(x, y) {
                text.push_str(symbol);
            }
        }
        text.trim_end().to_string()
    }
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("overflow", &self.overflow.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::cell::Rgb;

    #[test]
    fn test_put_str_clips_at_row_end() {
        let mut grid = Grid::new(5, 2);
        let end = grid.put_str(2, 0, "hello", Style::default());
        assert_eq!(end, 5);
        assert_eq!(grid.row_text(0), "  hel");
        assert_eq!(grid.row_text(1), "");
    }

    #[test]
    fn test_wide_glyphs() {
        let mut grid = Grid::new(4, 1);
        let end = grid.put_str(0, 0, "中a", Style::default());
        assert_eq!(end, 3);
        assert!(grid.get(1, 0).unwrap().is_wide_continuation());
        assert_eq!(grid.row_text(0), "中a");

        // No room for the right half.
        let mut grid = Grid::new(3, 1);
        grid.put_str(0, 0, "ab中", Style::default());
        assert_eq!(grid.row_text(0), "ab");
    }

    #[test]
    fn test_overflow_graphemes() {
        let mut grid = Grid::new(6, 1);
        grid.put_str(0, 0, "a👍🏽b", Style::default());
        assert_eq!(grid.symbol_at(1, 0), Some("👍🏽"));
        assert!(grid.get(1, 0).unwrap().overflow_index().is_some());
        assert_eq!(grid.row_text(0), "a👍🏽b");

        grid.clear();
        assert_eq!(grid.overflow(0), None);
    }

    #[test]
    fn test_fill_row_and_copy() {
        let red = Style::new(Rgb::WHITE, Rgb::new(200, 0, 0));
        let mut grid = Grid::new(4, 2);
        grid.fill_row(1, 1, red);
        assert_eq!(grid.get(0, 1), Some(&Cell::EMPTY));
        assert_eq!(grid.get(3, 1).unwrap().style(), red);

        let mut copy = Grid::new(1, 1);
        copy.copy_from(&grid);
        assert_eq!(copy.width(), 4);
        assert_eq!(copy.cells(), grid.cells());
    }

    #[test]
    fn test_resize_discards_content() {
        let mut grid = Grid::new(3, 3);
        grid.put_str(0, 0, "abc", Style::default());
        grid.resize(5, 0);
        assert_eq!((grid.width(), grid.height()), (5, 1));
        assert_eq!(grid.row_text(0), "");
        assert_eq!(grid.rows().count(), 1);
    }
}

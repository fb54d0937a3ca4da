//! Screen cells and their styling.
//!
//! A [`Cell`] keeps up to four bytes of UTF-8 inline. Longer grapheme
//! clusters live in the owning grid's overflow list and the cell stores
//! the list index instead, flagged with [`CellFlags::OVERFLOW`].

use bitflags::bitflags;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 24-bit color.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Create a color from its channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pure black.
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// Pure white.
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Create a color from `0xRRGGBB`.
    #[inline]
    pub const fn from_u32(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }

    /// Format as `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Debug for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

impl From<u32> for Rgb {
    fn from(hex: u32) -> Self {
        Self::from_u32(hex)
    }
}

/// A color string that is not `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected a color like #rrggbb, got {0:?}")]
pub struct ParseColorError(pub String);

impl FromStr for Rgb {
    type Err = ParseColorError;

    /// Parse `#rrggbb` (the `#` is optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseColorError(s.to_string()));
        }
        u32::from_str_radix(digits, 16)
            .map(Self::from_u32)
            .map_err(|_| ParseColorError(s.to_string()))
    }
}

bitflags! {
    /// SGR text attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Bold (SGR 1)
        const BOLD = 0b0000_0001;
        /// Dim (SGR 2)
        const DIM = 0b0000_0010;
        /// Italic (SGR 3)
        const ITALIC = 0b0000_0100;
        /// Underline (SGR 4)
        const UNDERLINE = 0b0000_1000;
        /// Reverse video (SGR 7)
        const REVERSED = 0b0001_0000;
    }
}

bitflags! {
    /// Cell bookkeeping flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CellFlags: u8 {
        /// The symbol bytes hold an overflow index.
        const OVERFLOW = 0b0000_0001;
        /// Right half of a double-width glyph; never drawn itself.
        const WIDE_CONTINUATION = 0b0000_0010;
    }
}

/// Colors and attributes applied to a run of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Style {
    /// Foreground
    pub fg: Rgb,
    /// Background
    pub bg: Rgb,
    /// Attributes
    pub modifiers: Modifiers,
}

impl Default for Style {
    fn default() -> Self {
        Self::new(Rgb::WHITE, Rgb::BLACK)
    }
}

impl Style {
    /// Plain style with the given colors.
    pub const fn new(fg: Rgb, bg: Rgb) -> Self {
        Self {
            fg,
            bg,
            modifiers: Modifiers::empty(),
        }
    }

    /// Add attributes.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// One terminal cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    symbol: [u8; 4],
    len: u8,
    width: u8,
    style: Style,
    flags: CellFlags,
}

const _: () = assert!(std::mem::size_of::<Cell>() <= 16);

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Cell {
    /// A space in the default style.
    pub const EMPTY: Self = Self::blank(Style::new(Rgb::WHITE, Rgb::BLACK));

    /// A space in `style`.
    pub const fn blank(style: Style) -> Self {
        Self {
            symbol: [b' ', 0, 0, 0],
            len: 1,
            width: 1,
            style,
            flags: CellFlags::empty(),
        }
    }

    /// A cell holding one character.
    pub fn from_char(c: char, style: Style) -> Self {
        let mut symbol = [0u8; 4];
        let len = c.encode_utf8(&mut symbol).len() as u8;
        let width = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0) as u8;
        Self {
            symbol,
            len,
            width,
            style,
            flags: CellFlags::empty(),
        }
    }

    /// A cell holding a grapheme cluster, if it fits inline.
    pub fn from_grapheme(grapheme: &str, style: Style) -> Option<Self> {
        let bytes = grapheme.as_bytes();
        if bytes.is_empty() || bytes.len() > 4 {
            return None;
        }
        let mut symbol = [0u8; 4];
        symbol[..bytes.len()].copy_from_slice(bytes);
        Some(Self {
            symbol,
            len: bytes.len() as u8,
            width: unicode_width::UnicodeWidthStr::width(grapheme) as u8,
            style,
            flags: CellFlags::empty(),
        })
    }

    /// A cell pointing into the grid's overflow list.
    pub const fn overflow(index: u32, width: u8, style: Style) -> Self {
        Self {
            symbol: index.to_le_bytes(),
            len: 0,
            width,
            style,
            flags: CellFlags::OVERFLOW,
        }
    }

    /// Placeholder right of a double-width glyph.
    pub const fn wide_continuation(style: Style) -> Self {
        Self {
            symbol: [0; 4],
            len: 0,
            width: 0,
            style,
            flags: CellFlags::WIDE_CONTINUATION,
        }
    }

    /// Inline text, or `None` for overflow and continuation cells.
    pub fn symbol(&self) -> Option<&str> {
        if self.flags.is_empty() {
            std::str::from_utf8(&self.symbol[..self.len as usize]).ok()
        } else {
            None
        }
    }

    /// Overflow list index.
    pub const fn overflow_index(&self) -> Option<u32> {
        if self.flags.contains(CellFlags::OVERFLOW) {
            Some(u32::from_le_bytes(self.symbol))
        } else {
            None
        }
    }

    /// Whether this is the right half of a wide glyph.
    #[inline]
    pub const fn is_wide_continuation(&self) -> bool {
        self.flags.contains(CellFlags::WIDE_CONTINUATION)
    }

    /// Columns this cell's glyph occupies.
    #[inline]
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Style.
    #[inline]
    pub const fn style(&self) -> Style {
        self.style
    }

    /// Flags.
    #[inline]
    pub const fn flags(&self) -> CellFlags {
        self.flags
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Cell");
        if let Some(symbol) = self.symbol() {
            s.field("symbol", &symbol);
        } else if let Some(index) = self.overflow_index() {
            s.field("overflow", &index);
        } else {
            s.field("continuation", &true);
        }
        s.field("fg", &self.style.fg)
            .field("bg", &self.style.bg)
            .field("modifiers", &self.style.modifiers)
            .finish()
    }
}

//! Castling availability flags.

use std::fmt;

use crate::Color;

/// The four castling rights packed into one byte.
///
/// A right being set means castling has not yet been permanently forfeited
/// by a king or rook move (or rook capture); it does not mean castling is
/// legal right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const WHITE_KINGSIDE: u8 = 0b0001;
    pub const WHITE_QUEENSIDE: u8 = 0b0010;
    pub const BLACK_KINGSIDE: u8 = 0b0100;
    pub const BLACK_QUEENSIDE: u8 = 0b1000;

    /// All four rights available, as at the start of a game.
    pub const fn all() -> Self {
        CastlingRights(0b1111)
    }

    /// No rights available.
    pub const fn none() -> Self {
        CastlingRights(0)
    }

    /// Builds rights from a raw bitmask. Bits outside the low four are
    /// discarded.
    pub const fn from_raw(bits: u8) -> Self {
        CastlingRights(bits & 0b1111)
    }

    /// Returns the raw bitmask, for hashing.
    pub const fn raw(self) -> u8 {
        self.0
    }

    #[inline]
    const fn kingside_bit(color: Color) -> u8 {
        match color {
            Color::White => Self::WHITE_KINGSIDE,
            Color::Black => Self::BLACK_KINGSIDE,
        }
    }

    #[inline]
    const fn queenside_bit(color: Color) -> u8 {
        match color {
            Color::White => Self::WHITE_QUEENSIDE,
            Color::Black => Self::BLACK_QUEENSIDE,
        }
    }

    /// Whether the given color may still castle kingside.
    #[inline]
    pub const fn kingside(self, color: Color) -> bool {
        self.0 & Self::kingside_bit(color) != 0
    }

    /// Whether the given color may still castle queenside.
    #[inline]
    pub const fn queenside(self, color: Color) -> bool {
        self.0 & Self::queenside_bit(color) != 0
    }

    /// Whether any right remains for either color.
    #[inline]
    pub const fn any(self) -> bool {
        self.0 != 0
    }

    /// Forfeits the kingside right for `color`.
    #[inline]
    pub fn clear_kingside(&mut self, color: Color) {
        self.0 &= !Self::kingside_bit(color);
    }

    /// Forfeits the queenside right for `color`.
    #[inline]
    pub fn clear_queenside(&mut self, color: Color) {
        self.0 &= !Self::queenside_bit(color);
    }

    /// Forfeits both rights for `color`, as when the king moves.
    #[inline]
    pub fn clear_color(&mut self, color: Color) {
        self.0 &= !(Self::kingside_bit(color) | Self::queenside_bit(color));
    }
}

impl Default for CastlingRights {
    fn default() -> Self {
        CastlingRights::all()
    }
}

impl fmt::Display for CastlingRights {
    /// Formats as the FEN castling field ("KQkq", subsets, or "-").
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.any() {
            return write!(f, "-");
        }
        if self.kingside(Color::White) {
            write!(f, "K")?;
        }
        if self.queenside(Color::White) {
            write!(f, "Q")?;
        }
        if self.kingside(Color::Black) {
            write!(f, "k")?;
        }
        if self.queenside(Color::Black) {
            write!(f, "q")?;
        }
        Ok(())
    }
}

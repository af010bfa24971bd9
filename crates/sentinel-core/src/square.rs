//! Board coordinates and the mailbox mapping.
//!
//! Squares carry two indexings. The compact index 0-63 (a1 = 0, h8 = 63)
//! is used for hashing and iteration. The mailbox index addresses a 120-cell
//! (10x12) array whose two-rank top/bottom margins and one-file side margins
//! are off-board sentinels, so a fixed offset applied to any playable cell
//! always lands inside the array and off-board rays terminate on a sentinel
//! instead of needing a bounds check.

use std::fmt;

/// Number of cells in the mailbox array.
pub const MAILBOX_SIZE: usize = 120;

/// A file (column), a through h.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum File {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
}

impl File {
    /// All files, a through h.
    pub const ALL: [File; 8] = [
        File::A,
        File::B,
        File::C,
        File::D,
        File::E,
        File::F,
        File::G,
        File::H,
    ];

    /// Creates a file from an index (0-7).
    #[inline]
    pub fn from_index(index: u8) -> Option<Self> {
        File::ALL.get(index as usize).copied()
    }

    /// Creates a file from its letter ('a'-'h').
    #[inline]
    pub fn from_char(c: char) -> Option<Self> {
        let idx = (c.to_ascii_lowercase() as u32).checked_sub('a' as u32)?;
        File::from_index(idx as u8)
    }

    /// Returns the index (0-7).
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Returns the letter ('a'-'h').
    #[inline]
    pub const fn to_char(self) -> char {
        (b'a' + self as u8) as char
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A rank (row), 1 through 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Rank {
    R1 = 0,
    R2 = 1,
    R3 = 2,
    R4 = 3,
    R5 = 4,
    R6 = 5,
    R7 = 6,
    R8 = 7,
}

impl Rank {
    /// All ranks, 1 through 8.
    pub const ALL: [Rank; 8] = [
        Rank::R1,
        Rank::R2,
        Rank::R3,
        Rank::R4,
        Rank::R5,
        Rank::R6,
        Rank::R7,
        Rank::R8,
    ];

    /// Creates a rank from an index (0-7).
    #[inline]
    pub fn from_index(index: u8) -> Option<Self> {
        Rank::ALL.get(index as usize).copied()
    }

    /// Creates a rank from its digit ('1'-'8').
    #[inline]
    pub fn from_char(c: char) -> Option<Self> {
        let idx = (c as u32).checked_sub('1' as u32)?;
        Rank::from_index(idx as u8)
    }

    /// Returns the index (0-7).
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Returns the digit ('1'-'8').
    #[inline]
    pub const fn to_char(self) -> char {
        (b'1' + self as u8) as char
    }

    /// The rank pawns of the given color start on.
    #[inline]
    pub const fn pawn_start(color: crate::Color) -> Rank {
        match color {
            crate::Color::White => Rank::R2,
            crate::Color::Black => Rank::R7,
        }
    }

    /// The rank pawns of the given color promote on.
    #[inline]
    pub const fn promotion(color: crate::Color) -> Rank {
        match color {
            crate::Color::White => Rank::R8,
            crate::Color::Black => Rank::R1,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A playable square, indexed 0-63 in rank-major order (a1 = 0, h8 = 63).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square(u8);

impl Square {
    /// Creates a square from file and rank.
    #[inline]
    pub const fn new(file: File, rank: Rank) -> Self {
        Square(rank.index() * 8 + file.index())
    }

    /// Creates a square from a compact index (0-63).
    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 64 {
            Some(Square(index))
        } else {
            None
        }
    }

    /// Parses algebraic notation (e.g. "e4").
    pub fn from_algebraic(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let file = File::from_char(chars.next()?)?;
        let rank = Rank::from_char(chars.next()?)?;
        if chars.next().is_some() {
            return None;
        }
        Some(Square::new(file, rank))
    }

    /// Returns the compact index (0-63).
    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Returns the file of this square.
    #[inline]
    pub const fn file(self) -> File {
        File::ALL[(self.0 % 8) as usize]
    }

    /// Returns the rank of this square.
    #[inline]
    pub const fn rank(self) -> Rank {
        Rank::ALL[(self.0 / 8) as usize]
    }

    /// Returns the mailbox index of this square (21-98).
    ///
    /// Adjacent files differ by 1, adjacent ranks by 10; the surrounding
    /// cells of the 120-cell array are off-board sentinels.
    #[inline]
    pub const fn mailbox(self) -> i16 {
        21 + (self.0 / 8) as i16 * 10 + (self.0 % 8) as i16
    }

    /// Converts a mailbox index back to a square.
    ///
    /// Returns `None` for sentinel (off-board) cells and out-of-range
    /// indices.
    #[inline]
    pub const fn from_mailbox(index: i16) -> Option<Self> {
        if index < 0 || index >= MAILBOX_SIZE as i16 {
            return None;
        }
        let row = index / 10;
        let col = index % 10;
        if row < 2 || row > 9 || col < 1 || col > 8 {
            return None;
        }
        Some(Square(((row - 2) * 8 + (col - 1)) as u8))
    }

    /// Returns the algebraic notation for this square.
    pub fn to_algebraic(self) -> String {
        format!("{}{}", self.file(), self.rank())
    }

    // Squares referenced by the castling and hashing logic.
    pub const A1: Square = Square::new(File::A, Rank::R1);
    pub const C1: Square = Square::new(File::C, Rank::R1);
    pub const D1: Square = Square::new(File::D, Rank::R1);
    pub const E1: Square = Square::new(File::E, Rank::R1);
    pub const F1: Square = Square::new(File::F, Rank::R1);
    pub const G1: Square = Square::new(File::G, Rank::R1);
    pub const H1: Square = Square::new(File::H, Rank::R1);
    pub const A8: Square = Square::new(File::A, Rank::R8);
    pub const C8: Square = Square::new(File::C, Rank::R8);
    pub const D8: Square = Square::new(File::D, Rank::R8);
    pub const E8: Square = Square::new(File::E, Rank::R8);
    pub const F8: Square = Square::new(File::F, Rank::R8);
    pub const G8: Square = Square::new(File::G, Rank::R8);
    pub const H8: Square = Square::new(File::H, Rank::R8);
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Square({})", self.to_algebraic())
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

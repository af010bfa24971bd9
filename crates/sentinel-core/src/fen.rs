//! FEN (Forsyth-Edwards Notation) parsing and serialization.
//!
//! Parsing stops at the notation level: the result is a bag of typed
//! fields that the engine turns into its internal position representation.
//! A string that parses here can still be nonsensical as a chess position
//! (no kings, pawns on the back rank); position-level validation is the
//! engine's job.

use thiserror::Error;

use crate::{CastlingRights, Color, File, Piece, Rank, Square};

/// Errors that can occur when parsing FEN strings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 6 fields, got {0}")]
    InvalidFieldCount(usize),

    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid active color: expected 'w' or 'b', got '{0}'")]
    InvalidActiveColor(String),

    #[error("invalid castling rights: {0}")]
    InvalidCastlingRights(String),

    #[error("invalid en passant square: {0}")]
    InvalidEnPassantSquare(String),

    #[error("invalid halfmove clock: {0}")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    InvalidFullmoveNumber(String),
}

/// A FEN record parsed into typed fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenParser {
    /// Occupant of each square, indexed by [`Square::index`].
    pub placement: [Option<(Color, Piece)>; 64],
    pub side_to_move: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,
    /// Halfmove clock for the fifty-move rule.
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl FenParser {
    /// The standard starting position.
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Parses a FEN string.
    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(FenError::InvalidFieldCount(fields.len()));
        }

        let placement = Self::parse_placement(fields[0])?;

        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidActiveColor(other.to_string())),
        };

        let castling = Self::parse_castling(fields[2])?;
        let en_passant = Self::parse_en_passant(fields[3])?;

        let halfmove_clock = fields[4]
            .parse::<u32>()
            .map_err(|_| FenError::InvalidHalfmoveClock(fields[4].to_string()))?;

        let fullmove_number = fields[5]
            .parse::<u32>()
            .map_err(|_| FenError::InvalidFullmoveNumber(fields[5].to_string()))?;
        if fullmove_number == 0 {
            return Err(FenError::InvalidFullmoveNumber(fields[5].to_string()));
        }

        Ok(FenParser {
            placement,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }

    fn parse_placement(field: &str) -> Result<[Option<(Color, Piece)>; 64], FenError> {
        let ranks: Vec<&str> = field.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidPiecePlacement(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        let mut placement = [None; 64];
        // FEN lists ranks from 8 down to 1.
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = Rank::ALL[7 - i];
            // u32 so an arbitrarily long digit run cannot wrap the count.
            let mut file_idx = 0u32;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if skip == 0 || skip == 9 {
                        return Err(FenError::InvalidPiecePlacement(format!(
                            "invalid run length '{}' in rank {}",
                            c,
                            rank.to_char()
                        )));
                    }
                    file_idx += skip;
                } else if let Some((piece, color)) = Piece::from_fen_char(c) {
                    let file = u8::try_from(file_idx)
                        .ok()
                        .and_then(File::from_index)
                        .ok_or_else(|| {
                            FenError::InvalidPiecePlacement(format!(
                                "rank {} overflows past file h",
                                rank.to_char()
                            ))
                        })?;
                    placement[Square::new(file, rank).index() as usize] = Some((color, piece));
                    file_idx += 1;
                } else {
                    return Err(FenError::InvalidPiecePlacement(format!(
                        "invalid character '{}' in rank {}",
                        c,
                        rank.to_char()
                    )));
                }
                if file_idx > 8 {
                    return Err(FenError::InvalidPiecePlacement(format!(
                        "rank {} has more than 8 squares",
                        rank.to_char()
                    )));
                }
            }
            if file_idx != 8 {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "rank {} has {} squares, expected 8",
                    rank.to_char(),
                    file_idx
                )));
            }
        }

        Ok(placement)
    }

    fn parse_castling(field: &str) -> Result<CastlingRights, FenError> {
        if field == "-" {
            return Ok(CastlingRights::none());
        }

        let mut bits = 0u8;
        for c in field.chars() {
            let bit = match c {
                'K' => CastlingRights::WHITE_KINGSIDE,
                'Q' => CastlingRights::WHITE_QUEENSIDE,
                'k' => CastlingRights::BLACK_KINGSIDE,
                'q' => CastlingRights::BLACK_QUEENSIDE,
                _ => {
                    return Err(FenError::InvalidCastlingRights(format!(
                        "invalid character '{}'",
                        c
                    )))
                }
            };
            if bits & bit != 0 {
                return Err(FenError::InvalidCastlingRights(format!(
                    "duplicate flag '{}'",
                    c
                )));
            }
            bits |= bit;
        }

        Ok(CastlingRights::from_raw(bits))
    }

    fn parse_en_passant(field: &str) -> Result<Option<Square>, FenError> {
        if field == "-" {
            return Ok(None);
        }

        let square = Square::from_algebraic(field)
            .ok_or_else(|| FenError::InvalidEnPassantSquare(field.to_string()))?;
        // Only the bypassed square of a double pawn push is a valid target.
        if square.rank() != Rank::R3 && square.rank() != Rank::R6 {
            return Err(FenError::InvalidEnPassantSquare(field.to_string()));
        }

        Ok(Some(square))
    }

    /// Serializes the record back to a FEN string.
    pub fn to_fen(&self) -> String {
        let mut placement = String::new();
        for (i, &rank) in Rank::ALL.iter().rev().enumerate() {
            if i > 0 {
                placement.push('/');
            }
            let mut empty = 0;
            for file in File::ALL {
                match self.placement[Square::new(file, rank).index() as usize] {
                    Some((color, piece)) => {
                        if empty > 0 {
                            placement.push(char::from_digit(empty, 10).unwrap_or('0'));
                            empty = 0;
                        }
                        placement.push(piece.to_fen_char(color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                placement.push(char::from_digit(empty, 10).unwrap_or('0'));
            }
        }

        let en_passant = match self.en_passant {
            Some(sq) => sq.to_algebraic(),
            None => "-".to_string(),
        };

        format!(
            "{} {} {} {} {} {}",
            placement,
            match self.side_to_move {
                Color::White => 'w',
                Color::Black => 'b',
            },
            self.castling,
            en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

impl Default for FenParser {
    fn default() -> Self {
        match Self::parse(Self::STARTPOS) {
            Ok(fen) => fen,
            Err(_) => unreachable!("STARTPOS is valid"),
        }
    }
}

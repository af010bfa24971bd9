//! Move representation.

use std::fmt;

use crate::{Color, Piece, Square};

/// Distinguishes the special move kinds that need extra handling when a
/// move is applied or undone. At most one applies to any move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MoveFlag {
    #[default]
    Normal,
    /// A pawn advance of two ranks from its start rank.
    DoublePush,
    /// An en passant capture; the captured pawn is not on the destination.
    EnPassant,
    CastleKingside,
    CastleQueenside,
}

/// A single move, cheap to copy and sufficient to apply and undo itself
/// together with a board snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    /// The piece being moved.
    pub piece: Piece,
    /// The piece captured on the destination square, if any. En passant
    /// captures record `None` here; the flag identifies the pawn removed
    /// from the bypassed square instead.
    pub captured: Option<Piece>,
    /// The piece a pawn becomes on reaching the last rank.
    pub promotion: Option<Piece>,
    pub flag: MoveFlag,
}

impl Move {
    /// Placeholder used to initialize fixed-size move buffers. Never a
    /// legal move in any reachable position.
    pub const NULL: Move = Move::quiet(Square::A1, Square::A1, Piece::Pawn);

    /// A non-capturing, non-special move.
    pub const fn quiet(from: Square, to: Square, piece: Piece) -> Self {
        Move {
            from,
            to,
            piece,
            captured: None,
            promotion: None,
            flag: MoveFlag::Normal,
        }
    }

    /// A capture of `victim` on the destination square.
    pub const fn capture(from: Square, to: Square, piece: Piece, victim: Piece) -> Self {
        Move {
            from,
            to,
            piece,
            captured: Some(victim),
            promotion: None,
            flag: MoveFlag::Normal,
        }
    }

    /// A pawn promotion, optionally capturing on the destination.
    pub const fn promotion(
        from: Square,
        to: Square,
        captured: Option<Piece>,
        promotion: Piece,
    ) -> Self {
        Move {
            from,
            to,
            piece: Piece::Pawn,
            captured,
            promotion: Some(promotion),
            flag: MoveFlag::Normal,
        }
    }

    /// A two-rank pawn advance.
    pub const fn double_push(from: Square, to: Square) -> Self {
        Move {
            from,
            to,
            piece: Piece::Pawn,
            captured: None,
            promotion: None,
            flag: MoveFlag::DoublePush,
        }
    }

    /// An en passant capture landing on the en passant target square.
    pub const fn en_passant(from: Square, to: Square) -> Self {
        Move {
            from,
            to,
            piece: Piece::Pawn,
            captured: None,
            promotion: None,
            flag: MoveFlag::EnPassant,
        }
    }

    /// A castling move described by the king's from/to squares.
    pub const fn castle(from: Square, to: Square, kingside: bool) -> Self {
        Move {
            from,
            to,
            piece: Piece::King,
            captured: None,
            promotion: None,
            flag: if kingside {
                MoveFlag::CastleKingside
            } else {
                MoveFlag::CastleQueenside
            },
        }
    }

    /// Whether this move removes an enemy piece from the board.
    #[inline]
    pub fn is_capture(&self) -> bool {
        self.captured.is_some() || self.flag == MoveFlag::EnPassant
    }

    /// Returns the move in UCI long algebraic notation (e.g. "e2e4",
    /// "e7e8q").
    pub fn to_uci(&self) -> String {
        match self.promotion {
            // Promotion pieces are written lowercase regardless of side.
            Some(p) => format!("{}{}{}", self.from, self.to, p.to_fen_char(Color::Black)),
            None => format!("{}{}", self.from, self.to),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

/// A move as written on the wire: from/to squares and an optional
/// promotion piece. Carries no board context; resolve it against the
/// legal moves of a position to obtain a full [`Move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UciMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Piece>,
}

impl UciMove {
    /// Parses UCI long algebraic notation.
    pub fn parse(s: &str) -> Option<Self> {
        if s.len() < 4 || s.len() > 5 {
            return None;
        }
        let from = Square::from_algebraic(&s[..2])?;
        let to = Square::from_algebraic(&s[2..4])?;
        let promotion = match s.len() {
            5 => {
                let (piece, _) = Piece::from_fen_char(s.chars().nth(4)?)?;
                if !Piece::PROMOTIONS.contains(&piece) {
                    return None;
                }
                Some(piece)
            }
            _ => None,
        };
        Some(UciMove {
            from,
            to,
            promotion,
        })
    }

    /// Whether `mv` is the move this notation describes.
    pub fn matches(&self, mv: &Move) -> bool {
        mv.from == self.from && mv.to == self.to && mv.promotion == self.promotion
    }
}

impl fmt::Display for UciMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.promotion {
            Some(p) => write!(f, "{}{}{}", self.from, self.to, p.to_fen_char(Color::Black)),
            None => write!(f, "{}{}", self.from, self.to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{File, Rank};

    #[test]
    fn uci_notation() {
        let e2 = Square::new(File::E, Rank::R2);
        let e4 = Square::new(File::E, Rank::R4);
        assert_eq!(Move::double_push(e2, e4).to_uci(), "e2e4");

        let e7 = Square::new(File::E, Rank::R7);
        let e8 = Square::new(File::E, Rank::R8);
        let promo = Move::promotion(e7, e8, None, Piece::Queen);
        assert_eq!(promo.to_uci(), "e7e8q");
    }

    #[test]
    fn parse_uci_move() {
        let mv = UciMove::parse("e2e4").unwrap();
        assert_eq!(mv.from, Square::from_algebraic("e2").unwrap());
        assert_eq!(mv.to, Square::from_algebraic("e4").unwrap());
        assert_eq!(mv.promotion, None);

        let promo = UciMove::parse("a7a8n").unwrap();
        assert_eq!(promo.promotion, Some(Piece::Knight));

        assert_eq!(UciMove::parse(""), None);
        assert_eq!(UciMove::parse("e2"), None);
        assert_eq!(UciMove::parse("e2e4qq"), None);
        assert_eq!(UciMove::parse("e7e8k"), None); // king is not a promotion
        assert_eq!(UciMove::parse("z2e4"), None);
    }

    #[test]
    fn en_passant_counts_as_capture() {
        let d5 = Square::from_algebraic("d5").unwrap();
        let e6 = Square::from_algebraic("e6").unwrap();
        let mv = Move::en_passant(d5, e6);
        assert!(mv.is_capture());
        assert_eq!(mv.captured, None);
    }

    #[test]
    fn matches_requires_promotion_piece() {
        let e7 = Square::from_algebraic("e7").unwrap();
        let e8 = Square::from_algebraic("e8").unwrap();
        let queen = Move::promotion(e7, e8, None, Piece::Queen);
        let rook = Move::promotion(e7, e8, None, Piece::Rook);
        let wanted = UciMove::parse("e7e8q").unwrap();
        assert!(wanted.matches(&queen));
        assert!(!wanted.matches(&rook));
    }
}

//! Static evaluation.
//!
//! The search only ever sees [`Evaluate`], so the scoring heuristic can be
//! swapped without touching the search. Scores are centipawns from the
//! side to move's perspective, which is what negamax expects.

use sentinel_core::{Color, File, Piece, Rank, Square};

use crate::board::Board;

/// A static position scorer.
///
/// Implementations must be pure: same position, same score. Terminal
/// positions (mate, stalemate) are handled by the search before the
/// evaluator is consulted.
pub trait Evaluate: Send {
    /// Scores the position in centipawns, positive meaning the side to
    /// move is better.
    fn evaluate(&self, board: &Board) -> i32;
}

/// Piece-square tables in centipawns, laid out rank 8 first (the printed
/// board, from white's side). Added to the piece base values.
const PAWN_PST: [i32; 64] = [
    0, 0, 0, 0, 0, 0, 0, 0, 50, 50, 50, 50, 50, 50, 50, 50, 10, 10, 20, 30, 30, 20, 10, 10, 5, 5,
    10, 25, 25, 10, 5, 5, 0, 0, 0, 20, 20, 0, 0, 0, 5, -5, -10, 0, 0, -10, -5, 5, 5, 10, 10, -20,
    -20, 10, 10, 5, 0, 0, 0, 0, 0, 0, 0, 0,
];

const KNIGHT_PST: [i32; 64] = [
    -50, -40, -30, -30, -30, -30, -40, -50, -40, -20, 0, 0, 0, 0, -20, -40, -30, 0, 10, 15, 15, 10,
    0, -30, -30, 5, 15, 20, 20, 15, 5, -30, -30, 0, 15, 20, 20, 15, 0, -30, -30, 5, 10, 15, 15, 10,
    5, -30, -40, -20, 0, 5, 5, 0, -20, -40, -50, -40, -30, -30, -30, -30, -40, -50,
];

const BISHOP_PST: [i32; 64] = [
    -20, -10, -10, -10, -10, -10, -10, -20, -10, 0, 0, 0, 0, 0, 0, -10, -10, 0, 5, 10, 10, 5, 0,
    -10, -10, 5, 5, 10, 10, 5, 5, -10, -10, 0, 10, 10, 10, 10, 0, -10, -10, 10, 10, 10, 10, 10, 10,
    -10, -10, 5, 0, 0, 0, 0, 5, -10, -20, -10, -10, -10, -10, -10, -10, -20,
];

const ROOK_PST: [i32; 64] = [
    0, 0, 0, 0, 0, 0, 0, 0, 5, 10, 10, 10, 10, 10, 10, 5, -5, 0, 0, 0, 0, 0, 0, -5, -5, 0, 0, 0, 0,
    0, 0, -5, -5, 0, 0, 0, 0, 0, 0, -5, -5, 0, 0, 0, 0, 0, 0, -5, -5, 0, 0, 0, 0, 0, 0, -5, 0, 0,
    0, 5, 5, 0, 0, 0,
];

const QUEEN_PST: [i32; 64] = [
    -20, -10, -10, -5, -5, -10, -10, -20, -10, 0, 0, 0, 0, 0, 0, -10, -10, 0, 5, 5, 5, 5, 0, -10,
    -5, 0, 5, 5, 5, 5, 0, -5, 0, 0, 5, 5, 5, 5, 0, -5, -10, 5, 5, 5, 5, 5, 0, -10, -10, 0, 5, 0, 0,
    0, 0, -10, -20, -10, -10, -5, -5, -10, -10, -20,
];

const KING_PST: [i32; 64] = [
    -30, -40, -40, -50, -50, -40, -40, -30, -30, -40, -40, -50, -50, -40, -40, -30, -30, -40, -40,
    -50, -50, -40, -40, -30, -30, -40, -40, -50, -50, -40, -40, -30, -20, -30, -30, -40, -40, -30,
    -30, -20, -10, -20, -20, -20, -20, -20, -20, -10, 20, 20, 0, 0, 0, 0, 20, 20, 20, 30, 10, 0, 0,
    10, 30, 20,
];

fn pst(piece: Piece) -> &'static [i32; 64] {
    match piece {
        Piece::Pawn => &PAWN_PST,
        Piece::Knight => &KNIGHT_PST,
        Piece::Bishop => &BISHOP_PST,
        Piece::Rook => &ROOK_PST,
        Piece::Queen => &QUEEN_PST,
        Piece::King => &KING_PST,
    }
}

/// Table index for a piece of `color` on (`file`, `rank`). The tables are
/// printed from white's side, so white reads them top-down mirrored and
/// black reads them directly.
#[inline]
fn pst_index(color: Color, file: File, rank: Rank) -> usize {
    let rank = match color {
        Color::White => 7 - rank.index(),
        Color::Black => rank.index(),
    };
    (rank * 8 + file.index()) as usize
}

/// Material plus piece-square evaluation.
///
/// The king contributes no material term, only its table, so both sides'
/// kings cancel out of the material balance.
#[derive(Debug, Default, Clone, Copy)]
pub struct MaterialEval;

impl Evaluate for MaterialEval {
    fn evaluate(&self, board: &Board) -> i32 {
        let mut score = 0i32;

        for idx in 0..64u8 {
            let square = match Square::from_index(idx) {
                Some(sq) => sq,
                None => continue,
            };
            let (color, piece) = match board.piece_at(square) {
                Some(occupant) => occupant,
                None => continue,
            };

            let material = if piece == Piece::King { 0 } else { piece.value() };
            let positional = pst(piece)[pst_index(color, square.file(), square.rank())];
            let sign = if color == Color::White { 1 } else { -1 };
            score += sign * (material + positional);
        }

        if board.side_to_move() == Color::White {
            score
        } else {
            -score
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_is_balanced() {
        let board = Board::startpos();
        assert_eq!(MaterialEval.evaluate(&board), 0);
    }

    #[test]
    fn perspective_flips_with_side_to_move() {
        let white =
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBN1 w Qkq - 0 1").unwrap();
        let black =
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBN1 b Qkq - 0 1").unwrap();
        let white_score = MaterialEval.evaluate(&white);
        let black_score = MaterialEval.evaluate(&black);
        assert_eq!(white_score, -black_score);
        // White is down a rook.
        assert!(white_score < 0);
    }

    #[test]
    fn central_knight_beats_corner_knight() {
        let centered = Board::from_fen("4k3/8/8/8/4N3/8/8/4K3 w - - 0 1").unwrap();
        let cornered = Board::from_fen("4k3/8/8/8/8/8/8/N3K3 w - - 0 1").unwrap();
        assert!(MaterialEval.evaluate(&centered) > MaterialEval.evaluate(&cornered));
    }

    #[test]
    fn pst_index_mirrors_between_colors() {
        // e2 for white and e7 for black are the same table cell.
        assert_eq!(
            pst_index(Color::White, File::E, Rank::R2),
            pst_index(Color::Black, File::E, Rank::R7)
        );
        assert_eq!(pst_index(Color::White, File::A, Rank::R1), 56);
        assert_eq!(pst_index(Color::Black, File::A, Rank::R1), 0);
    }
}

//! Mailbox board representation with reversible make/unmake.
//!
//! The board is a 120-cell array: the playable 8x8 area surrounded by
//! off-board sentinel cells (see [`Square::mailbox`]). Moves are applied
//! in place; every [`Board::make_move`] pushes a snapshot of the
//! irreversible state, and [`Board::unmake_move`] pops it, restoring the
//! position bit for bit, fingerprint included.

use thiserror::Error;

use sentinel_core::{
    CastlingRights, Color, FenError, FenParser, File, Move, MoveFlag, Piece, Rank, Square, UciMove,
    MAILBOX_SIZE,
};

use crate::movegen;
use crate::zobrist;

/// Errors that can occur when building a position.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PositionError {
    #[error(transparent)]
    Fen(#[from] FenError),

    #[error("{color} has {count} kings, expected exactly one")]
    KingCount { color: Color, count: usize },
}

/// One cell of the mailbox array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    /// A sentinel outside the playable area. Ray and offset walks stop
    /// here without a bounds check.
    Off,
    Empty,
    Occupied(Color, Piece),
}

/// Irreversible state saved before a move is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Snapshot {
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    hash: u64,
}

/// How a game ends, if it has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    /// The side to move is mated; the winner is the other side.
    Checkmate { winner: Color },
    Stalemate,
    FiftyMoveDraw,
    ThreefoldRepetition,
}

/// Complete position state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Cell; MAILBOX_SIZE],
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    /// Current Zobrist fingerprint, kept in sync by make/unmake.
    hash: u64,
    /// King squares indexed by color, kept in sync by make/unmake.
    kings: [Square; 2],
    /// Snapshots for unmake, LIFO.
    history: Vec<Snapshot>,
    /// Fingerprint of every position seen on the current line, including
    /// the initial one. Drives repetition detection.
    repetition_log: Vec<u64>,
}

impl Board {
    /// The standard starting position.
    pub fn startpos() -> Self {
        match Board::from_fen(FenParser::STARTPOS) {
            Ok(board) => board,
            Err(_) => unreachable!("the starting position is valid"),
        }
    }

    /// Builds a position from a FEN string.
    ///
    /// The board is constructed fresh, so a parse or validation failure
    /// leaves nothing half-initialized.
    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        let parsed = FenParser::parse(fen)?;

        let mut cells = [Cell::Off; MAILBOX_SIZE];
        let mut king_squares = [None; 2];
        for idx in 0..64u8 {
            let square = Square::from_index(idx).unwrap_or(Square::A1);
            cells[square.mailbox() as usize] = match parsed.placement[idx as usize] {
                Some((color, piece)) => {
                    if piece == Piece::King {
                        king_squares[color.index()] = Some(square);
                    }
                    Cell::Occupied(color, piece)
                }
                None => Cell::Empty,
            };
        }

        for color in [Color::White, Color::Black] {
            let count = (0..64u8)
                .filter(|&idx| {
                    parsed.placement[idx as usize] == Some((color, Piece::King))
                })
                .count();
            if count != 1 {
                return Err(PositionError::KingCount { color, count });
            }
        }
        let kings = [
            king_squares[0].unwrap_or(Square::E1),
            king_squares[1].unwrap_or(Square::E8),
        ];

        let mut board = Board {
            cells,
            side_to_move: parsed.side_to_move,
            castling: parsed.castling,
            en_passant: parsed.en_passant,
            halfmove_clock: parsed.halfmove_clock,
            fullmove_number: parsed.fullmove_number,
            hash: 0,
            kings,
            history: Vec::new(),
            repetition_log: Vec::new(),
        };
        board.hash = zobrist::compute(&board);
        board.repetition_log.push(board.hash);
        Ok(board)
    }

    /// Serializes the position to FEN.
    pub fn to_fen(&self) -> String {
        let mut placement = [None; 64];
        for idx in 0..64u8 {
            if let Some(square) = Square::from_index(idx) {
                if let Some((color, piece)) = self.piece_at(square) {
                    placement[idx as usize] = Some((color, piece));
                }
            }
        }
        FenParser {
            placement,
            side_to_move: self.side_to_move,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        }
        .to_fen()
    }

    /// Returns the occupant of a square.
    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<(Color, Piece)> {
        match self.cells[square.mailbox() as usize] {
            Cell::Occupied(color, piece) => Some((color, piece)),
            _ => None,
        }
    }

    /// Returns the cell at a raw mailbox index. Out-of-range indices read
    /// as off-board.
    #[inline]
    pub(crate) fn cell(&self, mailbox: i16) -> Cell {
        if (0..MAILBOX_SIZE as i16).contains(&mailbox) {
            self.cells[mailbox as usize]
        } else {
            Cell::Off
        }
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// The current Zobrist fingerprint.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// The king square of the given color.
    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.kings[color.index()]
    }

    /// Number of plies made (and not yet unmade) on this board.
    #[inline]
    pub fn ply(&self) -> usize {
        self.history.len()
    }

    #[inline]
    fn set(&mut self, square: Square, cell: Cell) {
        self.cells[square.mailbox() as usize] = cell;
    }

    /// Applies a move in place. The move must come from this position's
    /// legal (or at least pseudo-legal) move set.
    pub fn make_move(&mut self, mv: Move) {
        self.history.push(Snapshot {
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            hash: self.hash,
        });

        let mover = self.side_to_move;
        let back_rank = match mover {
            Color::White => Rank::R1,
            Color::Black => Rank::R8,
        };

        // The target square expires after exactly one ply.
        self.en_passant = None;

        if mv.piece == Piece::Pawn || mv.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        self.set(mv.from, Cell::Empty);
        let placed = mv.promotion.unwrap_or(mv.piece);
        self.set(mv.to, Cell::Occupied(mover, placed));

        match mv.flag {
            MoveFlag::Normal => {}
            MoveFlag::DoublePush => {
                // The bypassed square, midway between from and to.
                let mid = Rank::ALL
                    [((mv.from.rank().index() + mv.to.rank().index()) / 2) as usize];
                self.en_passant = Some(Square::new(mv.from.file(), mid));
            }
            MoveFlag::EnPassant => {
                // The captured pawn sits beside the destination, on the
                // mover's starting side of it.
                self.set(Square::new(mv.to.file(), mv.from.rank()), Cell::Empty);
            }
            MoveFlag::CastleKingside => {
                self.set(Square::new(File::H, back_rank), Cell::Empty);
                self.set(
                    Square::new(File::F, back_rank),
                    Cell::Occupied(mover, Piece::Rook),
                );
            }
            MoveFlag::CastleQueenside => {
                self.set(Square::new(File::A, back_rank), Cell::Empty);
                self.set(
                    Square::new(File::D, back_rank),
                    Cell::Occupied(mover, Piece::Rook),
                );
            }
        }

        if mv.piece == Piece::King {
            self.castling.clear_color(mover);
            self.kings[mover.index()] = mv.to;
        }
        // A rook leaving or anything landing on a rook home square kills
        // the corresponding right. Clearing on an already-cleared or
        // vacated corner is harmless.
        for square in [mv.from, mv.to] {
            match square {
                Square::H1 => self.castling.clear_kingside(Color::White),
                Square::A1 => self.castling.clear_queenside(Color::White),
                Square::H8 => self.castling.clear_kingside(Color::Black),
                Square::A8 => self.castling.clear_queenside(Color::Black),
                _ => {}
            }
        }

        if mover == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = mover.opposite();

        self.hash = zobrist::compute(self);
        self.repetition_log.push(self.hash);
    }

    /// Reverts the most recent [`Board::make_move`]. The move passed must
    /// be the one that was made.
    pub fn unmake_move(&mut self, mv: Move) {
        let snapshot = self
            .history
            .pop()
            .expect("unmake_move without a matching make_move");
        self.repetition_log.pop();

        self.side_to_move = self.side_to_move.opposite();
        let mover = self.side_to_move;
        let back_rank = match mover {
            Color::White => Rank::R1,
            Color::Black => Rank::R8,
        };

        // Promotions revert to the pawn recorded in the move.
        self.set(mv.from, Cell::Occupied(mover, mv.piece));
        self.set(
            mv.to,
            match mv.captured {
                Some(victim) => Cell::Occupied(mover.opposite(), victim),
                None => Cell::Empty,
            },
        );

        match mv.flag {
            MoveFlag::Normal | MoveFlag::DoublePush => {}
            MoveFlag::EnPassant => {
                self.set(
                    Square::new(mv.to.file(), mv.from.rank()),
                    Cell::Occupied(mover.opposite(), Piece::Pawn),
                );
            }
            MoveFlag::CastleKingside => {
                self.set(Square::new(File::F, back_rank), Cell::Empty);
                self.set(
                    Square::new(File::H, back_rank),
                    Cell::Occupied(mover, Piece::Rook),
                );
            }
            MoveFlag::CastleQueenside => {
                self.set(Square::new(File::D, back_rank), Cell::Empty);
                self.set(
                    Square::new(File::A, back_rank),
                    Cell::Occupied(mover, Piece::Rook),
                );
            }
        }

        if mv.piece == Piece::King {
            self.kings[mover.index()] = mv.from;
        }

        self.castling = snapshot.castling;
        self.en_passant = snapshot.en_passant;
        self.halfmove_clock = snapshot.halfmove_clock;
        self.fullmove_number = snapshot.fullmove_number;
        self.hash = snapshot.hash;
    }

    /// Generates all legal moves for the side to move.
    ///
    /// Pseudo-legal moves are filtered by applying each one and rejecting
    /// those that leave the mover's king attacked.
    pub fn legal_moves(&mut self) -> Vec<Move> {
        let pseudo = movegen::pseudo_legal(self);
        let mut legal = Vec::with_capacity(pseudo.len());
        let mover = self.side_to_move;
        for &mv in pseudo.iter() {
            self.make_move(mv);
            if !movegen::is_square_attacked(self, self.kings[mover.index()], mover.opposite()) {
                legal.push(mv);
            }
            self.unmake_move(mv);
        }
        legal
    }

    /// Whether the side to move is in check.
    pub fn in_check(&self) -> bool {
        movegen::is_square_attacked(
            self,
            self.kings[self.side_to_move.index()],
            self.side_to_move.opposite(),
        )
    }

    /// Resolves a wire-format move against this position's legal moves.
    pub fn find_move(&mut self, uci: UciMove) -> Option<Move> {
        self.legal_moves().into_iter().find(|mv| uci.matches(mv))
    }

    /// How many times the current position has occurred on this line,
    /// the current occurrence included.
    pub fn repetition_count(&self) -> usize {
        let current = self.hash;
        self.repetition_log
            .iter()
            .filter(|&&hash| hash == current)
            .count()
    }

    /// Whether the current position has occurred before on this line.
    /// The search treats a single recurrence as a draw; waiting for the
    /// third occurrence only helps the opponent.
    pub fn is_repetition(&self) -> bool {
        self.repetition_count() >= 2
    }

    /// Whether the current position has occurred three or more times.
    pub fn is_threefold_repetition(&self) -> bool {
        self.repetition_count() >= 3
    }

    /// Whether the fifty-move rule applies (100 plies without a pawn move
    /// or capture).
    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Classifies the current position as ongoing, mated, or drawn.
    pub fn status(&mut self) -> GameStatus {
        if self.is_fifty_move_draw() {
            return GameStatus::FiftyMoveDraw;
        }
        if self.is_threefold_repetition() {
            return GameStatus::ThreefoldRepetition;
        }
        if self.legal_moves().is_empty() {
            if self.in_check() {
                return GameStatus::Checkmate {
                    winner: self.side_to_move.opposite(),
                };
            }
            return GameStatus::Stalemate;
        }
        GameStatus::Ongoing
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::startpos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(board: &mut Board, uci: &str) -> Move {
        let parsed = UciMove::parse(uci).unwrap();
        board.find_move(parsed).unwrap()
    }

    #[test]
    fn startpos_layout() {
        let board = Board::startpos();
        assert_eq!(board.side_to_move(), Color::White);
        assert_eq!(board.castling(), CastlingRights::all());
        assert_eq!(board.en_passant(), None);
        assert_eq!(
            board.piece_at(Square::E1),
            Some((Color::White, Piece::King))
        );
        assert_eq!(board.king_square(Color::Black), Square::E8);
        assert_eq!(board.to_fen(), FenParser::STARTPOS);
    }

    #[test]
    fn startpos_has_twenty_moves() {
        let mut board = Board::startpos();
        assert_eq!(board.legal_moves().len(), 20);
    }

    #[test]
    fn make_unmake_restores_everything() {
        let mut board = Board::startpos();
        let original = board.clone();

        let e4 = mv(&mut board, "e2e4");
        board.make_move(e4);
        assert_ne!(board, original);
        assert_eq!(board.side_to_move(), Color::Black);
        assert_eq!(board.en_passant(), Square::from_algebraic("e3"));

        board.unmake_move(e4);
        assert_eq!(board, original);
    }

    #[test]
    fn capture_resets_halfmove_clock() {
        let mut board = Board::startpos();
        for uci in ["g1f3", "g8f6", "f3e5", "b8c6", "b1c3"] {
            let m = mv(&mut board, uci);
            board.make_move(m);
        }
        assert_eq!(board.halfmove_clock(), 5);
        let capture = mv(&mut board, "c6e5");
        assert!(capture.is_capture());
        board.make_move(capture);
        assert_eq!(board.halfmove_clock(), 0);
    }

    #[test]
    fn en_passant_capture_removes_pawn() {
        let mut board =
            Board::from_fen("rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 2")
                .unwrap();
        let ep = mv(&mut board, "d4e3");
        assert_eq!(ep.flag, MoveFlag::EnPassant);
        let before = board.clone();

        board.make_move(ep);
        assert_eq!(board.piece_at(Square::from_algebraic("e4").unwrap()), None);
        assert_eq!(
            board.piece_at(Square::from_algebraic("e3").unwrap()),
            Some((Color::Black, Piece::Pawn))
        );

        board.unmake_move(ep);
        assert_eq!(board, before);
    }

    #[test]
    fn castling_moves_rook_and_clears_rights() {
        let mut board =
            Board::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        let castle = mv(&mut board, "e1g1");
        assert_eq!(castle.flag, MoveFlag::CastleKingside);

        board.make_move(castle);
        assert_eq!(board.piece_at(Square::G1), Some((Color::White, Piece::King)));
        assert_eq!(board.piece_at(Square::F1), Some((Color::White, Piece::Rook)));
        assert_eq!(board.piece_at(Square::H1), None);
        assert!(!board.castling().kingside(Color::White));
        assert!(!board.castling().queenside(Color::White));
        assert!(board.castling().kingside(Color::Black));
        assert_eq!(board.king_square(Color::White), Square::G1);
    }

    #[test]
    fn rook_capture_clears_opponent_right() {
        let mut board =
            Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let take = mv(&mut board, "a1a8");
        board.make_move(take);
        assert!(!board.castling().queenside(Color::Black));
        assert!(!board.castling().queenside(Color::White));
        assert!(board.castling().kingside(Color::Black));
    }

    #[test]
    fn promotion_and_undo() {
        let mut board = Board::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let before = board.clone();
        let promo = mv(&mut board, "a7a8q");
        board.make_move(promo);
        assert_eq!(
            board.piece_at(Square::A8),
            Some((Color::White, Piece::Queen))
        );
        board.unmake_move(promo);
        assert_eq!(board, before);
    }

    #[test]
    fn repetition_detection() {
        let mut board = Board::startpos();
        assert_eq!(board.repetition_count(), 1);

        // Shuffle the knights out and back; startpos recurs.
        for uci in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            let m = mv(&mut board, uci);
            board.make_move(m);
        }
        assert_eq!(board.repetition_count(), 2);
        assert!(board.is_repetition());
        assert!(!board.is_threefold_repetition());

        for uci in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            let m = mv(&mut board, uci);
            board.make_move(m);
        }
        assert!(board.is_threefold_repetition());
        assert_eq!(board.status(), GameStatus::ThreefoldRepetition);
    }

    #[test]
    fn checkmate_and_stalemate_status() {
        // Fool's mate.
        let mut board = Board::startpos();
        for uci in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            let m = mv(&mut board, uci);
            board.make_move(m);
        }
        assert_eq!(
            board.status(),
            GameStatus::Checkmate {
                winner: Color::Black
            }
        );

        let mut stalemate = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(!stalemate.in_check());
        assert_eq!(stalemate.status(), GameStatus::Stalemate);
    }

    #[test]
    fn fifty_move_draw_status() {
        let mut board = Board::from_fen("7k/8/8/8/8/8/8/R6K w - - 99 80").unwrap();
        assert!(!board.is_fifty_move_draw());
        let m = mv(&mut board, "a1a2");
        board.make_move(m);
        assert!(board.is_fifty_move_draw());
        assert_eq!(board.status(), GameStatus::FiftyMoveDraw);
    }

    #[test]
    fn rejects_positions_without_kings() {
        assert!(matches!(
            Board::from_fen("8/8/8/8/8/8/8/8 w - - 0 1"),
            Err(PositionError::KingCount { .. })
        ));
        assert!(matches!(
            Board::from_fen("k7/8/8/8/8/8/8/KK6 w - - 0 1"),
            Err(PositionError::KingCount {
                color: Color::White,
                count: 2
            })
        ));
    }

    #[test]
    fn fen_roundtrip_after_moves() {
        let mut board = Board::startpos();
        for uci in ["e2e4", "c7c5", "g1f3"] {
            let m = mv(&mut board, uci);
            board.make_move(m);
        }
        let fen = board.to_fen();
        let reparsed = Board::from_fen(&fen).unwrap();
        assert_eq!(reparsed.to_fen(), fen);
        assert_eq!(reparsed.hash(), board.hash());
    }
}

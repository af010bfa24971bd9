//! Iterative-deepening negamax search with alpha-beta pruning.
//!
//! The searcher owns a transposition table and a boxed evaluator and is
//! driven one position at a time. Each call runs depth 1, 2, 3, ... until
//! the depth cap, the time budget, or an external stop request ends it;
//! the result of the last completed iteration wins. An aborted iteration
//! never contributes scores or table entries.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use sentinel_core::{File, Move, MoveFlag, Piece, Rank};

use crate::board::Board;
use crate::eval::Evaluate;
use crate::tt::{Bound, TranspositionTable};

/// Hard cap on search depth in plies.
pub const MAX_DEPTH: i32 = 50;

/// Larger than any reachable score; the initial alpha-beta window.
pub const INFINITY: i32 = 100_000;

/// Base score for checkmate. Mates found closer to the root score closer
/// to this value, so the search prefers the shortest mate.
pub const MATE_VALUE: i32 = 30_000;

/// Scores beyond this magnitude are mate scores, not evaluations.
pub const MATE_THRESHOLD: i32 = 29_000;

/// Nodes searched between deadline and stop-flag checks. At typical node
/// rates this batch clears in well under a millisecond, so a stop request
/// or an expired deadline is honored effectively at the node boundary
/// without paying for a clock read on every node.
const ABORT_CHECK_INTERVAL: u64 = 4096;

/// The outcome of one complete search call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    /// Best move of the deepest completed iteration. `None` when the
    /// root position has no legal moves.
    pub best_move: Option<Move>,
    /// Score in centipawns from the root side's perspective.
    pub score: i32,
    /// Deepest fully completed iteration.
    pub depth: i32,
    pub nodes: u64,
    pub elapsed: Duration,
}

/// Progress snapshot emitted after each completed iteration, for UCI
/// `info` lines.
#[derive(Debug, Clone, Copy)]
pub struct DepthReport {
    pub depth: i32,
    pub score: i32,
    pub nodes: u64,
    pub elapsed: Duration,
    pub best_move: Option<Move>,
}

/// Search state: table, evaluator, and per-search bookkeeping.
pub struct Searcher {
    table: TranspositionTable,
    evaluator: Box<dyn Evaluate>,
    stop: Arc<AtomicBool>,
    nodes: u64,
    deadline: Instant,
    stopped: bool,
}

impl Searcher {
    pub fn new(evaluator: Box<dyn Evaluate>, table_size_mb: usize) -> Self {
        Searcher {
            table: TranspositionTable::new(table_size_mb),
            evaluator,
            stop: Arc::new(AtomicBool::new(false)),
            nodes: 0,
            deadline: Instant::now(),
            stopped: false,
        }
    }

    /// A handle another thread can use to end the current search early.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Replaces the transposition table with an empty one of the given
    /// size.
    pub fn set_table_size_mb(&mut self, size_mb: usize) {
        self.table = TranspositionTable::new(size_mb);
    }

    /// Forgets everything learned from previous games.
    pub fn new_game(&mut self) {
        self.table.clear();
    }

    pub fn table(&self) -> &TranspositionTable {
        &self.table
    }

    /// Searches the position for up to `budget`, never deeper than
    /// `max_depth`. `on_depth` fires after every completed iteration.
    pub fn search(
        &mut self,
        board: &mut Board,
        max_depth: i32,
        budget: Duration,
        on_depth: &mut dyn FnMut(DepthReport),
    ) -> SearchResult {
        let start = Instant::now();
        self.nodes = 0;
        self.stopped = false;
        self.stop.store(false, Ordering::Relaxed);
        self.deadline = start + budget;
        self.table.new_search();

        let max_depth = max_depth.clamp(1, MAX_DEPTH);
        let mut result = SearchResult {
            best_move: None,
            score: 0,
            depth: 0,
            nodes: 0,
            elapsed: Duration::ZERO,
        };

        for depth in 1..=max_depth {
            let (score, best_move) = self.negamax(board, depth, 0, -INFINITY, INFINITY);
            if self.stopped {
                break;
            }

            result.score = score;
            result.best_move = best_move;
            result.depth = depth;
            on_depth(DepthReport {
                depth,
                score,
                nodes: self.nodes,
                elapsed: start.elapsed(),
                best_move,
            });

            // No legal moves, or a forced mate: deeper search can only
            // repeat the answer.
            if best_move.is_none() || score.abs() >= MATE_VALUE - MAX_DEPTH {
                break;
            }
        }

        result.nodes = self.nodes;
        result.elapsed = start.elapsed();
        result
    }

    fn check_abort(&mut self) {
        if self.nodes.is_multiple_of(ABORT_CHECK_INTERVAL)
            && (Instant::now() >= self.deadline || self.stop.load(Ordering::Relaxed))
        {
            self.stopped = true;
        }
    }

    /// Returns the score of the position from the side to move's
    /// perspective, with the best move when one was established. An
    /// aborted node returns a dummy score the caller must not use.
    fn negamax(
        &mut self,
        board: &mut Board,
        depth: i32,
        ply: i32,
        mut alpha: i32,
        beta: i32,
    ) -> (i32, Option<Move>) {
        self.nodes += 1;
        self.check_abort();
        if self.stopped {
            return (0, None);
        }

        // Draw rules never end the search at the root; a move is always
        // owed there.
        if ply > 0 && (board.is_repetition() || board.is_fifty_move_draw()) {
            return (0, None);
        }

        let key = board.hash();
        let side = board.side_to_move();
        let table_move = self.table.probe_move(key);
        if ply > 0 {
            if let Some(score) = self.table.probe_score(key, depth, alpha, beta, side) {
                return (score, table_move);
            }
        }

        if depth <= 0 {
            return (self.quiescence(board, alpha, beta), None);
        }

        let mut moves = board.legal_moves();
        if moves.is_empty() {
            if board.in_check() {
                return (-(MATE_VALUE - (MAX_DEPTH - depth)), None);
            }
            return (0, None);
        }
        order_moves(&mut moves, table_move);

        let alpha_orig = alpha;
        let mut best_score = -INFINITY;
        let mut best_move = None;

        for mv in moves {
            board.make_move(mv);
            let (child_score, _) = self.negamax(board, depth - 1, ply + 1, -beta, -alpha);
            board.unmake_move(mv);
            if self.stopped {
                return (0, None);
            }

            let score = -child_score;
            if score > best_score {
                best_score = score;
                best_move = Some(mv);
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                break;
            }
        }

        let bound = if best_score >= beta {
            Bound::Lower
        } else if best_score <= alpha_orig {
            Bound::Upper
        } else {
            Bound::Exact
        };
        self.table.store(key, depth, best_score, bound, best_move, side);

        (best_score, best_move)
    }

    /// Resolves captures and promotions until the position is quiet, so
    /// the evaluation is never taken in the middle of an exchange.
    fn quiescence(&mut self, board: &mut Board, mut alpha: i32, beta: i32) -> i32 {
        self.nodes += 1;
        self.check_abort();
        if self.stopped {
            return 0;
        }

        let moves = board.legal_moves();
        if moves.is_empty() {
            if board.in_check() {
                // Mate at the horizon: the furthest possible mate.
                return -(MATE_VALUE - MAX_DEPTH);
            }
            return 0;
        }

        let stand_pat = self.evaluator.evaluate(board);
        if stand_pat >= beta {
            return beta;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let mut tactical: Vec<Move> = moves
            .into_iter()
            .filter(|mv| mv.is_capture() || mv.promotion.is_some())
            .collect();
        order_moves(&mut tactical, None);

        for mv in tactical {
            board.make_move(mv);
            let score = -self.quiescence(board, -beta, -alpha);
            board.unmake_move(mv);
            if self.stopped {
                return 0;
            }

            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }

        alpha
    }
}

/// Ordering weight for a move. Higher is searched first.
fn move_score(mv: &Move, table_move: Option<Move>) -> i32 {
    if table_move == Some(*mv) {
        return 1_000_000;
    }

    let mut score = 0;
    if mv.is_capture() {
        // Most-valuable-victim, least-valuable-attacker. The en passant
        // victim is always a pawn.
        let victim = mv.captured.map_or(Piece::Pawn.value(), Piece::value);
        score += 1000 + victim - mv.piece.value();
    }
    if mv.promotion.is_some() {
        score += 900;
    }
    if matches!(mv.flag, MoveFlag::CastleKingside | MoveFlag::CastleQueenside) {
        score += 50;
    }
    let file = mv.to.file();
    let rank = mv.to.rank();
    if (file == File::D || file == File::E) && (rank == Rank::R4 || rank == Rank::R5) {
        score += 10;
    }
    score
}

/// Sorts moves best-first. The sort is stable, so ties keep generation
/// order.
fn order_moves(moves: &mut [Move], table_move: Option<Move>) {
    moves.sort_by_key(|mv| std::cmp::Reverse(move_score(mv, table_move)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_core::Square;

    #[test]
    fn table_move_sorts_first() {
        let mut board = Board::startpos();
        let mut moves = board.legal_moves();
        let hint = *moves.last().unwrap();
        order_moves(&mut moves, Some(hint));
        assert_eq!(moves[0], hint);
    }

    #[test]
    fn captures_order_by_victim_then_attacker() {
        let pawn_takes_queen = Move::capture(
            Square::from_algebraic("d4").unwrap(),
            Square::from_algebraic("e5").unwrap(),
            Piece::Pawn,
            Piece::Queen,
        );
        let queen_takes_pawn = Move::capture(
            Square::from_algebraic("d1").unwrap(),
            Square::from_algebraic("d7").unwrap(),
            Piece::Queen,
            Piece::Pawn,
        );
        let quiet = Move::quiet(
            Square::from_algebraic("b1").unwrap(),
            Square::from_algebraic("c3").unwrap(),
            Piece::Knight,
        );
        assert!(move_score(&pawn_takes_queen, None) > move_score(&queen_takes_pawn, None));
        assert!(move_score(&queen_takes_pawn, None) > move_score(&quiet, None));
    }

    #[test]
    fn en_passant_scores_as_pawn_capture() {
        let d5 = Square::from_algebraic("d5").unwrap();
        let e6 = Square::from_algebraic("e6").unwrap();
        let ep = Move::en_passant(d5, e6);
        let plain = Move::capture(d5, e6, Piece::Pawn, Piece::Pawn);
        assert_eq!(move_score(&ep, None), move_score(&plain, None));
    }

    #[test]
    fn central_destinations_break_ties() {
        let center = Move::quiet(
            Square::from_algebraic("b1").unwrap(),
            Square::from_algebraic("d4").unwrap(),
            Piece::Knight,
        );
        let edge = Move::quiet(
            Square::from_algebraic("b1").unwrap(),
            Square::from_algebraic("a3").unwrap(),
            Piece::Knight,
        );
        assert!(move_score(&center, None) > move_score(&edge, None));
    }
}

//! Chess engine: mailbox board, legal move generation, and search.
//!
//! This crate provides:
//! - [`Board`] - 10x12 mailbox position with reversible make/unmake
//! - Legal move generation with full castling, en passant, and promotion
//!   handling, validated by perft
//! - Zobrist fingerprints for repetition detection and hashing
//! - [`TranspositionTable`] - age-aware fixed-size hash table
//! - [`Searcher`] - iterative-deepening negamax with alpha-beta pruning
//!   and quiescence
//! - [`Evaluate`] - pluggable static evaluation, with [`MaterialEval`] as
//!   the material-plus-piece-square default
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use sentinel_engine::{Board, MaterialEval, Searcher};
//!
//! let mut board = Board::startpos();
//! let mut searcher = Searcher::new(Box::new(MaterialEval), 16);
//! let result = searcher.search(&mut board, 4, Duration::from_secs(5), &mut |_| {});
//! assert!(result.best_move.is_some());
//! ```

mod board;
mod eval;
pub mod movegen;
pub mod perft;
mod search;
mod tt;
mod zobrist;

pub use board::{Board, Cell, GameStatus, PositionError};
pub use eval::{Evaluate, MaterialEval};
pub use search::{
    DepthReport, SearchResult, Searcher, INFINITY, MATE_THRESHOLD, MATE_VALUE, MAX_DEPTH,
};
pub use tt::{Bound, TableEntry, TableStats, TranspositionTable};
pub use zobrist::compute as zobrist_hash;

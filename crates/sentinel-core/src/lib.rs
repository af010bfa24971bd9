//! Core types for the sentinel chess engine.
//!
//! Everything here is a plain value type shared by the engine and the
//! protocol layer:
//! - [`Color`] and [`Piece`] for piece identity
//! - [`Square`], [`File`], and [`Rank`] for board coordinates, including
//!   the 10x12 mailbox mapping used by the move generator
//! - [`Move`] and [`MoveFlag`] for fully-described moves
//! - [`CastlingRights`] for the four castling flags
//! - [`FenParser`] for FEN validation and serialization

mod castling;
mod color;
mod fen;
mod mov;
mod piece;
mod square;

pub use castling::CastlingRights;
pub use color::Color;
pub use fen::{FenError, FenParser};
pub use mov::{Move, MoveFlag, UciMove};
pub use piece::Piece;
pub use square::{File, Rank, Square, MAILBOX_SIZE};

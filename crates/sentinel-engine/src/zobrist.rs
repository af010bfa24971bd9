//! Zobrist hashing for position identification.
//!
//! Each position maps to a 64-bit fingerprint by XORing fixed random keys
//! for every occupied square, the castling rights, the en passant file,
//! and the side to move. Equal positions always hash equal; distinct
//! positions collide only with negligible probability, which is what the
//! transposition table and repetition detection rely on.

use sentinel_core::{Color, Square};

use crate::board::Board;

/// Zobrist hash keys.
///
/// Generated at compile time from a fixed seed so fingerprints are stable
/// across runs and builds.
pub struct ZobristKeys {
    /// Keys for pieces: [piece][color][square]
    pub pieces: [[[u64; 64]; 2]; 6],
    /// Key XORed in when black is to move.
    pub black_to_move: u64,
    /// Keys for the four castling rights, in
    /// [`sentinel_core::CastlingRights`] bit order.
    pub castling: [u64; 4],
    /// Keys for the en passant file.
    pub en_passant: [u64; 8],
}

impl ZobristKeys {
    const fn new() -> Self {
        // xorshift64, good enough for key material and usable in const eval
        const fn next_random(state: u64) -> (u64, u64) {
            let mut x = state;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            (x, x)
        }

        let mut state = 0xD1B5_4A32_D192_ED03u64;
        let mut pieces = [[[0u64; 64]; 2]; 6];
        let mut castling = [0u64; 4];
        let mut en_passant = [0u64; 8];

        let mut piece = 0;
        while piece < 6 {
            let mut color = 0;
            while color < 2 {
                let mut square = 0;
                while square < 64 {
                    let (new_state, value) = next_random(state);
                    state = new_state;
                    pieces[piece][color][square] = value;
                    square += 1;
                }
                color += 1;
            }
            piece += 1;
        }

        let mut i = 0;
        while i < 4 {
            let (new_state, value) = next_random(state);
            state = new_state;
            castling[i] = value;
            i += 1;
        }

        let mut i = 0;
        while i < 8 {
            let (new_state, value) = next_random(state);
            state = new_state;
            en_passant[i] = value;
            i += 1;
        }

        let (_, black_to_move) = next_random(state);

        ZobristKeys {
            pieces,
            black_to_move,
            castling,
            en_passant,
        }
    }
}

/// The global key table.
pub static KEYS: ZobristKeys = ZobristKeys::new();

/// Computes the fingerprint of a position from scratch.
pub fn compute(board: &Board) -> u64 {
    let mut hash = 0u64;

    for idx in 0..64u8 {
        let square = match Square::from_index(idx) {
            Some(sq) => sq,
            None => continue,
        };
        if let Some((color, piece)) = board.piece_at(square) {
            hash ^= KEYS.pieces[piece.index()][color.index()][idx as usize];
        }
    }

    let rights = board.castling().raw();
    for bit in 0..4 {
        if rights & (1 << bit) != 0 {
            hash ^= KEYS.castling[bit];
        }
    }

    if let Some(target) = board.en_passant() {
        hash ^= KEYS.en_passant[target.file().index() as usize];
    }

    if board.side_to_move() == Color::Black {
        hash ^= KEYS.black_to_move;
    }

    hash
}

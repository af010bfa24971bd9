//! Perft: exhaustive move-path counting for move generator validation.
//!
//! `perft(board, depth)` counts the leaf nodes of the legal move tree.
//! The counts for well-known positions are published and exercise every
//! special rule at once, so a single mismatch pinpoints a generation or
//! make/unmake bug.

use crate::board::Board;

/// Counts leaf nodes of the legal move tree to the given depth.
pub fn perft(board: &mut Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = board.legal_moves();
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for mv in moves {
        board.make_move(mv);
        nodes += perft(board, depth - 1);
        board.unmake_move(mv);
    }
    nodes
}

/// Per-root-move breakdown, matching the output of `go perft` style
/// commands. Useful when chasing a count mismatch.
pub fn perft_divide(board: &mut Board, depth: u32) -> Vec<(String, u64)> {
    let mut results = Vec::new();
    for mv in board.legal_moves() {
        board.make_move(mv);
        let nodes = if depth <= 1 {
            1
        } else {
            perft(board, depth - 1)
        };
        board.unmake_move(mv);
        results.push((mv.to_uci(), nodes));
    }
    results
}

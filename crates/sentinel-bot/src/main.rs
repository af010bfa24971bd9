//! UCI chess engine binary.
//!
//! Speaks the UCI protocol on stdin/stdout and drives the sentinel
//! search. The search runs on the calling thread; `stop` and time
//! controls end it through the searcher's stop handle and deadline.

use std::io::{BufReader, Stdin, Stdout};
use std::sync::atomic::Ordering;
use std::time::Duration;

use sentinel_core::{Color, File, Rank, Square, UciMove};
use sentinel_engine::{
    perft, Board, DepthReport, Evaluate, MaterialEval, Searcher, MATE_THRESHOLD, MATE_VALUE,
    MAX_DEPTH,
};
use sentinel_uci::{stdio_session, GoOptions, GuiCommand, InfoBuilder, Score, UciSession};

type StdioSession = UciSession<BufReader<Stdin>, Stdout>;

const NAME: &str = "Sentinel";
const AUTHOR: &str = "the Sentinel developers";

const DEFAULT_MOVETIME: Duration = Duration::from_secs(1);
/// Effectively unbounded; used when only a depth limit was given.
const NO_DEADLINE: Duration = Duration::from_secs(3600);

/// Picks the time to spend on one move from the `go` parameters.
fn time_budget(opts: &GoOptions, side: Color) -> Duration {
    if let Some(ms) = opts.movetime {
        return Duration::from_millis(ms);
    }
    if opts.infinite {
        return NO_DEADLINE;
    }

    let clock = match side {
        Color::White => opts.wtime,
        Color::Black => opts.btime,
    };
    match clock {
        // A flat fraction of the remaining clock.
        Some(ms) => Duration::from_millis((ms / 40).max(10)),
        None if opts.depth.is_some() => NO_DEADLINE,
        None => DEFAULT_MOVETIME,
    }
}

/// Translates an engine score into a UCI score, turning mate scores into
/// a signed full-move distance.
fn uci_score(score: i32, depth: i32) -> Score {
    if score >= MATE_THRESHOLD {
        let plies = (depth - (score - (MATE_VALUE - MAX_DEPTH))).max(1);
        Score::Mate((plies + 1) / 2)
    } else if score <= -MATE_THRESHOLD {
        let plies = (depth - (-score - (MATE_VALUE - MAX_DEPTH))).max(1);
        Score::Mate(-(plies + 1) / 2)
    } else {
        Score::Cp(score)
    }
}

fn send_depth_report(session: &mut StdioSession, report: &DepthReport) {
    let millis = report.elapsed.as_millis() as u64;
    let nps = if millis > 0 {
        report.nodes * 1000 / millis
    } else {
        report.nodes
    };
    let mut builder = InfoBuilder::new()
        .depth(report.depth as u32)
        .nodes(report.nodes)
        .nps(nps)
        .time(millis);
    builder = match uci_score(report.score, report.depth) {
        Score::Cp(cp) => builder.score_cp(cp),
        Score::Mate(m) => builder.score_mate(m),
    };
    if let Some(mv) = report.best_move {
        builder = builder.pv(vec![mv.to_uci()]);
    }
    session.send_info(builder.build()).ok();
}

/// Rebuilds the board from a `position` command. Unparseable FENs fall
/// back to the start position; unplayable moves are skipped.
fn set_position(fen: Option<String>, moves: Vec<String>) -> Board {
    let mut board = match fen {
        Some(fen) => Board::from_fen(&fen).unwrap_or_else(|_| Board::startpos()),
        None => Board::startpos(),
    };
    for text in moves {
        let Some(parsed) = UciMove::parse(&text) else {
            continue;
        };
        if let Some(mv) = board.find_move(parsed) {
            board.make_move(mv);
        }
    }
    board
}

/// Console-style board printout for the `d`/`display` debug command.
fn render_board(board: &Board) -> String {
    let mut out = String::from("   a b c d e f g h\n");
    for &rank in Rank::ALL.iter().rev() {
        out.push(rank.to_char());
        out.push_str("  ");
        for file in File::ALL {
            match board.piece_at(Square::new(file, rank)) {
                Some((color, piece)) => out.push(piece.to_fen_char(color)),
                None => out.push('.'),
            }
            out.push(' ');
        }
        out.push(' ');
        out.push(rank.to_char());
        out.push('\n');
    }
    out.push_str("   a b c d e f g h");
    out
}

fn run_display(session: &mut StdioSession, board: &mut Board) {
    session.send_line(&render_board(board)).ok();
    session.send_line(&format!("FEN: {}", board.to_fen())).ok();
    session
        .send_line(&format!("Legal moves: {}", board.legal_moves().len()))
        .ok();
}

fn white_perspective_eval(board: &Board) -> i32 {
    let score = MaterialEval.evaluate(board);
    match board.side_to_move() {
        Color::White => score,
        Color::Black => -score,
    }
}

fn run_eval(session: &mut StdioSession, board: &Board) {
    session
        .send_line(&format!(
            "Evaluation: {} (from White's perspective)",
            white_perspective_eval(board)
        ))
        .ok();
}

fn run_perft(session: &mut StdioSession, board: &mut Board, depth: u32) {
    let mut total = 0u64;
    for (mv, nodes) in perft::perft_divide(board, depth) {
        session.send_line(&format!("{}: {}", mv, nodes)).ok();
        total += nodes;
    }
    session.send_line(&format!("Nodes searched: {}", total)).ok();
}

fn run_search(session: &mut StdioSession, searcher: &mut Searcher, board: &mut Board, opts: &GoOptions) {
    let budget = time_budget(opts, board.side_to_move());
    let max_depth = opts.depth.map_or(MAX_DEPTH, |d| d as i32);

    let result = searcher.search(board, max_depth, budget, &mut |report| {
        send_depth_report(session, &report);
    });

    let best = result.best_move.or_else(|| {
        // A search cut off before depth 1 completed still owes a move if
        // one exists.
        board.legal_moves().first().copied()
    });
    match best {
        Some(mv) => session.send_bestmove(&mv.to_uci()).ok(),
        None => session.send_bestmove("0000").ok(),
    };
}

fn apply_option(searcher: &mut Searcher, name: &str, value: Option<&str>) {
    match name {
        "Hash" => {
            if let Some(mb) = value.and_then(|v| v.parse::<usize>().ok()) {
                searcher.set_table_size_mb(mb.clamp(1, 1024));
            }
        }
        "Clear Hash" => searcher.new_game(),
        _ => {}
    }
}

fn main() {
    let mut session = stdio_session();
    let mut searcher = Searcher::new(Box::new(MaterialEval), 16);
    let mut board = Board::startpos();

    loop {
        let cmd = match session.read_command() {
            Ok(cmd) => cmd,
            Err(e) => {
                eprintln!("error reading command: {}", e);
                continue;
            }
        };

        match cmd {
            GuiCommand::Uci => {
                session.send_id(NAME, AUTHOR).ok();
                session
                    .send_option("name Hash type spin default 16 min 1 max 1024")
                    .ok();
                session.send_option("name Clear Hash type button").ok();
                session.send_uciok().ok();
            }

            GuiCommand::IsReady => {
                session.send_readyok().ok();
            }

            GuiCommand::NewGame => {
                searcher.new_game();
                board = Board::startpos();
            }

            GuiCommand::SetOption { name, value } => {
                apply_option(&mut searcher, &name, value.as_deref());
            }

            GuiCommand::Position { fen, moves } => {
                board = set_position(fen, moves);
            }

            GuiCommand::Go(opts) => {
                if let Some(depth) = opts.perft {
                    run_perft(&mut session, &mut board, depth);
                } else {
                    run_search(&mut session, &mut searcher, &mut board, &opts);
                }
            }

            GuiCommand::Stop => {
                // The search blocks this loop, so a stop read here has
                // nothing left to end. Raising the flag is harmless.
                searcher.stop_handle().store(true, Ordering::Relaxed);
            }

            GuiCommand::Display => {
                run_display(&mut session, &mut board);
            }

            GuiCommand::Eval => {
                run_eval(&mut session, &board);
            }

            GuiCommand::Quit => {
                break;
            }

            GuiCommand::Unknown(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movetime_is_exact() {
        let opts = GoOptions {
            movetime: Some(2500),
            ..Default::default()
        };
        assert_eq!(
            time_budget(&opts, Color::White),
            Duration::from_millis(2500)
        );
    }

    #[test]
    fn clock_time_is_divided() {
        let opts = GoOptions {
            wtime: Some(60_000),
            btime: Some(40_000),
            ..Default::default()
        };
        assert_eq!(
            time_budget(&opts, Color::White),
            Duration::from_millis(1500)
        );
        assert_eq!(
            time_budget(&opts, Color::Black),
            Duration::from_millis(1000)
        );
    }

    #[test]
    fn depth_only_searches_without_deadline() {
        let opts = GoOptions {
            depth: Some(6),
            ..Default::default()
        };
        assert_eq!(time_budget(&opts, Color::White), NO_DEADLINE);
    }

    #[test]
    fn bare_go_uses_the_default() {
        assert_eq!(
            time_budget(&GoOptions::default(), Color::White),
            DEFAULT_MOVETIME
        );
    }

    #[test]
    fn mate_scores_become_move_counts() {
        // A mate in one found at depth 1.
        let mate_in_one = MATE_VALUE - MAX_DEPTH + 1 - 1;
        assert_eq!(uci_score(mate_in_one, 1), Score::Mate(1));
        assert_eq!(uci_score(-mate_in_one, 1), Score::Mate(-1));
        assert_eq!(uci_score(150, 5), Score::Cp(150));
    }

    #[test]
    fn position_command_replays_moves() {
        let board = set_position(None, vec!["e2e4".to_string(), "e7e5".to_string()]);
        assert_eq!(board.fullmove_number(), 2);
        assert_eq!(board.side_to_move(), Color::White);
    }

    #[test]
    fn board_printout_matches_the_console_layout() {
        let text = render_board(&Board::startpos());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "   a b c d e f g h");
        assert_eq!(lines[1], "8  r n b q k b n r  8");
        assert_eq!(lines[5], "4  . . . . . . . .  4");
        assert_eq!(lines[8], "1  R N B Q K B N R  1");
        assert_eq!(lines[9], "   a b c d e f g h");
    }

    #[test]
    fn eval_reports_from_whites_perspective() {
        let white_up = Board::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        let same_black_to_move = Board::from_fen("4k3/8/8/8/8/8/8/3QK3 b - - 0 1").unwrap();
        let score = white_perspective_eval(&white_up);
        assert!(score > 0);
        assert_eq!(white_perspective_eval(&same_black_to_move), score);
    }

    #[test]
    fn illegal_replayed_moves_are_skipped() {
        let board = set_position(
            None,
            vec!["e2e5".to_string(), "e2e4".to_string(), "junk".to_string()],
        );
        // Only e2e4 applies.
        assert_eq!(board.side_to_move(), Color::Black);
        assert_eq!(board.fullmove_number(), 1);
    }
}

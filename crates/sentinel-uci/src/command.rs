//! UCI command parsing.

use crate::UciError;

/// Commands sent from GUI to engine.
#[derive(Debug, Clone, PartialEq)]
pub enum GuiCommand {
    /// Initialize UCI mode.
    Uci,
    /// Check if engine is ready.
    IsReady,
    /// Forget state from the previous game.
    NewGame,
    /// Change an engine option.
    SetOption { name: String, value: Option<String> },
    /// Set up position.
    Position {
        fen: Option<String>,
        moves: Vec<String>,
    },
    /// Start calculating.
    Go(GoOptions),
    /// Stop calculating.
    Stop,
    /// Print the board to the console (`d` or `display`, debug aid).
    Display,
    /// Print the static evaluation (debug aid).
    Eval,
    /// Quit the engine.
    Quit,
    /// Unknown command (for forward compatibility).
    Unknown(String),
}

/// Options for the `go` command.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GoOptions {
    /// Search for exactly this time in milliseconds.
    pub movetime: Option<u64>,
    /// Search to this depth.
    pub depth: Option<u32>,
    /// White time remaining in milliseconds.
    pub wtime: Option<u64>,
    /// Black time remaining in milliseconds.
    pub btime: Option<u64>,
    /// White increment per move in milliseconds.
    pub winc: Option<u64>,
    /// Black increment per move in milliseconds.
    pub binc: Option<u64>,
    /// Moves to go until next time control.
    pub movestogo: Option<u32>,
    /// Search indefinitely until `stop`.
    pub infinite: bool,
    /// Count move paths to this depth instead of searching.
    pub perft: Option<u32>,
}

impl GuiCommand {
    /// Parses a UCI command line.
    pub fn parse(input: &str) -> Result<Self, UciError> {
        let input = input.trim();
        let mut parts = parts_of(input);

        match parts.next().unwrap_or("") {
            "uci" => Ok(GuiCommand::Uci),
            "isready" => Ok(GuiCommand::IsReady),
            "ucinewgame" => Ok(GuiCommand::NewGame),
            "setoption" => Self::parse_setoption(parts),
            "position" => Self::parse_position(parts),
            "go" => Self::parse_go(parts),
            "stop" => Ok(GuiCommand::Stop),
            "d" | "display" => Ok(GuiCommand::Display),
            "eval" => Ok(GuiCommand::Eval),
            "quit" => Ok(GuiCommand::Quit),
            _ => Ok(GuiCommand::Unknown(input.to_string())),
        }
    }

    /// `setoption name <name...> [value <value...>]`
    fn parse_setoption<'a>(parts: impl Iterator<Item = &'a str>) -> Result<Self, UciError> {
        let tokens: Vec<&str> = parts.collect();
        if tokens.first() != Some(&"name") {
            return Err(UciError::ParseError(
                "setoption requires 'name'".to_string(),
            ));
        }

        let value_at = tokens.iter().position(|&t| t == "value");
        let name_end = value_at.unwrap_or(tokens.len());
        let name = tokens[1..name_end].join(" ");
        if name.is_empty() {
            return Err(UciError::ParseError("setoption with empty name".to_string()));
        }

        let value = value_at.map(|idx| tokens[idx + 1..].join(" "));
        Ok(GuiCommand::SetOption { name, value })
    }

    fn parse_position<'a>(mut parts: impl Iterator<Item = &'a str>) -> Result<Self, UciError> {
        let fen = match parts.next() {
            Some("startpos") => None,
            Some("fen") => {
                let mut fields = Vec::new();
                for part in parts.by_ref() {
                    if part == "moves" {
                        break;
                    }
                    fields.push(part);
                }
                if fields.is_empty() {
                    return Err(UciError::ParseError("position fen without a FEN".to_string()));
                }
                Some(fields.join(" "))
            }
            Some(other) => {
                return Err(UciError::ParseError(format!(
                    "expected 'startpos' or 'fen', got '{}'",
                    other
                )));
            }
            None => {
                return Err(UciError::ParseError(
                    "expected 'startpos' or 'fen'".to_string(),
                ));
            }
        };

        // In the startpos form the "moves" keyword is still ahead of us; in
        // the fen form the loop above already consumed it.
        let rest: Vec<&str> = parts.collect();
        let moves = match rest.iter().position(|&t| t == "moves") {
            Some(idx) => rest[idx + 1..].iter().map(|s| s.to_string()).collect(),
            None if fen.is_some() => rest.iter().map(|s| s.to_string()).collect(),
            None => Vec::new(),
        };

        Ok(GuiCommand::Position { fen, moves })
    }

    fn parse_go<'a>(mut parts: impl Iterator<Item = &'a str>) -> Result<Self, UciError> {
        let mut opts = GoOptions::default();

        while let Some(keyword) = parts.next() {
            match keyword {
                "movetime" => opts.movetime = next_number(&mut parts),
                "depth" => opts.depth = next_number(&mut parts),
                "wtime" => opts.wtime = next_number(&mut parts),
                "btime" => opts.btime = next_number(&mut parts),
                "winc" => opts.winc = next_number(&mut parts),
                "binc" => opts.binc = next_number(&mut parts),
                "movestogo" => opts.movestogo = next_number(&mut parts),
                "perft" => opts.perft = next_number(&mut parts),
                "infinite" => opts.infinite = true,
                // Unrecognized go parameters are ignored.
                _ => {}
            }
        }

        Ok(GuiCommand::Go(opts))
    }
}

fn parts_of(input: &str) -> impl Iterator<Item = &str> {
    input.split_whitespace()
}

fn next_number<'a, T: std::str::FromStr>(
    parts: &mut impl Iterator<Item = &'a str>,
) -> Option<T> {
    parts.next().and_then(|t| t.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_commands() {
        assert_eq!(GuiCommand::parse("uci").unwrap(), GuiCommand::Uci);
        assert_eq!(GuiCommand::parse("isready").unwrap(), GuiCommand::IsReady);
        assert_eq!(GuiCommand::parse("ucinewgame").unwrap(), GuiCommand::NewGame);
        assert_eq!(GuiCommand::parse("stop").unwrap(), GuiCommand::Stop);
        assert_eq!(GuiCommand::parse("quit").unwrap(), GuiCommand::Quit);
        assert_eq!(GuiCommand::parse("  uci  ").unwrap(), GuiCommand::Uci);
    }

    #[test]
    fn parse_debug_commands() {
        assert_eq!(GuiCommand::parse("d").unwrap(), GuiCommand::Display);
        assert_eq!(GuiCommand::parse("display").unwrap(), GuiCommand::Display);
        assert_eq!(GuiCommand::parse("eval").unwrap(), GuiCommand::Eval);
    }

    #[test]
    fn parse_unknown_command() {
        assert_eq!(
            GuiCommand::parse("xyzzy 42").unwrap(),
            GuiCommand::Unknown("xyzzy 42".to_string())
        );
    }

    #[test]
    fn parse_position_startpos() {
        let cmd = GuiCommand::parse("position startpos").unwrap();
        assert_eq!(
            cmd,
            GuiCommand::Position {
                fen: None,
                moves: vec![]
            }
        );
    }

    #[test]
    fn parse_position_startpos_with_moves() {
        let cmd = GuiCommand::parse("position startpos moves e2e4 e7e5").unwrap();
        assert_eq!(
            cmd,
            GuiCommand::Position {
                fen: None,
                moves: vec!["e2e4".to_string(), "e7e5".to_string()]
            }
        );
    }

    #[test]
    fn parse_position_fen() {
        let cmd = GuiCommand::parse(
            "position fen rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
        )
        .unwrap();
        assert_eq!(
            cmd,
            GuiCommand::Position {
                fen: Some(
                    "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1".to_string()
                ),
                moves: vec![]
            }
        );
    }

    #[test]
    fn parse_position_fen_with_moves() {
        let cmd =
            GuiCommand::parse("position fen 8/8/8/8/8/8/8/K6k w - - 0 1 moves a1a2").unwrap();
        assert_eq!(
            cmd,
            GuiCommand::Position {
                fen: Some("8/8/8/8/8/8/8/K6k w - - 0 1".to_string()),
                moves: vec!["a1a2".to_string()]
            }
        );
    }

    #[test]
    fn parse_position_rejects_garbage() {
        assert!(GuiCommand::parse("position sideways").is_err());
        assert!(GuiCommand::parse("position").is_err());
        assert!(GuiCommand::parse("position fen").is_err());
    }

    #[test]
    fn parse_go_parameters() {
        let cmd = GuiCommand::parse("go wtime 60000 btime 55000 winc 1000 binc 1000 movestogo 35")
            .unwrap();
        let GuiCommand::Go(opts) = cmd else {
            panic!("expected go");
        };
        assert_eq!(opts.wtime, Some(60_000));
        assert_eq!(opts.btime, Some(55_000));
        assert_eq!(opts.winc, Some(1_000));
        assert_eq!(opts.binc, Some(1_000));
        assert_eq!(opts.movestogo, Some(35));
        assert!(!opts.infinite);
    }

    #[test]
    fn parse_go_movetime_and_depth() {
        let GuiCommand::Go(opts) = GuiCommand::parse("go movetime 1000 depth 10").unwrap() else {
            panic!("expected go");
        };
        assert_eq!(opts.movetime, Some(1000));
        assert_eq!(opts.depth, Some(10));
    }

    #[test]
    fn parse_go_infinite() {
        let GuiCommand::Go(opts) = GuiCommand::parse("go infinite").unwrap() else {
            panic!("expected go");
        };
        assert!(opts.infinite);
    }

    #[test]
    fn parse_go_perft() {
        let GuiCommand::Go(opts) = GuiCommand::parse("go perft 5").unwrap() else {
            panic!("expected go");
        };
        assert_eq!(opts.perft, Some(5));
    }

    #[test]
    fn parse_setoption() {
        assert_eq!(
            GuiCommand::parse("setoption name Hash value 64").unwrap(),
            GuiCommand::SetOption {
                name: "Hash".to_string(),
                value: Some("64".to_string())
            }
        );
        assert_eq!(
            GuiCommand::parse("setoption name Clear Hash").unwrap(),
            GuiCommand::SetOption {
                name: "Clear Hash".to_string(),
                value: None
            }
        );
        assert!(GuiCommand::parse("setoption Hash 64").is_err());
    }
}

use crate::board::Outcome;
use crate::error::ChessError;
use crate::evaluation::Evaluation;
use crate::game::{Game, GameStatus};
use crate::search::{Engine, SearchOptions};
use crate::square::parse_square;

use regex::Regex;
use rustyline::config::Configurer;
use rustyline::Editor;
use std::time::Duration;

const HELP: &str = "commands:
  new                       start a new game
  fen <FEN>                 set up a position
  show                      print the board
  moves [square]            list legal moves, of one piece if a square is given
  play <move>               play a move such as e2e4 or e7e8q
  go [depth N] [time MS] [nodes N]
                            let the engine play the side to move
  undo                      take back the last move of each side
  eval                      static evaluation for the side to move
  hash                      position key
  status                    side to move, check and game end
  set depth|time <value>    change the default search limits
  quit";

/// Interactive shell to play against the engine
pub struct Console {
    session: Session,
    editor: Editor<()>,
}
impl Default for Console {
    fn default() -> Self {
        let mut editor = Editor::<()>::new();
        editor.set_auto_add_history(true);
        editor.set_check_cursor_position(true);
        Console { session: Session::default(), editor }
    }
}
impl Console {
    pub fn run(&mut self) {
        while let Ok(line) = self.editor.readline("rookie> ") {
            match self.session.handle_command(&line) {
                Ok(Reply::Quit) => break,
                Ok(Reply::Output(text)) => println!("{}", text),
                Ok(Reply::Nothing) | Err(ConsoleErrCode::NoCommand) => (),
                Err(ConsoleErrCode::BadCommand(cmd)) => {
                    eprintln!("Unknown or badly formed command: {} (try help)", cmd)
                }
                Err(ConsoleErrCode::MissingArg(arg)) => {
                    eprintln!("Missing an argument: {} {} <- here", line.trim(), arg)
                }
                Err(ConsoleErrCode::BadValue(value)) => eprintln!("Bad value: {}", value),
                Err(ConsoleErrCode::Chess(e)) => eprintln!("{}", e),
            }
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Reply {
    Output(String),
    Nothing,
    Quit,
}

#[derive(Debug, PartialEq)]
pub enum ConsoleErrCode {
    NoCommand,
    BadCommand(String),
    MissingArg(String),
    BadValue(String),
    Chess(ChessError),
}
impl From<ChessError> for ConsoleErrCode {
    fn from(e: ChessError) -> Self {
        ConsoleErrCode::Chess(e)
    }
}

/// The state behind the shell: one game, the engine playing it and the
/// default search limits
pub struct Session {
    game: Game,
    engine: Engine,
    options: SearchOptions,
    args_regex: Regex,
}
impl Default for Session {
    fn default() -> Self {
        Session {
            game: Game::new(),
            engine: Engine::new(),
            options: SearchOptions::default(),
            args_regex: Regex::new(r#"(".*?"|[^"\s]+)"#).unwrap(),
        }
    }
}
impl Session {
    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn handle_command(&mut self, line: &str) -> Result<Reply, ConsoleErrCode> {
        let words: Vec<&str> = self.args_regex.find_iter(line).map(|m| m.as_str()).collect();
        let mut args = words.iter().copied();
        let cmd = args.next().ok_or(ConsoleErrCode::NoCommand)?;

        let reply = match cmd {
            "new" => {
                self.game = Game::new();
                Reply::Nothing
            }
            "fen" => {
                let fen = args.collect::<Vec<_>>().join(" ").replace('"', "");
                if fen.is_empty() {
                    return Err(ConsoleErrCode::MissingArg(String::from("<FEN>")));
                }
                self.game = Game::from_fen(&fen)?;
                Reply::Nothing
            }
            "show" => Reply::Output(self.game.board().to_string()),
            "moves" => {
                let moves = match args.next() {
                    Some(s) => {
                        let sq = parse_square(s).ok_or_else(|| ConsoleErrCode::BadValue(s.to_string()))?;
                        self.game.legal_moves(sq)
                    }
                    None => self.game.all_legal_moves(),
                };
                Reply::Output(moves.to_string())
            }
            "play" => {
                let mv = args.next().ok_or_else(|| ConsoleErrCode::MissingArg(String::from("<move>")))?;
                self.game.play_str(mv)?;
                self.after_move()
            }
            "go" => self.go(args)?,
            "undo" => {
                if self.game.take_back_turn().is_err() {
                    self.game.take_back()?;
                }
                Reply::Nothing
            }
            "eval" => {
                let side = self.game.board().side_to_move();
                Reply::Output(format!(
                    "{} cp for {}",
                    Evaluation::evaluate(self.game.board(), side),
                    side.name()
                ))
            }
            "hash" => Reply::Output(format!("{:#018x}", self.game.board().hash())),
            "status" => Reply::Output(describe(&self.game.status())),
            "set" => {
                let (name, value) = match (args.next(), args.next()) {
                    (Some(n), Some(v)) => (n, v),
                    (Some(_), None) => return Err(ConsoleErrCode::MissingArg(String::from("<value>"))),
                    _ => return Err(ConsoleErrCode::MissingArg(String::from("<depth | time>"))),
                };
                match name {
                    "depth" => {
                        self.options.set_depth(parse_value(value)?);
                    }
                    "time" => {
                        self.options.set_time(Duration::from_millis(parse_value(value)?));
                    }
                    _ => return Err(ConsoleErrCode::BadCommand(format!("set {}", name))),
                }
                Reply::Nothing
            }
            "help" => Reply::Output(HELP.to_string()),
            "quit" => Reply::Quit,
            _ => return Err(ConsoleErrCode::BadCommand(String::from(cmd))),
        };
        Ok(reply)
    }

    /// Searches with the default limits, overridden by `depth N`, `time MS`
    /// and `nodes N` pairs, then plays the move found
    fn go<'a, I: Iterator<Item = &'a str>>(&mut self, mut args: I) -> Result<Reply, ConsoleErrCode> {
        let mut options = self.options.clone();
        while let Some(name) = args.next() {
            let value = args.next().ok_or_else(|| ConsoleErrCode::MissingArg(String::from("<value>")))?;
            match name {
                "depth" => {
                    options.set_depth(parse_value(value)?);
                }
                "time" => {
                    options.set_time(Duration::from_millis(parse_value(value)?));
                }
                "nodes" => {
                    options.set_nodes_to_search(Some(parse_value(value)?));
                }
                _ => return Err(ConsoleErrCode::BadCommand(format!("go {}", name))),
            }
        }

        let search = self.game.think(&mut self.engine, &options);
        match search.best_move {
            Some(mv) => {
                self.game.play_move(mv)?;
                let mut output = format!("{}\nbestmove {}", search, mv);
                if let Reply::Output(end) = self.after_move() {
                    output.push('\n');
                    output.push_str(&end);
                }
                Ok(Reply::Output(output))
            }
            None => Ok(Reply::Output(String::from("no move available"))),
        }
    }

    /// Announces the end of the game, if the last move ended it
    fn after_move(&mut self) -> Reply {
        let status = self.game.status();
        if status.outcome == Outcome::Ongoing {
            Reply::Nothing
        } else {
            Reply::Output(describe(&status))
        }
    }
}

fn parse_value<T: std::str::FromStr>(value: &str) -> Result<T, ConsoleErrCode> {
    value.parse::<T>().map_err(|_| ConsoleErrCode::BadValue(value.to_string()))
}

fn describe(status: &GameStatus) -> String {
    match status.outcome {
        Outcome::Ongoing => format!(
            "{} to move{}",
            status.side_to_move.name(),
            if status.in_check { ", in check" } else { "" }
        ),
        Outcome::Checkmate { winner } => format!("checkmate, {} wins", winner.name()),
        Outcome::Stalemate => String::from("stalemate, draw"),
        Outcome::InsufficientMaterial => String::from("insufficient material, draw"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    fn output(session: &mut Session, line: &str) -> String {
        match session.handle_command(line) {
            Ok(Reply::Output(text)) => text,
            other => panic!("{} gave {:?}", line, other),
        }
    }

    #[test]
    fn playing_and_undoing() {
        let mut session = Session::default();
        assert_eq!(session.handle_command("play e2e4"), Ok(Reply::Nothing));
        assert_eq!(session.handle_command("play e7e5"), Ok(Reply::Nothing));
        assert_eq!(session.handle_command("undo"), Ok(Reply::Nothing));
        assert_eq!(session.game().board(), &Board::new());

        session.handle_command("play e2e4").unwrap();
        assert_eq!(session.handle_command("undo"), Ok(Reply::Nothing));
        assert_eq!(session.game().board(), &Board::new());
        assert!(matches!(session.handle_command("undo"), Err(ConsoleErrCode::Chess(ChessError::NothingToTakeBack))));
    }

    #[test]
    fn errors_are_reported() {
        let mut session = Session::default();
        assert_eq!(session.handle_command("   "), Err(ConsoleErrCode::NoCommand));
        assert_eq!(session.handle_command("castle"), Err(ConsoleErrCode::BadCommand("castle".to_string())));
        assert_eq!(session.handle_command("play"), Err(ConsoleErrCode::MissingArg("<move>".to_string())));
        assert!(matches!(session.handle_command("play e2e5"), Err(ConsoleErrCode::Chess(ChessError::IllegalMove { .. }))));
        assert_eq!(session.handle_command("set depth deep"), Err(ConsoleErrCode::BadValue("deep".to_string())));
        assert!(matches!(session.handle_command("fen 8/8 w"), Err(ConsoleErrCode::Chess(ChessError::InvalidFen { .. }))));
        // a king left en prise is refused and the shell keeps its game
        assert!(matches!(
            session.handle_command("fen 4k3/8/8/8/8/8/8/3KR3 w - - 0 1"),
            Err(ConsoleErrCode::Chess(ChessError::InvalidFen { .. }))
        ));
        assert_eq!(session.game().board(), &Board::new());
        assert_eq!(output(&mut session, "status"), "white to move");
    }

    #[test]
    fn fools_mate_is_announced() {
        let mut session = Session::default();
        for mv in ["f2f3", "e7e5", "g2g4"] {
            session.handle_command(&format!("play {}", mv)).unwrap();
        }
        assert_eq!(output(&mut session, "play d8h4"), "checkmate, black wins");
        assert_eq!(output(&mut session, "status"), "checkmate, black wins");
    }

    #[test]
    fn engine_plays_its_move() {
        let mut session = Session::default();
        session.handle_command("fen \"6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1\"").unwrap();
        assert_eq!(output(&mut session, "status"), "white to move");
        let reply = output(&mut session, "go depth 2 time 10000");
        assert!(reply.contains("bestmove a1a8"));
        assert!(reply.ends_with("checkmate, white wins"));
    }

    #[test]
    fn listing_moves() {
        let mut session = Session::default();
        assert_eq!(output(&mut session, "moves g1"), "g1f3 g1h3");
        assert_eq!(output(&mut session, "moves").split(' ').count(), 20);
        assert_eq!(output(&mut session, "eval"), "0 cp for white");
        assert_eq!(session.handle_command("moves z9"), Err(ConsoleErrCode::BadValue("z9".to_string())));
    }
}

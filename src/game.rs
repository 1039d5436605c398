use crate::board::{Board, Outcome};
use crate::error::{ChessError, ChessResult};
use crate::history::UndoRecord;
use crate::move_generator::{generate, legal_moves, GenType};
use crate::movelist::MoveList;
use crate::piece::{Color, Piece, PieceType};
use crate::r#move::Move;
use crate::search::{Engine, Search, SearchOptions};
use crate::square::Square;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GameStatus {
    pub side_to_move: Color,
    pub in_check: bool,
    pub outcome: Outcome,
}

/// A game being played: the board and every move that led to it,
/// each one kept with what is needed to take it back
#[derive(Clone, Debug, Default)]
pub struct Game {
    board: Board,
    history: Vec<UndoRecord>,
}

impl Game {
    pub fn new() -> Game {
        Game { board: Board::new(), history: vec![] }
    }

    pub fn from_fen(fen: &str) -> ChessResult<Game> {
        Ok(Game { board: Board::from_fen(fen)?, history: vec![] })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Plays a move given by its squares. A promotion with no requested piece
    /// promotes to a queen. The board is left untouched on failure.
    pub fn play(&mut self, from: Square, to: Square, promotion: Option<PieceType>) -> ChessResult<Move> {
        let piece = self.board.piece_at(from).ok_or(ChessError::NoPieceAt(from))?;
        let to_move = self.board.side_to_move();
        if piece.color != to_move {
            return Err(ChessError::WrongSide { square: from, owner: piece.color, to_move });
        }

        let wanted = promotion.unwrap_or(PieceType::Queen);
        let mv = legal_moves(&mut self.board, from)
            .iter()
            .copied()
            .find(|m| m.target() == to && m.promotion_target().map_or(true, |p| p == wanted))
            .ok_or(ChessError::IllegalMove { from, to })?;
        self.push(mv);
        Ok(mv)
    }

    /// Plays a move written in coordinate notation, such as "e2e4" or "e7e8n"
    pub fn play_str(&mut self, text: &str) -> ChessResult<Move> {
        let (from, to, promotion) = Move::parse(text).ok_or_else(|| ChessError::BadMoveFormat(text.to_owned()))?;
        self.play(from, to, promotion)
    }

    /// Plays a move that has to be one of the legal moves of the position
    pub fn play_move(&mut self, mv: Move) -> ChessResult<()> {
        if !generate(&mut self.board, GenType::Legal).contains(&mv) {
            return Err(ChessError::IllegalMove { from: mv.origin(), to: mv.target() });
        }
        self.push(mv);
        Ok(())
    }

    fn push(&mut self, mv: Move) {
        let record = self.board.make(mv);
        self.history.push(record);
    }

    /// Takes back a single ply
    pub fn take_back(&mut self) -> ChessResult<Move> {
        let record = self.history.pop().ok_or(ChessError::NothingToTakeBack)?;
        let mv = record.move_played;
        self.board.undo(record);
        Ok(mv)
    }

    /// Takes back the last move of each player, or nothing at all if
    /// fewer than two plies were played
    pub fn take_back_turn(&mut self) -> ChessResult<()> {
        if self.history.len() < 2 {
            return Err(ChessError::NothingToTakeBack);
        }
        self.take_back()?;
        self.take_back()?;
        Ok(())
    }

    pub fn last_move(&self) -> Option<Move> {
        self.history.last().map(|r| r.move_played)
    }

    pub fn moves_played(&self) -> impl Iterator<Item = Move> + '_ {
        self.history.iter().map(|r| r.move_played)
    }

    /// Pieces taken by `color`, in the order they were captured
    pub fn captured_by(&self, color: Color) -> Vec<Piece> {
        self.history
            .iter()
            .filter(|r| r.moved_piece.color == color)
            .filter_map(|r| r.captured_piece())
            .collect()
    }

    pub fn legal_moves(&mut self, from: Square) -> MoveList {
        legal_moves(&mut self.board, from)
    }

    pub fn all_legal_moves(&mut self) -> MoveList {
        generate(&mut self.board, GenType::Legal)
    }

    pub fn status(&mut self) -> GameStatus {
        let side_to_move = self.board.side_to_move();
        GameStatus {
            side_to_move,
            in_check: self.board.in_check(side_to_move),
            outcome: self.board.outcome(),
        }
    }

    /// Lets the engine search the current position, without playing its move
    pub fn think(&mut self, engine: &mut Engine, options: &SearchOptions) -> Search {
        engine.run(&mut self.board, options)
    }
}

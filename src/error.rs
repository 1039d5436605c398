//! Recoverable failures reported to callers of the rules engine.
//!
//! Every variant leaves the board it was raised on untouched.

use crate::piece::Color;
use crate::square::Square;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    #[error("no piece on {0}")]
    NoPieceAt(Square),

    #[error("the piece on {square} belongs to {}, it is {}'s turn", .owner.name(), .to_move.name())]
    WrongSide {
        square: Square,
        owner: Color,
        to_move: Color,
    },

    #[error("{from}{to} is not a legal move")]
    IllegalMove { from: Square, to: Square },

    #[error("badly formatted move: {0}")]
    BadMoveFormat(String),

    #[error("invalid FEN ({reason}): {fen}")]
    InvalidFen { fen: String, reason: String },

    #[error("not enough moves played to take back")]
    NothingToTakeBack,
}

pub type ChessResult<T> = Result<T, ChessError>;

use crate::castling::CastlingRights;
use crate::piece::{Color, Piece};
use crate::r#move::Move;
use crate::square::Square;
use crate::zob_hash::Hash;

/// Everything a move may overwrite, as it was before the move.
/// Each record is produced by exactly one `Board::apply` and consumed by
/// exactly one `Board::undo`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[must_use = "a move applied without its undo record can never be taken back"]
pub struct UndoRecord {
    pub move_played: Move,
    pub moved_piece: Piece,
    /// The captured piece and the square it stood on, which is not the
    /// target square for en passant captures
    pub captured: Option<(Piece, Square)>,
    /// Rook relocation (origin, target) of a castling move
    pub rook_relocation: Option<(Square, Square)>,
    pub castling_rights: CastlingRights,
    pub ep_target: Option<Square>,
    pub king_squares: [Square; 2],
    pub side_to_move: Color,
    pub hash: Hash,
}

impl UndoRecord {
    pub fn captured_piece(&self) -> Option<Piece> {
        self.captured.map(|(p, _)| p)
    }
}

use crate::board::Board;
use crate::castling::{CastlingRights, CastlingSide};
use crate::piece::{Color, Piece};
use crate::square::Square;

// Keys are initialized at compile time for reproducibility and
// to avoid init functions
include!(concat!(env!("OUT_DIR"), "/zobrist_keys.rs"));

pub type Hash = u64;

pub struct ZobristHasher {}
impl ZobristHasher {
    pub fn hash_for_piece_sq(piece: Piece, sq: Square) -> Hash {
        let piece_type_offset = 64 * (piece.piece_type as usize);
        let color_offset = if piece.color == Color::White { 6 * 64 } else { 0 };
        Self::ZOBRIST_KEYS[piece_type_offset + color_offset + sq.index()]
    }

    pub fn side_to_move_hash(color: Color) -> Hash {
        if color == Color::Black { Self::ZOBRIST_KEYS[Self::BLACK_TO_MOVE_INDEX] } else { 0u64 }
    }

    pub fn castling_right_hash(color: Color, side: CastlingSide) -> Hash {
        match (color, side) {
            (Color::White, CastlingSide::KingSide) => Self::ZOBRIST_KEYS[Self::WKING_CASTLE_INDEX],
            (Color::White, CastlingSide::QueenSide) => Self::ZOBRIST_KEYS[Self::WQUEEN_CASTLE_INDEX],
            (Color::Black, CastlingSide::KingSide) => Self::ZOBRIST_KEYS[Self::BKING_CASTLE_INDEX],
            (Color::Black, CastlingSide::QueenSide) => Self::ZOBRIST_KEYS[Self::BQUEEN_CASTLE_INDEX],
        }
    }

    pub fn castling_rights_hash(castling_rights: CastlingRights) -> Hash {
        castling_rights
            .iter()
            .fold(0u64, |hash, (color, side)| hash ^ Self::castling_right_hash(color, side))
    }

    /// The en passant target is part of the key: two positions that only
    /// differ by a capture opportunity must not share table entries
    pub fn en_passant_hash(ep_target: Option<Square>) -> Hash {
        if let Some(sq) = ep_target {
            Self::ZOBRIST_KEYS[Self::EP_TARGET_OFFSET + sq.col() as usize]
        } else { 0u64 }
    }

    /// Computes the key of a position from scratch
    pub fn hash(board: &Board) -> Hash {
        let mut hash = 0u64;
        for sq in Square::all() {
            if let Some(piece) = board.piece_at(sq) {
                hash ^= Self::hash_for_piece_sq(piece, sq)
            }
        }
        hash ^= Self::side_to_move_hash(board.side_to_move());
        hash ^= Self::castling_rights_hash(board.castling_rights());
        hash ^= Self::en_passant_hash(board.en_passant_target());
        hash
    }

    pub const BLACK_TO_MOVE_INDEX: usize = 768;
    pub const WKING_CASTLE_INDEX: usize = 769;
    pub const WQUEEN_CASTLE_INDEX: usize = 770;
    pub const BKING_CASTLE_INDEX: usize = 771;
    pub const BQUEEN_CASTLE_INDEX: usize = 772;
    pub const EP_TARGET_OFFSET: usize = 773;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::piece::PieceType;
    use crate::square::parse_square;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn keys_are_distinct() {
        let mut keys = ZobristHasher::ZOBRIST_KEYS.to_vec();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), ZobristHasher::ZOBRIST_KEYS.len());
    }

    #[test]
    fn identical_positions_hash_identically() {
        let a = Board::new();
        let b = Board::from_fen(START).unwrap();
        assert_eq!(ZobristHasher::hash(&a), ZobristHasher::hash(&b));
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn every_castling_right_changes_the_hash() {
        let full = Board::from_fen(START).unwrap();
        for field in ["Qkq", "Kkq", "KQq", "KQk"] {
            let fen = START.replace("KQkq", field);
            let board = Board::from_fen(&fen).unwrap();
            assert_ne!(board.hash(), full.hash(), "dropping a right from KQkq to {}", field);
        }
    }

    #[test]
    fn side_to_move_changes_the_hash() {
        let white = Board::from_fen(START).unwrap();
        let black = Board::from_fen(&START.replace(" w ", " b ")).unwrap();
        assert_ne!(white.hash(), black.hash());
        assert_eq!(
            white.hash() ^ black.hash(),
            ZobristHasher::ZOBRIST_KEYS[ZobristHasher::BLACK_TO_MOVE_INDEX]
        );
    }

    #[test]
    fn adding_or_removing_a_piece_changes_the_hash() {
        let base = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let with_pawn = Board::from_fen("4k3/8/8/8/8/8/3P4/4K3 w - - 0 1").unwrap();
        assert_ne!(base.hash(), with_pawn.hash());
        let d2 = parse_square("d2").unwrap();
        assert_eq!(
            base.hash() ^ with_pawn.hash(),
            ZobristHasher::hash_for_piece_sq(Piece::new(Color::White, PieceType::Pawn), d2)
        );
    }

    #[test]
    fn en_passant_target_changes_the_hash() {
        let with_ep = Board::from_fen("4k3/8/8/8/4P3/8/8/4K3 b - e3 0 1").unwrap();
        let without = Board::from_fen("4k3/8/8/8/4P3/8/8/4K3 b - - 0 1").unwrap();
        assert_ne!(with_ep.hash(), without.hash());
    }
}

use crate::board::Board;
use crate::piece::{Color, Piece, PieceType};
use crate::square::Square;

pub type Score = i32;

/// Piece-square tables, seen from white's side: the first row is the eighth rank.
/// Black pieces read them mirrored vertically.
#[rustfmt::skip]
const PIECE_SQUARE_TABLE: [[[Score; 8]; 8]; 6] = [
    // Pawn
    [
        [0, 0, 0, 0, 0, 0, 0, 0],
        [50, 50, 50, 50, 50, 50, 50, 50],
        [10, 10, 20, 30, 30, 20, 10, 10],
        [5, 5, 10, 25, 25, 10, 5, 5],
        [0, 0, 0, 20, 20, 0, 0, 0],
        [5, -5, -10, 0, 0, -10, -5, 5],
        [5, 10, 10, -20, -20, 10, 10, 5],
        [0, 0, 0, 0, 0, 0, 0, 0],
    ],
    // Knight
    [
        [-50, -40, -30, -30, -30, -30, -40, -50],
        [-40, -20, 0, 0, 0, 0, -20, -40],
        [-30, 0, 10, 15, 15, 10, 0, -30],
        [-30, 5, 15, 20, 20, 15, 5, -30],
        [-30, 0, 15, 20, 20, 15, 0, -30],
        [-30, 5, 10, 15, 15, 10, 5, -30],
        [-40, -20, 0, 5, 5, 0, -20, -40],
        [-50, -40, -30, -30, -30, -30, -40, -50],
    ],
    // Bishop
    [
        [-20, -10, -10, -10, -10, -10, -10, -20],
        [-10, 0, 0, 0, 0, 0, 0, -10],
        [-10, 0, 5, 10, 10, 5, 0, -10],
        [-10, 5, 5, 10, 10, 5, 5, -10],
        [-10, 0, 10, 10, 10, 10, 0, -10],
        [-10, 10, 10, 10, 10, 10, 10, -10],
        [-10, 5, 0, 0, 0, 0, 5, -10],
        [-20, -10, -10, -10, -10, -10, -10, -20],
    ],
    // Rook
    [
        [0, 0, 0, 0, 0, 0, 0, 0],
        [5, 10, 10, 10, 10, 10, 10, 5],
        [-5, 0, 0, 0, 0, 0, 0, -5],
        [-5, 0, 0, 0, 0, 0, 0, -5],
        [-5, 0, 0, 0, 0, 0, 0, -5],
        [-5, 0, 0, 0, 0, 0, 0, -5],
        [-5, 0, 0, 0, 0, 0, 0, -5],
        [0, 0, 0, 5, 5, 0, 0, 0],
    ],
    // Queen
    [
        [-20, -10, -10, -5, -5, -10, -10, -20],
        [-10, 0, 0, 0, 0, 0, 0, -10],
        [-10, 0, 5, 5, 5, 5, 0, -10],
        [-5, 0, 5, 5, 5, 5, 0, -5],
        [0, 0, 5, 5, 5, 5, 0, -5],
        [-10, 5, 5, 5, 5, 5, 0, -10],
        [-10, 0, 5, 0, 0, 0, 0, -10],
        [-20, -10, -10, -5, -5, -10, -10, -20],
    ],
    // King, middlegame table only
    [
        [-30, -40, -40, -50, -50, -40, -40, -30],
        [-30, -40, -40, -50, -50, -40, -40, -30],
        [-30, -40, -40, -50, -50, -40, -40, -30],
        [-30, -40, -40, -50, -50, -40, -40, -30],
        [-20, -30, -30, -40, -40, -30, -30, -20],
        [-10, -20, -20, -20, -20, -20, -20, -10],
        [20, 20, 0, 0, 0, 0, 20, 20],
        [20, 30, 10, 0, 0, 10, 30, 20],
    ],
];

pub struct Evaluation {}
impl Evaluation {
    pub const PIECE_TYPE_VALUE: [Score; 6] = [100, 320, 330, 500, 900, 20000];
    /// Far above any material count, mates are scored as MATE_SCORE minus the
    /// distance to mate in plies
    pub const MATE_SCORE: Score = 1_000_000;
    pub const DRAW_SCORE: Score = 0;
    pub const CHECK_BONUS: Score = 50;

    pub fn piece_value(piece_type: PieceType) -> Score {
        Self::PIECE_TYPE_VALUE[piece_type as usize]
    }

    /// Material plus positional value of a single piece
    pub fn piece_square_value(piece: Piece, sq: Square) -> Score {
        let sq = if piece.color == Color::White { sq } else { sq.vertical_symmetry() };
        Self::piece_value(piece.piece_type)
            + PIECE_SQUARE_TABLE[piece.piece_type as usize][sq.row() as usize][sq.col() as usize]
    }

    /// Static score of a position from `perspective`'s point of view: material and
    /// piece-square values, plus a bonus if the other side is in check.
    /// Mobility is not taken into account.
    pub fn evaluate(board: &Board, perspective: Color) -> Score {
        let mut score = board.pieces().fold(0, |acc, (sq, piece)| {
            let value = Self::piece_square_value(piece, sq);
            if piece.color == perspective { acc + value } else { acc - value }
        });
        if board.in_check(perspective.opposite()) {
            score += Self::CHECK_BONUS
        }
        score
    }

    /// Most valuable victim first, and among those the least valuable attacker
    pub fn mvv_lva(victim: PieceType, attacker: PieceType) -> Score {
        10_000 + Self::piece_value(victim) - Self::piece_value(attacker) / 10
    }

    pub fn is_mate_score(score: Score) -> bool {
        score.abs() > Self::MATE_SCORE - 1_000
    }
}

use crate::castling::CastlingSide;
use crate::piece::PieceType;
use crate::square::{self, Square};
use std::fmt::{Display, Formatter};

/// What a move does beyond relocating a piece. Every consumer matches on it
/// exhaustively, the tag alone is enough to apply and undo the move.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// Any move or capture with no side effect
    Normal,
    /// Two squares pawn advance, opens an en passant opportunity
    DoublePush,
    /// Pawn capture of a pawn standing next to the target square
    EnPassant,
    CastleKingSide,
    CastleQueenSide,
    Promotion(PieceType),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    origin: Square,
    target: Square,
    kind: MoveKind,
}

impl Move {
    pub fn new(origin: Square, target: Square, kind: MoveKind) -> Move {
        Move { origin, target, kind }
    }
    pub fn new_normal(origin: Square, target: Square) -> Move {
        Self::new(origin, target, MoveKind::Normal)
    }
    pub fn new_double_push(origin: Square, target: Square) -> Move {
        Self::new(origin, target, MoveKind::DoublePush)
    }
    pub fn new_en_passant(origin: Square, target: Square) -> Move {
        Self::new(origin, target, MoveKind::EnPassant)
    }
    pub fn new_castle(origin: Square, side: CastlingSide) -> Move {
        let target = Square::new(origin.row(), side.king_target_col());
        match side {
            CastlingSide::KingSide => Self::new(origin, target, MoveKind::CastleKingSide),
            CastlingSide::QueenSide => Self::new(origin, target, MoveKind::CastleQueenSide),
        }
    }
    pub fn new_promotion(origin: Square, target: Square, promote_to: PieceType) -> Move {
        Self::new(origin, target, MoveKind::Promotion(promote_to))
    }
    pub fn all_promotions(origin: Square, target: Square) -> [Move; 4] {
        PieceType::PROMOTIONS.map(|p| Self::new_promotion(origin, target, p))
    }

    pub fn origin(&self) -> Square {
        self.origin
    }
    pub fn target(&self) -> Square {
        self.target
    }
    pub fn kind(&self) -> MoveKind {
        self.kind
    }

    pub fn castling_side(&self) -> Option<CastlingSide> {
        match self.kind {
            MoveKind::CastleKingSide => Some(CastlingSide::KingSide),
            MoveKind::CastleQueenSide => Some(CastlingSide::QueenSide),
            _ => None,
        }
    }

    pub fn promotion_target(&self) -> Option<PieceType> {
        match self.kind {
            MoveKind::Promotion(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_promotion(&self) -> bool {
        self.promotion_target().is_some()
    }

    /// Parses a move formatted in coordinate notation ("e2e4", "e7e8q").
    /// Since no information can be given on the move kind, it simply returns origin, target and potential
    /// piece type to promote to
    pub fn parse(mv: &str) -> Option<(Square, Square, Option<PieceType>)> {
        if !mv.is_ascii() || !(4..=5).contains(&mv.len()) {
            return None;
        }
        let origin = square::parse_square(&mv[0..2])?;
        let target = square::parse_square(&mv[2..4])?;
        let promotion_target = match &mv[4..] {
            "" => None,
            "b" => Some(PieceType::Bishop),
            "n" => Some(PieceType::Knight),
            "r" => Some(PieceType::Rook),
            "q" => Some(PieceType::Queen),
            _ => return None,
        };
        Some((origin, target, promotion_target))
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(p) = self.promotion_target() {
            write!(f, "{}{}{}", self.origin, self.target, p)
        } else {
            write!(f, "{}{}", self.origin, self.target)
        }
    }
}

use crate::piece::Color;
use crate::piece::Color::{Black, White};
use crate::square::Square;
use std::fmt::{Display, Formatter};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CastlingSide {
    KingSide,
    QueenSide,
}

impl CastlingSide {
    pub const BOTH: [CastlingSide; 2] = [CastlingSide::KingSide, CastlingSide::QueenSide];

    /// Column the rook starts from
    pub fn rook_origin_col(&self) -> u8 {
        match self {
            CastlingSide::KingSide => 7,
            CastlingSide::QueenSide => 0,
        }
    }
    /// Column the rook lands on
    pub fn rook_target_col(&self) -> u8 {
        match self {
            CastlingSide::KingSide => 5,
            CastlingSide::QueenSide => 3,
        }
    }
    /// Column the king lands on
    pub fn king_target_col(&self) -> u8 {
        match self {
            CastlingSide::KingSide => 6,
            CastlingSide::QueenSide => 2,
        }
    }
    /// Columns that must be empty between king and rook
    pub fn empty_cols(&self) -> &'static [u8] {
        match self {
            CastlingSide::KingSide => &[5, 6],
            CastlingSide::QueenSide => &[1, 2, 3],
        }
    }
    /// Columns the king stands on, crosses or lands on
    pub fn king_path_cols(&self) -> &'static [u8] {
        match self {
            CastlingSide::KingSide => &[4, 5, 6],
            CastlingSide::QueenSide => &[4, 3, 2],
        }
    }

    pub fn rook_origin(&self, color: Color) -> Square {
        Square::new(color.back_row(), self.rook_origin_col())
    }
    pub fn rook_target(&self, color: Color) -> Square {
        Square::new(color.back_row(), self.rook_target_col())
    }
}

/// Castling rights as a 4 bits mask: white kingside, white queenside,
/// black kingside, black queenside from the highest bit down
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);

    pub fn new() -> CastlingRights {
        CastlingRights(0b1111)
    }
    pub fn from_str(s: &str) -> CastlingRights {
        let mut res = CastlingRights(0);
        if s.contains('K') {
            res.0 |= 0b1000
        }
        if s.contains('Q') {
            res.0 |= 0b0100
        }
        if s.contains('k') {
            res.0 |= 0b0010
        }
        if s.contains('q') {
            res.0 |= 0b0001
        }
        res
    }

    fn mask(side: Color, castling_side: CastlingSide) -> u8 {
        match (side, castling_side) {
            (White, CastlingSide::KingSide) => 0b1000,
            (White, CastlingSide::QueenSide) => 0b0100,
            (Black, CastlingSide::KingSide) => 0b0010,
            (Black, CastlingSide::QueenSide) => 0b0001,
        }
    }

    /// Returns the castling rights of a given color
    pub fn get(&self, side: Color) -> (bool, bool) {
        (
            self.has(side, CastlingSide::KingSide),
            self.has(side, CastlingSide::QueenSide),
        )
    }
    pub fn has(&self, side: Color, castling_side: CastlingSide) -> bool {
        self.0 & Self::mask(side, castling_side) != 0
    }
    /// Marks the given side as unable to castle
    pub fn uncastle(&mut self, side: Color) {
        self.0 &= match side {
            White => 0b0011,
            _ => 0b1100,
        }
    }
    /// Marks the given side as unable to castle on one wing
    pub fn revoke(&mut self, side: Color, castling_side: CastlingSide) {
        self.0 &= !Self::mask(side, castling_side)
    }

    /// Drops the rights tied to a rook corner when a piece leaves or lands on it
    pub fn touch(&mut self, sq: Square) {
        for color in Color::BOTH {
            for castling_side in CastlingSide::BOTH {
                if castling_side.rook_origin(color) == sq {
                    self.revoke(color, castling_side)
                }
            }
        }
    }

    /// Every right currently held
    pub fn iter(&self) -> impl Iterator<Item = (Color, CastlingSide)> + '_ {
        Color::BOTH
            .into_iter()
            .flat_map(|c| CastlingSide::BOTH.into_iter().map(move |s| (c, s)))
            .filter(move |(c, s)| self.has(*c, *s))
    }
}

impl Display for CastlingRights {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0 == 0 {
            return write!(f, "-");
        }
        let (wking, wqueen) = self.get(White);
        let (bking, bqueen) = self.get(Black);
        write!(
            f,
            "{}{}{}{}",
            if wking { "K" } else { "" },
            if wqueen { "Q" } else { "" },
            if bking { "k" } else { "" },
            if bqueen { "q" } else { "" }
        )
    }
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self::new()
    }
}

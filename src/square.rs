use std::fmt::{Display, Formatter};

/// A board coordinate. Row 0 is the eighth rank (black's back rank),
/// row 7 the first rank; column 0 is the a-file.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    row: u8,
    col: u8,
}

impl Square {
    /// Creates a square from its row and column, both in 0..8
    pub const fn new(row: u8, col: u8) -> Square {
        assert!(row < 8 && col < 8, "square out of bounds");
        Square { row, col }
    }

    /// Creates a square from signed coordinates, returning None when off the board
    pub fn try_new(row: i8, col: i8) -> Option<Square> {
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Square { row: row as u8, col: col as u8 })
        } else {
            None
        }
    }

    pub fn row(&self) -> u8 {
        self.row
    }
    pub fn col(&self) -> u8 {
        self.col
    }

    /// Row-major index in 0..64, a8 being 0 and h1 being 63
    pub fn index(&self) -> usize {
        self.row as usize * 8 + self.col as usize
    }

    /// The square reached by stepping (dr, dc) away, if it is still on the board
    pub fn offset(&self, dr: i8, dc: i8) -> Option<Square> {
        Self::try_new(self.row as i8 + dr, self.col as i8 + dc)
    }

    /// Same square seen from the other side of the board
    pub fn vertical_symmetry(&self) -> Square {
        Square { row: 7 - self.row, col: self.col }
    }

    pub fn is_light(&self) -> bool {
        (self.row + self.col) % 2 == 0
    }

    /// Every square of the board, row by row starting from a8
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64u8).map(|i| Square { row: i / 8, col: i % 8 })
    }
}

/// Parses a square from a given string slice,
/// only caring that the first two characters form a valid square representation
/// ```
/// use rookie::square::{parse_square, Square};
/// assert_eq!(parse_square("e4"), Some(Square::new(4, 4)));
/// assert_eq!(parse_square("d2someotherstuff"), Some(Square::new(6, 3)));
/// assert_eq!(parse_square("randoma1stuff"), None);
/// assert_eq!(parse_square("k9"), None);
/// ```
pub fn parse_square(s: &str) -> Option<Square> {
    let mut chars_iter = s.chars();
    let col = match chars_iter.next()? {
        c @ 'a'..='h' => c as u8 - b'a',
        _ => return None,
    };
    let rank = match chars_iter.next()?.to_digit(10) {
        Some(i) if (1..=8).contains(&i) => i as u8,
        _ => return None,
    };
    Some(Square::new(8 - rank, col))
}

/// Returns the string representation of a square
/// ```
/// use rookie::square::{square_representation, Square};
/// assert_eq!(square_representation(Square::new(4, 4)), "e4");
/// assert_eq!(square_representation(Square::new(7, 0)), "a1");
/// ```
pub fn square_representation(sq: Square) -> String {
    let mut repr = String::with_capacity(2);
    repr.push((b'a' + sq.col) as char);
    repr.push((b'8' - sq.row) as char);
    repr
}

impl Display for Square {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", square_representation(*self))
    }
}

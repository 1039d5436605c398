use std::fmt::{Display, Formatter};
use crate::castling::CastlingRights;
use crate::error::{ChessError, ChessResult};
use crate::history::UndoRecord;
use crate::move_generator::has_legal_move;
use crate::piece::{Color, Piece, PieceType};
use crate::piece::Color::{Black, White};
use crate::r#move::{Move, MoveKind};
use crate::square::{parse_square, Square};
use crate::zob_hash::{ZobristHasher, Hash};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Where a game stands for the side to move
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Outcome {
    Ongoing,
    Checkmate { winner: Color },
    Stalemate,
    InsufficientMaterial,
}

pub(crate) const KNIGHT_OFFSETS: [(i8, i8); 8] = [(-2, -1), (-2, 1), (-1, -2), (-1, 2), (1, -2), (1, 2), (2, -1), (2, 1)];
pub(crate) const KING_OFFSETS: [(i8, i8); 8] = [(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)];
pub(crate) const DIAGONAL_DIRECTIONS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
pub(crate) const CARDINAL_DIRECTIONS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// The single mutable state object of a game.
/// Kings squares are cached and the hash is maintained incrementally, both
/// must always agree with the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
    side_to_move: Color,
    castling_rights: CastlingRights,
    ep_target: Option<Square>,
    king_squares: [Square; 2],
    hash: Hash,
}

impl Board {
    /// Creates the standard starting position
    pub fn new() -> Board {
        match Self::from_fen(START_FEN) {
            Ok(b) => b,
            Err(e) => unreachable!("the starting position is valid: {}", e),
        }
    }

    fn empty() -> Board {
        Board {
            squares: [[None; 8]; 8],
            side_to_move: White,
            castling_rights: CastlingRights::NONE,
            ep_target: None,
            king_squares: [Square::new(0, 4), Square::new(7, 4)],
            hash: 0,
        }
    }

    /// Makes a move on the board, returning what is needed to take it back.
    /// Only fails if there is no piece on the origin square: the move is
    /// otherwise expected to come from the move generator.
    pub fn apply(&mut self, mv: Move) -> ChessResult<UndoRecord> {
        let origin = mv.origin();
        let target = mv.target();
        let moved_piece = self.piece_at(origin).ok_or(ChessError::NoPieceAt(origin))?;
        let side = moved_piece.color;

        let mut record = UndoRecord {
            move_played: mv,
            moved_piece,
            captured: None,
            rook_relocation: None,
            castling_rights: self.castling_rights,
            ep_target: self.ep_target,
            king_squares: self.king_squares,
            side_to_move: self.side_to_move,
            hash: self.hash,
        };

        let captured_square = match mv.kind() {
            MoveKind::EnPassant => Square::new(origin.row(), target.col()),
            _ => target,
        };
        if let Some(captured) = self.remove_piece(captured_square) {
            record.captured = Some((captured, captured_square));
        }

        self.hash ^= ZobristHasher::castling_rights_hash(self.castling_rights);
        if moved_piece.piece_type == PieceType::King {
            self.castling_rights.uncastle(side);
        }
        // A rook leaving its corner, or being captured on it
        self.castling_rights.touch(origin);
        self.castling_rights.touch(target);
        self.hash ^= ZobristHasher::castling_rights_hash(self.castling_rights);

        self.remove_piece(origin);
        let placed = match mv.kind() {
            MoveKind::Promotion(p) => Piece::new(side, p),
            _ => moved_piece,
        };
        self.add_piece(placed, target);

        if let Some(castling_side) = mv.castling_side() {
            let (rook_origin, rook_target) = (castling_side.rook_origin(side), castling_side.rook_target(side));
            if let Some(rook) = self.remove_piece(rook_origin) {
                self.add_piece(rook, rook_target);
                record.rook_relocation = Some((rook_origin, rook_target));
            }
        }

        self.hash ^= ZobristHasher::en_passant_hash(self.ep_target);
        self.ep_target = match mv.kind() {
            MoveKind::DoublePush => Some(Square::new((origin.row() + target.row()) / 2, origin.col())),
            _ => None,
        };
        self.hash ^= ZobristHasher::en_passant_hash(self.ep_target);

        if moved_piece.piece_type == PieceType::King {
            self.king_squares[side as usize] = target;
        }

        self.hash ^= ZobristHasher::ZOBRIST_KEYS[ZobristHasher::BLACK_TO_MOVE_INDEX];
        self.side_to_move = self.side_to_move.opposite();

        Ok(record)
    }

    /// Applies a move produced by the move generator. A failure here means
    /// the board and its bookkeeping went out of sync, which is a bug.
    pub(crate) fn make(&mut self, mv: Move) -> UndoRecord {
        match self.apply(mv) {
            Ok(record) => record,
            Err(e) => panic!("generated move {} does not fit the board: {}\n{}", mv, e, self),
        }
    }

    /// Takes back the move the record was produced by, restoring every field
    /// that move touched
    pub fn undo(&mut self, record: UndoRecord) {
        let mv = record.move_played;

        if let Some((rook_origin, rook_target)) = record.rook_relocation {
            if let Some(rook) = self.remove_piece(rook_target) {
                self.add_piece(rook, rook_origin);
            }
        }
        self.remove_piece(mv.target());
        self.add_piece(record.moved_piece, mv.origin());
        if let Some((captured, sq)) = record.captured {
            self.add_piece(captured, sq);
        }

        self.castling_rights = record.castling_rights;
        self.ep_target = record.ep_target;
        self.king_squares = record.king_squares;
        self.side_to_move = record.side_to_move;
        self.hash = record.hash;
    }

    /// Places a new piece on a given square
    fn add_piece(&mut self, piece: Piece, sq: Square) {
        self.squares[sq.row() as usize][sq.col() as usize] = Some(piece);
        self.hash ^= ZobristHasher::hash_for_piece_sq(piece, sq);
    }

    /// Clears the given square, returning the piece that has been removed if any
    fn remove_piece(&mut self, sq: Square) -> Option<Piece> {
        let removed = self.squares[sq.row() as usize][sq.col() as usize].take();
        if let Some(p) = removed {
            self.hash ^= ZobristHasher::hash_for_piece_sq(p, sq);
        }
        removed
    }

    /*
    INTERESTING GETTERS
     */
    pub fn side_to_move(&self) -> Color { self.side_to_move }

    pub fn en_passant_target(&self) -> Option<Square> {
        self.ep_target
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.row() as usize][sq.col() as usize]
    }

    pub fn king_square(&self, color: Color) -> Square {
        self.king_squares[color as usize]
    }

    /// Every piece on the board, row by row
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    /// The piece a move would capture, if any
    pub fn victim(&self, mv: &Move) -> Option<Piece> {
        match mv.kind() {
            MoveKind::EnPassant => Some(Piece::new(self.side_to_move.opposite(), PieceType::Pawn)),
            MoveKind::CastleKingSide | MoveKind::CastleQueenSide => None,
            _ => self.piece_at(mv.target()).filter(|p| p.color != self.side_to_move),
        }
    }

    /// Key of the position, kept up to date by `apply` and `undo`
    pub fn hash(&self) -> Hash { self.hash }

    /*
    ATTACKS
     */

    /// Whether any piece of the opponent of `defending_color` attacks the square.
    /// Uses attack patterns only: pawns attack diagonally whatever stands on
    /// the square, kings attack adjacent squares.
    pub fn is_attacked(&self, sq: Square, defending_color: Color) -> bool {
        let attacker = defending_color.opposite();
        let is_attacker = |from: Option<Square>, piece_type: PieceType| {
            from.and_then(|s| self.piece_at(s)) == Some(Piece::new(attacker, piece_type))
        };

        // A pawn attacking sq stands one row behind it, from the attacker's point of view
        if [-1, 1].iter().any(|dc| is_attacker(sq.offset(-attacker.forward(), *dc), PieceType::Pawn)) {
            return true;
        }
        if KNIGHT_OFFSETS.iter().any(|(dr, dc)| is_attacker(sq.offset(*dr, *dc), PieceType::Knight)) {
            return true;
        }
        if KING_OFFSETS.iter().any(|(dr, dc)| is_attacker(sq.offset(*dr, *dc), PieceType::King)) {
            return true;
        }
        let slider_hits = |directions: &[(i8, i8)], attacks_along: fn(&PieceType) -> bool| {
            directions.iter().any(|dir| {
                matches!(self.first_piece_along(sq, *dir), Some(p) if p.color == attacker && attacks_along(&p.piece_type))
            })
        };
        slider_hits(&CARDINAL_DIRECTIONS, PieceType::is_rook_like)
            || slider_hits(&DIAGONAL_DIRECTIONS, PieceType::is_bishop_like)
    }

    /// Walks from a square in a direction, stopping on the first occupied square
    fn first_piece_along(&self, from: Square, (dr, dc): (i8, i8)) -> Option<Piece> {
        let mut current = from.offset(dr, dc);
        while let Some(sq) = current {
            if let Some(p) = self.piece_at(sq) {
                return Some(p);
            }
            current = sq.offset(dr, dc);
        }
        None
    }

    pub fn in_check(&self, side: Color) -> bool {
        let king_square = self.king_square(side);
        debug_assert_eq!(
            self.piece_at(king_square),
            Some(Piece::new(side, PieceType::King)),
            "cached {} king square {} is stale\n{}", side.name(), king_square, self
        );
        self.is_attacked(king_square, side)
    }

    /*
    GAME END
     */

    /// Checkmate and stalemate take precedence over insufficient material
    pub fn outcome(&mut self) -> Outcome {
        let side = self.side_to_move;
        if !has_legal_move(self) {
            if self.in_check(side) {
                Outcome::Checkmate { winner: side.opposite() }
            } else {
                Outcome::Stalemate
            }
        } else if self.is_insufficient_material() {
            Outcome::InsufficientMaterial
        } else {
            Outcome::Ongoing
        }
    }

    /// Neither side can ever mate: bare kings, a single minor piece against a
    /// bare king, or one bishop each on squares of the same colour
    pub fn is_insufficient_material(&self) -> bool {
        let mut white = vec![];
        let mut black = vec![];
        for (sq, piece) in self.pieces().filter(|(_, p)| p.piece_type != PieceType::King) {
            match piece.color {
                White => white.push((sq, piece.piece_type)),
                Black => black.push((sq, piece.piece_type)),
            }
        }
        match (white.as_slice(), black.as_slice()) {
            ([], []) => true,
            ([(_, lone)], []) | ([], [(_, lone)]) => lone.is_minor(),
            ([(w, PieceType::Bishop)], [(b, PieceType::Bishop)]) => w.is_light() == b.is_light(),
            _ => false,
        }
    }

    /*
    FEN STRING OPERATIONS
     */
    pub fn from_fen(fen: &str) -> ChessResult<Board> {
        let invalid = |reason: &str| ChessError::InvalidFen { fen: fen.to_owned(), reason: reason.to_owned() };
        let mut b = Board::empty();
        let mut sections = fen.split_whitespace();
        let piece_placement = sections.next().ok_or_else(|| invalid("empty string"))?;
        let side = sections.next().unwrap_or("w");
        let castling = sections.next().unwrap_or("-");
        let ep_target = sections.next().unwrap_or("-");

        let ranks: Vec<&str> = piece_placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(invalid("expected 8 ranks"));
        }
        let mut kings = [None, None];
        for (row, rank) in ranks.iter().enumerate() {
            let mut col = 0u8;
            for c in rank.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if skip == 0 || col as u32 + skip > 8 {
                        return Err(invalid("rank too long"));
                    }
                    col += skip as u8;
                } else {
                    let piece = Piece::from_char(c).ok_or_else(|| invalid("unknown piece"))?;
                    if col >= 8 {
                        return Err(invalid("rank too long"));
                    }
                    let sq = Square::new(row as u8, col);
                    if piece.piece_type == PieceType::King {
                        if kings[piece.color as usize].is_some() {
                            return Err(invalid("more than one king for a side"));
                        }
                        kings[piece.color as usize] = Some(sq);
                    }
                    b.add_piece(piece, sq);
                    col += 1;
                }
            }
            if col != 8 {
                return Err(invalid("rank does not span 8 files"));
            }
        }
        for color in [Black, White] {
            b.king_squares[color as usize] = kings[color as usize].ok_or_else(|| invalid("missing king"))?;
        }

        b.side_to_move = match side {
            "w" => White,
            "b" => Black,
            _ => return Err(invalid("side to move must be w or b")),
        };
        b.castling_rights = CastlingRights::from_str(castling);
        b.ep_target = match ep_target {
            "-" => None,
            s => Some(parse_square(s).ok_or_else(|| invalid("bad en passant square"))?),
        };
        if let Some(ep) = b.ep_target {
            // The pawn that just moved two squares stands in front of the target
            let mover = b.side_to_move;
            let enemy_pawn = Piece::new(mover.opposite(), PieceType::Pawn);
            let pushed_from_row = mover.opposite().pawn_row() as i8;
            if ep.row() as i8 != pushed_from_row + mover.opposite().forward()
                || b.piece_at(ep).is_some()
                || ep.offset(-mover.forward(), 0).and_then(|sq| b.piece_at(sq)) != Some(enemy_pawn)
            {
                return Err(invalid("en passant square without a pawn that just moved two squares"));
            }
        }
        if b.in_check(b.side_to_move.opposite()) {
            return Err(invalid("the side not to move is in check"));
        }
        b.hash = ZobristHasher::hash(&b);
        Ok(b)
    }

    pub fn to_fen(&self) -> String {
        let mut fen = String::new();

        for row in 0..8u8 {
            let mut empty_counter = 0;
            for col in 0..8u8 {
                match self.piece_at(Square::new(row, col)) {
                    Some(p) => {
                        if empty_counter != 0 { fen.push_str(&empty_counter.to_string()) }
                        empty_counter = 0;
                        fen.push_str(&p.to_string())
                    }
                    None => empty_counter += 1,
                }
            }
            if empty_counter != 0 { fen.push_str(&empty_counter.to_string()) }
            if row != 7 { fen.push('/') }
        }

        fen.push_str(if self.side_to_move == White { " w " } else { " b " });
        fen.push_str(&self.castling_rights.to_string());
        match self.ep_target {
            Some(sq) => fen.push_str(&format!(" {} ", sq)),
            None => fen.push_str(" - "),
        }
        fen.push_str("0 1");
        fen
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let ranks: Vec<String> = (0..8u8)
            .map(|row| {
                let mut line = format!("{} ", 8 - row);
                for col in 0..8u8 {
                    match self.piece_at(Square::new(row, col)) {
                        None => line.push_str(". "),
                        Some(p) => line.push_str(&(p.to_string() + " ")),
                    }
                }
                line
            })
            .collect();

        writeln!(f, "{}", ranks[0])?;
        writeln!(f, "{}  side to move: {}", ranks[1], self.side_to_move)?;
        writeln!(f, "{}  castling_rights: {}", ranks[2], self.castling_rights)?;
        writeln!(f, "{}  en passant: {}", ranks[3], match self.ep_target {
            Some(sq) => sq.to_string(),
            None => String::from("-"),
        })?;
        writeln!(f, "{}  kings: {} {}", ranks[4], self.king_square(White), self.king_square(Black))?;
        writeln!(f, "{}  hash: {:#0x}", ranks[5], self.hash)?;
        writeln!(f, "{}  fen: {}", ranks[6], self.to_fen())?;
        writeln!(f, "{}", ranks[7])?;
        write!(f, "  a b c d e f g h")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::castling::CastlingSide;
    use crate::move_generator::{generate, GenType};
    use proptest::prelude::*;

    fn sq(s: &str) -> Square {
        parse_square(s).unwrap()
    }

    fn find(board: &mut Board, text: &str) -> Move {
        let (origin, target, promotion) = Move::parse(text).unwrap();
        *generate(board, GenType::Legal)
            .iter()
            .find(|m| m.origin() == origin && m.target() == target && m.promotion_target() == promotion)
            .unwrap_or_else(|| panic!("{} is not legal in {}", text, board.to_fen()))
    }

    fn assert_round_trip(fen: &str, mv: &str) {
        let mut board = Board::from_fen(fen).unwrap();
        let before = board.clone();
        let m = find(&mut board, mv);
        let record = board.apply(m).unwrap();
        assert_ne!(board, before);
        assert_eq!(board.hash(), ZobristHasher::hash(&board));
        board.undo(record);
        assert_eq!(board, before);
    }

    #[test]
    fn starting_position() {
        let board = Board::new();
        assert_eq!(board.to_fen(), START_FEN);
        assert_eq!(board.king_square(White), sq("e1"));
        assert_eq!(board.king_square(Black), sq("e8"));
        assert_eq!(board.side_to_move(), White);
        assert_eq!(board.castling_rights(), CastlingRights::new());
        assert_eq!(board.pieces().count(), 32);
    }

    #[test]
    fn fen_round_trip() {
        for fen in [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 1",
        ] {
            assert_eq!(Board::from_fen(fen).unwrap().to_fen(), fen);
        }
    }

    #[test]
    fn malformed_fens_are_rejected() {
        for fen in [
            "",
            "8/8/8/8/8/8/8/8 w - - 0 1",
            "4k3/8/8/8/8/8/8/3KK3 w - - 0 1",
            "4k3/8/8/8/8/8/8 w - - 0 1",
            "4k3/9/8/8/8/8/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K3 x - - 0 1",
            "4k3/8/8/8/8/8/8/4X3 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K30 w - - 0 1",
            "4k3/99999999999999999999999999999993/8/8/8/8/8/4K3 w - - 0 1",
            // en passant targets need an empty square behind a pawn that just moved two squares
            "4k3/8/8/3PK3/8/8/8/8 w - e6 0 1",
            "4k3/8/8/3pP3/8/8/8/4K3 w - e6 0 1",
            "4k3/8/3p4/3pP3/8/8/8/4K3 w - d6 0 1",
            "4k3/8/8/3pP3/8/8/8/4K3 w - d3 0 1",
            "4k3/8/8/8/3pP3/8/8/4K3 b - e6 0 1",
            // the side that just moved left its king in check
            "4k3/8/8/8/8/8/8/3KR3 w - - 0 1",
            "8/8/8/3kK3/8/8/8/8 b - - 0 1",
        ] {
            assert!(matches!(Board::from_fen(fen), Err(ChessError::InvalidFen { .. })), "{:?}", fen);
        }
    }

    #[test]
    fn apply_rejects_an_empty_origin() {
        let mut board = Board::new();
        let before = board.clone();
        let result = board.apply(Move::new_normal(sq("e4"), sq("e5")));
        assert_eq!(result, Err(ChessError::NoPieceAt(sq("e4"))));
        assert_eq!(board, before);
    }

    #[test]
    fn double_push_sets_en_passant_for_one_ply() {
        let mut board = Board::new();
        let e4 = find(&mut board, "e2e4");
        assert_eq!(e4.kind(), MoveKind::DoublePush);
        let _ = board.apply(e4).unwrap();
        assert_eq!(board.en_passant_target(), Some(sq("e3")));

        let nf6 = find(&mut board, "g8f6");
        let _ = board.apply(nf6).unwrap();
        assert_eq!(board.en_passant_target(), None);
    }

    #[test]
    fn en_passant_removes_the_passed_pawn() {
        let mut board = Board::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
        let before = board.clone();
        let ep = find(&mut board, "e5d6");
        assert_eq!(ep.kind(), MoveKind::EnPassant);
        let record = board.apply(ep).unwrap();
        assert_eq!(record.captured, Some((Piece::new(Black, PieceType::Pawn), sq("d5"))));
        assert_eq!(board.piece_at(sq("d5")), None);
        assert_eq!(board.piece_at(sq("d6")), Some(Piece::new(White, PieceType::Pawn)));
        board.undo(record);
        assert_eq!(board, before);
    }

    #[test]
    fn castling_relocates_the_rook() {
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let castle = find(&mut board, "e1g1");
        assert_eq!(castle.castling_side(), Some(CastlingSide::KingSide));
        let record = board.apply(castle).unwrap();
        assert_eq!(record.rook_relocation, Some((sq("h1"), sq("f1"))));
        assert_eq!(board.piece_at(sq("f1")), Some(Piece::new(White, PieceType::Rook)));
        assert_eq!(board.piece_at(sq("h1")), None);
        assert_eq!(board.king_square(White), sq("g1"));
        assert_eq!(board.castling_rights().get(White), (false, false));
        assert_eq!(board.castling_rights().get(Black), (true, true));
        board.undo(record);
        assert_eq!(board.king_square(White), sq("e1"));
        assert_eq!(board.castling_rights(), CastlingRights::new());
    }

    #[test]
    fn rook_moves_and_captures_revoke_castling() {
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let rook_takes_rook = find(&mut board, "a1a8");
        let _ = board.apply(rook_takes_rook).unwrap();
        assert_eq!(board.castling_rights().get(White), (true, false));
        assert_eq!(board.castling_rights().get(Black), (true, false));
    }

    #[test]
    fn promotion_is_applied_and_undone() {
        let mut board = Board::from_fen("1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let before = board.clone();
        let promote = find(&mut board, "a7b8n");
        let record = board.apply(promote).unwrap();
        assert_eq!(board.piece_at(sq("b8")), Some(Piece::new(White, PieceType::Knight)));
        assert_eq!(record.captured_piece(), Some(Piece::new(Black, PieceType::Knight)));
        board.undo(record);
        assert_eq!(board, before);
    }

    #[test]
    fn special_moves_round_trip() {
        assert_round_trip("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1", "e8c8");
        assert_round_trip("4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1", "d4e3");
        assert_round_trip("4k3/8/8/8/8/8/p7/4K3 b - - 0 1", "a2a1q");
        assert_round_trip("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", "h1h8");
    }

    #[test]
    fn attack_detection() {
        let board = Board::from_fen("4k3/8/8/3p4/8/1n6/8/R3K2b w - - 0 1").unwrap();
        // pawns attack diagonally, even empty squares
        assert!(board.is_attacked(sq("c4"), White));
        assert!(board.is_attacked(sq("e4"), White));
        assert!(!board.is_attacked(sq("d4"), White));
        // knight
        assert!(board.is_attacked(sq("d2"), White));
        assert!(board.is_attacked(sq("a1"), White));
        // bishop ray stops at the first blocker
        assert!(board.is_attacked(sq("g2"), White));
        assert!(!board.is_attacked(sq("e4"), Black));
        // rook along the first rank, blocked by the king
        assert!(board.is_attacked(sq("d1"), Black));
        assert!(!board.is_attacked(sq("g1"), Black));
        // kings attack adjacent squares
        assert!(board.is_attacked(sq("d7"), White));
        assert!(!board.in_check(White));
    }

    fn outcome_after(moves: &[&str]) -> Outcome {
        let mut board = Board::new();
        for mv in moves {
            let m = find(&mut board, mv);
            let _ = board.apply(m).unwrap();
        }
        board.outcome()
    }

    #[test]
    fn fools_mate() {
        assert_eq!(outcome_after(&["f2f3", "e7e5", "g2g4"]), Outcome::Ongoing);
        assert_eq!(outcome_after(&["f2f3", "e7e5", "g2g4", "d8h4"]), Outcome::Checkmate { winner: Black });

        let mut board = Board::new();
        for mv in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            let m = find(&mut board, mv);
            let _ = board.apply(m).unwrap();
        }
        assert!(board.in_check(White));
        assert!(!board.in_check(Black));
    }

    #[test]
    fn stalemate_is_not_checkmate() {
        let mut board = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(!board.in_check(Black));
        assert_eq!(board.outcome(), Outcome::Stalemate);
    }

    #[test]
    fn insufficient_material() {
        for fen in [
            "8/8/8/4k3/8/8/8/4K3 w - - 0 1",
            "8/8/8/4k3/8/8/8/2B1K3 w - - 0 1",
            "8/8/8/4k3/8/8/8/4K1n1 b - - 0 1",
            // c1 and f8 are both dark squares
            "5b2/8/8/4k3/8/8/8/2B1K3 w - - 0 1",
        ] {
            assert_eq!(Board::from_fen(fen).unwrap().outcome(), Outcome::InsufficientMaterial, "{}", fen);
        }
        for fen in [
            // bishops on opposite colours
            "2b1k3/8/8/8/8/8/8/2B1K3 w - - 0 1",
            "8/8/8/4k3/8/8/8/1NN1K3 w - - 0 1",
            "8/8/8/4k3/8/8/4P3/4K3 w - - 0 1",
            "8/8/8/4k3/8/8/8/3RK3 w - - 0 1",
        ] {
            assert_eq!(Board::from_fen(fen).unwrap().outcome(), Outcome::Ongoing, "{}", fen);
        }
    }

    #[test]
    fn display_mentions_the_fen() {
        let board = Board::new();
        assert!(board.to_string().contains(START_FEN));
    }

    proptest! {
        #[test]
        fn random_playouts_undo_exactly(choices in prop::collection::vec(any::<prop::sample::Index>(), 1..40)) {
            let mut board = Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1").unwrap();
            let mut snapshots = vec![];
            let mut records = vec![];
            for choice in choices {
                let moves = generate(&mut board, GenType::Legal);
                if moves.is_empty() {
                    break;
                }
                let mover = board.side_to_move();
                let mv = *choice.get(moves.iter().as_slice());
                snapshots.push(board.clone());
                records.push(board.apply(mv).unwrap());
                prop_assert!(!board.in_check(mover));
                prop_assert_eq!(board.hash(), ZobristHasher::hash(&board));
                for color in [White, Black] {
                    prop_assert_eq!(board.piece_at(board.king_square(color)), Some(Piece::new(color, PieceType::King)));
                }
            }
            while let Some(record) = records.pop() {
                board.undo(record);
                prop_assert_eq!(&board, &snapshots.pop().unwrap());
            }
        }
    }
}

use crate::{
    r#move::Move,
    board::{Board, CARDINAL_DIRECTIONS, DIAGONAL_DIRECTIONS, KING_OFFSETS, KNIGHT_OFFSETS},
    castling::CastlingSide,
    piece::{Color, Piece, PieceType},
    square::Square,
    movelist::MoveList
};

#[derive(Debug, Copy, Clone, PartialOrd, PartialEq)]
pub enum GenType {
    Legal,
    Captures
}

/// Generates a subset of all legal moves for the side to move.
/// Moves come out square by square from a8 to h1, which makes the order
/// deterministic for a given position.
/// The board is borrowed mutably to try moves out, it is left as it was found.
pub fn generate(board: &mut Board, gen_type: GenType) -> MoveList {
    let mut pseudo_legal = MoveList::default();
    let side = board.side_to_move();
    for sq in Square::all() {
        if matches!(board.piece_at(sq), Some(p) if p.color == side) {
            pseudo_legal_moves(board, sq, &mut pseudo_legal);
        }
    }
    if gen_type == GenType::Captures {
        pseudo_legal.retain(|m| board.victim(m).is_some());
    }
    pseudo_legal.retain(|m| leaves_king_safe(board, *m));
    pseudo_legal
}

/// Legal moves of the piece standing on `sq`.
/// Empty when the square is empty or holds a piece of the side not to move.
pub fn legal_moves(board: &mut Board, sq: Square) -> MoveList {
    let mut moves = MoveList::default();
    if matches!(board.piece_at(sq), Some(p) if p.color == board.side_to_move()) {
        pseudo_legal_moves(board, sq, &mut moves);
        moves.retain(|m| leaves_king_safe(board, *m));
    }
    moves
}

/// Whether the side to move has at least one legal move, stopping at the first one found
pub fn has_legal_move(board: &mut Board) -> bool {
    let side = board.side_to_move();
    let mut moves = MoveList::default();
    for sq in Square::all() {
        if matches!(board.piece_at(sq), Some(p) if p.color == side) {
            pseudo_legal_moves(board, sq, &mut moves);
            if moves.iter().any(|m| leaves_king_safe(board, *m)) {
                return true;
            }
            moves = MoveList::default();
        }
    }
    false
}

fn leaves_king_safe(board: &mut Board, mv: Move) -> bool {
    let side = board.side_to_move();
    let record = board.make(mv);
    let safe = !board.in_check(side);
    board.undo(record);
    safe
}

/// Moves following the movement rules of the piece on `sq`, ignoring
/// whether they leave their own king in check
fn pseudo_legal_moves(board: &Board, sq: Square, move_list: &mut MoveList) {
    let piece = match board.piece_at(sq) {
        Some(p) => p,
        None => return,
    };
    match piece.piece_type {
        PieceType::Pawn => pawn_moves(board, sq, piece.color, move_list),
        PieceType::Knight => step_moves(board, sq, piece.color, &KNIGHT_OFFSETS, move_list),
        PieceType::Bishop => slider_moves(board, sq, piece.color, &DIAGONAL_DIRECTIONS, move_list),
        PieceType::Rook => slider_moves(board, sq, piece.color, &CARDINAL_DIRECTIONS, move_list),
        PieceType::Queen => {
            slider_moves(board, sq, piece.color, &CARDINAL_DIRECTIONS, move_list);
            slider_moves(board, sq, piece.color, &DIAGONAL_DIRECTIONS, move_list);
        }
        PieceType::King => {
            step_moves(board, sq, piece.color, &KING_OFFSETS, move_list);
            castling(board, sq, piece.color, move_list);
        }
    }
}

fn is_enemy(board: &Board, sq: Square, side: Color) -> bool {
    matches!(board.piece_at(sq), Some(p) if p.color != side)
}

fn pawn_moves(board: &Board, sq: Square, side: Color, move_list: &mut MoveList) {
    let forward = side.forward();
    let promotion_row = side.opposite().back_row();
    let push = |origin: Square, target: Square, move_list: &mut MoveList| {
        if target.row() == promotion_row {
            for m in Move::all_promotions(origin, target) { move_list.push(m) }
        } else {
            move_list.push(Move::new_normal(origin, target))
        }
    };

    if let Some(single) = sq.offset(forward, 0) {
        if board.piece_at(single).is_none() {
            push(sq, single, move_list);
            if sq.row() == side.pawn_row() {
                if let Some(double) = single.offset(forward, 0) {
                    if board.piece_at(double).is_none() {
                        move_list.push(Move::new_double_push(sq, double))
                    }
                }
            }
        }
    }

    for dc in [-1, 1] {
        if let Some(target) = sq.offset(forward, dc) {
            if is_enemy(board, target, side) {
                push(sq, target, move_list)
            } else if board.en_passant_target() == Some(target) {
                move_list.push(Move::new_en_passant(sq, target))
            }
        }
    }
}

/// Knight and king moves: a single step per offset
fn step_moves(board: &Board, sq: Square, side: Color, offsets: &[(i8, i8)], move_list: &mut MoveList) {
    for (dr, dc) in offsets {
        if let Some(target) = sq.offset(*dr, *dc) {
            if board.piece_at(target).is_none() || is_enemy(board, target, side) {
                move_list.push(Move::new_normal(sq, target))
            }
        }
    }
}

fn slider_moves(board: &Board, sq: Square, side: Color, directions: &[(i8, i8)], move_list: &mut MoveList) {
    for (dr, dc) in directions {
        let mut current = sq.offset(*dr, *dc);
        while let Some(target) = current {
            match board.piece_at(target) {
                None => move_list.push(Move::new_normal(sq, target)),
                Some(p) => {
                    if p.color != side { move_list.push(Move::new_normal(sq, target)) }
                    break;
                }
            }
            current = target.offset(*dr, *dc);
        }
    }
}

/// Castling needs the right, the king and rook on their original squares,
/// nothing in between and no attacked square on the king's path (its
/// starting square included)
fn castling(board: &Board, sq: Square, side: Color, move_list: &mut MoveList) {
    let row = side.back_row();
    if sq != Square::new(row, 4) { return }
    for castling_side in CastlingSide::BOTH {
        if !board.castling_rights().has(side, castling_side) { continue }
        if board.piece_at(castling_side.rook_origin(side)) != Some(Piece::new(side, PieceType::Rook)) { continue }
        if castling_side.empty_cols().iter().any(|c| board.piece_at(Square::new(row, *c)).is_some()) { continue }
        if castling_side.king_path_cols().iter().any(|c| board.is_attacked(Square::new(row, *c), side)) { continue }
        move_list.push(Move::new_castle(sq, castling_side))
    }
}

/// Counts the leaf nodes of the legal move tree up to a given depth
pub fn perft(board: &mut Board, depth: u32) -> u64 {
    if depth == 0 { return 1 }
    let moves = generate(board, GenType::Legal);
    if depth == 1 { return moves.len() as u64 }

    let mut nodes = 0;
    for m in &moves {
        let record = board.make(*m);
        nodes += perft(board, depth - 1);
        board.undo(record);
    }
    nodes
}

/// Whether a move is a quiet move, as opposed to captures and promotions
pub fn is_quiet(board: &Board, mv: &Move) -> bool {
    board.victim(mv).is_none() && !mv.is_promotion()
}

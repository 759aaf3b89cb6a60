//! Full legal move generation pipeline.
//!
//! Pseudo-legal destinations are produced per piece type, then each candidate
//! is resolved to a move kind, scored for ordering, and filtered by
//! simulating it directly on a scratch board and probing the attack tables
//! for check exposure. Pawns reaching the last rank expand into the four
//! promotion moves.
//!
//! Returned lists are ordered best-first by ordering score. That contract is
//! explicit and enforced by a sort here; it does not depend on where the
//! score happens to sit in the packed move layout.

use crate::game_state::attack_tables::{DELTA_BISHOP, DELTA_KNIGHT, DELTA_ROOK, DELTA_ROYAL};
use crate::game_state::chess_types::*;
use crate::game_state::game_state::{
    GameState, BLACK_KING_HOME, WHITE_KING_HOME,
};
use crate::moves::bit_move::{
    move_captured_piece_code, move_from, move_kind_code, move_ordering_score, move_to, pack_move,
    PackedMove, ORDERING_CAPTURE_BONUS, ORDERING_DEFAULT, ORDERING_PROMOTION,
};

/// All legal moves for the side to move, best-first.
pub fn legal_moves(game_state: &GameState) -> Vec<PackedMove> {
    generate(game_state, false)
}

/// The capture-only subset for quiescence search, best-first.
///
/// Membership is decided by the captured-piece field, so en-passant captures
/// (whose target square is empty) and quiet promotions are not included.
pub fn capture_moves(game_state: &GameState) -> Vec<PackedMove> {
    generate(game_state, true)
}

/// Legal destination squares for the piece on `from`, in generation order.
pub fn legal_destinations(game_state: &GameState, from: Square) -> Vec<Square> {
    let mut seen = Vec::new();
    for mv in legal_moves(game_state) {
        if move_from(mv) == from {
            let to = move_to(mv);
            if !seen.contains(&to) {
                seen.push(to);
            }
        }
    }
    seen
}

/// No legal move while in check: the side to move is mated.
pub fn is_checkmate(game_state: &GameState) -> bool {
    game_state.in_check() && legal_moves(game_state).is_empty()
}

/// No legal move while not in check: the game is drawn.
pub fn is_stalemate(game_state: &GameState) -> bool {
    !game_state.in_check() && legal_moves(game_state).is_empty()
}

/// Validates a from/to pair against the legal move list.
///
/// Returns the packed move on success and `None` for an illegal attempt —
/// rejection is a first-class outcome, not an error. A pawn reaching the
/// last rank resolves to the queen promotion.
pub fn check_move(game_state: &GameState, from: Square, to: Square) -> Option<PackedMove> {
    let candidates: Vec<PackedMove> = legal_moves(game_state)
        .into_iter()
        .filter(|mv| move_from(*mv) == from && move_to(*mv) == to)
        .collect();

    candidates
        .iter()
        .copied()
        .find(|mv| move_kind_code(*mv) == MoveKind::PromotionQueen.code())
        .or_else(|| candidates.first().copied())
}

fn generate(game_state: &GameState, captures_only: bool) -> Vec<PackedMove> {
    let mut scratch = game_state.clone();
    let mut destinations = Vec::with_capacity(28);
    let mut moves = Vec::with_capacity(64);

    for start in (0u8..128).filter(|sq| on_board(*sq)) {
        let piece = scratch.board[start as usize];
        if piece.is_empty() || piece.team() != Some(scratch.side_to_move) {
            continue;
        }

        destinations.clear();
        pseudo_legal_destinations(&scratch, start, &mut destinations);

        for idx in 0..destinations.len() {
            let end = destinations[idx];
            let Some(packed) = check_move_internal(&mut scratch, start, end) else {
                continue;
            };
            if captures_only && move_captured_piece_code(packed) == 0 {
                continue;
            }
            push_expanded(&mut moves, &scratch, packed);
        }
    }

    order_best_first(&mut moves);
    moves
}

/// Expands a legal pawn move onto the last rank into the four promotions;
/// every other move passes through unchanged.
fn push_expanded(moves: &mut Vec<PackedMove>, game_state: &GameState, packed: PackedMove) {
    let from = move_from(packed);
    let to = move_to(packed);
    let piece = game_state.board[from as usize];

    let promotes = (piece == Piece::WhitePawn && rank_of(to) == 7)
        || (piece == Piece::BlackPawn && rank_of(to) == 0);
    if !promotes {
        moves.push(packed);
        return;
    }

    let captured =
        Piece::from_code(move_captured_piece_code(packed)).unwrap_or(Piece::Empty);
    for kind in [
        MoveKind::PromotionKnight,
        MoveKind::PromotionBishop,
        MoveKind::PromotionRook,
        MoveKind::PromotionQueen,
    ] {
        moves.push(pack_move(from, to, piece, captured, kind, ORDERING_PROMOTION));
    }
}

/// Pseudo-legal destinations for the piece on `start`, dispatched by type.
/// Castling destinations are gated only by the rights flags here; the full
/// gauntlet runs at legality-filtering time.
fn pseudo_legal_destinations(game_state: &GameState, start: Square, out: &mut Vec<Square>) {
    let board = &game_state.board;
    match board[start as usize] {
        Piece::WhitePawn => {
            if let Some(one) = offset_square(start, 16) {
                if board[one as usize].is_empty() {
                    out.push(one);
                    if rank_of(start) == 1 && board[(start + 32) as usize].is_empty() {
                        out.push(start + 32);
                    }
                }
            }
            if let Some(left) = offset_square(start, 15) {
                out.push(left);
            }
            if let Some(right) = offset_square(start, 17) {
                out.push(right);
            }
        }
        Piece::BlackPawn => {
            if let Some(one) = offset_square(start, -16) {
                if board[one as usize].is_empty() {
                    out.push(one);
                    if rank_of(start) == 6 && board[(start - 32) as usize].is_empty() {
                        out.push(start - 32);
                    }
                }
            }
            if let Some(left) = offset_square(start, -15) {
                out.push(left);
            }
            if let Some(right) = offset_square(start, -17) {
                out.push(right);
            }
        }
        Piece::WhiteKnight | Piece::BlackKnight => {
            for delta in DELTA_KNIGHT {
                if let Some(to) = offset_square(start, delta) {
                    out.push(to);
                }
            }
        }
        Piece::WhiteBishop | Piece::BlackBishop => slide(board, start, &DELTA_BISHOP, out),
        Piece::WhiteRook | Piece::BlackRook => slide(board, start, &DELTA_ROOK, out),
        Piece::WhiteQueen | Piece::BlackQueen => slide(board, start, &DELTA_ROYAL, out),
        Piece::WhiteKing => {
            for delta in DELTA_ROYAL {
                if let Some(to) = offset_square(start, delta) {
                    out.push(to);
                }
            }
            if game_state.white_castle_short {
                out.push(0x06);
            }
            if game_state.white_castle_long {
                out.push(0x02);
            }
        }
        Piece::BlackKing => {
            for delta in DELTA_ROYAL {
                if let Some(to) = offset_square(start, delta) {
                    out.push(to);
                }
            }
            if game_state.black_castle_short {
                out.push(0x76);
            }
            if game_state.black_castle_long {
                out.push(0x72);
            }
        }
        Piece::Empty => {}
    }
}

fn slide(board: &[Piece; 128], start: Square, deltas: &[i8], out: &mut Vec<Square>) {
    for &delta in deltas {
        let mut index = start;
        while let Some(next) = offset_square(index, delta) {
            out.push(next);
            if !board[next as usize].is_empty() {
                // The blocking square itself is a destination (a capture),
                // but nothing beyond it.
                break;
            }
            index = next;
        }
    }
}

/// Resolves one pseudo-legal `(start, end)` pair to a packed legal move, or
/// `None` when it is illegal.
///
/// The board is mutated to simulate the move and restored before returning;
/// `game_state` is a scratch copy owned by the generation pass.
fn check_move_internal(
    game_state: &mut GameState,
    start: Square,
    end: Square,
) -> Option<PackedMove> {
    let start_piece = game_state.board[start as usize];
    let end_piece = game_state.board[end as usize];
    let side = game_state.side_to_move;
    let mut kind = MoveKind::Ordinary;

    // Can't capture your own teammate.
    if !end_piece.is_empty() && end_piece.team() == start_piece.team() {
        return None;
    }

    let diff = end as i16 - start as i16;
    match start_piece {
        Piece::WhitePawn => {
            if (diff == 15 || diff == 17) && end_piece.is_empty() {
                if game_state.en_passant_square == Some(end) {
                    kind = MoveKind::EnPassant;
                } else {
                    return None;
                }
            }
        }
        Piece::BlackPawn => {
            if (diff == -15 || diff == -17) && end_piece.is_empty() {
                if game_state.en_passant_square == Some(end) {
                    kind = MoveKind::EnPassant;
                } else {
                    return None;
                }
            }
        }
        Piece::WhiteKing => {
            if start == WHITE_KING_HOME && end == 0x06 {
                kind = resolve_castle(
                    game_state,
                    MoveKind::WhiteShortCastle,
                    &[0x05, 0x06],
                    &[0x04, 0x05, 0x06],
                    game_state.white_castle_short,
                )?;
            }
            if start == WHITE_KING_HOME && end == 0x02 {
                kind = resolve_castle(
                    game_state,
                    MoveKind::WhiteLongCastle,
                    &[0x01, 0x02, 0x03],
                    &[0x02, 0x03, 0x04],
                    game_state.white_castle_long,
                )?;
            }
        }
        Piece::BlackKing => {
            if start == BLACK_KING_HOME && end == 0x76 {
                kind = resolve_castle(
                    game_state,
                    MoveKind::BlackShortCastle,
                    &[0x75, 0x76],
                    &[0x74, 0x75, 0x76],
                    game_state.black_castle_short,
                )?;
            }
            if start == BLACK_KING_HOME && end == 0x72 {
                kind = resolve_castle(
                    game_state,
                    MoveKind::BlackLongCastle,
                    &[0x71, 0x72, 0x73],
                    &[0x72, 0x73, 0x74],
                    game_state.black_castle_long,
                )?;
            }
        }
        _ => {}
    }

    // MVV/LVA ordering: the greater the victim and the cheaper the attacker,
    // the earlier the move should be tried. The +8 keeps the black piece
    // codes on equal ground with the white ones.
    let start_code = start_piece.code() as u32;
    let end_code = end_piece.code() as u32;
    let mut ordering = ORDERING_DEFAULT as u32;
    match side {
        Team::White => ordering = end_code / (start_code + 8),
        Team::Black => {
            if end_code != 0 {
                ordering = (end_code + 8) / start_code;
            }
        }
    }
    if end_code != 0 {
        ordering += ORDERING_CAPTURE_BONUS as u32;
    }

    // Simulate the move in place, probe for check exposure, then restore.
    // Testing the king's own destination covers moving into check; testing
    // the cached king square covers pins and discovered checks uniformly.
    game_state.board[end as usize] = game_state.board[start as usize];
    game_state.board[start as usize] = Piece::Empty;

    let opponent = side.opposite();
    let exposed = if matches!(start_piece, Piece::WhiteKing | Piece::BlackKing) {
        game_state.is_attacked(end, opponent)
    } else {
        match game_state.king_square(side) {
            Some(king_sq) => game_state.is_attacked(king_sq, opponent),
            None => false,
        }
    };

    game_state.board[start as usize] = game_state.board[end as usize];
    game_state.board[end as usize] = end_piece;

    if exposed {
        return None;
    }

    Some(pack_move(
        start,
        end,
        start_piece,
        end_piece,
        kind,
        ordering as u8,
    ))
}

/// The castling gauntlet: intervening squares empty, the right still held,
/// and the king's start, transit, and destination squares all unattacked.
fn resolve_castle(
    game_state: &GameState,
    kind: MoveKind,
    empty_squares: &[Square],
    safe_squares: &[Square],
    right_held: bool,
) -> Option<MoveKind> {
    if !right_held {
        return None;
    }
    if empty_squares
        .iter()
        .any(|sq| !game_state.board[*sq as usize].is_empty())
    {
        return None;
    }
    let opponent = game_state.side_to_move.opposite();
    if safe_squares
        .iter()
        .any(|sq| game_state.is_attacked(*sq, opponent))
    {
        return None;
    }
    Some(kind)
}

fn order_best_first(moves: &mut [PackedMove]) {
    moves.sort_unstable_by(|a, b| {
        move_ordering_score(*b)
            .cmp(&move_ordering_score(*a))
            .then_with(|| b.cmp(a))
    });
}

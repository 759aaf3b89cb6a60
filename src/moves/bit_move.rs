//! Packed move codec.
//!
//! Move lists are produced by the million during search and perft, so moves
//! are stored as one `u32` instead of heap-allocated structures. The five
//! semantic fields plus the ordering hint are packed low bits first:
//!
//! ```text
//! bits  0..7   from square       (7 bits)
//! bits  7..14  to square         (7 bits)
//! bits 14..18  moving piece code (4 bits)
//! bits 18..22  captured piece    (4 bits)
//! bits 22..26  move kind         (4 bits)
//! bits 26..32  ordering score    (6 bits)
//! ```
//!
//! Packing never validates legality; it is a pure bit transform, and
//! `ChessMove::decode(encode(m)) == m` holds for every in-range field
//! combination.

use crate::game_state::chess_types::{MoveKind, Piece, Square};

/// A move in its compact single-integer form.
pub type PackedMove = u32;

const FROM_SHIFT: u32 = 0;
const TO_SHIFT: u32 = 7;
const MOVING_PIECE_SHIFT: u32 = 14;
const CAPTURED_PIECE_SHIFT: u32 = 18;
const KIND_SHIFT: u32 = 22;
const ORDERING_SHIFT: u32 = 26;

const SQUARE_MASK: u32 = 0x7F;
const PIECE_MASK: u32 = 0x0F;
const KIND_MASK: u32 = 0x0F;
const ORDERING_MASK: u32 = 0x3F;

/// Baseline ordering score for quiet moves.
pub const ORDERING_DEFAULT: u8 = 0;
/// Flat bonus any capture receives on top of its MVV/LVA quotient.
pub const ORDERING_CAPTURE_BONUS: u8 = 32;
/// Promotions always receive the 6-bit maximum, ahead of every capture.
pub const ORDERING_PROMOTION: u8 = 63;

#[inline]
pub fn pack_move(
    from: Square,
    to: Square,
    moving_piece: Piece,
    captured_piece: Piece,
    kind: MoveKind,
    ordering_score: u8,
) -> PackedMove {
    (from as u32)
        | ((to as u32) << TO_SHIFT)
        | ((moving_piece.code() as u32) << MOVING_PIECE_SHIFT)
        | ((captured_piece.code() as u32) << CAPTURED_PIECE_SHIFT)
        | ((kind.code() as u32) << KIND_SHIFT)
        | (((ordering_score as u32) & ORDERING_MASK) << ORDERING_SHIFT)
}

#[inline]
pub fn move_from(packed: PackedMove) -> Square {
    ((packed >> FROM_SHIFT) & SQUARE_MASK) as Square
}

#[inline]
pub fn move_to(packed: PackedMove) -> Square {
    ((packed >> TO_SHIFT) & SQUARE_MASK) as Square
}

#[inline]
pub fn move_moving_piece_code(packed: PackedMove) -> u8 {
    ((packed >> MOVING_PIECE_SHIFT) & PIECE_MASK) as u8
}

#[inline]
pub fn move_captured_piece_code(packed: PackedMove) -> u8 {
    ((packed >> CAPTURED_PIECE_SHIFT) & PIECE_MASK) as u8
}

#[inline]
pub fn move_kind_code(packed: PackedMove) -> u8 {
    ((packed >> KIND_SHIFT) & KIND_MASK) as u8
}

#[inline]
pub fn move_ordering_score(packed: PackedMove) -> u8 {
    ((packed >> ORDERING_SHIFT) & ORDERING_MASK) as u8
}

/// Structured form of a move, for presentation and API ergonomics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChessMove {
    pub from: Square,
    pub to: Square,
    pub moving_piece: Piece,
    pub captured_piece: Piece,
    pub kind: MoveKind,
    pub ordering_score: u8,
}

impl ChessMove {
    #[inline]
    pub fn encode(&self) -> PackedMove {
        pack_move(
            self.from,
            self.to,
            self.moving_piece,
            self.captured_piece,
            self.kind,
            self.ordering_score,
        )
    }

    /// Unpacks a move; `None` when a piece or kind field holds a code that no
    /// piece or move kind uses.
    pub fn decode(packed: PackedMove) -> Option<ChessMove> {
        Some(ChessMove {
            from: move_from(packed),
            to: move_to(packed),
            moving_piece: Piece::from_code(move_moving_piece_code(packed))?,
            captured_piece: Piece::from_code(move_captured_piece_code(packed))?,
            kind: MoveKind::from_code(move_kind_code(packed))?,
            ordering_score: move_ordering_score(packed),
        })
    }
}

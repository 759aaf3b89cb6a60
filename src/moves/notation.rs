//! Move text forms.
//!
//! Two forms exist: the four-character coordinate form (`e2e4`, with a fifth
//! letter on promotions, used for input and for perft/divide keys) and the
//! algebraic output form with piece letters, `x` for captures, `0-0` for
//! castling, and `=<Letter>` for promotions.

use crate::errors::ChessError;
use crate::game_state::chess_types::{MoveKind, Piece, PieceKind, Square};
use crate::moves::bit_move::ChessMove;
use crate::utils::algebraic::{algebraic_to_square, square_to_algebraic};

/// Coordinate text for a move: `e2e4`, or `e7e8q` for promotions so every
/// move maps to a distinct key.
pub fn coordinate_string(mv: &ChessMove) -> String {
    let mut out = String::with_capacity(5);
    out.push_str(&square_to_algebraic(mv.from).expect("move squares are on board"));
    out.push_str(&square_to_algebraic(mv.to).expect("move squares are on board"));
    match mv.kind {
        MoveKind::PromotionKnight => out.push('n'),
        MoveKind::PromotionBishop => out.push('b'),
        MoveKind::PromotionRook => out.push('r'),
        MoveKind::PromotionQueen => out.push('q'),
        _ => {}
    }
    out
}

/// Parses a from/to pair out of coordinate text (`e2e4`). A trailing
/// promotion letter is accepted and ignored; move resolution picks the
/// promotion piece.
pub fn parse_coordinate(text: &str) -> Result<(Square, Square), ChessError> {
    let trimmed = text.trim();
    if trimmed.len() != 4 && trimmed.len() != 5 {
        return Err(ChessError::InvalidMoveText(trimmed.to_owned()));
    }
    let from = algebraic_to_square(&trimmed[0..2])?;
    let to = algebraic_to_square(&trimmed[2..4])?;
    Ok((from, to))
}

/// Algebraic output form: `0-0`, `Nxe5`, `exd5`, `e8=Q`.
pub fn algebraic_string(mv: &ChessMove) -> String {
    match mv.kind {
        MoveKind::WhiteShortCastle | MoveKind::BlackShortCastle => return "0-0".to_owned(),
        MoveKind::WhiteLongCastle | MoveKind::BlackLongCastle => return "0-0-0".to_owned(),
        _ => {}
    }

    let mut out = String::new();
    let is_capture = mv.captured_piece != Piece::Empty || mv.kind == MoveKind::EnPassant;

    match mv.moving_piece.kind() {
        Some(PieceKind::Pawn) | None => {
            if is_capture {
                // Pawn captures lead with the start file.
                let from_text =
                    square_to_algebraic(mv.from).expect("move squares are on board");
                out.push(from_text.as_bytes()[0] as char);
            }
        }
        Some(PieceKind::Knight) => out.push('N'),
        Some(PieceKind::Bishop) => out.push('B'),
        Some(PieceKind::Rook) => out.push('R'),
        Some(PieceKind::Queen) => out.push('Q'),
        Some(PieceKind::King) => out.push('K'),
    }

    if is_capture {
        out.push('x');
    }
    out.push_str(&square_to_algebraic(mv.to).expect("move squares are on board"));

    match mv.kind {
        MoveKind::PromotionKnight => out.push_str("=N"),
        MoveKind::PromotionBishop => out.push_str("=B"),
        MoveKind::PromotionRook => out.push_str("=R"),
        MoveKind::PromotionQueen => out.push_str("=Q"),
        _ => {}
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::game_state::GameState;
    use crate::move_generation::legal_moves::check_move;

    fn resolved(fen: &str, from: &str, to: &str) -> ChessMove {
        let game = GameState::from_fen(fen).expect("FEN should parse");
        let from_sq = algebraic_to_square(from).expect("square should parse");
        let to_sq = algebraic_to_square(to).expect("square should parse");
        let packed = check_move(&game, from_sq, to_sq).expect("move should be legal");
        ChessMove::decode(packed).expect("generated moves always decode")
    }

    #[test]
    fn quiet_moves_and_captures_render_in_algebraic_form() {
        let quiet = resolved(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "g1",
            "f3",
        );
        assert_eq!(algebraic_string(&quiet), "Nf3");
        assert_eq!(coordinate_string(&quiet), "g1f3");

        let capture = resolved("4k3/8/8/3p4/4N3/8/8/4K3 w - - 0 1", "e4", "d5");
        assert_eq!(algebraic_string(&capture), "Nxd5");
    }

    #[test]
    fn pawn_captures_lead_with_the_start_file() {
        let mv = resolved("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1", "e4", "d5");
        assert_eq!(algebraic_string(&mv), "exd5");
    }

    #[test]
    fn castles_render_as_zero_notation() {
        let short = resolved("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", "e1", "g1");
        assert_eq!(algebraic_string(&short), "0-0");
        let long = resolved("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1", "e8", "c8");
        assert_eq!(algebraic_string(&long), "0-0-0");
    }

    #[test]
    fn promotions_carry_the_equals_suffix() {
        let push = resolved("8/P7/8/8/8/8/8/k6K w - - 0 1", "a7", "a8");
        assert_eq!(algebraic_string(&push), "a8=Q");
        assert_eq!(coordinate_string(&push), "a7a8q");

        let grab = resolved("1r5k/P7/8/8/8/8/8/6K1 w - - 0 1", "a7", "b8");
        assert_eq!(algebraic_string(&grab), "axb8=Q");
    }

    #[test]
    fn en_passant_renders_as_a_pawn_capture() {
        let mv = resolved("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1", "e5", "d6");
        assert_eq!(algebraic_string(&mv), "exd6");
    }

    #[test]
    fn coordinate_text_parses_and_rejects() {
        assert_eq!(parse_coordinate("e2e4").expect("should parse"), (0x14, 0x34));
        assert_eq!(parse_coordinate("a7a8q").expect("should parse"), (0x60, 0x70));
        assert!(parse_coordinate("e2").is_err());
        assert!(parse_coordinate("e2e9").is_err());
        assert!(parse_coordinate("x2e4").is_err());
    }
}

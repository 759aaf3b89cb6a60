//! Square conversions for coordinate text.
//!
//! Converts between human-readable coordinates (e.g., `e4`) and internal
//! 0x88 square indices, reused by the FEN and move-text components.

use crate::errors::ChessError;
use crate::game_state::chess_types::{file_of, on_board, rank_of, Square};

/// Convert coordinate text (for example: "e4") to a 0x88 square index.
pub fn algebraic_to_square(text: &str) -> Result<Square, ChessError> {
    let bytes = text.as_bytes();
    if bytes.len() != 2 {
        return Err(ChessError::InvalidSquareText(text.to_owned()));
    }

    let file = bytes[0];
    let rank = bytes[1];
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return Err(ChessError::InvalidSquareText(text.to_owned()));
    }

    Ok(((rank - b'1') << 4) | (file - b'a'))
}

/// Convert a 0x88 square index to coordinate text (for example: "e4").
pub fn square_to_algebraic(square: Square) -> Result<String, ChessError> {
    if !on_board(square) {
        return Err(ChessError::OffBoard(square));
    }

    let file_char = char::from(b'a' + file_of(square));
    let rank_char = char::from(b'1' + rank_of(square));
    Ok(format!("{file_char}{rank_char}"))
}

#[cfg(test)]
mod tests {
    use super::{algebraic_to_square, square_to_algebraic};
    use crate::errors::ChessError;

    #[test]
    fn corner_squares_round_trip() {
        assert_eq!(algebraic_to_square("a1").expect("a1 should parse"), 0x00);
        assert_eq!(algebraic_to_square("h1").expect("h1 should parse"), 0x07);
        assert_eq!(algebraic_to_square("a8").expect("a8 should parse"), 0x70);
        assert_eq!(algebraic_to_square("h8").expect("h8 should parse"), 0x77);
        assert_eq!(square_to_algebraic(0x00).expect("a1"), "a1");
        assert_eq!(square_to_algebraic(0x77).expect("h8"), "h8");
        for square in (0u8..128).filter(|sq| sq & 0x88 == 0) {
            let text = square_to_algebraic(square).expect("on-board square");
            assert_eq!(algebraic_to_square(&text).expect("round trip"), square);
        }
    }

    #[test]
    fn malformed_text_is_rejected() {
        assert!(matches!(
            algebraic_to_square("i1"),
            Err(ChessError::InvalidSquareText(_))
        ));
        assert!(matches!(
            algebraic_to_square("a9"),
            Err(ChessError::InvalidSquareText(_))
        ));
        assert!(matches!(
            algebraic_to_square("e"),
            Err(ChessError::InvalidSquareText(_))
        ));
        assert!(matches!(
            square_to_algebraic(0x08),
            Err(ChessError::OffBoard(0x08))
        ));
    }
}

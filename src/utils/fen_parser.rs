//! FEN-to-GameState parser.
//!
//! Builds a fully-populated position from a Forsyth-Edwards Notation string,
//! including the piece matrix, rights, clocks, and cached king squares.

use crate::errors::ChessError;
use crate::game_state::chess_types::{Piece, Team};
use crate::game_state::game_state::GameState;
use crate::utils::algebraic::algebraic_to_square;

pub fn parse_fen(fen: &str) -> Result<GameState, ChessError> {
    let mut parts = fen.split_whitespace();
    let missing = |what: &str| ChessError::InvalidFen(format!("missing {what}: {fen}"));

    let board_part = parts.next().ok_or_else(|| missing("board layout"))?;
    let side_part = parts.next().ok_or_else(|| missing("side to move"))?;
    let castling_part = parts.next().ok_or_else(|| missing("castling rights"))?;
    let en_passant_part = parts.next().ok_or_else(|| missing("en-passant square"))?;
    let halfmove_part = parts.next().ok_or_else(|| missing("halfmove clock"))?;
    let fullmove_part = parts.next().ok_or_else(|| missing("fullmove number"))?;

    if parts.next().is_some() {
        return Err(ChessError::InvalidFen(format!(
            "extra trailing fields: {fen}"
        )));
    }

    let mut game_state = GameState::new_empty();

    parse_board(board_part, &mut game_state)?;

    game_state.side_to_move = match side_part {
        "w" => Team::White,
        "b" => Team::Black,
        other => {
            return Err(ChessError::InvalidFen(format!(
                "invalid side to move: {other}"
            )))
        }
    };

    if castling_part != "-" {
        for ch in castling_part.chars() {
            match ch {
                'K' => game_state.white_castle_short = true,
                'Q' => game_state.white_castle_long = true,
                'k' => game_state.black_castle_short = true,
                'q' => game_state.black_castle_long = true,
                other => {
                    return Err(ChessError::InvalidFen(format!(
                        "invalid castling flag: {other}"
                    )))
                }
            }
        }
    }

    game_state.en_passant_square = if en_passant_part == "-" {
        None
    } else {
        Some(
            algebraic_to_square(en_passant_part)
                .map_err(|_| ChessError::InvalidFen(format!("bad en-passant: {en_passant_part}")))?,
        )
    };

    game_state.half_move_clock = halfmove_part
        .parse::<u16>()
        .map_err(|_| ChessError::InvalidFen(format!("invalid halfmove clock: {halfmove_part}")))?;
    game_state.full_move_count = fullmove_part
        .parse::<u16>()
        .map_err(|_| ChessError::InvalidFen(format!("invalid fullmove number: {fullmove_part}")))?;

    // Reconstruct the ply counter from the move number and side to move.
    game_state.half_move_count = game_state.full_move_count * 2
        + if game_state.side_to_move == Team::Black {
            1
        } else {
            0
        };

    Ok(game_state)
}

fn parse_board(board_part: &str, game_state: &mut GameState) -> Result<(), ChessError> {
    let ranks: Vec<&str> = board_part.split('/').collect();
    if ranks.len() != 8 {
        return Err(ChessError::InvalidFen(
            "board layout must contain 8 ranks".to_owned(),
        ));
    }

    for (fen_rank_idx, rank_str) in ranks.iter().enumerate() {
        let board_rank = 7 - fen_rank_idx as u8;
        let mut file = 0u8;

        for ch in rank_str.chars() {
            if let Some(empty_count) = ch.to_digit(10) {
                if !(1..=8).contains(&empty_count) {
                    return Err(ChessError::InvalidFen(format!(
                        "invalid empty-square count '{ch}'"
                    )));
                }
                file += empty_count as u8;
                continue;
            }

            let piece = Piece::from_fen_char(ch).ok_or_else(|| {
                ChessError::InvalidFen(format!("invalid piece character '{ch}'"))
            })?;

            if file >= 8 {
                return Err(ChessError::InvalidFen(
                    "board rank has too many files".to_owned(),
                ));
            }

            let square = (board_rank << 4) | file;
            game_state.board[square as usize] = piece;
            match piece {
                Piece::WhiteKing => game_state.white_king = Some(square),
                Piece::BlackKing => game_state.black_king = Some(square),
                _ => {}
            }
            file += 1;
        }

        if file != 8 {
            return Err(ChessError::InvalidFen(
                "board rank does not sum to 8 files".to_owned(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::parse_fen;
    use crate::errors::ChessError;
    use crate::game_state::chess_types::{Piece, Team};

    #[test]
    fn starting_position_parses_with_king_caches() {
        let game = parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
            .expect("starting FEN should parse");
        assert_eq!(game.side_to_move, Team::White);
        assert_eq!(game.piece_at(0x04), Piece::WhiteKing);
        assert_eq!(game.white_king, Some(0x04));
        assert_eq!(game.black_king, Some(0x74));
        assert!(game.white_castle_short && game.black_castle_long);
        assert_eq!(game.en_passant_square, None);
        assert_eq!(game.full_move_count, 1);
    }

    #[test]
    fn en_passant_and_partial_rights_parse() {
        let game = parse_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b Kq e3 0 1")
            .expect("FEN should parse");
        assert_eq!(game.en_passant_square, Some(0x24));
        assert!(game.white_castle_short);
        assert!(!game.white_castle_long);
        assert!(!game.black_castle_short);
        assert!(game.black_castle_long);
    }

    #[test]
    fn malformed_records_are_rejected() {
        assert!(matches!(
            parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -"),
            Err(ChessError::InvalidFen(_))
        ));
        assert!(matches!(
            parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1"),
            Err(ChessError::InvalidFen(_))
        ));
        assert!(matches!(
            parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNX w KQkq - 0 1"),
            Err(ChessError::InvalidFen(_))
        ));
        assert!(matches!(
            parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1"),
            Err(ChessError::InvalidFen(_))
        ));
        assert!(matches!(
            parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq zz 0 1"),
            Err(ChessError::InvalidFen(_))
        ));
    }
}

//! GameState-to-FEN writer.
//!
//! The inverse of `fen_parser`: a well-formed record parsed and re-serialized
//! must come back character for character.

use crate::game_state::chess_types::{Piece, Team};
use crate::game_state::game_state::GameState;
use crate::utils::algebraic::square_to_algebraic;

pub fn generate_fen(game_state: &GameState) -> String {
    let mut out = String::new();

    for rank in (0u8..8).rev() {
        let mut blanks = 0u8;
        for file in 0u8..8 {
            let square = (rank << 4) | file;
            match game_state.piece_at(square).fen_char() {
                Some(ch) => {
                    if blanks > 0 {
                        out.push(char::from(b'0' + blanks));
                        blanks = 0;
                    }
                    out.push(ch);
                }
                None => blanks += 1,
            }
        }
        if blanks > 0 {
            out.push(char::from(b'0' + blanks));
        }
        if rank > 0 {
            out.push('/');
        }
    }

    out.push(' ');
    out.push(match game_state.side_to_move {
        Team::White => 'w',
        Team::Black => 'b',
    });

    out.push(' ');
    let mut any_rights = false;
    if game_state.white_castle_short {
        out.push('K');
        any_rights = true;
    }
    if game_state.white_castle_long {
        out.push('Q');
        any_rights = true;
    }
    if game_state.black_castle_short {
        out.push('k');
        any_rights = true;
    }
    if game_state.black_castle_long {
        out.push('q');
        any_rights = true;
    }
    if !any_rights {
        out.push('-');
    }

    out.push(' ');
    match game_state.en_passant_square {
        Some(square) => {
            out.push_str(&square_to_algebraic(square).expect("en-passant square is on board"))
        }
        None => out.push('-'),
    }

    out.push(' ');
    out.push_str(&game_state.half_move_clock.to_string());
    out.push(' ');
    out.push_str(&game_state.full_move_count.to_string());

    out
}

#[cfg(test)]
mod tests {
    use crate::game_state::game_state::GameState;

    #[test]
    fn representative_positions_round_trip_exactly() {
        let records = [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            // En-passant target set after a double push.
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            // Partial castling rights.
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w Kq - 4 12",
            // No rights at all, deep into a game.
            "1r4k1/7p/3p1bp1/p1pP4/P1P1prP1/1N2R2P/1P1N1PK1/8 b - - 3 31",
            "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1",
            "8/bpp1k2p/p2pP1p1/P5q1/1P5N/8/6PP/5Q1K b - - 0 35",
        ];

        for record in records {
            let game = GameState::from_fen(record).expect("record should parse");
            assert_eq!(game.get_fen(), record);
        }
    }
}

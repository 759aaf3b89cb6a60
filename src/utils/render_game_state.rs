//! Terminal-oriented board renderer.
//!
//! Creates a human-readable board view from the 0x88 matrix for the shell,
//! tests, and search telemetry in text environments.

use crate::game_state::game_state::GameState;

/// Render the board to a text grid, rank 8 at the top.
pub fn render_game_state(game_state: &GameState) -> String {
    let mut out = String::new();

    out.push_str("  a b c d e f g h\n");

    for rank in (0u8..8).rev() {
        out.push(char::from(b'1' + rank));
        out.push(' ');

        for file in 0u8..8 {
            let square = (rank << 4) | file;
            match game_state.piece_at(square).fen_char() {
                Some(ch) => out.push(ch),
                None => out.push('·'),
            }
            if file < 7 {
                out.push(' ');
            }
        }

        out.push(' ');
        out.push(char::from(b'1' + rank));
        out.push('\n');
    }

    out.push_str("  a b c d e f g h");
    out
}

#[cfg(test)]
mod tests {
    use super::render_game_state;
    use crate::game_state::game_state::GameState;

    #[test]
    fn starting_position_renders_with_both_back_ranks() {
        let rendered = render_game_state(&GameState::new_game());
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[1], "8 r n b q k b n r 8");
        assert_eq!(lines[8], "1 R N B Q K B N R 1");
        assert!(lines[4].contains('·'));
    }
}

//! Crate root module declarations for the Quince Chess engine project.
//!
//! This file exposes all top-level subsystems (game state, move generation,
//! search, the command shell session, and utility helpers) so binaries,
//! tests, and external tooling can import stable module paths.

pub mod errors;

pub mod game_state {
    pub mod attack_tables;
    pub mod chess_types;
    pub mod game_state;
}

pub mod moves {
    pub mod bit_move;
    pub mod notation;
}

pub mod move_generation {
    pub mod legal_moves;
    pub mod perft;
}

pub mod search {
    pub mod board_scoring;
    pub mod engine;
    pub mod observer;
}

pub mod shell {
    pub mod command_shell;
}

pub mod utils {
    pub mod algebraic;
    pub mod fen_generator;
    pub mod fen_parser;
    pub mod render_game_state;
}

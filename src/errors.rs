//! Errors used throughout the chess engine.
//!
//! `ChessError` is the single error type returned by parsing utilities and
//! the engine control surface. Illegal move attempts are deliberately not
//! represented here: move validation reports them through an `Option`-shaped
//! "invalid" outcome, because a rejected move is a normal interactive result,
//! not a failure. Search cancellation is likewise a normal termination path
//! and never surfaces as an error.

use thiserror::Error;

/// Unified error type for the chess engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChessError {
    /// The provided FEN string is malformed or could not be parsed.
    #[error("invalid FEN string: {0}")]
    InvalidFen(String),

    /// A square in coordinate text form (for example `e4`) failed to parse.
    #[error("invalid algebraic square: {0}")]
    InvalidSquareText(String),

    /// A move in coordinate text form (for example `e2e4`) failed to parse.
    #[error("invalid coordinate move: {0}")]
    InvalidMoveText(String),

    /// A square index outside the 64 valid board squares was supplied.
    #[error("square index {0} is off the board")]
    OffBoard(u8),

    /// A command asked about a square that holds no piece of the side to move.
    #[error("no piece of the side to move on {0}")]
    NoPieceToMove(String),
}

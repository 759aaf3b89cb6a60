//! Engine control surface and the line-based command interpreter.
//!
//! `EngineSession` owns a position and a search engine and exposes the
//! operations a front end needs: FEN in/out, legal-destination queries, move
//! attempts with an explicit illegal outcome, the three search modes, the
//! side-to-move toggle, and the perft diagnostics. `handle_command` maps one
//! text command onto that surface so the binary stays a thin read loop.

use std::collections::BTreeMap;

use crate::errors::ChessError;
use crate::game_state::game_state::GameState;
use crate::move_generation::legal_moves::{check_move, is_checkmate, legal_destinations};
use crate::move_generation::perft::{divide, perft, run_reference_suite};
use crate::moves::bit_move::ChessMove;
use crate::moves::notation::{algebraic_string, parse_coordinate};
use crate::search::board_scoring::PositionalScorer;
use crate::search::engine::{CancelToken, SearchEngine};
use crate::utils::algebraic::{algebraic_to_square, square_to_algebraic};
use crate::utils::render_game_state::render_game_state;

const HELP_TEXT: &str = "Commands:
 show - Outputs a visual representation of the current position
 fen - Outputs the FEN string for the current position
 setposition {FEN} - Sets the current position from the FEN string
 reset - Resets the position to the default starting position
 move {e2e4} - Makes the specified move if legal
 moves {e2} - Lists the legal destinations from the given square
 perft {depth} - Counts leaf nodes for the current position at the given depth
 divide {depth} - Prints per-move leaf counts at the given depth
 testmovegen - Runs the perft reference suite against known-good counts
 yourmove - Searches the current position and plays the move found
 think - Searches the current position and reveals the best move
 timedmove {millis} - Searches under a wall-clock budget and plays the result
 nullmove - Toggles whose turn it is without moving a piece
 setdepth {depth} - Sets the search depth
 exit - Exits the program";

/// Result of interpreting one command line.
pub enum ShellOutcome {
    Continue(String),
    Quit(String),
}

/// The engine control surface consumed by the interactive shell.
pub struct EngineSession {
    position: GameState,
    engine: SearchEngine<PositionalScorer>,
    search_depth: i32,
}

impl Default for EngineSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineSession {
    pub fn new() -> Self {
        Self {
            position: GameState::new_game(),
            engine: SearchEngine::default(),
            search_depth: 3,
        }
    }

    pub fn position(&self) -> &GameState {
        &self.position
    }

    pub fn position_fen(&self) -> String {
        self.position.get_fen()
    }

    pub fn set_position_from_fen(&mut self, fen: &str) -> Result<(), ChessError> {
        self.position = GameState::from_fen(fen)?;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.position = GameState::new_game();
    }

    pub fn set_search_depth(&mut self, depth: i32) {
        self.search_depth = depth.max(1);
    }

    /// Attempts the move; `Some` applies it and reports what was played,
    /// `None` is the explicit illegal-move outcome.
    pub fn try_move(&mut self, from: u8, to: u8) -> Option<ChessMove> {
        let packed = check_move(&self.position, from, to)?;
        self.position.make_move(packed);
        ChessMove::decode(packed)
    }

    /// Legal destination squares from the square given in coordinate text.
    pub fn legal_destinations_from(&self, square_text: &str) -> Result<Vec<String>, ChessError> {
        let from = algebraic_to_square(square_text)?;
        if self.position.piece_at(from).team() != Some(self.position.side_to_move) {
            return Err(ChessError::NoPieceToMove(square_text.to_owned()));
        }
        legal_destinations(&self.position, from)
            .into_iter()
            .map(square_to_algebraic)
            .collect()
    }

    pub fn best_move_at_depth(&mut self, depth: i32) -> Option<ChessMove> {
        self.engine.compute_move_at_depth(&self.position, depth)
    }

    pub fn best_move_timed(&mut self, millis: u64) -> Option<ChessMove> {
        self.engine.compute_move_timed(&self.position, millis)
    }

    pub fn best_move_until_cancelled(&mut self, token: CancelToken) -> Option<ChessMove> {
        self.engine
            .compute_move_until_cancelled(&self.position, token)
    }

    /// Applies an engine-chosen move to the session position.
    pub fn play(&mut self, mv: &ChessMove) {
        self.position.make_move(mv.encode());
    }

    pub fn toggle_side_to_move(&mut self) {
        self.position.make_null_move();
    }

    pub fn perft(&self, depth: u32) -> u64 {
        perft(&self.position, depth)
    }

    pub fn divide(&self, depth: u32) -> BTreeMap<String, u64> {
        divide(&self.position, depth)
    }

    pub fn run_reference_suite(&self) -> bool {
        run_reference_suite()
    }

    /// Interprets a single command line against this session.
    pub fn handle_command(&mut self, line: &str) -> ShellOutcome {
        let trimmed = line.trim();
        let mut words = trimmed.split_whitespace();
        let Some(command) = words.next() else {
            return ShellOutcome::Continue(String::new());
        };

        match command.to_ascii_lowercase().as_str() {
            "help" => ShellOutcome::Continue(HELP_TEXT.to_owned()),
            "exit" | "quit" => ShellOutcome::Quit("Bye!".to_owned()),
            "show" => ShellOutcome::Continue(format!(
                "Current position:\n{}",
                render_game_state(&self.position)
            )),
            "fen" => ShellOutcome::Continue(format!("Current position: {}", self.position_fen())),
            "reset" => {
                self.reset();
                ShellOutcome::Continue(
                    "Resetting current position to the starting position".to_owned(),
                )
            }
            "setposition" => {
                // The FEN begins after the command word; preserve its spacing.
                let fen = trimmed
                    .strip_prefix(command)
                    .map(str::trim)
                    .unwrap_or_default();
                match self.set_position_from_fen(fen) {
                    Ok(()) => ShellOutcome::Continue(format!("Position set to: {fen}")),
                    Err(err) => ShellOutcome::Continue(err.to_string()),
                }
            }
            "move" => match words.next().map(parse_coordinate) {
                Some(Ok((from, to))) => match self.try_move(from, to) {
                    Some(mv) => ShellOutcome::Continue(algebraic_string(&mv)),
                    None => ShellOutcome::Continue("Illegal Move".to_owned()),
                },
                Some(Err(err)) => ShellOutcome::Continue(err.to_string()),
                None => ShellOutcome::Continue("Usage: move e2e4".to_owned()),
            },
            "moves" => match words.next() {
                Some(square_text) => match self.legal_destinations_from(square_text) {
                    Ok(destinations) if destinations.is_empty() => {
                        ShellOutcome::Continue(format!("No legal moves from {square_text}"))
                    }
                    Ok(destinations) => ShellOutcome::Continue(destinations.join(" ")),
                    Err(err) => ShellOutcome::Continue(err.to_string()),
                },
                None => ShellOutcome::Continue("Usage: moves e2".to_owned()),
            },
            "perft" => match words.next().and_then(|w| w.parse::<u32>().ok()) {
                Some(depth) => {
                    let started = std::time::Instant::now();
                    let nodes = self.perft(depth);
                    ShellOutcome::Continue(format!(
                        "Nodes at depth {depth}: {nodes}\nTime to calculate: {}ms",
                        started.elapsed().as_millis()
                    ))
                }
                None => ShellOutcome::Continue("Usage: perft 3".to_owned()),
            },
            "divide" => match words.next().and_then(|w| w.parse::<u32>().ok()) {
                Some(depth) => {
                    let map = self.divide(depth);
                    let mut out = String::new();
                    for (key, count) in &map {
                        out.push_str(&format!("{key} {count}\n"));
                    }
                    out.push_str(&format!("Moves: {}", map.len()));
                    ShellOutcome::Continue(out)
                }
                None => ShellOutcome::Continue("Usage: divide 3".to_owned()),
            },
            "testmovegen" => {
                if self.run_reference_suite() {
                    ShellOutcome::Continue("Success!".to_owned())
                } else {
                    ShellOutcome::Continue("There's a problem.".to_owned())
                }
            }
            "yourmove" => {
                let depth = self.search_depth;
                match self.best_move_at_depth(depth) {
                    Some(mv) => {
                        self.play(&mv);
                        ShellOutcome::Continue(format!(
                            "{}\n{}",
                            algebraic_string(&mv),
                            render_game_state(&self.position)
                        ))
                    }
                    None => ShellOutcome::Continue(self.no_move_outcome()),
                }
            }
            "think" => {
                let depth = self.search_depth;
                match self.best_move_at_depth(depth) {
                    Some(mv) => {
                        ShellOutcome::Continue(format!("Best move: {}", algebraic_string(&mv)))
                    }
                    None => ShellOutcome::Continue(self.no_move_outcome()),
                }
            }
            "timedmove" => match words.next().and_then(|w| w.parse::<u64>().ok()) {
                Some(millis) => match self.best_move_timed(millis) {
                    Some(mv) => {
                        self.play(&mv);
                        ShellOutcome::Continue(algebraic_string(&mv))
                    }
                    None => ShellOutcome::Continue(self.no_move_outcome()),
                },
                None => ShellOutcome::Continue("Usage: timedmove 2000".to_owned()),
            },
            "nullmove" => {
                self.toggle_side_to_move();
                ShellOutcome::Continue("Making null move".to_owned())
            }
            "setdepth" => match words.next().and_then(|w| w.parse::<i32>().ok()) {
                Some(depth) => {
                    self.set_search_depth(depth);
                    ShellOutcome::Continue(format!(
                        "Setting default search depth to {}",
                        self.search_depth
                    ))
                }
                None => ShellOutcome::Continue("Usage: setdepth 4".to_owned()),
            },
            unknown => ShellOutcome::Continue(format!("Unknown command: {unknown}")),
        }
    }

    fn no_move_outcome(&self) -> String {
        if is_checkmate(&self.position) {
            "Checkmate; no move to make".to_owned()
        } else {
            "Stalemate; no move to make".to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(outcome: ShellOutcome) -> String {
        match outcome {
            ShellOutcome::Continue(text) | ShellOutcome::Quit(text) => text,
        }
    }

    #[test]
    fn move_command_applies_legal_moves_and_rejects_illegal_ones() {
        let mut session = EngineSession::new();
        assert_eq!(text(session.handle_command("move e2e4")), "e4");
        assert_eq!(
            session.position_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );

        assert_eq!(text(session.handle_command("move e2e4")), "Illegal Move");
        assert_eq!(text(session.handle_command("move zz99")).contains("invalid"), true);
    }

    #[test]
    fn moves_command_lists_destinations() {
        let mut session = EngineSession::new();
        let listed = text(session.handle_command("moves e2"));
        assert!(listed.contains("e3"));
        assert!(listed.contains("e4"));

        let refused = text(session.handle_command("moves e5"));
        assert!(refused.contains("e5"));
    }

    #[test]
    fn perft_and_divide_commands_report_node_counts() {
        let mut session = EngineSession::new();
        assert!(text(session.handle_command("perft 2")).contains("Nodes at depth 2: 400"));

        let divided = text(session.handle_command("divide 1"));
        assert!(divided.contains("e2e4 1"));
        assert!(divided.contains("Moves: 20"));
    }

    #[test]
    fn setposition_fen_and_reset_round_trip() {
        let mut session = EngineSession::new();
        let record = "8/bpp1k2p/p2pP1p1/P5q1/1P5N/8/6PP/5Q1K b - - 0 35";
        assert!(text(session.handle_command(&format!("setposition {record}"))).contains(record));
        assert!(text(session.handle_command("fen")).contains(record));

        session.handle_command("reset");
        assert_eq!(
            session.position_fen(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );

        let rejected = text(session.handle_command("setposition not a fen"));
        assert!(rejected.contains("invalid FEN"));
    }

    #[test]
    fn nullmove_toggles_the_side_to_move() {
        let mut session = EngineSession::new();
        session.handle_command("nullmove");
        assert!(session.position_fen().contains(" b "));
        session.handle_command("nullmove");
        assert!(session.position_fen().contains(" w "));
    }

    #[test]
    fn yourmove_plays_a_move_at_shallow_depth() {
        let mut session = EngineSession::new();
        session.handle_command("setdepth 1");
        let before = session.position_fen();
        let reply = text(session.handle_command("yourmove"));
        assert_ne!(session.position_fen(), before);
        assert!(!reply.is_empty());
    }

    #[test]
    fn think_reports_checkmate_when_there_is_no_move() {
        let mut session = EngineSession::new();
        session.handle_command("setposition R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1");
        assert!(text(session.handle_command("think")).contains("Checkmate"));

        session.handle_command("setposition 7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert!(text(session.handle_command("think")).contains("Stalemate"));
    }

    #[test]
    fn cancellation_driven_search_is_reachable_through_the_session() {
        use std::thread;
        use std::time::Duration;

        let mut session = EngineSession::new();
        let token = CancelToken::new();
        let trigger = token.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(200));
            trigger.cancel();
        });

        let best = session
            .best_move_until_cancelled(token)
            .expect("the opening has moves");
        assert!(session.try_move(best.from, best.to).is_some());
    }

    #[test]
    fn unknown_commands_are_reported() {
        let mut session = EngineSession::new();
        assert!(text(session.handle_command("frobnicate")).contains("Unknown command"));
        assert!(matches!(session.handle_command("exit"), ShellOutcome::Quit(_)));
    }
}

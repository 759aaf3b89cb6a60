//! Negamax search with quiescence, null-move pruning, and aspiration
//! windows.
//!
//! Every recursive call works on its own clone of the position, so no two
//! in-flight branches ever share a mutable board and nothing needs a lock.
//! Cancellation is cooperative: the search polls a token between root moves
//! and at the top of every recursive call, unwinding with the neutral score
//! 0 for abandoned subtrees. Those scores are never trusted as results; only
//! the best move a completed depth locked in is ever returned.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rand::prelude::IndexedRandom;

use crate::game_state::game_state::GameState;
use crate::move_generation::legal_moves::{capture_moves, legal_moves};
use crate::moves::bit_move::{ChessMove, PackedMove};
use crate::search::board_scoring::{BoardScorer, PositionalScorer};
use crate::search::observer::SearchObserver;
use crate::utils::render_game_state::render_game_state;

/// Half-width of the aspiration window around the previous depth's score.
pub const ASPIRATION_WINDOW: i32 = 10;
/// Quiescence search may run at most this many plies past the horizon.
pub const MAX_QUIESCENCE_PLY: i32 = 10;
/// Null-move depth reduction.
pub const NULL_MOVE_REDUCTION: i32 = 2;
/// Checkmate score; far above any material total.
pub const MATE_SCORE: i32 = 150_000;
/// Virtual infinity for alpha-beta bounds.
pub const INFINITY_SCORE: i32 = 300_000;
/// Tick interval of the search timer thread, in milliseconds.
pub const TIMER_INTERVAL_MS: u64 = 100;

/// Cooperative cancellation flag shared between a search and its scheduler.
#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Spawns the timer thread driving a wall-clock search budget: every tick it
/// decrements the remaining time and cancels the token once the budget is
/// spent.
pub fn spawn_search_timer(token: CancelToken, millis: u64) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut remaining = millis as i64;
        loop {
            thread::sleep(Duration::from_millis(TIMER_INTERVAL_MS));
            remaining -= TIMER_INTERVAL_MS as i64;
            if remaining <= 100 {
                token.cancel();
                break;
            }
        }
    })
}

/// Search depth presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    /// Plays a uniformly random legal move without searching.
    Impulsive,
    Easy,
    Medium,
    Hard,
}

enum RootOutcome {
    Cancelled,
    NoMoves,
    Best(PackedMove, i32),
}

/// The search engine: evaluation, the negamax family, and the driving loops.
pub struct SearchEngine<S: BoardScorer> {
    scorer: S,
    observer: Option<Box<dyn SearchObserver>>,
    cancel: CancelToken,
    nodes_searched: u64,
    deepest_ply: i32,
    window_alpha: i32,
    window_beta: i32,
}

impl Default for SearchEngine<PositionalScorer> {
    fn default() -> Self {
        SearchEngine::new(PositionalScorer)
    }
}

impl<S: BoardScorer> SearchEngine<S> {
    pub fn new(scorer: S) -> Self {
        Self {
            scorer,
            observer: None,
            cancel: CancelToken::new(),
            nodes_searched: 0,
            deepest_ply: 0,
            window_alpha: -INFINITY_SCORE,
            window_beta: INFINITY_SCORE,
        }
    }

    pub fn set_observer(&mut self, observer: Box<dyn SearchObserver>) {
        self.observer = Some(observer);
    }

    pub fn remove_observer(&mut self) {
        self.observer = None;
    }

    pub fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }

    /// Static evaluation from the moving side's perspective.
    pub fn evaluate_position(&self, game_state: &GameState) -> i32 {
        self.scorer.score(game_state)
    }

    /// Searches to exactly `depth` plies (plus quiescence) and returns the
    /// best move found, or `None` when the side to move has no legal move.
    pub fn compute_move_at_depth(
        &mut self,
        game_state: &GameState,
        depth: i32,
    ) -> Option<ChessMove> {
        self.begin_search(CancelToken::new());
        self.root_search(game_state, depth)
            .and_then(ChessMove::decode)
    }

    /// Maps a difficulty preset onto a search. The impulsive level answers
    /// instantly with a random legal move.
    pub fn compute_move_for_difficulty(
        &mut self,
        game_state: &GameState,
        difficulty: Difficulty,
    ) -> Option<ChessMove> {
        match difficulty {
            Difficulty::Impulsive => {
                let moves = legal_moves(game_state);
                let mut rng = rand::rng();
                moves.choose(&mut rng).copied().and_then(ChessMove::decode)
            }
            Difficulty::Easy => self.compute_move_at_depth(game_state, 2),
            Difficulty::Medium => self.compute_move_at_depth(game_state, 3),
            Difficulty::Hard => self.compute_move_at_depth(game_state, 4),
        }
    }

    /// Iterative-deepening search under a wall-clock budget.
    ///
    /// A one-ply non-quiescent root search runs first so a fallback move
    /// exists immediately; the timer thread then drives the cancellation
    /// token while depths increase. Whatever the last completed depth locked
    /// in is returned.
    pub fn compute_move_timed(&mut self, game_state: &GameState, millis: u64) -> Option<ChessMove> {
        let token = CancelToken::new();
        spawn_search_timer(token.clone(), millis);
        self.deepening_loop(game_state, token)
    }

    /// Iterative-deepening search that runs until `token` is cancelled by
    /// the caller.
    pub fn compute_move_until_cancelled(
        &mut self,
        game_state: &GameState,
        token: CancelToken,
    ) -> Option<ChessMove> {
        self.deepening_loop(game_state, token)
    }

    fn begin_search(&mut self, token: CancelToken) {
        self.cancel = token;
        self.nodes_searched = 0;
        self.deepest_ply = 0;
        self.window_alpha = -INFINITY_SCORE;
        self.window_beta = INFINITY_SCORE;
        if let Some(observer) = self.observer.as_mut() {
            observer.search_started();
        }
    }

    fn deepening_loop(&mut self, game_state: &GameState, token: CancelToken) -> Option<ChessMove> {
        self.begin_search(CancelToken::new());

        // Guarantee a fallback before the clock starts mattering.
        let mut best = self.root_search_no_quiescence(game_state, 1);
        if best.is_none() {
            // No legal moves: checkmate or stalemate, nothing to deepen.
            return None;
        }
        self.publish_best(best);

        self.cancel = token.clone();
        let mut depth = 0i32;
        while !token.is_cancelled() {
            let started = Instant::now();
            match self.root_search(game_state, depth) {
                Some(mv) => {
                    best = Some(mv);
                    self.publish_best(best);
                }
                None => {
                    // Cancelled mid-depth; the previous depth's move stands.
                }
            }
            depth += 1;

            if let Some(observer) = self.observer.as_mut() {
                observer.depth_completed(depth - 1);
                observer.deepest_ply(self.deepest_ply);
                let elapsed_ms = started.elapsed().as_millis() as u64;
                if elapsed_ms != 0 {
                    observer.nodes_per_second(self.nodes_searched.saturating_mul(1000) / elapsed_ms);
                }
            }
        }

        best.and_then(ChessMove::decode)
    }

    fn publish_best(&mut self, best: Option<PackedMove>) {
        if let (Some(observer), Some(mv)) = (self.observer.as_mut(), best.and_then(ChessMove::decode))
        {
            observer.best_move_changed(&mv);
        }
    }

    /// One root iteration inside the aspiration window. A result at or
    /// outside the window re-searches the same depth with full bounds
    /// instead of trusting a fail-high or fail-low move.
    fn root_search(&mut self, game_state: &GameState, depth: i32) -> Option<PackedMove> {
        let (alpha, beta) = (self.window_alpha, self.window_beta);
        match self.root_search_window(game_state, depth, alpha, beta) {
            RootOutcome::Cancelled | RootOutcome::NoMoves => None,
            RootOutcome::Best(mv, score) => {
                if score <= alpha || score >= beta {
                    self.window_alpha = -INFINITY_SCORE;
                    self.window_beta = INFINITY_SCORE;
                    match self.root_search_window(
                        game_state,
                        depth,
                        -INFINITY_SCORE,
                        INFINITY_SCORE,
                    ) {
                        RootOutcome::Best(full_mv, full_score) => {
                            self.window_alpha = full_score - ASPIRATION_WINDOW;
                            self.window_beta = full_score + ASPIRATION_WINDOW;
                            Some(full_mv)
                        }
                        RootOutcome::Cancelled | RootOutcome::NoMoves => None,
                    }
                } else {
                    self.window_alpha = score - ASPIRATION_WINDOW;
                    self.window_beta = score + ASPIRATION_WINDOW;
                    Some(mv)
                }
            }
        }
    }

    /// Root iteration of the quiescent search over all legal moves.
    fn root_search_window(
        &mut self,
        game_state: &GameState,
        depth: i32,
        mut alpha: i32,
        beta: i32,
    ) -> RootOutcome {
        let moves = legal_moves(game_state);
        if moves.is_empty() {
            return RootOutcome::NoMoves;
        }

        let total = moves.len();
        let mut best_move = None;
        let mut best = -INFINITY_SCORE;

        for (completed, mv) in moves.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                return RootOutcome::Cancelled;
            }

            let mut copy = game_state.clone();
            copy.make_move(mv);
            let score = -self.negamax_quiescent(&copy, 1, depth - 1, -beta, -alpha, true);

            if let Some(observer) = self.observer.as_mut() {
                observer.display_board(&render_game_state(&copy));
                observer.progress(completed + 1, total);
                observer.nodes_searched(self.nodes_searched);
                observer.deepest_ply(self.deepest_ply);
            }

            if score > best {
                best = score;
                best_move = Some(mv);
                if let Some(observer) = self.observer.as_mut() {
                    let pawns =
                        f64::from(score) / 100.0 * f64::from(game_state.side_to_move.sign());
                    observer.evaluation(pawns);
                }
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                break;
            }
        }

        match best_move {
            Some(mv) => RootOutcome::Best(mv, best),
            None => RootOutcome::NoMoves,
        }
    }

    /// Root iteration of the plain negamax search; immune to quiescence
    /// blowup, subject to the horizon effect. Used to secure the instant
    /// fallback move.
    fn root_search_no_quiescence(
        &mut self,
        game_state: &GameState,
        depth: i32,
    ) -> Option<PackedMove> {
        let mut best_move = None;
        let mut best = -INFINITY_SCORE;

        for mv in legal_moves(game_state) {
            if self.cancel.is_cancelled() {
                return best_move;
            }
            let mut copy = game_state.clone();
            copy.make_move(mv);
            let score =
                -self.negamax(&copy, 1, depth - 1, -INFINITY_SCORE, INFINITY_SCORE);
            if score > best {
                best = score;
                best_move = Some(mv);
            }
        }

        best_move
    }

    /// The main workhorse: negamax over all moves, falling into quiescence
    /// at the horizon, with null-move pruning ahead of the real moves.
    fn negamax_quiescent(
        &mut self,
        game_state: &GameState,
        ply: i32,
        depth: i32,
        mut alpha: i32,
        beta: i32,
        allow_null: bool,
    ) -> i32 {
        self.nodes_searched += 1;
        if self.cancel.is_cancelled() {
            return 0;
        }

        // Probe a pass: if doing nothing at reduced depth already beats
        // beta, no real move needs examining. Never probed while in check.
        if allow_null && !game_state.in_check() {
            let mut null_state = game_state.clone();
            null_state.make_null_move();
            let val = -self.negamax_quiescent(
                &null_state,
                ply + 1,
                depth - 1 - NULL_MOVE_REDUCTION,
                -beta,
                -beta + 1,
                false,
            );
            if val >= beta {
                return val;
            }
        }

        if depth <= 0 {
            return self.quiescence(game_state, ply + 1, alpha, beta);
        }

        let moves = legal_moves(game_state);
        if moves.is_empty() {
            return if game_state.in_check() {
                -(MATE_SCORE + ply)
            } else {
                0
            };
        }

        for mv in moves {
            let mut copy = game_state.clone();
            copy.make_move(mv);
            let val = -self.negamax_quiescent(&copy, ply + 1, depth - 1, -beta, -alpha, true);
            if val >= beta {
                return beta;
            }
            if val > alpha {
                alpha = val;
            }
        }
        alpha
    }

    /// Capture-only extension past the horizon.
    ///
    /// In check there is no quiet stand-pat: the position escapes the
    /// horizon through a one-ply full search instead. Capped at
    /// `MAX_QUIESCENCE_PLY` to bound runaway capture chains.
    fn quiescence(&mut self, game_state: &GameState, ply: i32, mut alpha: i32, beta: i32) -> i32 {
        self.nodes_searched += 1;
        if ply > self.deepest_ply {
            self.deepest_ply = ply;
        }
        if self.cancel.is_cancelled() {
            return 0;
        }

        if game_state.in_check() {
            if legal_moves(game_state).is_empty() {
                return -(MATE_SCORE + ply);
            }
            return self.negamax(game_state, ply + 1, 1, alpha, beta);
        }

        let stand_pat = self.evaluate_position(game_state);
        if stand_pat >= beta {
            return beta;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }
        if ply >= MAX_QUIESCENCE_PLY {
            return alpha;
        }

        for mv in capture_moves(game_state) {
            let mut copy = game_state.clone();
            copy.make_move(mv);
            let val = -self.quiescence(&copy, ply + 1, -beta, -alpha);
            if val >= beta {
                return beta;
            }
            if val > alpha {
                alpha = val;
            }
        }
        alpha
    }

    /// Plain depth-bounded negamax without quiescence.
    fn negamax(
        &mut self,
        game_state: &GameState,
        ply: i32,
        depth: i32,
        mut alpha: i32,
        beta: i32,
    ) -> i32 {
        self.nodes_searched += 1;
        if self.cancel.is_cancelled() {
            return 0;
        }
        if depth <= 0 {
            return self.evaluate_position(game_state);
        }

        let moves = legal_moves(game_state);
        if moves.is_empty() {
            return if game_state.in_check() {
                -(MATE_SCORE + ply)
            } else {
                0
            };
        }

        for mv in moves {
            let mut copy = game_state.clone();
            copy.make_move(mv);
            let val = -self.negamax(&copy, ply + 1, depth - 1, -beta, -alpha);
            if val >= beta {
                return beta;
            }
            if val > alpha {
                alpha = val;
            }
        }
        alpha
    }
}

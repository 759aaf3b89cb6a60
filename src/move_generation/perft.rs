//! Perft and divide: the correctness oracle for move generation.
//!
//! `perft` counts the leaf positions reachable in exactly `depth` plies by
//! brute-force expansion, with no pruning and no evaluation. Known node
//! counts for fixed reference positions make any generator defect visible;
//! `divide` splits the count per root move for pinpointing where a miscount
//! comes from.

use std::collections::BTreeMap;

use crate::game_state::game_state::GameState;
use crate::move_generation::legal_moves::legal_moves;
use crate::moves::bit_move::ChessMove;
use crate::moves::notation::coordinate_string;

/// Leaf count at exactly `depth` plies. Depth 0 is one node: the position
/// itself.
pub fn perft(game_state: &GameState, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut nodes = 0u64;
    for mv in legal_moves(game_state) {
        let mut copy = game_state.clone();
        copy.make_move(mv);
        nodes += perft(&copy, depth - 1);
    }
    nodes
}

/// Per-root-move leaf counts, keyed by the move's coordinate text.
pub fn divide(game_state: &GameState, depth: u32) -> BTreeMap<String, u64> {
    let mut map = BTreeMap::new();
    if depth == 0 {
        return map;
    }
    for mv in legal_moves(game_state) {
        let mut copy = game_state.clone();
        copy.make_move(mv);
        let key = ChessMove::decode(mv)
            .map(|m| coordinate_string(&m))
            .unwrap_or_else(|| format!("#{mv:08x}"));
        map.insert(key, perft(&copy, depth - 1));
    }
    map
}

/// A reference position with a known exact node count.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceCase {
    pub name: &'static str,
    pub fen: &'static str,
    pub depth: u32,
    pub expected_nodes: u64,
}

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
pub const COMPLICATED_FEN: &str =
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
pub const PROMOTION_FEN: &str = "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1";

/// The self-check suite: standard opening, a complex midgame, and a position
/// with imminent promotions, each pinned to its exact depth-5 count.
pub const REFERENCE_SUITE: [ReferenceCase; 3] = [
    ReferenceCase {
        name: "starting position",
        fen: STARTING_FEN,
        depth: 5,
        expected_nodes: 4_865_609,
    },
    ReferenceCase {
        name: "complicated midgame",
        fen: COMPLICATED_FEN,
        depth: 5,
        expected_nodes: 193_690_690,
    },
    ReferenceCase {
        name: "promotion tangle",
        fen: PROMOTION_FEN,
        depth: 5,
        expected_nodes: 3_605_103,
    },
];

/// Runs the full reference suite, succeeding only if every count matches
/// exactly. This is a long-running diagnostic, not a unit test.
pub fn run_reference_suite() -> bool {
    REFERENCE_SUITE.iter().all(|case| {
        let game = match GameState::from_fen(case.fen) {
            Ok(game) => game,
            Err(_) => return false,
        };
        perft(&game, case.depth) == case.expected_nodes
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(fen: &str) -> GameState {
        GameState::from_fen(fen).expect("reference FEN should parse")
    }

    #[test]
    fn perft_depth_zero_is_one_node() {
        assert_eq!(perft(&position(STARTING_FEN), 0), 1);
    }

    #[test]
    fn starting_position_shallow_counts() {
        let game = position(STARTING_FEN);
        assert_eq!(perft(&game, 1), 20);
        assert_eq!(perft(&game, 2), 400);
        assert_eq!(perft(&game, 3), 8_902);
    }

    #[test]
    fn complicated_midgame_shallow_counts() {
        let game = position(COMPLICATED_FEN);
        assert_eq!(perft(&game, 1), 48);
        assert_eq!(perft(&game, 2), 2_039);
        assert_eq!(perft(&game, 3), 97_862);
    }

    #[test]
    fn promotion_position_shallow_counts() {
        let game = position(PROMOTION_FEN);
        assert_eq!(perft(&game, 1), 24);
        assert_eq!(perft(&game, 2), 496);
        assert_eq!(perft(&game, 3), 9_483);
    }

    #[test]
    #[ignore = "deep perft; run with --ignored for full validation"]
    fn starting_position_deep_counts() {
        let game = position(STARTING_FEN);
        assert_eq!(perft(&game, 4), 197_281);
        assert_eq!(perft(&game, 5), 4_865_609);
    }

    #[test]
    #[ignore = "deep perft; run with --ignored for full validation"]
    fn complicated_midgame_deep_counts() {
        let game = position(COMPLICATED_FEN);
        assert_eq!(perft(&game, 4), 4_085_603);
        assert_eq!(perft(&game, 5), 193_690_690);
    }

    #[test]
    #[ignore = "deep perft; run with --ignored for full validation"]
    fn promotion_position_deep_counts() {
        let game = position(PROMOTION_FEN);
        assert_eq!(perft(&game, 4), 182_838);
        assert_eq!(perft(&game, 5), 3_605_103);
    }

    #[test]
    fn divide_splits_the_total_per_root_move() {
        let game = position(STARTING_FEN);

        let shallow = divide(&game, 1);
        assert_eq!(shallow.len(), 20);
        assert!(shallow.values().all(|count| *count == 1));
        assert!(shallow.contains_key("e2e4"));

        let deeper = divide(&game, 2);
        assert_eq!(deeper.values().sum::<u64>(), perft(&game, 2));
    }

    #[test]
    fn divide_depth_zero_is_empty() {
        assert!(divide(&position(STARTING_FEN), 0).is_empty());
    }
}

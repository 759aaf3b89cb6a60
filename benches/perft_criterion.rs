use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use quince_chess::game_state::game_state::GameState;
use quince_chess::move_generation::perft::perft;

#[derive(Clone, Copy)]
struct BenchCase {
    name: &'static str,
    fen: &'static str,
    expected_nodes: &'static [u64],
}

const STARTPOS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

const CASES: &[BenchCase] = &[
    BenchCase {
        name: "starting_position",
        fen: STARTPOS_FEN,
        expected_nodes: &[20, 400, 8_902],
    },
    BenchCase {
        name: "complicated_midgame",
        fen: "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        expected_nodes: &[48, 2_039],
    },
    BenchCase {
        name: "promotion_tangle",
        fen: "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1",
        expected_nodes: &[24, 496, 9_483],
    },
];

fn perft_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft");
    group.measurement_time(Duration::from_secs(10));

    for case in CASES {
        let game = GameState::from_fen(case.fen).expect("bench FEN should parse");
        let depth = case.expected_nodes.len() as u32;
        let expected = *case.expected_nodes.last().expect("cases have depths");

        group.throughput(Throughput::Elements(expected));
        group.bench_with_input(
            BenchmarkId::new(case.name, depth),
            &game,
            |bencher, game| {
                bencher.iter(|| {
                    let nodes = perft(black_box(game), depth);
                    assert_eq!(nodes, expected);
                    nodes
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, perft_bench);
criterion_main!(benches);

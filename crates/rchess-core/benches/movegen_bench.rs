//! 指し手生成・perft・探索のベンチマーク
//!
//! - 疑似合法手生成（GenType::All）
//! - 詰み判定（指し手リストを作らない判定）
//! - perft（make/unmake を含む）
//! - 固定深さ探索

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rchess_core::eval::MaterialEvaluator;
use rchess_core::movegen::{GenType, MoveList, generate, perft};
use rchess_core::position::{Position, START_FEN};
use rchess_core::search::{SearchLimits, SearchWorker};

const POSITIONS: &[(&str, &str)] = &[
    ("startpos", START_FEN),
    ("kiwipete", "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"),
    ("endgame", "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1"),
];

fn bench_generate(c: &mut Criterion) {
    rchess_core::init();
    let mut group = c.benchmark_group("generate_all");
    for &(name, fen) in POSITIONS {
        let pos = Position::from_fen(fen).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(name), &pos, |b, pos| {
            let mut list = MoveList::new();
            b.iter(|| {
                list.clear();
                generate(black_box(pos), GenType::All, &mut list);
                black_box(list.len())
            });
        });
    }
    group.finish();
}

fn bench_has_legal_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("has_legal_move");
    for &(name, fen) in POSITIONS {
        let pos = Position::from_fen(fen).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(name), &pos, |b, pos| {
            b.iter(|| black_box(pos).has_legal_move());
        });
    }
    group.finish();
}

fn bench_perft(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft");
    group.sample_size(10);
    for &(name, fen) in POSITIONS {
        let pos = Position::from_fen(fen).unwrap();
        group.bench_with_input(BenchmarkId::new(name, 3), &pos, |b, pos| {
            b.iter(|| {
                let mut p = pos.clone();
                black_box(perft(&mut p, 3))
            });
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_depth_5");
    group.sample_size(10);
    for &(name, fen) in POSITIONS {
        let pos = Position::from_fen(fen).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(name), &pos, |b, pos| {
            b.iter(|| {
                let mut worker = SearchWorker::with_hash(MaterialEvaluator, 16);
                let mut p = pos.clone();
                black_box(worker.search(&mut p, &SearchLimits::depth(5)).best_move)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_generate, bench_has_legal_move, bench_perft, bench_search);
criterion_main!(benches);

//! 局面の不変条件（ハッシュ整合・make/unmake の逆操作・FEN 往復・詰み判定の一致）

use proptest::prelude::*;
use rchess_core::movegen::{count_legal_moves, legal_moves};
use rchess_core::position::{Position, START_FEN};
use rchess_core::types::Move;

const SEEDS: &[&str] = &[
    START_FEN,
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
    "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
];

/// 各局面で検査する不変条件
fn check_invariants(pos: &Position) {
    pos.assert_consistent();
    assert_eq!(pos.key(), pos.compute_key(), "incremental key mismatch at {}", pos.to_fen());

    let fen = pos.to_fen();
    let reparsed = Position::from_fen(&fen).unwrap();
    assert_eq!(reparsed.to_fen(), fen);
    assert_eq!(reparsed.key(), pos.key(), "key differs after FEN round trip of {fen}");

    let legal = legal_moves(pos).len();
    assert_eq!(pos.has_legal_move(), legal > 0, "has_legal_move at {fen}");
    assert_eq!(pos.is_checkmate(), legal == 0 && pos.in_check(), "is_checkmate at {fen}");
    assert_eq!(pos.is_stalemate(), legal == 0 && !pos.in_check(), "is_stalemate at {fen}");
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_random_walk_keeps_invariants(
        seed in 0..SEEDS.len(),
        choices in prop::collection::vec(any::<u16>(), 1..40),
    ) {
        let mut pos = Position::from_fen(SEEDS[seed]).unwrap();
        let original = pos.clone();
        let mut history = Vec::new();

        for choice in choices {
            let moves = legal_moves(&pos);
            if moves.is_empty() {
                break;
            }
            let mv = moves[choice as usize % moves.len()];
            let undo = pos.make_move(mv);
            prop_assert!(!pos.left_king_in_check());
            check_invariants(&pos);
            history.push((mv, undo));
        }

        while let Some((mv, undo)) = history.pop() {
            pos.unmake_move(mv, &undo);
        }
        prop_assert!(pos == original);
    }

    #[test]
    fn prop_null_move_is_reversible(
        seed in 0..SEEDS.len(),
        choices in prop::collection::vec(any::<u16>(), 0..10),
    ) {
        let mut pos = Position::from_fen(SEEDS[seed]).unwrap();
        for choice in choices {
            let moves = legal_moves(&pos);
            if moves.is_empty() {
                break;
            }
            pos.make_move(moves[choice as usize % moves.len()]);
        }
        if !pos.in_check() {
            let before = pos.clone();
            let undo = pos.make_null_move();
            prop_assert_eq!(pos.key(), pos.compute_key());
            prop_assert!(pos.ep_square().is_none());
            pos.unmake_null_move(&undo);
            prop_assert!(pos == before);
        }
    }
}

#[test]
fn test_transposition_gives_same_key() {
    let mut a = Position::startpos();
    for text in ["g1f3", "g8f6", "b1c3", "b8c6"] {
        let mv = a.parse_move(text).unwrap();
        a.make_move(mv);
    }
    let mut b = Position::startpos();
    for text in ["b1c3", "b8c6", "g1f3", "g8f6"] {
        let mv = b.parse_move(text).unwrap();
        b.make_move(mv);
    }
    assert_eq!(a.key(), b.key());
    assert_eq!(a.to_fen(), b.to_fen());
}

#[test]
fn test_double_push_without_capturer_has_no_ep_in_key() {
    let mut pos = Position::startpos();
    let mv = pos.parse_move("e2e4").unwrap();
    pos.make_move(mv);
    assert!(pos.ep_square().is_none());
    assert_eq!(pos.key(), Position::from_fen(&pos.to_fen()).unwrap().key());
}

#[test]
fn test_threefold_by_repetition() {
    let mut pos = Position::startpos();
    assert_eq!(pos.threefold_count(), 1);
    for round in 0..2 {
        for text in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            let mv: Move = pos.parse_move(text).unwrap();
            pos.make_move(mv);
        }
        assert_eq!(pos.threefold_count(), round + 2);
    }
}

#[test]
fn test_fifty_move_counter() {
    let mut pos = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 99 80").unwrap();
    assert!(!pos.is_fifty_move_draw());
    let mv = pos.parse_move("a1a2").unwrap();
    pos.make_move(mv);
    assert!(pos.is_fifty_move_draw());
}

/// 詰み判定と合法手の数え上げが一致すること
fn assert_mate_agrees(fen: &str, expected_moves: usize) {
    let pos = Position::from_fen(fen).unwrap();
    let count = count_legal_moves(&pos);
    assert_eq!(count, expected_moves, "legal move count of {fen}");
    assert_eq!(pos.has_legal_move(), count > 0, "{fen}");
    assert_eq!(pos.is_checkmate(), pos.in_check() && count == 0, "{fen}");
    assert_eq!(pos.is_stalemate(), !pos.in_check() && count == 0, "{fen}");
}

#[test]
fn test_en_passant_exposing_king_on_rank_is_stalemate() {
    // bxc6 e.p. は5段目のルークに玉をさらすので指せない
    let pinned = "7k/pp6/1n6/KPp4r/8/8/8/8 w - c6 0 2";
    assert!(Position::from_fen(pinned).unwrap().to_fen().contains(" c6 "));
    assert_mate_agrees(pinned, 0);
    assert!(Position::from_fen(pinned).unwrap().is_stalemate());

    // ルークがいなければ e.p. だけが合法手
    assert_mate_agrees("7k/pp6/1n6/KPp5/8/8/8/8 w - c6 0 2", 1);
}

#[test]
fn test_promotion_push_is_the_only_block() {
    // e8 への成り（4種）だけが王手を遮る
    let blockable = "K6r/4P3/2k5/8/8/4b3/8/8 w - - 0 1";
    assert_mate_agrees(blockable, 4);
    assert!(!Position::from_fen(blockable).unwrap().is_checkmate());

    // ポーンが1段手前だと遮れない
    let mated = "K6r/8/2k1P3/8/8/4b3/8/8 w - - 0 1";
    assert_mate_agrees(mated, 0);
    assert!(Position::from_fen(mated).unwrap().is_checkmate());
}

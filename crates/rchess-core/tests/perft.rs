//! 既知局面の perft 値による指し手生成の検証

use rchess_core::movegen::{perft, perft_divide};
use rchess_core::position::{Position, START_FEN};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
const POSITION_4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";
const POSITION_6: &str =
    "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10";

fn check(fen: &str, expected: &[u64]) {
    rchess_core::init();
    let mut pos = Position::from_fen(fen).unwrap();
    let original = pos.clone();
    for (i, &nodes) in expected.iter().enumerate() {
        let depth = i as u32 + 1;
        assert_eq!(perft(&mut pos, depth), nodes, "perft({depth}) of {fen}");
        assert!(pos == original, "perft({depth}) did not restore {fen}");
    }
}

#[test]
fn test_perft_startpos() {
    check(START_FEN, &[20, 400, 8_902, 197_281]);
}

#[test]
fn test_perft_kiwipete() {
    check(KIWIPETE, &[48, 2_039, 97_862]);
}

#[test]
fn test_perft_position_3() {
    check(POSITION_3, &[14, 191, 2_812, 43_238]);
}

#[test]
fn test_perft_position_4() {
    check(POSITION_4, &[6, 264, 9_467]);
}

#[test]
fn test_perft_position_4_mirrored() {
    check("r2q1rk1/pP1p2pp/Q4n2/bbp1p3/Np6/1B3NBn/pPPP1PPP/R3K2R b KQ - 0 1", &[6, 264, 9_467]);
}

#[test]
fn test_perft_position_5() {
    check(POSITION_5, &[44, 1_486, 62_379]);
}

#[test]
fn test_perft_position_6() {
    check(POSITION_6, &[46, 2_079, 89_890]);
}

#[test]
fn test_perft_divide_kiwipete_sums() {
    let mut pos = Position::from_fen(KIWIPETE).unwrap();
    let divide = perft_divide(&mut pos, 2);
    assert_eq!(divide.len(), 48);
    assert_eq!(divide.iter().map(|&(_, n)| n).sum::<u64>(), 2_039);
}

//! 近接駒の利きテーブルと升間のマスク
//!
//! - ナイト・キングの利き（升ごとのテーブル）
//! - 歩の利き・前進（シフトと筋マスクによる算術計算）
//! - `between_bb` / `line_bb`（合駒・ピン判定用）

use std::sync::OnceLock;

use crate::types::{Color, Square};

use super::Bitboard;
use super::sliders::{bishop_attacks, rook_attacks};

/// 筋ごとのマスク（a..h）
pub const FILE_BB: [Bitboard; 8] = {
    let mut table = [Bitboard::EMPTY; 8];
    let mut f = 0;
    while f < 8 {
        table[f] = Bitboard(0x0101_0101_0101_0101u64 << f);
        f += 1;
    }
    table
};

/// 段ごとのマスク（1..8）
pub const RANK_BB: [Bitboard; 8] = {
    let mut table = [Bitboard::EMPTY; 8];
    let mut r = 0;
    while r < 8 {
        table[r] = Bitboard(0xFFu64 << (r * 8));
        r += 1;
    }
    table
};

const NOT_FILE_A: u64 = !0x0101_0101_0101_0101u64;
const NOT_FILE_H: u64 = !(0x0101_0101_0101_0101u64 << 7);

const KNIGHT_DELTAS: [(i8, i8); 8] =
    [(1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2)];
const KING_DELTAS: [(i8, i8); 8] =
    [(1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1), (0, -1), (1, -1)];

struct StepTables {
    knight: [Bitboard; Square::NUM],
    king: [Bitboard; Square::NUM],
    between: Box<[[Bitboard; Square::NUM]; Square::NUM]>,
    line: Box<[[Bitboard; Square::NUM]; Square::NUM]>,
}

static STEP_TABLES: OnceLock<StepTables> = OnceLock::new();

fn step_tables() -> &'static StepTables {
    STEP_TABLES.get_or_init(StepTables::new)
}

pub(super) fn init_tables() {
    step_tables();
}

impl StepTables {
    fn new() -> Self {
        let knight = init_leaper(&KNIGHT_DELTAS);
        let king = init_leaper(&KING_DELTAS);
        let (between, line) = init_between_and_line();
        StepTables {
            knight,
            king,
            between,
            line,
        }
    }
}

/// 固定オフセットを列挙し、盤外を捨ててテーブルを作る
fn init_leaper(deltas: &[(i8, i8)]) -> [Bitboard; Square::NUM] {
    let mut table = [Bitboard::EMPTY; Square::NUM];
    for sq in Square::all() {
        for &(df, dr) in deltas {
            let f = sq.file() as i8 + df;
            let r = sq.rank() as i8 + dr;
            if (0..8).contains(&f) && (0..8).contains(&r) {
                table[sq.index()].set(Square::new(f as u8, r as u8));
            }
        }
    }
    table
}

type SquarePairTable = Box<[[Bitboard; Square::NUM]; Square::NUM]>;

fn init_between_and_line() -> (SquarePairTable, SquarePairTable) {
    let mut between = Box::new([[Bitboard::EMPTY; Square::NUM]; Square::NUM]);
    let mut line = Box::new([[Bitboard::EMPTY; Square::NUM]; Square::NUM]);
    for a in Square::all() {
        let a_bb = Bitboard::from_square(a);
        for b in Square::all() {
            if a == b {
                continue;
            }
            let b_bb = Bitboard::from_square(b);
            if (bishop_attacks(a, Bitboard::EMPTY) & b_bb).is_not_empty() {
                between[a.index()][b.index()] = bishop_attacks(a, b_bb) & bishop_attacks(b, a_bb);
                line[a.index()][b.index()] = (bishop_attacks(a, Bitboard::EMPTY)
                    & bishop_attacks(b, Bitboard::EMPTY))
                    | a_bb
                    | b_bb;
            } else if (rook_attacks(a, Bitboard::EMPTY) & b_bb).is_not_empty() {
                between[a.index()][b.index()] = rook_attacks(a, b_bb) & rook_attacks(b, a_bb);
                line[a.index()][b.index()] = (rook_attacks(a, Bitboard::EMPTY)
                    & rook_attacks(b, Bitboard::EMPTY))
                    | a_bb
                    | b_bb;
            }
        }
    }
    (between, line)
}

/// ナイトの利き
#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    step_tables().knight[sq.index()]
}

/// キングの利き
#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    step_tables().king[sq.index()]
}

/// 2升の間（両端を含まない）。同一直線上にない場合は空。
#[inline]
pub fn between_bb(a: Square, b: Square) -> Bitboard {
    step_tables().between[a.index()][b.index()]
}

/// 2升を通る直線（盤端から盤端まで、両端を含む）。同一直線上にない場合は空。
#[inline]
pub fn line_bb(a: Square, b: Square) -> Bitboard {
    step_tables().line[a.index()][b.index()]
}

/// 3升が同一直線上にあるか
#[inline]
pub fn aligned(a: Square, b: Square, c: Square) -> bool {
    line_bb(a, b).contains(c)
}

/// `color` 側の歩の集合が利いている升
#[inline]
pub const fn pawn_attacks_bb(color: Color, pawns: Bitboard) -> Bitboard {
    let p = pawns.0;
    match color {
        Color::White => Bitboard(((p & NOT_FILE_A) << 7) | ((p & NOT_FILE_H) << 9)),
        Color::Black => Bitboard(((p & NOT_FILE_A) >> 9) | ((p & NOT_FILE_H) >> 7)),
    }
}

/// 1升の歩の利き
#[inline]
pub const fn pawn_attacks(color: Color, sq: Square) -> Bitboard {
    pawn_attacks_bb(color, Bitboard::from_square(sq))
}

/// `color` 側の歩の集合を1升前進させる
#[inline]
pub const fn pawn_push(color: Color, pawns: Bitboard) -> Bitboard {
    match color {
        Color::White => pawns.north(),
        Color::Black => pawns.south(),
    }
}

/// 1升前進した先が `empty` の歩のうち、さらに2升目も空いているものの到達升
#[inline]
pub const fn pawn_double_push(color: Color, pawns: Bitboard, empty: Bitboard) -> Bitboard {
    let single = Bitboard(pawn_push(color, pawns).0 & empty.0);
    let third = match color {
        Color::White => RANK_BB[2],
        Color::Black => RANK_BB[5],
    };
    Bitboard(pawn_push(color, Bitboard(single.0 & third.0)).0 & empty.0)
}

/// 手番側から見た n 段目のマスク（0 始まり）
#[inline]
pub const fn relative_rank_bb(color: Color, rank: usize) -> Bitboard {
    match color {
        Color::White => RANK_BB[rank],
        Color::Black => RANK_BB[7 - rank],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_knight_attack_counts() {
        assert_eq!(knight_attacks(Square::A1).count(), 2);
        assert_eq!(knight_attacks(sq("b1")).count(), 3);
        assert_eq!(knight_attacks(sq("d4")).count(), 8);
        assert!(knight_attacks(Square::G1).contains(sq("f3")));
    }

    #[test]
    fn test_king_attack_counts() {
        assert_eq!(king_attacks(Square::A1).count(), 3);
        assert_eq!(king_attacks(sq("a4")).count(), 5);
        assert_eq!(king_attacks(sq("e4")).count(), 8);
    }

    #[test]
    fn test_pawn_attacks_do_not_wrap() {
        let a2 = pawn_attacks(Color::White, sq("a2"));
        assert_eq!(a2, Bitboard::from_square(sq("b3")));
        let h7 = pawn_attacks(Color::Black, sq("h7"));
        assert_eq!(h7, Bitboard::from_square(sq("g6")));
        assert_eq!(pawn_attacks(Color::White, sq("e4")).count(), 2);
    }

    #[test]
    fn test_pawn_pushes() {
        let pawns = Bitboard::from_square(sq("e2")) | Bitboard::from_square(sq("d3"));
        let empty = !pawns;
        assert_eq!(
            pawn_push(Color::White, pawns) & empty,
            Bitboard::from_square(sq("e3")) | Bitboard::from_square(sq("d4"))
        );
        assert_eq!(
            pawn_double_push(Color::White, pawns, empty),
            Bitboard::from_square(sq("e4"))
        );
        let blocked = empty & !Bitboard::from_square(sq("e3"));
        assert!(pawn_double_push(Color::White, pawns, blocked).is_empty());
    }

    #[test]
    fn test_between_and_line() {
        assert_eq!(between_bb(Square::A1, sq("d4")).count(), 2);
        assert_eq!(between_bb(Square::A1, Square::A8).count(), 6);
        assert!(between_bb(Square::A1, sq("b3")).is_empty());
        assert_eq!(line_bb(Square::A1, sq("c3")).count(), 8);
        assert!(aligned(Square::A1, sq("c3"), Square::H8));
        assert!(!aligned(Square::A1, sq("c3"), Square::H1));
    }
}

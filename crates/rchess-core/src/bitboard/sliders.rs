//! 遠方駒（ビショップ・ルーク・クイーン）の利きをマジックビットボードで計算する
//!
//! 升ごとに「関係する占有マスク」「マジック乗数」「シフト量」を持ち、
//! `(occupied & mask) * magic >> shift` を利きテーブルのインデックスとする。
//! マジック乗数は固定シードの乱数から初期化時に探索し、升ごとに衝突がないことを確認する。

use std::sync::OnceLock;

use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::types::Square;

use super::Bitboard;

/// マジック探索の乱数シード
const MAGIC_SEED: u64 = 0x2545_F491_4F6C_DD1D;

/// 1升あたりのマジック探索の試行上限
const MAX_MAGIC_ATTEMPTS: u32 = 100_000_000;

const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// 1升分のマジック
#[derive(Clone, Copy, Default)]
struct Magic {
    mask: u64,
    magic: u64,
    shift: u32,
    offset: usize,
}

impl Magic {
    #[inline]
    fn index(&self, occupied: Bitboard) -> usize {
        self.offset + ((occupied.0 & self.mask).wrapping_mul(self.magic) >> self.shift) as usize
    }
}

struct SliderTable {
    bishop: [Magic; Square::NUM],
    rook: [Magic; Square::NUM],
    attacks: Vec<Bitboard>,
}

static SLIDER_ATTACKS: OnceLock<SliderTable> = OnceLock::new();

fn slider_attacks() -> &'static SliderTable {
    SLIDER_ATTACKS.get_or_init(SliderTable::new)
}

pub(super) fn init_sliders() {
    slider_attacks();
}

impl SliderTable {
    fn new() -> Self {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(MAGIC_SEED);
        // ルーク 102400 + ビショップ 5248 エントリ
        let mut attacks = Vec::with_capacity(102_400 + 5_248);
        let mut bishop = [Magic::default(); Square::NUM];
        let mut rook = [Magic::default(); Square::NUM];
        for sq in Square::all() {
            bishop[sq.index()] = find_magic(sq, &BISHOP_DIRECTIONS, &mut rng, &mut attacks);
            rook[sq.index()] = find_magic(sq, &ROOK_DIRECTIONS, &mut rng, &mut attacks);
        }
        log::debug!("magic bitboard tables ready ({} entries)", attacks.len());
        SliderTable {
            bishop,
            rook,
            attacks,
        }
    }
}

/// レイを1升ずつ辿って利きを求める（テーブル構築とテスト用）
pub(crate) fn sliding_attack(sq: Square, occupied: Bitboard, directions: &[(i8, i8)]) -> Bitboard {
    let mut attacks = Bitboard::EMPTY;
    for &(df, dr) in directions {
        let (mut f, mut r) = (sq.file() as i8, sq.rank() as i8);
        loop {
            f += df;
            r += dr;
            if !(0..8).contains(&f) || !(0..8).contains(&r) {
                break;
            }
            let to = Square::new(f as u8, r as u8);
            attacks.set(to);
            if occupied.contains(to) {
                break;
            }
        }
    }
    attacks
}

/// 関係する占有マスク（各レイの盤端の升を除く）
fn relevant_mask(sq: Square, directions: &[(i8, i8)]) -> u64 {
    let mut mask = 0u64;
    for &(df, dr) in directions {
        let (mut f, mut r) = (sq.file() as i8 + df, sq.rank() as i8 + dr);
        while (0..8).contains(&(f + df)) && (0..8).contains(&(r + dr)) {
            mask |= 1u64 << (r * 8 + f);
            f += df;
            r += dr;
        }
    }
    mask
}

fn find_magic(
    sq: Square,
    directions: &[(i8, i8)],
    rng: &mut Xoshiro256PlusPlus,
    attacks: &mut Vec<Bitboard>,
) -> Magic {
    let mask = relevant_mask(sq, directions);
    let bits = mask.count_ones();
    let size = 1usize << bits;
    let shift = 64 - bits;

    // carry-rippler で mask の全部分集合を列挙
    let mut occupancies = Vec::with_capacity(size);
    let mut references = Vec::with_capacity(size);
    let mut subset = 0u64;
    loop {
        occupancies.push(subset);
        references.push(sliding_attack(sq, Bitboard(subset), directions));
        subset = subset.wrapping_sub(mask) & mask;
        if subset == 0 {
            break;
        }
    }

    let mut table = vec![Bitboard::EMPTY; size];
    let mut epoch = vec![0u32; size];
    let mut attempt = 0u32;
    loop {
        let magic = rng.next_u64() & rng.next_u64() & rng.next_u64();
        if (mask.wrapping_mul(magic) >> 56).count_ones() < 6 {
            continue;
        }
        attempt += 1;
        assert!(
            attempt < MAX_MAGIC_ATTEMPTS,
            "no magic found for square {sq} after {attempt} attempts"
        );

        let mut ok = true;
        for (occ, reference) in occupancies.iter().zip(references.iter()) {
            let idx = (occ.wrapping_mul(magic) >> shift) as usize;
            if epoch[idx] < attempt {
                epoch[idx] = attempt;
                table[idx] = *reference;
            } else if table[idx] != *reference {
                ok = false;
                break;
            }
        }
        if ok {
            let offset = attacks.len();
            attacks.extend_from_slice(&table);
            return Magic {
                mask,
                magic,
                shift,
                offset,
            };
        }
    }
}

/// ビショップの利き
#[inline]
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    let t = slider_attacks();
    t.attacks[t.bishop[sq.index()].index(occupied)]
}

/// ルークの利き
#[inline]
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    let t = slider_attacks();
    t.attacks[t.rook[sq.index()].index(occupied)]
}

/// クイーンの利き
#[inline]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}

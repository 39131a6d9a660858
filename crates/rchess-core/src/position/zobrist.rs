//! Zobristハッシュ乱数テーブル
//!
//! 駒×升・手番・キャスリング権・アンパッサン筋ごとの乱数。
//! 固定シードの乱数から1度だけ生成するため、実行ごとに同じ値になる。

use std::sync::LazyLock;

use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::types::{CastlingRights, Piece, Square};

/// Zobrist 乱数のシード
const ZOBRIST_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// Zobristテーブル
pub struct Zobrist {
    psq: [[u64; Square::NUM]; Piece::NUM],
    side: u64,
    castling: [u64; CastlingRights::NUM],
    ep_file: [u64; 8],
}

impl Zobrist {
    fn new() -> Self {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(ZOBRIST_SEED);
        let mut psq = [[0u64; Square::NUM]; Piece::NUM];
        // NONE を含む未使用インデックスは 0 のまま
        for (pc_idx, row) in psq.iter_mut().enumerate() {
            if matches!(pc_idx & 7, 1..=6) {
                for key in row.iter_mut() {
                    *key = rng.next_u64();
                }
            }
        }
        let side = rng.next_u64();

        // 4つの権利それぞれの乱数を XOR して16通りの組み合わせを作る
        let rights: [u64; 4] = std::array::from_fn(|_| rng.next_u64());
        let mut castling = [0u64; CastlingRights::NUM];
        for (bits, key) in castling.iter_mut().enumerate() {
            for (i, r) in rights.iter().enumerate() {
                if bits & (1 << i) != 0 {
                    *key ^= r;
                }
            }
        }
        let ep_file = std::array::from_fn(|_| rng.next_u64());

        Zobrist {
            psq,
            side,
            castling,
            ep_file,
        }
    }
}

/// グローバルなZobristテーブル
pub static ZOBRIST: LazyLock<Zobrist> = LazyLock::new(Zobrist::new);

/// 駒×升の乱数
#[inline]
pub fn zobrist_psq(pc: Piece, sq: Square) -> u64 {
    ZOBRIST.psq[pc.index()][sq.index()]
}

/// 手番の乱数（黒番のときに XOR される）
#[inline]
pub fn zobrist_side() -> u64 {
    ZOBRIST.side
}

/// キャスリング権の組み合わせの乱数
#[inline]
pub fn zobrist_castling(cr: CastlingRights) -> u64 {
    ZOBRIST.castling[cr.index()]
}

/// アンパッサン筋の乱数
#[inline]
pub fn zobrist_ep(file: u8) -> u64 {
    ZOBRIST.ep_file[file as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Color, PieceType};

    #[test]
    fn test_keys_are_distinct_and_nonzero() {
        let a = zobrist_psq(Piece::new(Color::White, PieceType::Pawn), Square::A1);
        let b = zobrist_psq(Piece::new(Color::Black, PieceType::Pawn), Square::A1);
        assert_ne!(a, 0);
        assert_ne!(a, b);
        assert_ne!(zobrist_side(), 0);
        assert_eq!(zobrist_castling(CastlingRights::NONE), 0);
    }

    #[test]
    fn test_castling_keys_combine_by_xor() {
        let k = zobrist_castling(CastlingRights::WHITE_KING);
        let q = zobrist_castling(CastlingRights::WHITE_QUEEN);
        let kq = zobrist_castling(CastlingRights::from_bits(3));
        assert_eq!(k ^ q, kq);
    }
}

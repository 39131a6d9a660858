//! ビットボードモジュール
//!
//! 64マスの盤面を u64 で表現し、高速なビット演算と利き計算を提供する。
//!
//! - `Bitboard`: 64bit盤面表現（a1=bit0 .. h8=bit63）
//! - 筋・段ごとのマスク（`FILE_BB`, `RANK_BB`）
//! - 近接駒の利きテーブル（ナイト・キング）と歩の算術的な利き・前進
//! - 遠方駒の利き計算（マジックビットボード、`between_bb` / `line_bb`）

mod core;
mod sliders;
mod tables;

pub use self::core::{Bitboard, BitboardIter};
pub use sliders::{bishop_attacks, queen_attacks, rook_attacks};
pub use tables::*;

/// 利きテーブルを初期化する
///
/// 初回アクセス時にも自動で初期化されるが、探索開始前に明示的に
/// 呼んでおくと初期化コストが探索時間に混ざらない。
pub fn init() {
    tables::init_tables();
    sliders::init_sliders();
}

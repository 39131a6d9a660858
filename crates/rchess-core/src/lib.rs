//! rchess-core: チェス探索エンジンのコアライブラリ
//!
//! - `bitboard`: ビットボードと利きテーブル（マジックビットボード）
//! - `position`: 局面・FEN・Zobristハッシュ・SEE・詰み判定
//! - `movegen`: 指し手生成・指し手アリーナ・perft
//! - `tt`: 置換表
//! - `search`: 反復深化アルファベータ探索
//! - `eval`: 評価関数の呼び出し規約と素材評価
//! - `config`: エンジン設定（JSON）

pub mod bitboard;
pub mod config;
pub mod eval;
pub mod movegen;
pub mod position;
pub mod search;
pub mod tt;
pub mod types;

/// 利きテーブル・Zobrist 乱数・LMR 表を初期化する
///
/// いずれも初回アクセス時に遅延初期化されるため呼ばなくても動作するが、
/// 探索の前に呼んでおくと初期化時間が計測に混ざらない。
pub fn init() {
    bitboard::init();
    std::sync::LazyLock::force(&position::ZOBRIST);
    search::init_reductions();
}

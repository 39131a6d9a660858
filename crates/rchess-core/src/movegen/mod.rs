//! 指し手生成モジュール
//!
//! - `generate`: 駒種ごとの疑似合法手生成（`GenType` で取る手/静かな手を分割）
//! - `MoveArena`: 探索全体で共有する指し手バッファ（ply ごとにフレームを積む）
//! - `MoveList`: 固定長の指し手リスト（ツール・テスト用）
//! - `perft`: 指し手生成の正しさを検証するノード数計測

mod arena;
mod generator;
mod movelist;
mod perft;

pub use arena::MoveArena;
pub use generator::{GenType, MoveSink, count_legal_moves, generate, generate_legal, legal_moves};
pub use movelist::MoveList;
pub use perft::{perft, perft_divide};

//! 置換表モジュール
//!
//! 探索結果をキャッシュする置換表（Transposition Table）。
//!
//! - `TTEntry`: エントリ（16バイト、64bitキー）
//! - `TTData`: エントリから読み出した値
//! - `TranspositionTable`: テーブル本体（`key % len` の1エントリ/スロット、深さ優先置換）
//!
//! 探索インスタンスが排他的に所有する前提で、内部に同期機構は持たない。

mod entry;
mod table;

pub use entry::{TTData, TTEntry};
pub use table::TranspositionTable;

/// 置換表の既定サイズ（MB）
pub const DEFAULT_HASH_MB: usize = 16;

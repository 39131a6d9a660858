//! rchess のコマンドラインツール群の共通部品
//!
//! - `common::io`: 入出力（`-` は標準入出力、`.gz` は gzip）
//! - `suite`: FEN / EPD 局面集の読み込み

pub mod common;
pub mod suite;

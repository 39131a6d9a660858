//! 基本型モジュール
//!
//! - `Color`: 手番（白/黒）
//! - `Square`: 升（a1=0 .. h8=63）
//! - `PieceType` / `Piece`: 駒種と先後付きの駒
//! - `Move` / `ExtMove`: 32bitにパックした指し手とオーダリング用スコア付きの指し手
//! - `CastlingRights`: キャスリング権（4bit）
//! - `Value` / `Bound` / `Depth`: 探索で使うスコア・境界・深さ

mod bound;
mod castling;
mod color;
mod moves;
mod piece;
mod square;
mod value;

pub use bound::Bound;
pub use castling::CastlingRights;
pub use color::Color;
pub use moves::{ExtMove, Move, MoveFlags};
pub use piece::{Piece, PieceType};
pub use square::Square;
pub use value::Value;

/// 探索深さ
pub type Depth = i32;

/// 最大探索ply（スタック・PVテーブルの大きさ）
pub const MAX_PLY: usize = 128;

/// 1局面の指し手数の上限
pub const MAX_MOVES: usize = 256;

/// 静止探索のTT格納深さ
pub const DEPTH_QS: Depth = 0;

//! 局面表現モジュール
//!
//! チェスの局面を表現し、手の実行・巻き戻しを行う。
//!
//! - `Position`: 局面本体（升→駒の配列・駒種/手番ごとのBitboard・手番・キャスリング権・
//!   アンパッサン升・50手カウンタ・ハッシュスタック）
//! - `UndoInfo`: `make_move` が返し `unmake_move` が消費する巻き戻し情報
//! - `Zobrist`: Zobristハッシュ乱数テーブル（駒×升・手番・キャスリング権・アンパッサン筋）
//! - FEN形式の解析・出力、指し手文字列の解析
//! - 静的交換評価（SEE）と、指し手リストを作らない詰み・ステイルメイト判定
//!
//! 升→駒の配列・Bitboard・Zobristキーは `Position` のメソッド
//! （`put_piece` / `remove_piece` / `make_move` 系）を通じて更新されることを前提とし、
//! 常に互いに整合しているように保つ。

mod fen;
mod mate;
mod notation;
mod pos;
mod see;
mod state;
mod zobrist;

pub use fen::{FenError, FenField, START_FEN};
pub use notation::MoveParseError;
pub use pos::Position;
pub(crate) use pos::castle_king_destination;
pub use state::UndoInfo;
pub use zobrist::{ZOBRIST, Zobrist, zobrist_castling, zobrist_ep, zobrist_psq, zobrist_side};

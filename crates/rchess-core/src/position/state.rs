//! 手の巻き戻し情報

use crate::types::{CastlingRights, Piece, Square};

/// `make_move` が返し、`unmake_move` が消費する巻き戻し情報
///
/// 指し手の前の状態のうち、指し手そのものから復元できないものを保持する。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoInfo {
    /// 取った駒（なければ NONE）
    pub captured: Piece,
    /// 指す前のキャスリング権
    pub castling: CastlingRights,
    /// 指す前のアンパッサン升
    pub ep_square: Option<Square>,
    /// 指す前の50手ルールカウンタ
    pub rule50: u16,
    /// 指す前の null move からの手数
    pub plies_from_null: u16,
    /// 指す前の手数（ply）
    pub game_ply: u32,
}

//! 探索で使う補助型
//!
//! - `value_to_tt` / `value_from_tt`: 詰みスコアの ply 基準変換
//! - `StackEntry`: ply ごとの探索スタック
//! - `PvTable`: 三角形 PV テーブル
//! - `SearchResult`: 探索結果

use crate::types::{MAX_PLY, Move, Piece, Square, Value};

/// 詰みスコアを「現局面からの手数」基準に直して置換表に格納する
#[inline]
pub fn value_to_tt(v: Value, ply: usize) -> Value {
    if v.is_win() {
        v + ply as i32
    } else if v.is_loss() {
        v - ply as i32
    } else {
        v
    }
}

/// 置換表の値を「ルートからの手数」基準に戻す
#[inline]
pub fn value_from_tt(v: Value, ply: usize) -> Value {
    if v.is_win() {
        v - ply as i32
    } else if v.is_loss() {
        v + ply as i32
    } else {
        v
    }
}

/// 探索スタックの1要素
#[derive(Clone, Copy, Debug)]
pub struct StackEntry {
    /// この ply で指した手（null move なら `Move::NULL`）
    pub current_move: Move,
    /// 動かした駒（null move なら `Piece::NONE`）
    pub moved_piece: Piece,
    pub static_eval: Value,
}

impl Default for StackEntry {
    fn default() -> Self {
        Self {
            current_move: Move::NONE,
            moved_piece: Piece::NONE,
            static_eval: Value::NONE,
        }
    }
}

impl StackEntry {
    /// continuation history のキー（駒と移動先）
    #[inline]
    pub fn continuation_key(&self) -> Option<(Piece, Square)> {
        (self.current_move.is_some() && self.moved_piece.is_some())
            .then(|| (self.moved_piece, self.current_move.to()))
    }
}

/// 三角形 PV テーブル
///
/// `lines[ply]` は ply 以降の最善手順を保持する。
pub struct PvTable {
    lines: [[Move; MAX_PLY + 1]; MAX_PLY + 1],
    len: [usize; MAX_PLY + 1],
}

impl PvTable {
    pub fn new_boxed() -> Box<Self> {
        Box::new(Self {
            lines: [[Move::NONE; MAX_PLY + 1]; MAX_PLY + 1],
            len: [0; MAX_PLY + 1],
        })
    }

    /// ノードに入ったときに呼ぶ
    #[inline]
    pub fn clear(&mut self, ply: usize) {
        self.len[ply] = 0;
    }

    /// `ply` の最善手を `mv` にし、その後ろに子の手順を続ける
    pub fn update(&mut self, ply: usize, mv: Move) {
        let child_len = if ply < MAX_PLY { self.len[ply + 1] } else { 0 };
        let child_len = child_len.min(MAX_PLY - ply);
        self.lines[ply][0] = mv;
        if child_len > 0 {
            let (head, tail) = self.lines.split_at_mut(ply + 1);
            head[ply][1..=child_len].copy_from_slice(&tail[0][..child_len]);
        }
        self.len[ply] = child_len + 1;
    }

    /// `ply` からの手順
    #[inline]
    pub fn line(&self, ply: usize) -> &[Move] {
        &self.lines[ply][..self.len[ply]]
    }
}

/// 探索結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// 最善手（合法手が無いときは `Move::NONE`）
    pub best_move: Move,
    /// 手番側から見た評価値
    pub score: Value,
    /// 完了した反復深化の深さ
    pub depth: i32,
    /// 到達した最大 ply
    pub sel_depth: usize,
    pub nodes: u64,
    pub pv: Vec<Move>,
}

impl SearchResult {
    /// PV の2手目（ponder 用の予想手）
    pub fn ponder_move(&self) -> Option<Move> {
        self.pv.get(1).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MoveFlags, PieceType};

    #[test]
    fn test_mate_value_roundtrip_through_tt() {
        let mate_in_5_from_root = Value::mate_in(5);
        // ply 3 で見つかった値を格納し、ply 7 で読み出す
        let stored = value_to_tt(mate_in_5_from_root, 3);
        assert_eq!(stored, Value::mate_in(2));
        assert_eq!(value_from_tt(stored, 7), Value::mate_in(9));

        let loss = Value::mated_in(6);
        assert_eq!(value_from_tt(value_to_tt(loss, 4), 4), loss);

        let normal = Value::new(123);
        assert_eq!(value_to_tt(normal, 10), normal);
        assert_eq!(value_from_tt(normal, 10), normal);
    }

    #[test]
    fn test_pv_table_update_copies_child_line() {
        let m = |f: u8, t: u8| {
            Move::new(Square::from_u8(f), Square::from_u8(t), PieceType::Rook, MoveFlags::NONE)
        };
        let mut pv = PvTable::new_boxed();
        pv.clear(2);
        pv.update(2, m(0, 8));
        pv.clear(1);
        pv.update(1, m(1, 9));
        assert_eq!(pv.line(1), &[m(1, 9), m(0, 8)]);
        pv.clear(0);
        pv.update(0, m(2, 10));
        assert_eq!(pv.line(0), &[m(2, 10), m(1, 9), m(0, 8)]);

        // 子が手順を持たないときは1手だけ
        pv.clear(1);
        pv.update(0, m(3, 11));
        assert_eq!(pv.line(0), &[m(3, 11)]);
    }
}

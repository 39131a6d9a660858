//! History統計
//!
//! 探索中の手の成功/失敗を記録し、手の順序付けに利用する。
//!
//! - `StatsEntry`: 範囲制限付きの重力式更新エントリ（捕獲履歴で使用）
//! - `ButterflyHistory`: [Color][from_to] -> score
//! - `ContinuationHistory`: [prev_pc][prev_to][pc][to] -> score
//! - `CaptureHistory`: [pc][to][captured_pt] -> score
//! - `HistoryTables`: 上記をまとめて1つのヒープ領域に置くコンテナ
//!
//! 静かな手の履歴は加算して ±`HISTORY_MAX` に丸め、捕獲履歴は
//! `v' = v + b - v * |b| / MAX` で更新する。探索開始ごとに `decay` で半減させる。

use crate::types::{Color, Move, Piece, PieceType, Square};

// =============================================================================
// 定数
// =============================================================================

/// from_toインデックスのサイズ（64 × 64）
pub const FROM_TO_SIZE: usize = Square::NUM * Square::NUM;

/// 静かな手の履歴（butterfly / continuation）の上限
pub const HISTORY_MAX: i32 = 16384;

/// 捕獲履歴の上限
pub const CAPTURE_HISTORY_MAX: i32 = 8192;

/// 値を ±`HISTORY_MAX` に収めて加算する
#[inline]
fn add_clamped(entry: &mut i16, delta: i32) {
    *entry = (*entry as i32 + delta).clamp(-HISTORY_MAX, HISTORY_MAX) as i16;
}

// =============================================================================
// StatsEntry
// =============================================================================

/// 上限 `D` つきの重力式エントリ
#[derive(Clone, Copy, Default)]
pub struct StatsEntry<const D: i32> {
    value: i16,
}

impl<const D: i32> StatsEntry<D> {
    #[inline]
    pub fn get(&self) -> i16 {
        self.value
    }

    #[inline]
    pub fn set(&mut self, v: i16) {
        self.value = v;
    }

    /// `v += b - v * |b| / D`（`b` は ±D に丸める）
    ///
    /// 同符号のボーナスが続くほど増分が小さくなり、値は ±D を越えない。
    #[inline]
    pub fn update(&mut self, bonus: i32) {
        let b = bonus.clamp(-D, D);
        let v = self.value as i32;
        let next = v + b - v * b.abs() / D;
        debug_assert!(next.abs() <= D, "capture history entry {next} exceeds {D}");
        self.value = next as i16;
    }

    /// 値を半分にする
    #[inline]
    pub fn halve(&mut self) {
        self.value /= 2;
    }
}

// =============================================================================
// ButterflyHistory
// =============================================================================

/// ButterflyHistory: [Color][from_to] -> score
///
/// 静かな手の成功/失敗を記録。手の移動元と移動先でインデックス。
pub struct ButterflyHistory {
    table: [[i16; FROM_TO_SIZE]; Color::NUM],
}

impl ButterflyHistory {
    #[inline]
    pub fn get(&self, color: Color, mv: Move) -> i16 {
        self.table[color.index()][mv.history_index()]
    }

    #[inline]
    pub fn update(&mut self, color: Color, mv: Move, delta: i32) {
        add_clamped(&mut self.table[color.index()][mv.history_index()], delta);
    }

    pub fn decay(&mut self) {
        for entry in self.table.iter_mut().flatten() {
            *entry /= 2;
        }
    }

    pub fn clear(&mut self) {
        for color_table in &mut self.table {
            color_table.fill(0);
        }
    }
}

// =============================================================================
// ContinuationHistory
// =============================================================================

/// PieceToHistory: [piece][to] -> score
pub type PieceToHistory = [[i16; Square::NUM]; Piece::NUM];

/// ContinuationHistory: [prev_pc][prev_to][pc][to] -> score
///
/// 「直前（1手前・2手前）にこの駒がこの升へ動いた後で、この手が良かったか」を記録する。
pub struct ContinuationHistory {
    table: [[PieceToHistory; Square::NUM]; Piece::NUM],
}

impl ContinuationHistory {
    #[inline]
    pub fn get(&self, prev_pc: Piece, prev_to: Square, pc: Piece, to: Square) -> i16 {
        self.table[prev_pc.index()][prev_to.index()][pc.index()][to.index()]
    }

    #[inline]
    pub fn update(&mut self, prev_pc: Piece, prev_to: Square, pc: Piece, to: Square, delta: i32) {
        add_clamped(
            &mut self.table[prev_pc.index()][prev_to.index()][pc.index()][to.index()],
            delta,
        );
    }

    pub fn decay(&mut self) {
        for entry in self.table.iter_mut().flatten().flatten().flatten() {
            *entry /= 2;
        }
    }

    pub fn clear(&mut self) {
        for entry in self.table.iter_mut().flatten().flatten() {
            entry.fill(0);
        }
    }
}

// =============================================================================
// CaptureHistory
// =============================================================================

/// CaptureHistory: [pc][to][captured_pt] -> score
pub struct CaptureHistory {
    table: [[[StatsEntry<CAPTURE_HISTORY_MAX>; PieceType::NUM]; Square::NUM]; Piece::NUM],
}

impl CaptureHistory {
    #[inline]
    pub fn get(&self, pc: Piece, to: Square, captured: PieceType) -> i16 {
        self.table[pc.index()][to.index()][captured.index()].get()
    }

    #[inline]
    pub fn update(&mut self, pc: Piece, to: Square, captured: PieceType, bonus: i32) {
        self.table[pc.index()][to.index()][captured.index()].update(bonus);
    }

    pub fn decay(&mut self) {
        for entry in self.table.iter_mut().flatten().flatten() {
            entry.halve();
        }
    }

    pub fn clear(&mut self) {
        for entry in self.table.iter_mut().flatten().flatten() {
            entry.set(0);
        }
    }
}

// =============================================================================
// HistoryTables
// =============================================================================

/// 履歴/統計テーブルをまとめて保持するコンテナ
///
/// 大きな配列を単一のヒープ領域に配置する。探索インスタンスごとに1つ持つ。
pub struct HistoryTables {
    pub main_history: ButterflyHistory,
    pub continuation_history: ContinuationHistory,
    pub capture_history: CaptureHistory,
}

impl HistoryTables {
    /// 新しいHistoryTablesを作成（ヒープ確保、全要素ゼロ）
    pub fn new_boxed() -> Box<Self> {
        // SAFETY: 各テーブルは i16 のみで構成され、ゼロ初期化は常に有効。
        unsafe { Box::<Self>::new_zeroed().assume_init() }
    }

    /// 探索開始時の減衰（全テーブルを半減）
    pub fn decay(&mut self) {
        self.main_history.decay();
        self.continuation_history.decay();
        self.capture_history.decay();
    }

    /// すべての履歴テーブルをクリア（対局の切り替え時）
    pub fn clear(&mut self) {
        self.main_history.clear();
        self.continuation_history.clear();
        self.capture_history.clear();
    }

    /// 静かな手の評価値（butterfly + 1手前・2手前の continuation）
    #[inline]
    pub fn quiet_score(&self, us: Color, mv: Move, prev: &[Option<(Piece, Square)>; 2]) -> i32 {
        let pc = Piece::new(us, mv.piece_type());
        let mut score = self.main_history.get(us, mv) as i32;
        for &(prev_pc, prev_to) in prev.iter().flatten() {
            score += self.continuation_history.get(prev_pc, prev_to, pc, mv.to()) as i32;
        }
        score
    }

    /// 静かな手の履歴を `delta` だけ動かす（butterfly と continuation の両方）
    pub fn update_quiet(
        &mut self,
        us: Color,
        mv: Move,
        prev: &[Option<(Piece, Square)>; 2],
        delta: i32,
    ) {
        let pc = Piece::new(us, mv.piece_type());
        self.main_history.update(us, mv, delta);
        for &(prev_pc, prev_to) in prev.iter().flatten() {
            self.continuation_history.update(prev_pc, prev_to, pc, mv.to(), delta);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MoveFlags;

    fn quiet(from: Square, to: Square) -> Move {
        Move::new(from, to, PieceType::Knight, MoveFlags::NONE)
    }

    #[test]
    fn test_stats_entry_update_convergence() {
        let mut entry = StatsEntry::<1000>::default();
        for _ in 0..100 {
            entry.update(1000);
        }
        assert!(entry.get() <= 1000);
        assert!(entry.get() > 900);

        for _ in 0..100 {
            entry.update(-1000);
        }
        assert!(entry.get() >= -1000);
        assert!(entry.get() < -900);
    }

    #[test]
    fn test_stats_entry_small_bonus_is_nearly_additive() {
        let mut entry = StatsEntry::<1000>::default();
        entry.update(10);
        assert_eq!(entry.get(), 10);
        entry.update(10);
        // 10 - 10 * 10 / 1000 = 10
        assert_eq!(entry.get(), 20);
    }

    #[test]
    fn test_butterfly_clamps_and_decays() {
        let mut h = HistoryTables::new_boxed();
        let mv = quiet(Square::B1, Square::C1);
        for _ in 0..100 {
            h.main_history.update(Color::White, mv, 1000);
        }
        assert_eq!(h.main_history.get(Color::White, mv) as i32, HISTORY_MAX);
        assert_eq!(h.main_history.get(Color::Black, mv), 0);

        h.decay();
        assert_eq!(h.main_history.get(Color::White, mv) as i32, HISTORY_MAX / 2);
        h.clear();
        assert_eq!(h.main_history.get(Color::White, mv), 0);
    }

    #[test]
    fn test_quiet_score_includes_continuation() {
        let mut h = HistoryTables::new_boxed();
        let mv = quiet(Square::G1, Square::F1);
        let prev_pc = Piece::new(Color::Black, PieceType::Pawn);
        let prev = [Some((prev_pc, Square::E1)), None];

        h.update_quiet(Color::White, mv, &prev, 64);
        assert_eq!(h.quiet_score(Color::White, mv, &prev), 128);
        assert_eq!(h.quiet_score(Color::White, mv, &[None, None]), 64);

        h.update_quiet(Color::White, mv, &prev, -32);
        assert_eq!(h.quiet_score(Color::White, mv, &prev), 64);
    }

    #[test]
    fn test_capture_history_gravity() {
        let mut h = HistoryTables::new_boxed();
        let pc = Piece::new(Color::White, PieceType::Knight);
        for _ in 0..200 {
            h.capture_history.update(pc, Square::D1, PieceType::Queen, 4000);
        }
        let v = h.capture_history.get(pc, Square::D1, PieceType::Queen) as i32;
        assert!(v > 0 && v <= CAPTURE_HISTORY_MAX);
        h.decay();
        assert_eq!(h.capture_history.get(pc, Square::D1, PieceType::Queen) as i32, v / 2);
    }
}

//! MovePicker（指し手オーダリング）
//!
//! カットオフを起こしやすい手から順に返す。指し手は呼び出し側が開いた
//! `MoveArena` のフレームに段階的に生成する（lazy generation）。
//!
//! ## 参照を保持しない設計
//!
//! 再帰呼び出しの間に `Position` や `HistoryTables` を可変借用できるよう、
//! MovePicker はそれらへの参照を持たない。`next_move()` の呼び出しごとに受け取る。
//!
//! ## Stage
//!
//! 1. PickHash - 置換表の指し手（疑似合法なときだけ）
//! 2. GenerateNoisy - 取る手・成る手の生成と採点
//! 3. YieldGoodNoisy - SEE >= 0 の手を選択ソートで返す
//! 4. GenerateQuiet - 静かな手の生成と採点
//! 5. YieldRest - 静かな手と損な取り合いを選択ソートで返す（損な取り合いは重みが
//!    負の帯にあるので最後になる）
//!
//! 静止探索では静かな手を生成しない（最初の ply だけ王手になる静かな手を生成する）。
//! 王手回避は通常探索と同じ段階を通る（生成器が回避手に絞る）。

use crate::movegen::{GenType, MoveArena, generate};
use crate::position::Position;
use crate::types::{Color, Move, Piece, Square};

use super::history::HistoryTables;

/// SEE >= 0 の取る手に加えるオフセット（SEE < 0 なら減じる）
const CAPTURE_BAND: i32 = 1 << 24;

// =============================================================================
// Stage / Mode
// =============================================================================

/// 指し手生成の段階
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum Stage {
    /// 置換表の指し手
    PickHash,
    /// 取る手・成る手の生成
    GenerateNoisy,
    /// 得な取る手
    YieldGoodNoisy,
    /// 静かな手の生成
    GenerateQuiet,
    /// 残り（静かな手、損な取る手）
    YieldRest,
    /// 終端
    Done,
}

/// 呼び出し元の探索の種類
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PickMode {
    /// 通常探索
    Main,
    /// 王手回避
    Evasion,
    /// 静止探索（`with_checks` なら王手になる静かな手も返す）
    QSearch { with_checks: bool },
}

// =============================================================================
// MovePicker
// =============================================================================

/// 指し手オーダリング器
///
/// ```ignore
/// worker.arena.push_frame();
/// let mut mp = MovePicker::new(pos, tt_move, PickMode::Main, cont_keys);
/// loop {
///     let mv = mp.next_move(pos, &worker.history, &mut worker.arena);
///     if mv.is_none() { break; }
///     // make / 再帰 / unmake
/// }
/// worker.arena.pop_frame();
/// ```
pub struct MovePicker {
    stage: Stage,
    mode: PickMode,
    tt_move: Move,
    side_to_move: Color,
    /// 1手前・2手前の (駒, 移動先)
    cont_keys: [Option<(Piece, Square)>; 2],
    // フレーム内の位置
    cur: usize,
    end_noisy: usize,
    end: usize,
}

impl MovePicker {
    /// `pos` は初期化時のみ使用し、フィールドとして保持しない
    pub fn new(
        pos: &Position,
        tt_move: Move,
        mode: PickMode,
        cont_keys: [Option<(Piece, Square)>; 2],
    ) -> Self {
        let usable = tt_move.is_some()
            && pos.pseudo_legal(tt_move)
            && (!matches!(mode, PickMode::QSearch { .. }) || tt_move.is_noisy());
        Self {
            stage: if usable { Stage::PickHash } else { Stage::GenerateNoisy },
            mode,
            tt_move: if usable { tt_move } else { Move::NONE },
            side_to_move: pos.side_to_move(),
            cont_keys,
            cur: 0,
            end_noisy: 0,
            end: 0,
        }
    }

    /// 現在のステージ
    #[inline]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// 実際に使う置換表の手（使えないときは `Move::NONE`）
    #[inline]
    pub fn tt_move(&self) -> Move {
        self.tt_move
    }

    /// 次の指し手を返す。尽きたら `Move::NONE`
    ///
    /// `arena` の現在のフレームはこの MovePicker 専用でなければならない。
    pub fn next_move(
        &mut self,
        pos: &Position,
        history: &HistoryTables,
        arena: &mut MoveArena,
    ) -> Move {
        loop {
            match self.stage {
                Stage::PickHash => {
                    self.stage = Stage::GenerateNoisy;
                    return self.tt_move;
                }

                Stage::GenerateNoisy => {
                    debug_assert_eq!(arena.frame_len(), 0);
                    generate(pos, GenType::Noisy, arena);
                    self.cur = 0;
                    self.end_noisy = arena.frame_len();
                    self.end = self.end_noisy;
                    self.score_noisy(pos, history, arena);
                    self.stage = Stage::YieldGoodNoisy;
                }

                Stage::YieldGoodNoisy => {
                    match self.select_best(arena, self.end_noisy, 0) {
                        Some(mv) if mv == self.tt_move => continue,
                        Some(mv) => return mv,
                        None => self.stage = Stage::GenerateQuiet,
                    }
                }

                Stage::GenerateQuiet => {
                    match self.mode {
                        PickMode::Main | PickMode::Evasion => {
                            generate(pos, GenType::Quiet, arena);
                            self.end = arena.frame_len();
                            self.score_quiet(history, arena);
                        }
                        PickMode::QSearch { with_checks: true } => {
                            // 損な取る手は静止探索では読まない
                            self.cur = self.end_noisy;
                            generate(pos, GenType::Quiet, arena);
                            let frame = arena.frame_mut();
                            let mut kept = self.end_noisy;
                            for i in self.end_noisy..frame.len() {
                                if pos.gives_check(frame[i].mv) {
                                    frame[kept] = frame[i];
                                    kept += 1;
                                }
                            }
                            arena.truncate_frame(kept);
                            self.end = kept;
                            self.score_quiet(history, arena);
                        }
                        PickMode::QSearch { with_checks: false } => {
                            self.stage = Stage::Done;
                            continue;
                        }
                    }
                    self.stage = Stage::YieldRest;
                }

                Stage::YieldRest => match self.select_best(arena, self.end, i32::MIN) {
                    Some(mv) if mv == self.tt_move => continue,
                    Some(mv) => return mv,
                    None => self.stage = Stage::Done,
                },

                Stage::Done => return Move::NONE,
            }
        }
    }

    /// 取る手・成る手の採点
    fn score_noisy(&self, pos: &Position, history: &HistoryTables, arena: &mut MoveArena) {
        let us = self.side_to_move;
        for m in &mut arena.frame_mut()[self.cur..self.end_noisy] {
            let mv = m.mv;
            let see = pos.see(mv);
            let hist = pos.captured_piece_type(mv).map_or(0, |pt| {
                history.capture_history.get(Piece::new(us, mv.piece_type()), mv.to(), pt) as i32
            });
            let band = if see >= 0 { CAPTURE_BAND } else { -CAPTURE_BAND };
            m.value = band + see * 32 + hist / 8;
        }
    }

    /// 静かな手の採点（butterfly + continuation）
    fn score_quiet(&self, history: &HistoryTables, arena: &mut MoveArena) {
        let us = self.side_to_move;
        for m in &mut arena.frame_mut()[self.end_noisy..self.end] {
            m.value = history.quiet_score(us, m.mv, &self.cont_keys);
        }
    }

    /// `[cur, end)` で重みが最大の手を `cur` に寄せて返す
    ///
    /// 最大でも `min_value` 未満なら何も返さない。同じ重みなら先に生成された手を選ぶ。
    fn select_best(&mut self, arena: &mut MoveArena, end: usize, min_value: i32) -> Option<Move> {
        if self.cur >= end {
            return None;
        }
        let frame = arena.frame_mut();
        let mut best = self.cur;
        for i in self.cur + 1..end {
            if frame[i].value > frame[best].value {
                best = i;
            }
        }
        if frame[best].value < min_value {
            return None;
        }
        frame.swap(self.cur, best);
        let mv = frame[self.cur].mv;
        self.cur += 1;
        Some(mv)
    }
}

//! 静止探索 (Quiescence Search)
//!
//! 取る手・成る手だけを読んで局面が落ち着くまで探索する。最初の ply では
//! 王手になる静かな手も読み、王手をかけられている局面ではすべての回避手を読む。

use crate::eval::Evaluator;
use crate::position::Position;
use crate::types::{Bound, DEPTH_QS, MAX_PLY, Move, Value};

use super::alpha_beta::{SearchWorker, tt_cutoff};
use super::movepicker::{MovePicker, PickMode};
use super::pruning::delta_prunable;
use super::stats::inc_stat;
use super::types::{value_from_tt, value_to_tt};

impl<E: Evaluator> SearchWorker<E> {
    /// 静止探索
    ///
    /// `qply` は静止探索に入ってからの手数。
    pub(super) fn qsearch<const PV: bool>(
        &mut self,
        pos: &mut Position,
        mut alpha: Value,
        beta: Value,
        ply: usize,
        qply: u32,
    ) -> Value {
        self.pv.clear(ply);
        if self.check_abort() {
            return Value::ZERO;
        }
        self.nodes += 1;
        inc_stat!(self, qnodes);
        self.sel_depth = self.sel_depth.max(ply + 1);

        let in_check = pos.in_check();
        if ply >= MAX_PLY - 1 {
            return if in_check { Value::DRAW } else { self.evaluator.evaluate(pos) };
        }

        // 置換表
        let key = pos.key();
        let mut tt_move = Move::NONE;
        if let Some(data) = self.tt.probe(key) {
            inc_stat!(self, tt_hits);
            tt_move = data.mv;
            let tt_value = value_from_tt(data.value, ply);
            if !PV && data.depth >= DEPTH_QS && tt_cutoff(data.bound, tt_value, alpha, beta) {
                inc_stat!(self, tt_cutoffs);
                return tt_value;
            }
        }

        // stand pat
        let stand_pat;
        let mut best_value;
        if in_check {
            stand_pat = Value::NONE;
            best_value = -Value::INFINITE;
        } else {
            stand_pat = self.evaluator.evaluate(pos);
            if stand_pat >= beta {
                return stand_pat;
            }
            if stand_pat > alpha {
                alpha = stand_pat;
            }
            best_value = stand_pat;
        }
        self.stack_at(ply).static_eval = stand_pat;

        let mode = if in_check {
            PickMode::Evasion
        } else {
            PickMode::QSearch { with_checks: qply == 0 }
        };
        let mut mp = MovePicker::new(pos, tt_move, mode, self.cont_keys(ply));
        self.arena.push_frame();

        let mut best_move = Move::NONE;
        let mut move_count = 0;
        loop {
            let mv = mp.next_move(pos, &self.history, &mut self.arena);
            if mv.is_none() {
                break;
            }

            if !in_check {
                if delta_prunable(&self.params, pos, mv, stand_pat, alpha) {
                    inc_stat!(self, delta_pruned);
                    continue;
                }
                if !pos.see_ge(mv, 0) {
                    continue;
                }
            }

            let moved_piece = pos.piece_on(mv.from());
            let undo = pos.make_move(mv);
            if pos.left_king_in_check() {
                pos.unmake_move(mv, &undo);
                continue;
            }
            move_count += 1;
            self.set_current_move(ply, mv, moved_piece);

            let value = -self.qsearch::<PV>(pos, -beta, -alpha, ply + 1, qply + 1);
            pos.unmake_move(mv, &undo);
            if self.abort {
                self.arena.pop_frame();
                return Value::ZERO;
            }

            if value > best_value {
                best_value = value;
                if value > alpha {
                    best_move = mv;
                    if PV {
                        self.pv.update(ply, mv);
                    }
                    if value >= beta {
                        break;
                    }
                    alpha = value;
                }
            }
        }
        self.arena.pop_frame();

        if in_check && move_count == 0 {
            return Value::mated_in(ply as i32);
        }

        let bound = if best_value >= beta { Bound::Lower } else { Bound::Upper };
        self.tt.store(key, value_to_tt(best_value, ply), bound, DEPTH_QS, best_move);
        best_value
    }
}

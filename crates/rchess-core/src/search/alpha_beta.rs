//! Alpha-Beta 探索本体
//!
//! `SearchWorker` が置換表・履歴・指し手アリーナ・PV テーブル・探索スタックを
//! 排他的に所有し、1スレッドで反復深化を行う。複数の `SearchWorker` は
//! 互いに何も共有しないので、並列に動かしてよい。
//!
//! ノード内の処理順:
//! 1. 中断チェック・引き分け判定・mate distance pruning
//! 2. 置換表の参照（非 PV ノードはここでカットし得る）
//! 3. 静的評価と null move pruning
//! 4. MovePicker の順に make / 再帰（PVS + LMR）/ unmake
//! 5. beta カット時の履歴更新、置換表への格納

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::EngineConfig;
use crate::eval::{Evaluator, MaterialEvaluator};
use crate::movegen::{MoveArena, MoveList, legal_moves};
use crate::position::Position;
use crate::tt::TranspositionTable;
use crate::types::{Bound, Depth, MAX_PLY, Move, Piece, Square, Value};

use super::history::HistoryTables;
use super::limits::{SearchInfo, SearchLimits};
use super::movepicker::{MovePicker, PickMode};
use super::pruning::{
    lmr_applicable, mate_distance_window, null_move_allowed, null_move_reduction, reduction,
};
use super::stats::{SearchStats, inc_stat, inc_stat_by_depth};
use super::time_manager::TimeManager;
use super::tune_params::SearchTuneParams;
use super::types::{PvTable, SearchResult, StackEntry, value_from_tt, value_to_tt};

/// 停止フラグ・時計を確認する間隔（ノード数）
pub const CHECK_INTERVAL: u32 = 1024;

/// 探索スタックの先頭に置く番兵の数（ply - 2 まで参照するため）
const STACK_OFFSET: usize = 2;

/// 置換表の値で探索を打ち切ってよいか
#[inline]
pub(super) fn tt_cutoff(bound: Bound, value: Value, alpha: Value, beta: Value) -> bool {
    bound == Bound::Exact
        || (bound == Bound::Lower && value >= beta)
        || (bound == Bound::Upper && value <= alpha)
}

// =============================================================================
// SearchControl
// =============================================================================

/// 探索1回分の停止条件
struct SearchControl {
    stop: Option<Arc<AtomicBool>>,
    hard_nodes: Option<u64>,
    soft_nodes: Option<u64>,
    debug: bool,
    time: TimeManager,
}

impl SearchControl {
    fn new(limits: &SearchLimits) -> Self {
        Self {
            stop: limits.stop.clone(),
            hard_nodes: limits.hard_nodes,
            soft_nodes: limits.soft_nodes,
            debug: limits.debug,
            time: TimeManager::new(limits),
        }
    }

    #[inline]
    fn stop_requested(&self) -> bool {
        self.stop.as_ref().is_some_and(|f| f.load(Ordering::Relaxed))
    }
}

// =============================================================================
// SearchWorker
// =============================================================================

/// 探索用のワーカー
///
/// 対局を通して再利用する。履歴は `search` のたびに半減し、
/// `clear` で（対局の切り替え時に）すべて消す。
pub struct SearchWorker<E: Evaluator = MaterialEvaluator> {
    pub(super) evaluator: E,
    pub(super) tt: TranspositionTable,
    pub(super) history: Box<HistoryTables>,
    pub(super) arena: MoveArena,
    pub(super) pv: Box<PvTable>,
    /// ply + STACK_OFFSET で引く探索スタック
    pub(super) stack: Vec<StackEntry>,
    pub(super) params: SearchTuneParams,
    pub(super) stats: SearchStats,

    // =========================================================================
    // 探索1回分の状態
    // =========================================================================
    pub(super) nodes: u64,
    pub(super) sel_depth: usize,
    pub(super) root_depth: Depth,
    /// このイテレーションでルートの alpha を更新した最後の手
    pub(super) root_best: Move,
    pub(super) abort: bool,
    calls_cnt: u32,
    control: SearchControl,
}

impl<E: Evaluator> SearchWorker<E> {
    /// 設定から作る
    pub fn new(evaluator: E, config: &EngineConfig) -> Self {
        Self {
            evaluator,
            tt: TranspositionTable::new(config.hash_mb),
            history: HistoryTables::new_boxed(),
            arena: MoveArena::new(),
            pv: PvTable::new_boxed(),
            stack: vec![StackEntry::default(); MAX_PLY + STACK_OFFSET + 1],
            params: config.tune,
            stats: SearchStats::default(),
            nodes: 0,
            sel_depth: 0,
            root_depth: 0,
            root_best: Move::NONE,
            abort: false,
            calls_cnt: CHECK_INTERVAL,
            control: SearchControl::new(&SearchLimits::default()),
        }
    }

    /// 置換表サイズ（MB）だけを指定して作る
    pub fn with_hash(evaluator: E, hash_mb: usize) -> Self {
        let config = EngineConfig { hash_mb, ..EngineConfig::default() };
        Self::new(evaluator, &config)
    }

    /// 置換表と履歴を消す（対局の切り替え時）
    pub fn clear(&mut self) {
        self.tt.clear();
        self.history.clear();
    }

    /// 置換表の大きさを変える（内容は消える）
    pub fn resize_hash(&mut self, hash_mb: usize) {
        self.tt.resize(hash_mb);
    }

    #[inline]
    pub fn params(&self) -> &SearchTuneParams {
        &self.params
    }

    #[inline]
    pub fn params_mut(&mut self) -> &mut SearchTuneParams {
        &mut self.params
    }

    /// 直前の探索の統計
    #[inline]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    #[inline]
    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    #[inline]
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    // =========================================================================
    // スタック
    // =========================================================================

    #[inline]
    pub(super) fn stack_at(&mut self, ply: usize) -> &mut StackEntry {
        &mut self.stack[ply + STACK_OFFSET]
    }

    /// 1手前・2手前の continuation history キー
    #[inline]
    pub(super) fn cont_keys(&self, ply: usize) -> [Option<(Piece, Square)>; 2] {
        [
            self.stack[ply + STACK_OFFSET - 1].continuation_key(),
            self.stack[ply + STACK_OFFSET - 2].continuation_key(),
        ]
    }

    /// ply で指した手を記録する
    #[inline]
    pub(super) fn set_current_move(&mut self, ply: usize, mv: Move, moved_piece: Piece) {
        let entry = self.stack_at(ply);
        entry.current_move = mv;
        entry.moved_piece = moved_piece;
    }

    // =========================================================================
    // 中断チェック
    // =========================================================================

    /// ハードノード上限は毎ノード、停止フラグ・時計は `CHECK_INTERVAL` ごとに確認する
    #[inline]
    pub(super) fn check_abort(&mut self) -> bool {
        if self.abort {
            return true;
        }
        if self.control.hard_nodes.is_some_and(|limit| self.nodes >= limit) {
            log::debug!("hard node limit reached at {} nodes", self.nodes);
            self.abort = true;
            return true;
        }

        self.calls_cnt -= 1;
        if self.calls_cnt > 0 {
            return false;
        }
        self.calls_cnt = CHECK_INTERVAL;

        if self.control.stop_requested() {
            log::debug!("stop requested at {} nodes", self.nodes);
            self.abort = true;
            return true;
        }
        self.control.time.poll_ponderhit();
        if self.control.time.hard_exceeded() {
            log::debug!("hard time limit reached after {} ms", self.control.time.elapsed_ms());
            self.abort = true;
            return true;
        }
        false
    }

    /// 反復の完了時に見るソフト予算
    fn soft_limit_reached(&mut self) -> bool {
        self.control.time.poll_ponderhit();
        if self.control.time.is_pondering() {
            return false;
        }
        self.control.time.soft_exceeded()
            || self.control.soft_nodes.is_some_and(|limit| self.nodes >= limit)
    }

    // =========================================================================
    // 反復深化
    // =========================================================================

    /// 探索のメインエントリーポイント
    ///
    /// 中断された反復の結果は捨て、最後に完了した深さの結果を返す。
    /// 1回も完了しなかったときは、途中でルートの alpha を更新した手か最初の合法手を返す。
    pub fn search(&mut self, pos: &mut Position, limits: &SearchLimits) -> SearchResult {
        self.prepare_search(limits);

        let root_moves = legal_moves(pos);
        if root_moves.is_empty() {
            let score = if pos.in_check() { Value::mated_in(0) } else { Value::DRAW };
            return SearchResult {
                best_move: Move::NONE,
                score,
                depth: 0,
                sel_depth: 0,
                nodes: 0,
                pv: Vec::new(),
            };
        }

        let max_depth = limits.depth.unwrap_or(MAX_PLY as Depth - 1).clamp(1, MAX_PLY as Depth - 1);
        let mut completed: Option<SearchResult> = None;
        let mut prev_score = Value::ZERO;

        for depth in 1..=max_depth {
            self.root_depth = depth;
            self.sel_depth = 0;

            let score = self.aspiration_search(pos, depth, prev_score);
            if self.abort {
                log::debug!("iteration {depth} aborted");
                break;
            }
            prev_score = score;

            let pv = self.pv.line(0).to_vec();
            let best_move = pv.first().copied().unwrap_or(self.root_best);
            let result = SearchResult {
                best_move,
                score,
                depth,
                sel_depth: self.sel_depth,
                nodes: self.nodes,
                pv,
            };
            self.report(&result, limits);
            completed = Some(result);

            if score.is_mate_score() && !self.control.time.is_pondering() && limits.depth.is_none()
            {
                // 最短の詰みを見つけた後は深くしても変わらない
                if (score.mate_ply() as Depth) < depth {
                    break;
                }
            }
            if self.soft_limit_reached() {
                break;
            }
        }

        let result = match completed {
            Some(mut result) => {
                result.nodes = self.nodes;
                result
            }
            None => {
                let best_move = if self.root_best.is_some() { self.root_best } else { root_moves[0] };
                SearchResult {
                    best_move,
                    score: Value::ZERO,
                    depth: 0,
                    sel_depth: self.sel_depth,
                    nodes: self.nodes,
                    pv: vec![best_move],
                }
            }
        };
        self.finish_search(&result, limits);
        result
    }

    /// 探索開始時の初期化
    pub(super) fn prepare_search(&mut self, limits: &SearchLimits) {
        self.history.decay();
        self.arena.reset();
        self.stats.reset();
        self.stack.fill(StackEntry::default());
        self.nodes = 0;
        self.sel_depth = 0;
        self.root_depth = 0;
        self.root_best = Move::NONE;
        self.abort = false;
        self.calls_cnt = CHECK_INTERVAL;
        self.control = SearchControl::new(limits);
    }

    /// 探索終了時の後始末（統計の公開・ログ）
    fn finish_search(&mut self, result: &SearchResult, limits: &SearchLimits) {
        if let Some(sink) = &limits.stats {
            self.stats.publish(sink);
        }
        if limits.debug {
            log::info!(
                "search finished: bestmove {} score {} depth {} nodes {} time {}ms\n{}",
                result.best_move,
                result.score,
                result.depth,
                result.nodes,
                self.control.time.elapsed_ms(),
                self.stats.format_report()
            );
        }
    }

    /// 1イテレーション分の進捗を出す
    fn report(&self, result: &SearchResult, limits: &SearchLimits) {
        let time_ms = self.control.time.elapsed_ms();
        let info = SearchInfo {
            depth: result.depth,
            sel_depth: result.sel_depth,
            score: result.score,
            nodes: self.nodes,
            time_ms,
            nps: self.nodes * 1000 / time_ms.max(1),
            hashfull: self.tt.hashfull(),
            pv: result.pv.clone(),
        };
        log::debug!("info {info}");
        if let Some(callback) = &limits.info {
            callback(&info);
        }
    }

    /// Aspiration Window 付きでルートを探索する
    fn aspiration_search(&mut self, pos: &mut Position, depth: Depth, prev_score: Value) -> Value {
        let use_window = depth >= self.params.aspiration_min_depth && !prev_score.is_mate_score();
        if !use_window {
            return self.search_node::<true>(pos, depth, -Value::INFINITE, Value::INFINITE, 0);
        }

        let mut delta = self.params.aspiration_delta.max(1);
        let mut alpha = (prev_score - delta).max(-Value::INFINITE);
        let mut beta = (prev_score + delta).min(Value::INFINITE);
        loop {
            let score = self.search_node::<true>(pos, depth, alpha, beta, 0);
            if self.abort {
                return score;
            }
            if score <= alpha {
                beta = Value::new((alpha.raw() + beta.raw()) / 2);
                alpha = (score - delta).max(-Value::INFINITE);
            } else if score >= beta {
                beta = (score + delta).min(Value::INFINITE);
            } else {
                return score;
            }
            log::trace!("aspiration re-search depth {depth} window [{alpha:?}, {beta:?}]");
            delta = delta.saturating_mul(2);
        }
    }

    // =========================================================================
    // 通常探索
    // =========================================================================

    /// 通常探索ノード
    ///
    /// `PV` は PV ノード（全窓）かどうか。ply 0 はルート。
    pub(super) fn search_node<const PV: bool>(
        &mut self,
        pos: &mut Position,
        depth: Depth,
        mut alpha: Value,
        mut beta: Value,
        ply: usize,
    ) -> Value {
        if depth <= 0 {
            return self.qsearch::<PV>(pos, alpha, beta, ply, 0);
        }

        self.pv.clear(ply);
        if self.check_abort() {
            return Value::ZERO;
        }
        self.nodes += 1;
        inc_stat!(self, nodes);
        inc_stat_by_depth!(self, nodes_by_depth, depth);
        self.sel_depth = self.sel_depth.max(ply + 1);

        let root = ply == 0;
        let in_check = pos.in_check();

        // 引き分け・最大手数・mate distance pruning
        if !root {
            if pos.is_fifty_move_draw() && !pos.is_checkmate() {
                return Value::DRAW;
            }
            if pos.threefold_count() >= 2 {
                return Value::DRAW;
            }
            if ply >= MAX_PLY - 1 {
                return if in_check { Value::DRAW } else { self.evaluator.evaluate(pos) };
            }
            (alpha, beta) = mate_distance_window(alpha, beta, ply);
            if alpha >= beta {
                return alpha;
            }
        }

        // 置換表
        let key = pos.key();
        let mut tt_move = Move::NONE;
        if let Some(data) = self.tt.probe(key) {
            inc_stat!(self, tt_hits);
            tt_move = data.mv;
            if self.control.debug && tt_move.is_some() && !pos.pseudo_legal(tt_move) {
                log::warn!("unusable hash move {tt_move} at ply {ply} (key {key:016x})");
            }
            let tt_value = value_from_tt(data.value, ply);
            if !PV && data.depth >= depth && tt_cutoff(data.bound, tt_value, alpha, beta) {
                inc_stat!(self, tt_cutoffs);
                return tt_value;
            }
        }
        if root && self.root_best.is_some() {
            tt_move = self.root_best;
        }

        // 静的評価
        let static_eval = if in_check { Value::NONE } else { self.evaluator.evaluate(pos) };
        self.stack_at(ply).static_eval = static_eval;

        // Null Move Pruning
        let prev_move = self.stack[ply + STACK_OFFSET - 1].current_move;
        if null_move_allowed(&self.params, pos, PV, in_check, depth, static_eval, beta, prev_move)
        {
            inc_stat!(self, null_move_tries);
            let r = null_move_reduction(&self.params, depth);
            self.set_current_move(ply, Move::NULL, Piece::NONE);
            let undo = pos.make_null_move();
            let null_value =
                -self.search_node::<false>(pos, depth - 1 - r, -beta, -beta + 1, ply + 1);
            pos.unmake_null_move(&undo);
            if self.abort {
                return Value::ZERO;
            }
            if null_value >= beta {
                inc_stat!(self, null_move_cutoffs);
                // 未検証の詰みスコアは返さない
                return if null_value.is_win() { beta } else { null_value };
            }
        }

        // 指し手ループ
        let cont_keys = self.cont_keys(ply);
        let mode = if in_check { PickMode::Evasion } else { PickMode::Main };
        let mut mp = MovePicker::new(pos, tt_move, mode, cont_keys);
        self.arena.push_frame();

        let mut best_value = -Value::INFINITE;
        let mut best_move = Move::NONE;
        let mut move_count = 0;
        let mut quiets_tried = MoveList::new();
        let mut captures_tried = MoveList::new();

        loop {
            let mv = mp.next_move(pos, &self.history, &mut self.arena);
            if mv.is_none() {
                break;
            }

            let gives_check = pos.gives_check(mv);
            let moved_piece = pos.piece_on(mv.from());
            let undo = pos.make_move(mv);
            if pos.left_king_in_check() {
                pos.unmake_move(mv, &undo);
                continue;
            }
            move_count += 1;
            self.set_current_move(ply, mv, moved_piece);

            // 王手延長（延長の連鎖はルート深さの2倍までに抑える）
            let extension = (gives_check && ply < 2 * self.root_depth as usize) as Depth;
            let new_depth = depth - 1 + extension;

            let value = if move_count == 1 {
                -self.search_node::<PV>(pos, new_depth, -beta, -alpha, ply + 1)
            } else {
                let mut r = 0;
                if lmr_applicable(&self.params, depth, move_count, mv, in_check, gives_check) {
                    r = reduction(&self.params, depth, move_count) - PV as Depth;
                    r = r.clamp(0, (new_depth - 1).max(0));
                    if r > 0 {
                        inc_stat!(self, lmr_applied);
                    }
                }
                let mut v =
                    -self.search_node::<false>(pos, new_depth - r, -(alpha + 1), -alpha, ply + 1);
                if r > 0 && v > alpha {
                    inc_stat!(self, lmr_researches);
                    v = -self.search_node::<false>(pos, new_depth, -(alpha + 1), -alpha, ply + 1);
                }
                if PV && v > alpha && v < beta {
                    v = -self.search_node::<true>(pos, new_depth, -beta, -alpha, ply + 1);
                }
                v
            };

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
                    if root {
                        self.root_best = mv;
                    }
                    if value >= beta {
                        inc_stat!(self, beta_cutoffs);
                        if move_count == 1 {
                            inc_stat!(self, first_move_cutoffs);
                        }
                        inc_stat_by_depth!(self, cutoff_by_depth, depth);
                        break;
                    }
                    alpha = value;
                }
            }

            if mv != best_move {
                if mv.is_quiet() {
                    quiets_tried.push(mv);
                } else {
                    captures_tried.push(mv);
                }
            }
        }
        self.arena.pop_frame();

        if move_count == 0 {
            return if in_check { Value::mated_in(ply as i32) } else { Value::DRAW };
        }

        if best_value >= beta {
            self.update_history_on_cutoff(
                pos,
                best_move,
                depth,
                &cont_keys,
                &quiets_tried,
                &captures_tried,
            );
        }

        let bound = if best_value >= beta {
            Bound::Lower
        } else if PV && best_move.is_some() {
            Bound::Exact
        } else {
            Bound::Upper
        };
        self.tt.store(key, value_to_tt(best_value, ply), bound, depth, best_move);

        best_value
    }

    /// beta カットした手に加点し、先に試して失敗した手に減点する
    fn update_history_on_cutoff(
        &mut self,
        pos: &Position,
        best_move: Move,
        depth: Depth,
        cont_keys: &[Option<(Piece, Square)>; 2],
        quiets_tried: &MoveList,
        captures_tried: &MoveList,
    ) {
        let us = pos.side_to_move();
        let bonus = depth * depth * self.params.history_bonus_mult;
        let malus = bonus / self.params.history_malus_div.max(1);

        if best_move.is_quiet() {
            self.history.update_quiet(us, best_move, cont_keys, bonus);
            for &mv in quiets_tried {
                self.history.update_quiet(us, mv, cont_keys, -malus);
            }
        } else if let Some(captured) = pos.captured_piece_type(best_move) {
            let pc = Piece::new(us, best_move.piece_type());
            self.history.capture_history.update(pc, best_move.to(), captured, bonus);
        }

        for &mv in captures_tried {
            if let Some(captured) = pos.captured_piece_type(mv) {
                let pc = Piece::new(us, mv.piece_type());
                self.history.capture_history.update(pc, mv.to(), captured, -malus);
            }
        }
    }
}

impl SearchWorker<MaterialEvaluator> {
    /// 駒得評価で動く既定のワーカー
    pub fn with_material(config: &EngineConfig) -> Self {
        Self::new(MaterialEvaluator, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worker() -> SearchWorker {
        SearchWorker::with_hash(MaterialEvaluator, 1)
    }

    #[test]
    fn test_no_legal_moves_checkmate() {
        let mut pos = Position::from_fen("R5k1/5ppp/8/8/8/8/5PPP/6K1 b - - 1 1").unwrap();
        let result = worker().search(&mut pos, &SearchLimits::depth(3));
        assert!(result.best_move.is_none());
        assert_eq!(result.score, Value::mated_in(0));
    }

    #[test]
    fn test_no_legal_moves_stalemate() {
        let mut pos = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let result = worker().search(&mut pos, &SearchLimits::depth(3));
        assert!(result.best_move.is_none());
        assert_eq!(result.score, Value::DRAW);
    }

    #[test]
    fn test_finds_back_rank_mate() {
        let mut pos = Position::from_fen("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1").unwrap();
        let result = worker().search(&mut pos, &SearchLimits::depth(3));
        assert_eq!(result.best_move.to_string(), "a1a8");
        assert_eq!(result.score, Value::mate_in(1));
        assert_eq!(result.pv[0], result.best_move);
    }

    #[test]
    fn test_wins_hanging_queen() {
        let mut pos = Position::from_fen("4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1").unwrap();
        let result = worker().search(&mut pos, &SearchLimits::depth(4));
        assert_eq!(result.best_move.to_string(), "d2d5");
        assert!(result.score > Value::new(300));
    }

    #[test]
    fn test_search_restores_position() {
        let mut pos = Position::startpos();
        let before = pos.to_fen();
        let key = pos.key();
        worker().search(&mut pos, &SearchLimits::depth(4));
        assert_eq!(pos.to_fen(), before);
        assert_eq!(pos.key(), key);
    }

    #[test]
    fn test_hard_node_limit_before_first_iteration_returns_legal_move() {
        let limits = SearchLimits::builder().hard_nodes(1).depth(10).build();
        let mut pos = Position::startpos();
        let result = worker().search(&mut pos, &limits);
        assert!(pos.is_legal(result.best_move));
        assert_eq!(result.depth, 0);
        assert!(result.nodes <= 2);
    }

    #[test]
    fn test_stop_flag_ends_deep_search() {
        let stop = Arc::new(AtomicBool::new(true));
        let limits = SearchLimits::builder().stop(stop).depth(60).build();
        let mut pos = Position::startpos();
        let result = worker().search(&mut pos, &limits);
        assert!(pos.is_legal(result.best_move));
        assert!(result.nodes <= 2 * CHECK_INTERVAL as u64);
    }

    #[test]
    fn test_tt_cutoff_bounds() {
        let a = Value::new(-10);
        let b = Value::new(10);
        assert!(tt_cutoff(Bound::Lower, Value::new(20), a, b));
        assert!(!tt_cutoff(Bound::Lower, Value::new(0), a, b));
        assert!(tt_cutoff(Bound::Upper, Value::new(-20), a, b));
        assert!(!tt_cutoff(Bound::Upper, Value::new(0), a, b));
        assert!(tt_cutoff(Bound::Exact, Value::new(0), a, b));
    }
}

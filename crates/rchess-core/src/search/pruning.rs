//! 枝刈りヘルパー群
//!
//! - Late Move Reductions（reduction 表）
//! - Null Move Pruning（適用条件と reduction）
//! - Delta Pruning（静止探索）
//! - Mate Distance Pruning

use std::sync::LazyLock;

use crate::position::Position;
use crate::types::{Depth, Move, PieceType, Value};

use super::tune_params::SearchTuneParams;

/// reduction 表の大きさ（depth・手数ともにこれ以上は頭打ち）
const LMR_TABLE_SIZE: usize = 64;

type Reductions = [[i32; LMR_TABLE_SIZE]; LMR_TABLE_SIZE];

/// ln(depth) * ln(move_count) を 1024 倍した表（LazyLockによる遅延初期化）
static REDUCTIONS: LazyLock<Reductions> = LazyLock::new(|| {
    let mut table: Reductions = [[0; LMR_TABLE_SIZE]; LMR_TABLE_SIZE];
    for (d, row) in table.iter_mut().enumerate().skip(1) {
        for (m, value) in row.iter_mut().enumerate().skip(1) {
            *value = ((d as f64).ln() * (m as f64).ln() * 1024.0) as i32;
        }
    }
    table
});

/// reduction 表を初期化する（`crate::init()` から呼ばれる）
pub fn init_reductions() {
    LazyLock::force(&REDUCTIONS);
}

// =============================================================================
// Late Move Reductions
// =============================================================================

/// LMR の減少量（ply 単位）
#[inline]
pub(super) fn reduction(params: &SearchTuneParams, depth: Depth, move_count: i32) -> Depth {
    if depth <= 0 || move_count <= 0 {
        return 0;
    }
    let max_idx = LMR_TABLE_SIZE as i32 - 1;
    let d = depth.min(max_idx) as usize;
    let mc = move_count.min(max_idx) as usize;
    let scaled = params.lmr_base * 1024 / 100
        + REDUCTIONS[d][mc] * 100 / params.lmr_divisor.max(1);
    (scaled / 1024).max(0)
}

/// LMR を試してよい手か
///
/// 取る手・成る手・王手になる手・王手回避中の手は減らさない。
#[inline]
pub(super) fn lmr_applicable(
    params: &SearchTuneParams,
    depth: Depth,
    move_count: i32,
    mv: Move,
    in_check: bool,
    gives_check: bool,
) -> bool {
    depth >= params.lmr_min_depth
        && move_count > params.lmr_min_move_count
        && mv.is_quiet()
        && !in_check
        && !gives_check
}

// =============================================================================
// Null Move Pruning
// =============================================================================

/// null move を試してよい局面か
///
/// 手番側に（ポーンとキング以外の）駒が残っていないとツークツワンクで誤るので除外する。
#[allow(clippy::too_many_arguments)]
#[inline]
pub(super) fn null_move_allowed(
    params: &SearchTuneParams,
    pos: &Position,
    pv_node: bool,
    in_check: bool,
    depth: Depth,
    static_eval: Value,
    beta: Value,
    prev_move: Move,
) -> bool {
    !pv_node
        && !in_check
        && depth >= params.nmp_min_depth
        && !prev_move.is_null()
        && static_eval >= beta
        && !beta.is_loss()
        && pos.has_non_pawn_material(pos.side_to_move())
}

/// null move の reduction（R = base + depth / div）
#[inline]
pub(super) fn null_move_reduction(params: &SearchTuneParams, depth: Depth) -> Depth {
    params.nmp_reduction_base + depth / params.nmp_reduction_depth_div.max(1)
}

// =============================================================================
// Delta Pruning
// =============================================================================

/// 静止探索で、取っても alpha に届かない手か
///
/// 成りは駒の価値が変わるので対象外。
#[inline]
pub(super) fn delta_prunable(
    params: &SearchTuneParams,
    pos: &Position,
    mv: Move,
    stand_pat: Value,
    alpha: Value,
) -> bool {
    if mv.is_promotion() || !mv.is_capture() {
        return false;
    }
    let gain = if mv.is_en_passant() {
        PieceType::Pawn.value()
    } else {
        pos.piece_on(mv.to()).piece_type().value()
    };
    stand_pat + gain + params.delta_margin < alpha
}

// =============================================================================
// Mate Distance Pruning
// =============================================================================

/// ルートからの距離で alpha/beta を詰みスコアの範囲に狭める
///
/// 窓が潰れたら、そのスコアで打ち切ってよい。
#[inline]
pub(super) fn mate_distance_window(alpha: Value, beta: Value, ply: usize) -> (Value, Value) {
    let alpha = alpha.max(Value::mated_in(ply as i32));
    let beta = beta.min(Value::mate_in(ply as i32 + 1));
    (alpha, beta)
}

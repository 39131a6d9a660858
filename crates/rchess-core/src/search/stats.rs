//! 探索統計
//!
//! 探索中は `SearchStats`（ただの u64 カウンタ）に記録し、探索終了時に
//! 呼び出し側から渡された `SearchCounters`（原子カウンタ）へ加算する。
//! 深さ別の内訳は `search-stats` feature 有効時のみ集計する。

use std::sync::atomic::{AtomicU64, Ordering};

/// 深度別統計の最大深度
#[cfg(feature = "search-stats")]
pub(super) const STATS_MAX_DEPTH: usize = 32;

/// 探索1回分の統計カウンタ
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    /// 通常探索ノード数
    pub nodes: u64,
    /// 静止探索ノード数
    pub qnodes: u64,
    /// 置換表ヒット数
    pub tt_hits: u64,
    /// 置換表によるカットオフ数
    pub tt_cutoffs: u64,
    /// null move 試行回数
    pub null_move_tries: u64,
    /// null move による枝刈り成功回数
    pub null_move_cutoffs: u64,
    /// LMR 適用回数
    pub lmr_applied: u64,
    /// LMR 後の再探索回数
    pub lmr_researches: u64,
    /// beta カット回数
    pub beta_cutoffs: u64,
    /// 1手目での beta カット回数（オーダリング品質）
    pub first_move_cutoffs: u64,
    /// delta pruning で捨てた手の数
    pub delta_pruned: u64,
    /// 深度別ノード数
    #[cfg(feature = "search-stats")]
    pub nodes_by_depth: [u64; STATS_MAX_DEPTH],
    /// 深度別 beta カット回数
    #[cfg(feature = "search-stats")]
    pub cutoff_by_depth: [u64; STATS_MAX_DEPTH],
}

impl SearchStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// 共有カウンタへ加算する
    pub fn publish(&self, sink: &SearchCounters) {
        let add = |c: &AtomicU64, v: u64| {
            c.fetch_add(v, Ordering::Relaxed);
        };
        add(&sink.nodes, self.nodes);
        add(&sink.qnodes, self.qnodes);
        add(&sink.tt_hits, self.tt_hits);
        add(&sink.tt_cutoffs, self.tt_cutoffs);
        add(&sink.null_move_tries, self.null_move_tries);
        add(&sink.null_move_cutoffs, self.null_move_cutoffs);
        add(&sink.lmr_applied, self.lmr_applied);
        add(&sink.lmr_researches, self.lmr_researches);
        add(&sink.beta_cutoffs, self.beta_cutoffs);
        add(&sink.first_move_cutoffs, self.first_move_cutoffs);
        add(&sink.delta_pruned, self.delta_pruned);
    }

    /// 統計を読みやすい形式で出力
    pub fn format_report(&self) -> String {
        let mut out = String::new();
        out.push_str("=== Search Statistics ===\n");
        out.push_str(&format!("Nodes:           {:>12}\n", self.nodes));
        out.push_str(&format!("QNodes:          {:>12}\n", self.qnodes));
        out.push_str(&format!(
            "TT hits:         {:>12} (cutoffs {})\n",
            self.tt_hits, self.tt_cutoffs
        ));
        out.push_str(&format!(
            "Null move:       {:>12} (cutoffs {})\n",
            self.null_move_tries, self.null_move_cutoffs
        ));
        out.push_str(&format!(
            "LMR:             {:>12} (re-searches {})\n",
            self.lmr_applied, self.lmr_researches
        ));
        let first_rate = if self.beta_cutoffs > 0 {
            self.first_move_cutoffs as f64 * 100.0 / self.beta_cutoffs as f64
        } else {
            0.0
        };
        out.push_str(&format!(
            "Beta cutoffs:    {:>12} (first move {:.1}%)\n",
            self.beta_cutoffs, first_rate
        ));
        out.push_str(&format!("Delta pruned:    {:>12}\n", self.delta_pruned));
        #[cfg(feature = "search-stats")]
        {
            out.push_str("Depth  nodes        cutoffs\n");
            for d in 0..STATS_MAX_DEPTH {
                if self.nodes_by_depth[d] > 0 {
                    out.push_str(&format!(
                        "{:>5}  {:>11}  {:>11}\n",
                        d, self.nodes_by_depth[d], self.cutoff_by_depth[d]
                    ));
                }
            }
        }
        out
    }
}

/// 呼び出し側と共有する統計カウンタ（`SearchLimits` で渡す）
#[derive(Debug, Default)]
pub struct SearchCounters {
    pub nodes: AtomicU64,
    pub qnodes: AtomicU64,
    pub tt_hits: AtomicU64,
    pub tt_cutoffs: AtomicU64,
    pub null_move_tries: AtomicU64,
    pub null_move_cutoffs: AtomicU64,
    pub lmr_applied: AtomicU64,
    pub lmr_researches: AtomicU64,
    pub beta_cutoffs: AtomicU64,
    pub first_move_cutoffs: AtomicU64,
    pub delta_pruned: AtomicU64,
}

impl SearchCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// 現在値のスナップショット
    pub fn snapshot(&self) -> SearchStats {
        let get = |c: &AtomicU64| c.load(Ordering::Relaxed);
        SearchStats {
            nodes: get(&self.nodes),
            qnodes: get(&self.qnodes),
            tt_hits: get(&self.tt_hits),
            tt_cutoffs: get(&self.tt_cutoffs),
            null_move_tries: get(&self.null_move_tries),
            null_move_cutoffs: get(&self.null_move_cutoffs),
            lmr_applied: get(&self.lmr_applied),
            lmr_researches: get(&self.lmr_researches),
            beta_cutoffs: get(&self.beta_cutoffs),
            first_move_cutoffs: get(&self.first_move_cutoffs),
            delta_pruned: get(&self.delta_pruned),
            ..SearchStats::default()
        }
    }
}

// =============================================================================
// 統計マクロ
// =============================================================================

/// 統計カウンタをインクリメントするマクロ
/// SearchWorker から呼び出される（self.stats へアクセス）
macro_rules! inc_stat {
    ($self:expr, $field:ident) => {
        $self.stats.$field += 1;
    };
}

/// 深度別統計をカウントするマクロ（feature有効時のみ実行）
#[cfg(feature = "search-stats")]
macro_rules! inc_stat_by_depth {
    ($self:expr, $field:ident, $depth:expr) => {
        let d = ($depth.max(0) as usize).min($crate::search::stats::STATS_MAX_DEPTH - 1);
        $self.stats.$field[d] += 1;
    };
}

#[cfg(not(feature = "search-stats"))]
macro_rules! inc_stat_by_depth {
    ($self:expr, $field:ident, $depth:expr) => {};
}

// マクロを search モジュール内で使えるようにする
pub(super) use inc_stat;
pub(super) use inc_stat_by_depth;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_accumulates() {
        let sink = SearchCounters::new();
        let stats = SearchStats {
            nodes: 10,
            beta_cutoffs: 4,
            first_move_cutoffs: 3,
            ..SearchStats::default()
        };
        stats.publish(&sink);
        stats.publish(&sink);
        let snap = sink.snapshot();
        assert_eq!(snap.nodes, 20);
        assert_eq!(snap.beta_cutoffs, 8);
        assert_eq!(snap.first_move_cutoffs, 6);
        assert!(stats.format_report().contains("first move 75.0%"));
    }
}

//! 探索条件
//!
//! 停止シグナル・ponderhit シグナル・時間/ノード予算・深さ制限・進捗出力先・
//! 統計出力先をまとめる。`SearchLimits::builder()` で組み立てる。
//!
//! - ハード予算（ノード上限・ハード時間）は反復の途中でも探索を打ち切る
//! - ソフト予算（ソフト時間・ソフトノード）は反復の完了時にだけ判定する

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::types::{Depth, Move, Value};

use super::stats::SearchCounters;

/// 反復ごとの進捗報告
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchInfo {
    pub depth: Depth,
    pub sel_depth: usize,
    pub score: Value,
    pub nodes: u64,
    pub time_ms: u64,
    pub nps: u64,
    /// 置換表使用率（1000分率）
    pub hashfull: u32,
    pub pv: Vec<Move>,
}

impl fmt::Display for SearchInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "depth {} seldepth {} score {} nodes {} nps {} time {} hashfull {} pv",
            self.depth, self.sel_depth, self.score, self.nodes, self.nps, self.time_ms, self.hashfull
        )?;
        for mv in &self.pv {
            write!(f, " {mv}")?;
        }
        Ok(())
    }
}

/// 進捗出力先
pub type InfoCallback = Arc<dyn Fn(&SearchInfo) + Send + Sync>;

/// 探索条件
#[derive(Clone, Default)]
pub struct SearchLimits {
    /// 立てると探索を打ち切る
    pub stop: Option<Arc<AtomicBool>>,
    /// ponder 中に立てると通常の予算管理に移る
    pub ponderhit: Option<Arc<AtomicBool>>,
    /// ponder として開始する（ponderhit までソフト予算を無視する）
    pub ponder: bool,
    /// ソフト時間（ms）。反復完了時に超えていたら終了
    pub soft_time_ms: Option<u64>,
    /// ハード時間（ms）。超えたら反復の途中でも終了
    pub hard_time_ms: Option<u64>,
    /// ハードノード上限
    pub hard_nodes: Option<u64>,
    /// ソフトノード上限
    pub soft_nodes: Option<u64>,
    /// 深さ上限
    pub depth: Option<Depth>,
    /// 探索終了時に統計を info ログへ出す
    pub debug: bool,
    pub info: Option<InfoCallback>,
    pub stats: Option<Arc<SearchCounters>>,
}

impl fmt::Debug for SearchLimits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchLimits")
            .field("ponder", &self.ponder)
            .field("soft_time_ms", &self.soft_time_ms)
            .field("hard_time_ms", &self.hard_time_ms)
            .field("hard_nodes", &self.hard_nodes)
            .field("soft_nodes", &self.soft_nodes)
            .field("depth", &self.depth)
            .field("debug", &self.debug)
            .field("has_stop", &self.stop.is_some())
            .field("has_info", &self.info.is_some())
            .finish()
    }
}

impl SearchLimits {
    pub fn builder() -> SearchLimitsBuilder {
        SearchLimitsBuilder::default()
    }

    /// 深さだけを指定した条件
    pub fn depth(depth: Depth) -> Self {
        Self::builder().depth(depth).build()
    }

    /// 時間・ノードのどの予算も持たないか
    pub fn is_unbounded(&self) -> bool {
        self.soft_time_ms.is_none()
            && self.hard_time_ms.is_none()
            && self.hard_nodes.is_none()
            && self.soft_nodes.is_none()
            && self.depth.is_none()
    }
}

/// `SearchLimits` のビルダー
#[derive(Default)]
pub struct SearchLimitsBuilder {
    limits: SearchLimits,
}

impl SearchLimitsBuilder {
    pub fn stop(mut self, flag: Arc<AtomicBool>) -> Self {
        self.limits.stop = Some(flag);
        self
    }

    pub fn ponderhit(mut self, flag: Arc<AtomicBool>) -> Self {
        self.limits.ponderhit = Some(flag);
        self
    }

    pub fn ponder(mut self, ponder: bool) -> Self {
        self.limits.ponder = ponder;
        self
    }

    pub fn soft_time_ms(mut self, ms: u64) -> Self {
        self.limits.soft_time_ms = Some(ms);
        self
    }

    pub fn hard_time_ms(mut self, ms: u64) -> Self {
        self.limits.hard_time_ms = Some(ms);
        self
    }

    pub fn hard_nodes(mut self, nodes: u64) -> Self {
        self.limits.hard_nodes = Some(nodes);
        self
    }

    pub fn soft_nodes(mut self, nodes: u64) -> Self {
        self.limits.soft_nodes = Some(nodes);
        self
    }

    pub fn depth(mut self, depth: Depth) -> Self {
        self.limits.depth = Some(depth);
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.limits.debug = debug;
        self
    }

    pub fn info(mut self, callback: impl Fn(&SearchInfo) + Send + Sync + 'static) -> Self {
        self.limits.info = Some(Arc::new(callback));
        self
    }

    pub fn stats(mut self, sink: Arc<SearchCounters>) -> Self {
        self.limits.stats = Some(sink);
        self
    }

    pub fn build(self) -> SearchLimits {
        self.limits
    }
}

//! 探索エンジン
//!
//! 反復深化 + Alpha-Beta（PVS）で最善手を探す。
//!
//! - `alpha_beta`: `SearchWorker`（反復深化・aspiration・通常探索ノード）
//! - `qsearch`: 静止探索
//! - `movepicker`: 段階的な指し手オーダリング
//! - `history`: butterfly / continuation / capture history
//! - `pruning`: LMR・null move・delta pruning の条件と量
//! - `limits` / `time_manager`: 停止条件と時間管理
//! - `stats`: 探索統計
//! - `tune_params`: 探索係数
//! - `types`: 探索スタック・PV テーブル・探索結果

mod alpha_beta;
mod history;
mod limits;
mod movepicker;
mod pruning;
mod qsearch;
mod stats;
mod time_manager;
mod tune_params;
mod types;

pub use alpha_beta::{CHECK_INTERVAL, SearchWorker};
pub use history::{
    ButterflyHistory, CAPTURE_HISTORY_MAX, CaptureHistory, ContinuationHistory, HISTORY_MAX,
    HistoryTables, PieceToHistory, StatsEntry,
};
pub use limits::{InfoCallback, SearchInfo, SearchLimits, SearchLimitsBuilder};
pub use movepicker::{MovePicker, PickMode, Stage};
pub use pruning::init_reductions;
pub use stats::{SearchCounters, SearchStats};
pub use time_manager::TimeManager;
pub use tune_params::{SearchTuneOptionSpec, SearchTuneParams, SearchTuneSetResult};
pub use types::{PvTable, SearchResult, StackEntry, value_from_tt, value_to_tt};

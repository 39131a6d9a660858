//! 時間管理
//!
//! ソフト時間は反復の完了時に、ハード時間はノードの一定間隔ごとに判定する。
//! ponder 中はどちらの時間も数えず、ponderhit を観測した時点から計り直す。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use super::limits::SearchLimits;

/// 探索1回分の時間管理
pub struct TimeManager {
    /// 探索開始時刻（経過時間の表示用）
    start: Instant,
    /// 予算を計る起点（ponderhit で更新）
    budget_start: Instant,
    soft_ms: Option<u64>,
    hard_ms: Option<u64>,
    pondering: bool,
    ponderhit: Option<Arc<AtomicBool>>,
}

impl TimeManager {
    pub fn new(limits: &SearchLimits) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            budget_start: now,
            soft_ms: limits.soft_time_ms,
            hard_ms: limits.hard_time_ms,
            pondering: limits.ponder,
            ponderhit: limits.ponderhit.clone(),
        }
    }

    /// 探索開始からの経過時間（ms）
    #[inline]
    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// 予算の起点からの経過時間（ms）
    #[inline]
    fn budget_elapsed_ms(&self) -> u64 {
        self.budget_start.elapsed().as_millis() as u64
    }

    /// ponder 中か
    #[inline]
    pub fn is_pondering(&self) -> bool {
        self.pondering
    }

    /// ponderhit シグナルを確認し、立っていれば予算の計測を始める
    pub fn poll_ponderhit(&mut self) {
        if !self.pondering {
            return;
        }
        let hit = self.ponderhit.as_ref().is_some_and(|f| f.load(Ordering::Relaxed));
        if hit {
            self.pondering = false;
            self.budget_start = Instant::now();
            log::debug!("ponderhit after {} ms", self.elapsed_ms());
        }
    }

    /// ソフト時間を使い切ったか
    pub fn soft_exceeded(&self) -> bool {
        !self.pondering && self.soft_ms.is_some_and(|ms| self.budget_elapsed_ms() >= ms)
    }

    /// ハード時間を使い切ったか
    pub fn hard_exceeded(&self) -> bool {
        !self.pondering && self.hard_ms.is_some_and(|ms| self.budget_elapsed_ms() >= ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_budget_is_exceeded_immediately() {
        let limits = SearchLimits::builder().soft_time_ms(0).hard_time_ms(0).build();
        let tm = TimeManager::new(&limits);
        assert!(tm.soft_exceeded());
        assert!(tm.hard_exceeded());
    }

    #[test]
    fn test_no_budget_never_expires() {
        let tm = TimeManager::new(&SearchLimits::default());
        assert!(!tm.soft_exceeded());
        assert!(!tm.hard_exceeded());
    }

    #[test]
    fn test_ponder_suppresses_until_hit() {
        let hit = Arc::new(AtomicBool::new(false));
        let limits = SearchLimits::builder()
            .ponder(true)
            .ponderhit(hit.clone())
            .soft_time_ms(0)
            .build();
        let mut tm = TimeManager::new(&limits);
        assert!(tm.is_pondering());
        tm.poll_ponderhit();
        assert!(!tm.soft_exceeded());

        hit.store(true, Ordering::Relaxed);
        tm.poll_ponderhit();
        assert!(!tm.is_pondering());
        assert!(tm.soft_exceeded());
    }
}

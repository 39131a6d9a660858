//! TranspositionTable本体
//!
//! - スロット = `key % len`（1スロット1エントリ）
//! - 置換は深さ優先（新しい深さ >= 格納済みの深さのときだけ上書き）
//! - ヒットは使用中のスロットで64bitキーが一致したときだけ

use super::entry::{TTData, TTEntry};
use crate::types::{Bound, Depth, Move, Value};

/// 置換表
pub struct TranspositionTable {
    entries: Box<[TTEntry]>,
}

impl TranspositionTable {
    /// 新しい置換表を作成（サイズはMB単位）
    pub fn new(mb_size: usize) -> Self {
        Self {
            entries: Self::allocate(Self::entry_count(mb_size)),
        }
    }

    /// エントリ数を指定して作成（テスト用の小さな表など）
    pub fn with_entries(count: usize) -> Self {
        Self {
            entries: Self::allocate(count.max(1)),
        }
    }

    fn entry_count(mb_size: usize) -> usize {
        (mb_size * 1024 * 1024 / std::mem::size_of::<TTEntry>()).max(1)
    }

    fn allocate(count: usize) -> Box<[TTEntry]> {
        vec![TTEntry::new(); count].into_boxed_slice()
    }

    /// サイズを変更（内容は失われる）
    pub fn resize(&mut self, mb_size: usize) {
        let count = Self::entry_count(mb_size);
        if count != self.entries.len() {
            self.entries = Self::allocate(count);
        } else {
            self.clear();
        }
    }

    /// クリア
    pub fn clear(&mut self) {
        self.entries.fill(TTEntry::new());
    }

    /// エントリ数
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        (key % self.entries.len() as u64) as usize
    }

    /// 置換表を検索
    #[inline]
    pub fn probe(&self, key: u64) -> Option<TTData> {
        let entry = &self.entries[self.index(key)];
        (entry.is_occupied() && entry.key() == key).then(|| entry.read())
    }

    /// 置換表に書き込む（格納済みより浅い結果では上書きしない）
    ///
    /// `value` は `value_to_tt` で ply 基準に直した値を渡す。
    pub fn store(&mut self, key: u64, value: Value, bound: Bound, depth: Depth, mv: Move) {
        let index = self.index(key);
        let entry = &mut self.entries[index];
        if !entry.is_occupied() || depth >= entry.depth() {
            entry.save(key, value, bound, depth, mv);
        }
    }

    /// 置換表の使用率を1000分率で返す（先頭1000エントリの標本）
    pub fn hashfull(&self) -> u32 {
        let sample = self.entries.len().min(1000);
        let used = self.entries[..sample].iter().filter(|e| e.is_occupied()).count();
        (used * 1000 / sample) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tt_new() {
        let tt = TranspositionTable::new(1);
        assert_eq!(tt.len(), 1024 * 1024 / 16);
        assert_eq!(tt.hashfull(), 0);
    }

    #[test]
    fn test_tt_probe_empty() {
        let tt = TranspositionTable::new(1);
        assert!(tt.probe(12345).is_none());
        // キー 0 の空きスロットもヒットしない
        assert!(tt.probe(0).is_none());
    }

    #[test]
    fn test_tt_store_and_probe() {
        let mut tt = TranspositionTable::with_entries(64);
        tt.store(1000, Value::new(50), Bound::Exact, 10, Move::NONE);
        let data = tt.probe(1000).unwrap();
        assert_eq!(data.value.raw(), 50);
        assert_eq!(data.bound, Bound::Exact);
        assert_eq!(data.depth, 10);
        // 同じスロットの別キーはヒットしない
        assert!(tt.probe(1000 + 64).is_none());
    }

    #[test]
    fn test_tt_depth_preferred_replacement() {
        let mut tt = TranspositionTable::with_entries(8);
        tt.store(3, Value::new(1), Bound::Lower, 6, Move::NONE);
        tt.store(11, Value::new(2), Bound::Lower, 5, Move::NONE);
        assert!(tt.probe(11).is_none());
        assert_eq!(tt.probe(3).unwrap().depth, 6);

        tt.store(11, Value::new(2), Bound::Upper, 6, Move::NONE);
        assert!(tt.probe(3).is_none());
        assert_eq!(tt.probe(11).unwrap().bound, Bound::Upper);
    }

    #[test]
    fn test_tt_clear_and_resize() {
        let mut tt = TranspositionTable::new(1);
        tt.store(77, Value::new(100), Bound::Lower, 3, Move::NONE);
        tt.clear();
        assert!(tt.probe(77).is_none());

        let initial = tt.len();
        tt.resize(2);
        assert_eq!(tt.len(), initial * 2);
        tt.resize(1);
        assert_eq!(tt.len(), initial);
    }

    #[test]
    fn test_tt_hashfull_counts_sample() {
        let mut tt = TranspositionTable::with_entries(2000);
        for key in 0..500u64 {
            tt.store(key, Value::ZERO, Bound::Exact, 1, Move::NONE);
        }
        assert_eq!(tt.hashfull(), 500);
    }
}

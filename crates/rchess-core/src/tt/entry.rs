//! 置換表エントリ

use crate::types::{Bound, Depth, Move, Value};

/// 指し手（下位 22bit）と境界種別を詰める位置
const BOUND_SHIFT: u32 = 30;
const MOVE_MASK: u32 = (1 << BOUND_SHIFT) - 1;

/// エントリから読み出したデータ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TTData {
    pub mv: Move,
    /// 格納時の ply を基準にした値（`value_from_tt` で戻す）
    pub value: Value,
    pub depth: Depth,
    pub bound: Bound,
}

/// 置換表エントリ
///
/// `bound == Bound::None` のエントリは空きとして扱う。
#[derive(Debug, Clone, Copy, Default)]
#[repr(C)]
pub struct TTEntry {
    key: u64,
    move_bound: u32,
    value: i16,
    depth: i16,
}

const _: () = assert!(std::mem::size_of::<TTEntry>() == 16);

impl TTEntry {
    pub const fn new() -> Self {
        Self {
            key: 0,
            move_bound: 0,
            value: 0,
            depth: 0,
        }
    }

    #[inline]
    pub fn key(&self) -> u64 {
        self.key
    }

    #[inline]
    pub fn bound(&self) -> Bound {
        Bound::from_u8((self.move_bound >> BOUND_SHIFT) as u8)
    }

    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.bound() != Bound::None
    }

    #[inline]
    pub fn depth(&self) -> Depth {
        self.depth as Depth
    }

    #[inline]
    pub fn read(&self) -> TTData {
        TTData {
            mv: Move::from_raw(self.move_bound & MOVE_MASK),
            value: Value::new(self.value as i32),
            depth: self.depth as Depth,
            bound: self.bound(),
        }
    }

    /// エントリを書き換える
    ///
    /// 同じ局面で指し手が無い書き込みのときは、既存の指し手を残す。
    pub(super) fn save(&mut self, key: u64, value: Value, bound: Bound, depth: Depth, mv: Move) {
        debug_assert!(mv.raw() <= MOVE_MASK);
        debug_assert!(value.raw().abs() <= i16::MAX as i32);
        let mv = if mv.is_none() && key == self.key && self.is_occupied() {
            Move::from_raw(self.move_bound & MOVE_MASK)
        } else {
            mv
        };
        self.key = key;
        self.move_bound = mv.raw() | ((bound as u32) << BOUND_SHIFT);
        self.value = value.raw() as i16;
        self.depth = depth.clamp(i16::MIN as Depth, i16::MAX as Depth) as i16;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MoveFlags, PieceType, Square};

    #[test]
    fn test_entry_roundtrip() {
        let mv = Move::new_promotion(Square::A8, Square::B8, PieceType::Queen, MoveFlags::CAPTURE);
        let mut e = TTEntry::new();
        assert!(!e.is_occupied());
        e.save(0xDEAD_BEEF, Value::new(-123), Bound::Lower, 7, mv);
        let d = e.read();
        assert_eq!(d.mv, mv);
        assert_eq!(d.value, Value::new(-123));
        assert_eq!(d.depth, 7);
        assert_eq!(d.bound, Bound::Lower);
        assert_eq!(e.key(), 0xDEAD_BEEF);
    }

    #[test]
    fn test_save_keeps_move_for_same_key() {
        let mv = Move::new(Square::A1, Square::A8, PieceType::Rook, MoveFlags::NONE);
        let mut e = TTEntry::new();
        e.save(42, Value::new(5), Bound::Exact, 3, mv);
        e.save(42, Value::new(9), Bound::Upper, 4, Move::NONE);
        assert_eq!(e.read().mv, mv);
        e.save(43, Value::new(9), Bound::Upper, 5, Move::NONE);
        assert_eq!(e.read().mv, Move::NONE);
    }
}

//! Bitboard 本体

use std::fmt;

use crate::types::Square;

/// 64bit盤面表現
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Bitboard(pub u64);

impl Bitboard {
    /// 空
    pub const EMPTY: Bitboard = Bitboard(0);
    /// 全升
    pub const ALL: Bitboard = Bitboard(!0);

    /// 1升だけのビットボード
    #[inline]
    pub const fn from_square(sq: Square) -> Bitboard {
        Bitboard(1u64 << sq.raw())
    }

    /// 生の値
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// 空か
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// 空でないか
    #[inline]
    pub const fn is_not_empty(self) -> bool {
        self.0 != 0
    }

    /// 升を含むか
    #[inline]
    pub const fn contains(self, sq: Square) -> bool {
        self.0 & (1u64 << sq.raw()) != 0
    }

    /// 升を立てる
    #[inline]
    pub fn set(&mut self, sq: Square) {
        self.0 |= 1u64 << sq.raw();
    }

    /// 升を落とす
    #[inline]
    pub fn clear(&mut self, sq: Square) {
        self.0 &= !(1u64 << sq.raw());
    }

    /// 升を反転
    #[inline]
    pub fn toggle(&mut self, sq: Square) {
        self.0 ^= 1u64 << sq.raw();
    }

    /// 立っているビット数
    #[inline]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// 2つ以上ビットが立っているか
    #[inline]
    pub const fn more_than_one(self) -> bool {
        self.0 & self.0.wrapping_sub(1) != 0
    }

    /// ちょうど1つだけビットが立っているか（2のべき乗判定）
    #[inline]
    pub const fn is_single(self) -> bool {
        self.0 != 0 && !self.more_than_one()
    }

    /// 最下位ビットの升（空のときは呼ばない）
    #[inline]
    pub const fn lsb(self) -> Square {
        debug_assert!(self.0 != 0, "lsb() on empty bitboard");
        Square::from_u8(self.0.trailing_zeros() as u8)
    }

    /// 最下位ビットの升を取り出して落とす
    #[inline]
    pub fn pop_lsb(&mut self) -> Square {
        let sq = self.lsb();
        self.0 &= self.0 - 1;
        sq
    }

    /// 升を列挙するイテレータ
    #[inline]
    pub const fn iter(self) -> BitboardIter {
        BitboardIter(self)
    }

    /// 北（+8）へシフト
    #[inline]
    pub const fn north(self) -> Bitboard {
        Bitboard(self.0 << 8)
    }

    /// 南（-8）へシフト
    #[inline]
    pub const fn south(self) -> Bitboard {
        Bitboard(self.0 >> 8)
    }
}

impl std::ops::BitAnd for Bitboard {
    type Output = Bitboard;

    #[inline]
    fn bitand(self, rhs: Bitboard) -> Bitboard {
        Bitboard(self.0 & rhs.0)
    }
}

impl std::ops::BitOr for Bitboard {
    type Output = Bitboard;

    #[inline]
    fn bitor(self, rhs: Bitboard) -> Bitboard {
        Bitboard(self.0 | rhs.0)
    }
}

impl std::ops::BitXor for Bitboard {
    type Output = Bitboard;

    #[inline]
    fn bitxor(self, rhs: Bitboard) -> Bitboard {
        Bitboard(self.0 ^ rhs.0)
    }
}

impl std::ops::Not for Bitboard {
    type Output = Bitboard;

    #[inline]
    fn not(self) -> Bitboard {
        Bitboard(!self.0)
    }
}

impl std::ops::BitAndAssign for Bitboard {
    #[inline]
    fn bitand_assign(&mut self, rhs: Bitboard) {
        self.0 &= rhs.0;
    }
}

impl std::ops::BitOrAssign for Bitboard {
    #[inline]
    fn bitor_assign(&mut self, rhs: Bitboard) {
        self.0 |= rhs.0;
    }
}

impl std::ops::BitXorAssign for Bitboard {
    #[inline]
    fn bitxor_assign(&mut self, rhs: Bitboard) {
        self.0 ^= rhs.0;
    }
}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = BitboardIter;

    #[inline]
    fn into_iter(self) -> BitboardIter {
        BitboardIter(self)
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bitboard({:#018x})", self.0)?;
        for rank in (0..8u8).rev() {
            for file in 0..8u8 {
                let c = if self.contains(Square::new(file, rank)) { 'x' } else { '.' };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// 升を下位ビットから順に返すイテレータ
pub struct BitboardIter(Bitboard);

impl Iterator for BitboardIter {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Square> {
        if self.0.is_empty() {
            None
        } else {
            Some(self.0.pop_lsb())
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for BitboardIter {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lsb_and_pop() {
        let mut bb = Bitboard(0b1010_0000);
        assert_eq!(bb.count(), 2);
        assert_eq!(bb.lsb().index(), 5);
        assert_eq!(bb.pop_lsb().index(), 5);
        assert_eq!(bb.pop_lsb().index(), 7);
        assert!(bb.is_empty());
    }

    #[test]
    fn test_single_and_more_than_one() {
        assert!(!Bitboard::EMPTY.is_single());
        assert!(Bitboard(1 << 40).is_single());
        assert!(!Bitboard(3).is_single());
        assert!(Bitboard(3).more_than_one());
        assert!(!Bitboard(8).more_than_one());
    }

    #[test]
    fn test_iter_order() {
        let bb = Bitboard::from_square(Square::H8) | Bitboard::from_square(Square::A1);
        let squares: Vec<Square> = bb.iter().collect();
        assert_eq!(squares, vec![Square::A1, Square::H8]);
        assert_eq!(bb.iter().len(), 2);
    }

    #[test]
    fn test_set_clear_toggle() {
        let mut bb = Bitboard::EMPTY;
        bb.set(Square::E1);
        assert!(bb.contains(Square::E1));
        bb.toggle(Square::E8);
        assert!(bb.contains(Square::E8));
        bb.clear(Square::E1);
        assert!(!bb.contains(Square::E1));
        assert_eq!(bb.count(), 1);
    }
}

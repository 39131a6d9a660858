//! 升（Square）
//!
//! a1=0, b1=1, ..., h1=7, a2=8, ..., h8=63 のリトルエンディアン・ランク-ファイル配置。

use std::fmt;
use std::str::FromStr;

use super::Color;

/// 升
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Square(u8);

impl Square {
    /// 升の数
    pub const NUM: usize = 64;

    pub const A1: Square = Square(0);
    pub const B1: Square = Square(1);
    pub const C1: Square = Square(2);
    pub const D1: Square = Square(3);
    pub const E1: Square = Square(4);
    pub const F1: Square = Square(5);
    pub const G1: Square = Square(6);
    pub const H1: Square = Square(7);
    pub const A8: Square = Square(56);
    pub const B8: Square = Square(57);
    pub const C8: Square = Square(58);
    pub const D8: Square = Square(59);
    pub const E8: Square = Square(60);
    pub const F8: Square = Square(61);
    pub const G8: Square = Square(62);
    pub const H8: Square = Square(63);

    /// 筋・段から生成（0..8）
    #[inline]
    pub const fn new(file: u8, rank: u8) -> Square {
        debug_assert!(file < 8 && rank < 8);
        Square(rank * 8 + file)
    }

    /// インデックスから生成（範囲外は None）
    #[inline]
    pub const fn from_index(index: usize) -> Option<Square> {
        if index < Self::NUM {
            Some(Square(index as u8))
        } else {
            None
        }
    }

    /// インデックスから生成（範囲チェックは debug のみ）
    #[inline]
    pub const fn from_u8(v: u8) -> Square {
        debug_assert!(v < 64);
        Square(v)
    }

    /// 筋（0=a .. 7=h）
    #[inline]
    pub const fn file(self) -> u8 {
        self.0 & 7
    }

    /// 段（0=1段目 .. 7=8段目）
    #[inline]
    pub const fn rank(self) -> u8 {
        self.0 >> 3
    }

    /// 手番から見た段（白は rank、黒は 7-rank）
    #[inline]
    pub const fn relative_rank(self, color: Color) -> u8 {
        match color {
            Color::White => self.rank(),
            Color::Black => 7 - self.rank(),
        }
    }

    /// 生の値
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// インデックスとして使用（配列アクセス用）
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// 符号付きオフセットを加えた升（盤外チェックは呼び出し側の責任）
    #[inline]
    pub const fn offset(self, delta: i8) -> Square {
        let v = self.0 as i8 + delta;
        debug_assert!(v >= 0 && v < 64);
        Square(v as u8)
    }

    /// 全升を a1 から順に列挙
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64u8).map(Square)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file()) as char, (b'1' + self.rank()) as char)
    }
}

impl FromStr for Square {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(());
        }
        let (f, r) = (bytes[0], bytes[1]);
        if !(b'a'..=b'h').contains(&f) || !(b'1'..=b'8').contains(&r) {
            return Err(());
        }
        Ok(Square::new(f - b'a', r - b'1'))
    }
}

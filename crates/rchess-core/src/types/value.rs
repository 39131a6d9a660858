//! 評価値（Value）
//!
//! センチポーン単位の符号付き整数。`±MATE` から `MAX_PLY` 以内を詰みスコアに
//! 予約し、それより内側が通常の評価値になる。

use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use super::MAX_PLY;

/// 手番側から見た評価値
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Value(i32);

impl Value {
    pub const ZERO: Value = Value(0);
    pub const DRAW: Value = Value(0);
    /// 即詰み（ルートで詰ませている）の値
    pub const MATE: Value = Value(32000);
    /// 探索窓の上限
    pub const INFINITE: Value = Value(32001);
    /// 「値なし」を表す番兵（静的評価を計算しなかった局面など）
    pub const NONE: Value = Value(32002);

    /// これ以上なら勝ちの詰みスコア
    pub const MATE_IN_MAX_PLY: Value = Value(Self::MATE.0 - MAX_PLY as i32);
    /// これ以下なら負けの詰みスコア
    pub const MATED_IN_MAX_PLY: Value = Value(-Self::MATE_IN_MAX_PLY.0);

    #[inline]
    pub const fn new(v: i32) -> Value {
        Value(v)
    }

    /// ルートから `ply` 手目で相手玉を詰ませるスコア
    #[inline]
    pub const fn mate_in(ply: i32) -> Value {
        Value(Self::MATE.0 - ply)
    }

    /// ルートから `ply` 手目で自玉が詰まされるスコア
    #[inline]
    pub const fn mated_in(ply: i32) -> Value {
        Value(ply - Self::MATE.0)
    }

    #[inline]
    pub const fn is_win(self) -> bool {
        self.0 >= Self::MATE_IN_MAX_PLY.0
    }

    #[inline]
    pub const fn is_loss(self) -> bool {
        self.0 <= Self::MATED_IN_MAX_PLY.0
    }

    #[inline]
    pub const fn is_mate_score(self) -> bool {
        self.is_win() || self.is_loss()
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// 詰みまでの ply 数（詰みスコアでなければ 0）
    #[inline]
    pub const fn mate_ply(self) -> i32 {
        match self.0 {
            v if v >= Self::MATE_IN_MAX_PLY.0 => Self::MATE.0 - v,
            v if v <= Self::MATED_IN_MAX_PLY.0 => Self::MATE.0 + v,
            _ => 0,
        }
    }
}

/// UCI の `score` 表記（`cp N` / `mate N`、N は手数）
impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let moves = (self.mate_ply() + 1) / 2;
        if self.is_win() {
            write!(f, "mate {moves}")
        } else if self.is_loss() {
            write!(f, "mate -{moves}")
        } else {
            write!(f, "cp {}", self.0)
        }
    }
}

impl Neg for Value {
    type Output = Value;

    #[inline]
    fn neg(self) -> Value {
        Value(-self.0)
    }
}

/// `Value ⊕ Value` と `Value ⊕ i32` の両方を実装する
macro_rules! impl_value_arith {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $op:tt) => {
        impl $trait for Value {
            type Output = Value;

            #[inline]
            fn $method(self, rhs: Value) -> Value {
                Value(self.0 $op rhs.0)
            }
        }

        impl $trait<i32> for Value {
            type Output = Value;

            #[inline]
            fn $method(self, rhs: i32) -> Value {
                Value(self.0 $op rhs)
            }
        }

        impl $assign_trait for Value {
            #[inline]
            fn $assign_method(&mut self, rhs: Value) {
                *self = *self $op rhs;
            }
        }
    };
}

impl_value_arith!(Add, add, AddAssign, add_assign, +);
impl_value_arith!(Sub, sub, SubAssign, sub_assign, -);

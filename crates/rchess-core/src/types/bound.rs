//! 置換表の境界種別

/// スコアの境界種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Bound {
    /// 未使用
    #[default]
    None = 0,
    /// 上界（fail low）
    Upper = 1,
    /// 下界（fail high）
    Lower = 2,
    /// 正確な値
    Exact = 3,
}

impl Bound {
    /// u8から変換
    #[inline]
    pub const fn from_u8(v: u8) -> Bound {
        match v & 3 {
            1 => Bound::Upper,
            2 => Bound::Lower,
            3 => Bound::Exact,
            _ => Bound::None,
        }
    }

    /// 下界を含むか（Lower / Exact）
    #[inline]
    pub const fn is_lower(self) -> bool {
        (self as u8) & (Bound::Lower as u8) != 0
    }

    /// 上界を含むか（Upper / Exact）
    #[inline]
    pub const fn is_upper(self) -> bool {
        (self as u8) & (Bound::Upper as u8) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_flags() {
        assert!(Bound::Exact.is_lower() && Bound::Exact.is_upper());
        assert!(Bound::Lower.is_lower() && !Bound::Lower.is_upper());
        assert!(!Bound::Upper.is_lower() && Bound::Upper.is_upper());
        assert!(!Bound::None.is_lower() && !Bound::None.is_upper());
        assert_eq!(Bound::from_u8(Bound::Lower as u8), Bound::Lower);
    }
}

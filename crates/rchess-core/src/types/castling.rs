//! キャスリング権

use super::{Color, Square};

/// キャスリング権（白K=1, 白Q=2, 黒K=4, 黒Q=8）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KING: CastlingRights = CastlingRights(1);
    pub const WHITE_QUEEN: CastlingRights = CastlingRights(2);
    pub const BLACK_KING: CastlingRights = CastlingRights(4);
    pub const BLACK_QUEEN: CastlingRights = CastlingRights(8);
    pub const ALL: CastlingRights = CastlingRights(15);

    /// 組み合わせの数（Zobrist テーブル用）
    pub const NUM: usize = 16;

    /// 生の値から生成
    #[inline]
    pub const fn from_bits(bits: u8) -> CastlingRights {
        CastlingRights(bits & 15)
    }

    /// 生の値
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// インデックスとして使用（配列アクセス用）
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// 権利をすべて含むか
    #[inline]
    pub const fn contains(self, other: CastlingRights) -> bool {
        self.0 & other.0 == other.0
    }

    /// 権利が1つもないか
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// 権利を追加
    #[inline]
    pub fn insert(&mut self, other: CastlingRights) {
        self.0 |= other.0;
    }

    /// 権利を削除
    #[inline]
    pub fn remove(&mut self, other: CastlingRights) {
        self.0 &= !other.0;
    }

    /// 手番側のキング側/クイーン側の権利
    #[inline]
    pub const fn for_side(color: Color, king_side: bool) -> CastlingRights {
        match (color, king_side) {
            (Color::White, true) => Self::WHITE_KING,
            (Color::White, false) => Self::WHITE_QUEEN,
            (Color::Black, true) => Self::BLACK_KING,
            (Color::Black, false) => Self::BLACK_QUEEN,
        }
    }

    /// 升から出入りする駒によって失われる権利
    ///
    /// キングまたはルークの初期位置が関係する升でのみ非空になる。
    #[inline]
    pub const fn lost_by_square(sq: Square) -> CastlingRights {
        match sq.raw() {
            0 => Self::WHITE_QUEEN,
            4 => CastlingRights(Self::WHITE_KING.0 | Self::WHITE_QUEEN.0),
            7 => Self::WHITE_KING,
            56 => Self::BLACK_QUEEN,
            60 => CastlingRights(Self::BLACK_KING.0 | Self::BLACK_QUEEN.0),
            63 => Self::BLACK_KING,
            _ => Self::NONE,
        }
    }

    /// 個々の権利（K, Q, k, q の順）を列挙
    pub fn iter(self) -> impl Iterator<Item = CastlingRights> {
        [Self::WHITE_KING, Self::WHITE_QUEEN, Self::BLACK_KING, Self::BLACK_QUEEN]
            .into_iter()
            .filter(move |r| self.contains(*r))
    }
}

impl std::fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        for (right, c) in [
            (Self::WHITE_KING, 'K'),
            (Self::WHITE_QUEEN, 'Q'),
            (Self::BLACK_KING, 'k'),
            (Self::BLACK_QUEEN, 'q'),
        ] {
            if self.contains(right) {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_castling_insert_remove() {
        let mut cr = CastlingRights::NONE;
        cr.insert(CastlingRights::WHITE_KING);
        cr.insert(CastlingRights::BLACK_QUEEN);
        assert_eq!(cr.to_string(), "Kq");
        cr.remove(CastlingRights::lost_by_square(Square::H1));
        assert_eq!(cr.to_string(), "q");
        assert_eq!(cr.iter().count(), 1);
        cr.remove(CastlingRights::lost_by_square(Square::E8));
        assert!(cr.is_empty());
        assert_eq!(cr.to_string(), "-");
    }
}

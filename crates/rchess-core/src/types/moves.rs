//! 指し手（Move）
//!
//! 32bit にパックした指し手表現。
//!
//! ```text
//! bit  0- 5: 移動元
//! bit  6-11: 移動先
//! bit 12-14: 動かす駒種
//! bit 15-17: 成り駒種（0 = 成りなし）
//! bit 18-21: フラグ（捕獲・キャスリング・2歩前進・アンパッサン）
//! ```

use std::fmt;

use super::{PieceType, Square};

/// 指し手のフラグ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct MoveFlags(u8);

impl MoveFlags {
    pub const NONE: MoveFlags = MoveFlags(0);
    /// 駒を取る手（アンパッサンを含む）
    pub const CAPTURE: MoveFlags = MoveFlags(1);
    /// キャスリング
    pub const CASTLE: MoveFlags = MoveFlags(2);
    /// アンパッサンを可能にする2歩前進
    pub const DOUBLE_PUSH: MoveFlags = MoveFlags(4);
    /// アンパッサン
    pub const EN_PASSANT: MoveFlags = MoveFlags(8);

    /// フラグを含むか
    #[inline]
    pub const fn contains(self, other: MoveFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// 生の値
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl std::ops::BitOr for MoveFlags {
    type Output = MoveFlags;

    #[inline]
    fn bitor(self, rhs: MoveFlags) -> MoveFlags {
        MoveFlags(self.0 | rhs.0)
    }
}

const FROM_SHIFT: u32 = 0;
const TO_SHIFT: u32 = 6;
const PIECE_SHIFT: u32 = 12;
const PROMO_SHIFT: u32 = 15;
const FLAG_SHIFT: u32 = 18;

/// 指し手
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Move(u32);

impl Move {
    /// 指し手なし
    pub const NONE: Move = Move(0);
    /// パス（null move）
    pub const NULL: Move = Move((1 << FROM_SHIFT) | (1 << TO_SHIFT));

    /// 指し手を生成
    #[inline]
    pub const fn new(from: Square, to: Square, pt: PieceType, flags: MoveFlags) -> Move {
        Move(
            ((from.raw() as u32) << FROM_SHIFT)
                | ((to.raw() as u32) << TO_SHIFT)
                | ((pt as u32) << PIECE_SHIFT)
                | ((flags.bits() as u32) << FLAG_SHIFT),
        )
    }

    /// 成りの指し手を生成
    #[inline]
    pub const fn new_promotion(
        from: Square,
        to: Square,
        promo: PieceType,
        flags: MoveFlags,
    ) -> Move {
        Move(Self::new(from, to, PieceType::Pawn, flags).0 | ((promo as u32) << PROMO_SHIFT))
    }

    /// 生の値から生成
    #[inline]
    pub const fn from_raw(raw: u32) -> Move {
        Move(raw)
    }

    /// 生の値
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// 移動元
    #[inline]
    pub const fn from(self) -> Square {
        Square::from_u8(((self.0 >> FROM_SHIFT) & 0x3F) as u8)
    }

    /// 移動先
    #[inline]
    pub const fn to(self) -> Square {
        Square::from_u8(((self.0 >> TO_SHIFT) & 0x3F) as u8)
    }

    /// 動かす駒種
    #[inline]
    pub const fn piece_type(self) -> PieceType {
        match PieceType::from_u8(((self.0 >> PIECE_SHIFT) & 7) as u8) {
            Some(pt) => pt,
            None => PieceType::Pawn,
        }
    }

    /// 成り駒種
    #[inline]
    pub const fn promotion(self) -> Option<PieceType> {
        match (self.0 >> PROMO_SHIFT) & 7 {
            0 => None,
            v => PieceType::from_u8(v as u8),
        }
    }

    /// フラグ
    #[inline]
    pub const fn flags(self) -> MoveFlags {
        MoveFlags(((self.0 >> FLAG_SHIFT) & 0xF) as u8)
    }

    /// 指し手なしか
    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// 通常の指し手か（NONE / NULL 以外）
    #[inline]
    pub const fn is_some(self) -> bool {
        self.0 != Self::NONE.0 && self.0 != Self::NULL.0
    }

    /// null move か
    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == Self::NULL.0
    }

    /// 捕獲か
    #[inline]
    pub const fn is_capture(self) -> bool {
        self.flags().contains(MoveFlags::CAPTURE)
    }

    /// 成りか
    #[inline]
    pub const fn is_promotion(self) -> bool {
        (self.0 >> PROMO_SHIFT) & 7 != 0
    }

    /// キャスリングか
    #[inline]
    pub const fn is_castle(self) -> bool {
        self.flags().contains(MoveFlags::CASTLE)
    }

    /// アンパッサンか
    #[inline]
    pub const fn is_en_passant(self) -> bool {
        self.flags().contains(MoveFlags::EN_PASSANT)
    }

    /// 2歩前進か
    #[inline]
    pub const fn is_double_push(self) -> bool {
        self.flags().contains(MoveFlags::DOUBLE_PUSH)
    }

    /// 捕獲または成り（静止探索・MovePicker の noisy 手）
    #[inline]
    pub const fn is_noisy(self) -> bool {
        self.is_capture() || self.is_promotion()
    }

    /// 静かな手か
    #[inline]
    pub const fn is_quiet(self) -> bool {
        !self.is_noisy()
    }

    /// [from][to] の履歴インデックス
    #[inline]
    pub const fn history_index(self) -> usize {
        (self.0 & 0xFFF) as usize
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_some() {
            return f.write_str("0000");
        }
        write!(f, "{}{}", self.from(), self.to())?;
        if let Some(promo) = self.promotion() {
            write!(f, "{}", promo.to_char())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({self}, {:?}, flags={:#x})", self.piece_type(), self.flags().bits())
    }
}

/// スコア付きの指し手（MovePicker・MoveArena で使用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtMove {
    pub mv: Move,
    pub value: i32,
}

impl ExtMove {
    /// 新しいExtMoveを作成
    #[inline]
    pub const fn new(mv: Move, value: i32) -> Self {
        Self { mv, value }
    }
}

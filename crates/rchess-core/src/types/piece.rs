//! 駒種（PieceType）と駒（Piece）

use super::Color;

/// 駒種
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PieceType {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl PieceType {
    /// 駒種の数
    pub const NUM: usize = 6;

    /// 全駒種（価値の昇順）
    pub const ALL: [PieceType; 6] = [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ];

    /// 成りで選べる駒種（クイーン優先）
    pub const PROMOTIONS: [PieceType; 4] =
        [PieceType::Queen, PieceType::Rook, PieceType::Bishop, PieceType::Knight];

    /// u8から変換（範囲外は None）
    #[inline]
    pub const fn from_u8(v: u8) -> Option<PieceType> {
        match v {
            0 => Some(PieceType::Pawn),
            1 => Some(PieceType::Knight),
            2 => Some(PieceType::Bishop),
            3 => Some(PieceType::Rook),
            4 => Some(PieceType::Queen),
            5 => Some(PieceType::King),
            _ => None,
        }
    }

    /// インデックスとして使用（配列アクセス用）
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// SEE・MVV で使う駒価値
    #[inline]
    pub const fn value(self) -> i32 {
        match self {
            PieceType::Pawn => 100,
            PieceType::Knight => 320,
            PieceType::Bishop => 330,
            PieceType::Rook => 500,
            PieceType::Queen => 900,
            PieceType::King => 20000,
        }
    }

    /// 小文字の駒文字
    #[inline]
    pub const fn to_char(self) -> char {
        match self {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        }
    }

    /// 駒文字（大文字小文字を問わない）から変換
    #[inline]
    pub const fn from_char(c: char) -> Option<PieceType> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceType::Pawn),
            'n' => Some(PieceType::Knight),
            'b' => Some(PieceType::Bishop),
            'r' => Some(PieceType::Rook),
            'q' => Some(PieceType::Queen),
            'k' => Some(PieceType::King),
            _ => None,
        }
    }
}

/// 先後付きの駒
///
/// 0 = 駒なし、1..=6 = 白、9..=14 = 黒。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Piece(u8);

impl Piece {
    /// 駒なし
    pub const NONE: Piece = Piece(0);

    /// 駒のインデックス数（履歴テーブル用、NONE を含む）
    pub const NUM: usize = 16;

    /// 手番と駒種から生成
    #[inline]
    pub const fn new(color: Color, pt: PieceType) -> Piece {
        Piece(((color as u8) << 3) | (pt as u8 + 1))
    }

    /// 駒なしか
    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// 駒があるか
    #[inline]
    pub const fn is_some(self) -> bool {
        self.0 != 0
    }

    /// 駒種（NONE に対して呼んではならない）
    #[inline]
    pub const fn piece_type(self) -> PieceType {
        debug_assert!(self.0 != 0, "piece_type() on Piece::NONE");
        match PieceType::from_u8((self.0 & 7).wrapping_sub(1)) {
            Some(pt) => pt,
            None => PieceType::Pawn,
        }
    }

    /// 手番（NONE に対して呼んではならない）
    #[inline]
    pub const fn color(self) -> Color {
        if self.0 & 8 == 0 {
            Color::White
        } else {
            Color::Black
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

    /// FEN の駒文字（白は大文字）
    pub const fn to_char(self) -> char {
        if self.is_none() {
            return '.';
        }
        let c = self.piece_type().to_char();
        match self.color() {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// FEN の駒文字から変換
    pub const fn from_char(c: char) -> Option<Piece> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        match PieceType::from_char(c) {
            Some(pt) => Some(Piece::new(color, pt)),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_roundtrip() {
        for color in Color::ALL {
            for pt in PieceType::ALL {
                let pc = Piece::new(color, pt);
                assert!(pc.is_some());
                assert_eq!(pc.color(), color);
                assert_eq!(pc.piece_type(), pt);
                assert!(pc.index() < Piece::NUM);
                assert_eq!(Piece::from_char(pc.to_char()), Some(pc));
            }
        }
        assert!(Piece::NONE.is_none());
    }

    #[test]
    fn test_piece_chars() {
        assert_eq!(Piece::new(Color::White, PieceType::Knight).to_char(), 'N');
        assert_eq!(Piece::new(Color::Black, PieceType::Queen).to_char(), 'q');
        assert_eq!(Piece::from_char('x'), None);
    }

    #[test]
    fn test_piece_values_ascending() {
        let values: Vec<i32> = PieceType::ALL.iter().map(|pt| pt.value()).collect();
        assert!(values.windows(2).all(|w| w[0] < w[1]));
    }
}

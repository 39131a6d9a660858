//! 指し手文字列（`e2e4` / `e7e8q` 形式）の解析

use crate::movegen::legal_moves;
use crate::types::{Move, PieceType, Square};

use super::pos::Position;

/// 指し手文字列の解析エラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveParseError {
    /// 書式が `<from><to>[promotion]` になっていない
    #[error("malformed move text {0:?}")]
    Malformed(String),
    /// 書式は正しいがこの局面の合法手ではない
    #[error("illegal move {0:?} in this position")]
    Illegal(String),
}

impl Position {
    /// 指し手文字列をこの局面の合法手に変換する
    ///
    /// `0000` は `Move::NONE` を返す。
    pub fn parse_move(&self, text: &str) -> Result<Move, MoveParseError> {
        let malformed = || MoveParseError::Malformed(text.to_string());
        if text == "0000" {
            return Ok(Move::NONE);
        }
        if !text.is_ascii() || !(4..=5).contains(&text.len()) {
            return Err(malformed());
        }
        let from: Square = text[0..2].parse().map_err(|_| malformed())?;
        let to: Square = text[2..4].parse().map_err(|_| malformed())?;
        let promo = match text[4..].chars().next() {
            None => None,
            Some(c) => match PieceType::from_char(c) {
                Some(pt) if PieceType::PROMOTIONS.contains(&pt) => Some(pt),
                _ => return Err(malformed()),
            },
        };

        let mv = self.encode_move(from, to, promo);
        if mv.is_some() && legal_moves(self).contains(mv) {
            Ok(mv)
        } else {
            Err(MoveParseError::Illegal(text.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_moves() {
        let pos = Position::startpos();
        let mv = pos.parse_move("e2e4").unwrap();
        assert!(mv.is_double_push());
        assert_eq!(mv.to_string(), "e2e4");
        assert_eq!(pos.parse_move("g1f3").unwrap().piece_type(), PieceType::Knight);
        assert_eq!(pos.parse_move("0000").unwrap(), Move::NONE);
    }

    #[test]
    fn test_parse_promotion_and_castle() {
        let pos = Position::from_fen("4k3/1P6/8/8/8/8/8/R3K3 w Q - 0 1").unwrap();
        let promo = pos.parse_move("b7b8n").unwrap();
        assert_eq!(promo.promotion(), Some(PieceType::Knight));
        assert!(pos.parse_move("e1c1").unwrap().is_castle());
        // 昇格先なしのポーン8段目移動は合法手にない
        assert!(matches!(pos.parse_move("b7b8"), Err(MoveParseError::Illegal(_))));
    }

    #[test]
    fn test_parse_errors() {
        let pos = Position::startpos();
        assert!(matches!(pos.parse_move("e2"), Err(MoveParseError::Malformed(_))));
        assert!(matches!(pos.parse_move("e2e9"), Err(MoveParseError::Malformed(_))));
        assert!(matches!(pos.parse_move("e7e8k"), Err(MoveParseError::Malformed(_))));
        assert!(matches!(pos.parse_move("e2e5"), Err(MoveParseError::Illegal(_))));
        assert!(matches!(pos.parse_move("e7e5"), Err(MoveParseError::Illegal(_))));
    }
}

//! 素材評価
//!
//! 駒の価値に、中央寄りの小駒と前進したポーンへの小さな加点を足しただけの評価関数。
//! テストとツールの既定評価として使う。

use crate::position::Position;
use crate::types::{Color, PieceType, Square, Value};

use super::Evaluator;

/// 中央からの距離（0 = 中央4升 .. 3 = 盤端）
#[inline]
fn edge_distance(sq: Square) -> i32 {
    let f = (2 * sq.file() as i32 - 7).abs() / 2;
    let r = (2 * sq.rank() as i32 - 7).abs() / 2;
    f.max(r)
}

/// 駒と升ごとの加点（`color` 側から見た段で計算する）
fn placement_bonus(pt: PieceType, color: Color, sq: Square) -> i32 {
    match pt {
        PieceType::Pawn => 4 * sq.relative_rank(color) as i32,
        PieceType::Knight => 12 - 8 * edge_distance(sq),
        PieceType::Bishop => 6 - 4 * edge_distance(sq),
        PieceType::Queen => 3 - edge_distance(sq),
        PieceType::Rook | PieceType::King => 0,
    }
}

/// 素材 + 配置ボーナスの評価関数
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialEvaluator;

impl MaterialEvaluator {
    /// 白から見た評価値
    pub fn white_score(pos: &Position) -> i32 {
        let mut score = 0;
        for color in Color::ALL {
            let sign = if color == Color::White { 1 } else { -1 };
            for pt in PieceType::ALL {
                if pt == PieceType::King {
                    continue;
                }
                for sq in pos.pieces(color, pt) {
                    score += sign * (pt.value() + placement_bonus(pt, color, sq));
                }
            }
        }
        score
    }
}

impl Evaluator for MaterialEvaluator {
    fn evaluate(&self, pos: &Position) -> Value {
        let score = Self::white_score(pos);
        Value::new(match pos.side_to_move() {
            Color::White => score,
            Color::Black => -score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startpos_is_balanced() {
        assert_eq!(MaterialEvaluator.evaluate(&Position::startpos()), Value::ZERO);
    }

    #[test]
    fn test_material_advantage_is_side_relative() {
        // 白がクイーン得
        let w = Position::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        let b = Position::from_fen("4k3/8/8/8/8/8/8/3QK3 b - - 0 1").unwrap();
        let ws = MaterialEvaluator.evaluate(&w);
        assert!(ws.raw() > 800);
        assert_eq!(MaterialEvaluator.evaluate(&b), -ws);
    }

    #[test]
    fn test_mirrored_position_is_symmetric() {
        let a = Position::from_fen("4k3/pp6/2n5/8/8/5N2/6PP/4K3 w - - 0 1").unwrap();
        assert_eq!(MaterialEvaluator::white_score(&a), 0);
    }
}

//! 評価関数の呼び出し規約
//!
//! 探索は `Evaluator` を通じて局面の静的評価値（手番側から見た値）を受け取る。
//! 評価値は詰みスコア帯（`Value::MATE_IN_MAX_PLY` 以上）に入ってはならない。

mod material;

pub use material::MaterialEvaluator;

use crate::position::Position;
use crate::types::Value;

/// 静的評価関数
pub trait Evaluator {
    /// 手番側から見た評価値
    fn evaluate(&self, pos: &Position) -> Value;
}

impl<F> Evaluator for F
where
    F: Fn(&Position) -> Value,
{
    #[inline]
    fn evaluate(&self, pos: &Position) -> Value {
        self(pos)
    }
}

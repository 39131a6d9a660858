//! 探索チューニングパラメータ
//!
//! 探索係数を1か所に集約する。`EngineConfig` の JSON から読み込むほか、
//! 名前を指定して1項目ずつ（範囲に丸めて）更新できる。

use serde::{Deserialize, Serialize};

/// 1つのチューニング項目の定義
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTuneOptionSpec {
    /// 項目名（`SearchTuneParams` のフィールド名と同じ）
    pub name: &'static str,
    /// デフォルト値
    pub default: i32,
    /// 最小値（inclusive）
    pub min: i32,
    /// 最大値（inclusive）
    pub max: i32,
}

/// 1項目を適用した結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTuneSetResult {
    /// 反映後の値（必要なら clamp 後）
    pub applied: i32,
    /// 入力値が範囲外で clamp されたか
    pub clamped: bool,
    pub min: i32,
    pub max: i32,
}

/// 探索係数の集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchTuneParams {
    /// NMP: reduction のベース
    pub nmp_reduction_base: i32,
    /// NMP: reduction の depth 除算（R = base + depth / div）
    pub nmp_reduction_depth_div: i32,
    /// NMP: 適用する最小の残り深さ
    pub nmp_min_depth: i32,

    /// LMR: 定数項（/100）
    pub lmr_base: i32,
    /// LMR: ln(depth) * ln(move_count) の除数（/100）
    pub lmr_divisor: i32,
    /// LMR: 適用する最小の残り深さ
    pub lmr_min_depth: i32,
    /// LMR: この手数より後の手だけを減らす
    pub lmr_min_move_count: i32,

    /// QSearch: delta pruning の安全マージン
    pub delta_margin: i32,

    /// Aspiration: 初期窓幅
    pub aspiration_delta: i32,
    /// Aspiration: 窓を使い始める深さ
    pub aspiration_min_depth: i32,

    /// History: fail high した静かな手への加点倍率（depth^2 に掛ける）
    pub history_bonus_mult: i32,
    /// History: 試して棄却された静かな手への減点の除数（depth^2 * mult / div）
    pub history_malus_div: i32,
}

impl Default for SearchTuneParams {
    fn default() -> Self {
        Self {
            nmp_reduction_base: 3,
            nmp_reduction_depth_div: 4,
            nmp_min_depth: 3,
            lmr_base: 75,
            lmr_divisor: 225,
            lmr_min_depth: 3,
            lmr_min_move_count: 3,
            delta_margin: 200,
            aspiration_delta: 25,
            aspiration_min_depth: 4,
            history_bonus_mult: 1,
            history_malus_div: 2,
        }
    }
}

const OPTION_SPECS: &[SearchTuneOptionSpec] = &[
    SearchTuneOptionSpec {
        name: "nmp_reduction_base",
        default: 3,
        min: 1,
        max: 8,
    },
    SearchTuneOptionSpec {
        name: "nmp_reduction_depth_div",
        default: 4,
        min: 1,
        max: 32,
    },
    SearchTuneOptionSpec {
        name: "nmp_min_depth",
        default: 3,
        min: 1,
        max: 16,
    },
    SearchTuneOptionSpec {
        name: "lmr_base",
        default: 75,
        min: 0,
        max: 400,
    },
    SearchTuneOptionSpec {
        name: "lmr_divisor",
        default: 225,
        min: 50,
        max: 1000,
    },
    SearchTuneOptionSpec {
        name: "lmr_min_depth",
        default: 3,
        min: 1,
        max: 16,
    },
    SearchTuneOptionSpec {
        name: "lmr_min_move_count",
        default: 3,
        min: 1,
        max: 32,
    },
    SearchTuneOptionSpec {
        name: "delta_margin",
        default: 200,
        min: 0,
        max: 2000,
    },
    SearchTuneOptionSpec {
        name: "aspiration_delta",
        default: 25,
        min: 5,
        max: 500,
    },
    SearchTuneOptionSpec {
        name: "aspiration_min_depth",
        default: 4,
        min: 1,
        max: 64,
    },
    SearchTuneOptionSpec {
        name: "history_bonus_mult",
        default: 1,
        min: 1,
        max: 16,
    },
    SearchTuneOptionSpec {
        name: "history_malus_div",
        default: 2,
        min: 1,
        max: 16,
    },
];

impl SearchTuneParams {
    /// 公開している項目の定義
    pub fn option_specs() -> &'static [SearchTuneOptionSpec] {
        OPTION_SPECS
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut i32> {
        Some(match name {
            "nmp_reduction_base" => &mut self.nmp_reduction_base,
            "nmp_reduction_depth_div" => &mut self.nmp_reduction_depth_div,
            "nmp_min_depth" => &mut self.nmp_min_depth,
            "lmr_base" => &mut self.lmr_base,
            "lmr_divisor" => &mut self.lmr_divisor,
            "lmr_min_depth" => &mut self.lmr_min_depth,
            "lmr_min_move_count" => &mut self.lmr_min_move_count,
            "delta_margin" => &mut self.delta_margin,
            "aspiration_delta" => &mut self.aspiration_delta,
            "aspiration_min_depth" => &mut self.aspiration_min_depth,
            "history_bonus_mult" => &mut self.history_bonus_mult,
            "history_malus_div" => &mut self.history_malus_div,
            _ => return None,
        })
    }

    /// 項目名と値を受け取り、範囲に丸めて更新する
    ///
    /// 不明な項目名の場合は `None` を返す。
    pub fn set_by_name(&mut self, name: &str, value: i32) -> Option<SearchTuneSetResult> {
        let spec = OPTION_SPECS.iter().find(|s| s.name == name)?;
        let dst = self.field_mut(name)?;
        let applied = value.clamp(spec.min, spec.max);
        *dst = applied;
        Some(SearchTuneSetResult {
            applied,
            clamped: applied != value,
            min: spec.min,
            max: spec.max,
        })
    }

    /// 範囲外の項目名を返す（すべて範囲内なら `None`）
    pub fn out_of_range(&self) -> Option<&'static str> {
        let mut copy = *self;
        OPTION_SPECS.iter().find_map(|spec| {
            let v = *copy.field_mut(spec.name)?;
            (!(spec.min..=spec.max).contains(&v)).then_some(spec.name)
        })
    }
}

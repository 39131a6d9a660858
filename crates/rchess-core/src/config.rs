//! エンジン設定
//!
//! 置換表サイズと探索係数をまとめる。JSON から読み込み、`SearchWorker::new` に渡す。
//!
//! ```json
//! { "hash_mb": 64, "tune": { "lmr_divisor": 250 } }
//! ```
//!
//! 省略した項目はデフォルト値になる。

use serde::{Deserialize, Serialize};

use crate::search::SearchTuneParams;
use crate::tt::DEFAULT_HASH_MB;

/// 設定の読み込みエラー
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// エンジン設定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 置換表サイズ（MB）
    pub hash_mb: usize,
    pub tune: SearchTuneParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hash_mb: DEFAULT_HASH_MB,
            tune: SearchTuneParams::default(),
        }
    }
}

impl EngineConfig {
    /// JSON 文字列から読み込んで検証する
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// JSON 文字列に書き出す
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 値の範囲を検証する
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hash_mb == 0 {
            return Err(ConfigError::Invalid("hash_mb must be at least 1".to_string()));
        }
        if let Some(name) = self.tune.out_of_range() {
            return Err(ConfigError::Invalid(format!("tune.{name} is out of range")));
        }
        Ok(())
    }
}

//! Serializable run configuration.
//!
//! ```toml
//! [data]
//! daily = "data/daily.csv"
//! instruments = "data/instruments.csv"
//!
//! [rules]
//! path = "config/limit_rules.toml"
//! eps = 1e-6
//!
//! [backtest]
//! strategy = "buy_first_limitup_sell_next_close"
//! fee_bps = 3.0
//! slippage_bps = 5.0
//!
//! [output]
//! dir = "artifacts/demo"
//! ```
//!
//! Relative paths are resolved against the directory containing the config file.

use limitup_core::backtest::CostModel;
use limitup_core::labels::DEFAULT_EPS;
use limitup_core::strategy::{strategy_by_name, BuyFirstLimitUpSellNextClose};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    pub data: DataConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub backtest: BacktestConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Input tables (CSV or Parquet).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    pub daily: PathBuf,
    pub instruments: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RulesConfig {
    /// Limit-rule override file. Built-in defaults when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Absolute tolerance for at-limit comparisons.
    #[serde(default = "default_eps")]
    pub eps: f64,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            path: None,
            eps: DEFAULT_EPS,
        }
    }
}

fn default_eps() -> f64 {
    DEFAULT_EPS
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BacktestConfig {
    #[serde(default = "default_strategy")]
    pub strategy: String,
    #[serde(default)]
    pub fee_bps: f64,
    #[serde(default)]
    pub slippage_bps: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            fee_bps: 0.0,
            slippage_bps: 0.0,
        }
    }
}

fn default_strategy() -> String {
    BuyFirstLimitUpSellNextClose::NAME.to_string()
}

impl BacktestConfig {
    pub fn costs(&self) -> CostModel {
        CostModel::new(self.fee_bps, self.slippage_bps)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("artifacts")
}

impl RunConfig {
    /// Load from a TOML file, resolving relative paths against its directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    /// Parse and validate a TOML string. Paths are kept as written.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.rules.eps.is_finite() || self.rules.eps < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "rules.eps must be a non-negative number, got {}",
                self.rules.eps
            )));
        }
        strategy_by_name(&self.backtest.strategy)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.backtest
            .costs()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.data.daily);
        resolve(&mut self.data.instruments);
        if let Some(rules) = self.rules.path.as_mut() {
            resolve(rules);
        }
        resolve(&mut self.output.dir);
    }

    /// Content hash of the configuration (blake3 over its JSON form).
    pub fn run_id(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        blake3::hash(&json).to_hex().to_string()
    }
}

//! Serializable batch configuration.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use barback_core::engine::EngineConfig;
use barback_core::strategy::StrategyConfig;

/// Unique identifier for a batch run (content-addressable hash).
pub type RunId = String;

/// Configuration problems found before any run starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no runs configured")]
    NoRuns,

    #[error("duplicate run for symbol '{0}'")]
    DuplicateRun(String),

    #[error("start_date {start} is after end_date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("initial_cash must be positive (got {0})")]
    NonPositiveCash(f64),

    #[error("fixed_stake must be >= 1")]
    ZeroStake,

    #[error("commission_rate must be in [0, 1) (got {0})")]
    BadCommissionRate(f64),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

fn default_strategy() -> StrategyConfig {
    StrategyConfig::breakout_atr()
}

fn default_parallel() -> bool {
    true
}

/// One backtest to run: a symbol plus optional overrides of the
/// batch-level window and strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSpec {
    pub symbol: String,

    /// Inclusive window start; omit to use the batch-level default.
    #[serde(default)]
    pub start: Option<NaiveDate>,

    /// Inclusive window end; omit to use the batch-level default.
    #[serde(default)]
    pub end: Option<NaiveDate>,

    /// Strategy for this run only; omit to use the batch-level strategy.
    #[serde(default)]
    pub strategy: Option<StrategyConfig>,
}

impl RunSpec {
    pub fn for_symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            start: None,
            end: None,
            strategy: None,
        }
    }
}

/// Everything needed to reproduce a batch of runs.
///
/// Two batches with identical configs hash to the same [`RunId`], so
/// artifacts from re-runs land in the same directories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Backtests to run, in report order.
    pub runs: Vec<RunSpec>,

    /// Inclusive window start for runs that set none; omit to use each
    /// series from its first bar.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    /// Inclusive window end for runs that set none; omit to run each
    /// series to its last bar.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    #[serde(default = "default_strategy")]
    pub strategy: StrategyConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    /// Run symbols on the rayon pool instead of sequentially.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl BatchConfig {
    /// Default-engine config over a symbol list, no per-run overrides.
    pub fn for_symbols(symbols: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            runs: symbols.into_iter().map(RunSpec::for_symbol).collect(),
            start_date: None,
            end_date: None,
            strategy: default_strategy(),
            engine: EngineConfig::default(),
            parallel: default_parallel(),
        }
    }

    /// Effective [start, end] window for one run after batch defaults.
    pub fn window_for(&self, spec: &RunSpec) -> (Option<NaiveDate>, Option<NaiveDate>) {
        (spec.start.or(self.start_date), spec.end.or(self.end_date))
    }

    /// Effective strategy for one run after the batch default.
    pub fn strategy_for<'a>(&'a self, spec: &'a RunSpec) -> &'a StrategyConfig {
        spec.strategy.as_ref().unwrap_or(&self.strategy)
    }

    /// Load and validate a TOML config file.
    pub fn from_toml_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the config for problems worth refusing the whole batch over.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.runs.is_empty() {
            return Err(ConfigError::NoRuns);
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(ConfigError::InvalidDateRange { start, end });
            }
        }
        for (i, spec) in self.runs.iter().enumerate() {
            if let (Some(start), Some(end)) = self.window_for(spec) {
                if start > end {
                    return Err(ConfigError::InvalidDateRange { start, end });
                }
            }
            // Same symbol twice is fine (different windows or strategies);
            // a fully identical run would only duplicate a summary row.
            for earlier in &self.runs[..i] {
                if earlier.symbol == spec.symbol
                    && self.window_for(earlier) == self.window_for(spec)
                    && self.strategy_for(earlier) == self.strategy_for(spec)
                {
                    return Err(ConfigError::DuplicateRun(spec.symbol.clone()));
                }
            }
        }
        if !(self.engine.initial_cash.is_finite() && self.engine.initial_cash > 0.0) {
            return Err(ConfigError::NonPositiveCash(self.engine.initial_cash));
        }
        if self.engine.fixed_stake == 0 {
            return Err(ConfigError::ZeroStake);
        }
        if !(0.0..1.0).contains(&self.engine.commission_rate) {
            return Err(ConfigError::BadCommissionRate(self.engine.commission_rate));
        }
        Ok(())
    }

    /// Deterministic hash ID for this configuration.
    ///
    /// Two identical configs always produce the same ID, so re-runs can
    /// be matched to earlier artifacts.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("BatchConfig serialization failed");
        let hash = blake3::hash(json.as_bytes());
        format!("{}", hash.to_hex())
    }
}

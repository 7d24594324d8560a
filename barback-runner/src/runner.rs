//! Batch runner — one engine run per symbol, results in config order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use barback_core::analytics::BacktestResult;
use barback_core::data::{BarProvider, DataError};
use barback_core::domain::BarSeries;
use barback_core::engine::{run_backtest, EngineConfig, RunResult};
use barback_core::strategy::StrategyConfig;

use crate::config::{BatchConfig, ConfigError, RunId, RunSpec};

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Default schema version when deserializing older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Errors that abort a run outright. Inside a batch, missing or
/// malformed data for one symbol becomes a [`SkipRecord`] instead; only
/// an unreadable backing store ([`DataError::Source`]) aborts the batch.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// Complete result of one symbol's backtest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    /// Name of the strategy that produced this run.
    #[serde(default)]
    pub strategy: String,
    /// Aggregate metrics, ready for the summary report.
    pub result: BacktestResult,
    /// Full engine output: equity curve, trades, diagnostics.
    pub run: RunResult,
    pub duration_secs: f64,
}

/// A symbol the batch could not run, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkipRecord {
    pub symbol: String,
    pub reason: String,
}

/// One symbol's slot in a batch, in configured order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SymbolRecord {
    Completed(RunOutcome),
    Skipped(SkipRecord),
}

impl SymbolRecord {
    pub fn symbol(&self) -> &str {
        match self {
            SymbolRecord::Completed(outcome) => &outcome.result.symbol,
            SymbolRecord::Skipped(skip) => &skip.symbol,
        }
    }
}

/// All per-symbol records of a batch plus its identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub run_id: RunId,
    /// One record per configured symbol, in configuration order.
    pub records: Vec<SymbolRecord>,
}

impl BatchResult {
    pub fn completed(&self) -> impl Iterator<Item = &RunOutcome> {
        self.records.iter().filter_map(|r| match r {
            SymbolRecord::Completed(outcome) => Some(outcome),
            SymbolRecord::Skipped(_) => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = &SkipRecord> {
        self.records.iter().filter_map(|r| match r {
            SymbolRecord::Skipped(skip) => Some(skip),
            SymbolRecord::Completed(_) => None,
        })
    }
}

/// Run the whole batch.
///
/// Runs execute independently (in parallel when configured); missing or
/// malformed data on one symbol records a skip and the rest keep going,
/// while a source-level fault (backing store unreadable) aborts the
/// whole batch. Record order always matches `config.runs`, regardless
/// of which runs finish first.
pub fn run_batch(
    config: &BatchConfig,
    provider: &dyn BarProvider,
) -> Result<BatchResult, RunError> {
    config.validate()?;
    let run_id = config.run_id();
    tracing::info!(
        run_id = %run_id,
        runs = config.runs.len(),
        strategy = config.strategy.name(),
        parallel = config.parallel,
        "starting batch"
    );

    let records: Vec<SymbolRecord> = if config.parallel {
        config
            .runs
            .par_iter()
            .map(|spec| run_spec(spec, config, provider, &run_id))
            .collect::<Result<_, _>>()?
    } else {
        config
            .runs
            .iter()
            .map(|spec| run_spec(spec, config, provider, &run_id))
            .collect::<Result<_, _>>()?
    };

    let skips = records
        .iter()
        .filter(|r| matches!(r, SymbolRecord::Skipped(_)))
        .count();
    tracing::info!(
        run_id = %run_id,
        completed = records.len() - skips,
        skipped = skips,
        "batch finished"
    );

    Ok(BatchResult { run_id, records })
}

/// Run exactly one symbol, treating data problems as hard errors.
///
/// This is the single-run entry point for the CLI; batches route through
/// [`run_batch`] so per-symbol failures skip instead.
pub fn run_single(
    symbol: &str,
    config: &BatchConfig,
    provider: &dyn BarProvider,
) -> Result<RunOutcome, RunError> {
    config.validate()?;
    let run_id = config.run_id();
    let series = provider.fetch_bars(symbol, config.start_date, config.end_date)?;
    Ok(execute(&series, &config.strategy, &config.engine, &run_id))
}

fn run_spec(
    spec: &RunSpec,
    config: &BatchConfig,
    provider: &dyn BarProvider,
    run_id: &str,
) -> Result<SymbolRecord, RunError> {
    let (start, end) = config.window_for(spec);
    let series = match provider.fetch_bars(&spec.symbol, start, end) {
        Ok(series) => series,
        Err(err @ DataError::Source(_)) => {
            tracing::error!(
                symbol = %spec.symbol,
                error = %err,
                "data source failure, aborting batch"
            );
            return Err(err.into());
        }
        Err(err) => {
            tracing::warn!(symbol = %spec.symbol, error = %err, "skipping symbol");
            return Ok(SymbolRecord::Skipped(SkipRecord {
                symbol: spec.symbol.clone(),
                reason: err.to_string(),
            }));
        }
    };
    let strategy = config.strategy_for(spec);
    Ok(SymbolRecord::Completed(execute(&series, strategy, &config.engine, run_id)))
}

fn execute(
    series: &BarSeries,
    strategy_config: &StrategyConfig,
    engine: &EngineConfig,
    run_id: &str,
) -> RunOutcome {
    let started = std::time::Instant::now();
    let mut strategy = strategy_config.build();
    let run = run_backtest(series, strategy.as_mut(), engine);
    let result = BacktestResult::compute(series, &run);
    let duration_secs = started.elapsed().as_secs_f64();

    tracing::info!(
        symbol = %run.symbol,
        final_equity = run.final_equity,
        trades = run.trades.len(),
        sharpe = result.sharpe_ratio,
        "run complete"
    );

    RunOutcome {
        schema_version: SCHEMA_VERSION,
        run_id: run_id.to_string(),
        strategy: strategy_config.name().to_string(),
        result,
        run,
        duration_secs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barback_core::data::{InMemoryProvider, SyntheticProvider};
    use chrono::NaiveDate;

    fn synthetic() -> SyntheticProvider {
        SyntheticProvider::new(42, NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(), 120)
    }

    #[test]
    fn batch_preserves_symbol_order() {
        let config = BatchConfig::for_symbols(["C", "A", "B"]);
        let batch = run_batch(&config, &synthetic()).unwrap();

        let order: Vec<&str> = batch.records.iter().map(|r| r.symbol()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let mut config = BatchConfig::for_symbols(["SPY", "QQQ", "IWM"]);
        let provider = synthetic();

        config.parallel = true;
        let parallel = run_batch(&config, &provider).unwrap();
        config.parallel = false;
        let sequential = run_batch(&config, &provider).unwrap();

        // parallel flag participates in the run_id; results must not.
        for (a, b) in parallel.records.iter().zip(&sequential.records) {
            match (a, b) {
                (SymbolRecord::Completed(x), SymbolRecord::Completed(y)) => {
                    assert_eq!(x.result.final_portfolio_value, y.result.final_portfolio_value);
                    assert_eq!(x.run.trades, y.run.trades);
                }
                _ => panic!("expected completed records"),
            }
        }
    }

    #[test]
    fn missing_symbol_becomes_skip_and_batch_continues() {
        let provider = InMemoryProvider::with_series([synthetic().load("GOOD").unwrap()]);
        let config = BatchConfig::for_symbols(["MISSING", "GOOD"]);
        let batch = run_batch(&config, &provider).unwrap();

        assert_eq!(batch.records.len(), 2);
        assert!(matches!(&batch.records[0], SymbolRecord::Skipped(s) if s.symbol == "MISSING"));
        assert!(matches!(&batch.records[1], SymbolRecord::Completed(_)));
        assert_eq!(batch.skipped().count(), 1);
        assert_eq!(batch.completed().count(), 1);
    }

    #[test]
    fn date_window_trims_series() {
        let provider = synthetic();
        let full = provider.load("SPY").unwrap();

        let mut config = BatchConfig::for_symbols(["SPY"]);
        config.start_date = Some(full.bars()[10].date);
        config.end_date = Some(full.bars()[50].date);

        let outcome = run_single("SPY", &config, &provider).unwrap();
        assert_eq!(outcome.run.bar_count, 41);
        assert_eq!(outcome.result.start, full.bars()[10].date);
        assert_eq!(outcome.result.end, full.bars()[50].date);
    }

    #[test]
    fn per_run_overrides_beat_batch_defaults() {
        let provider = synthetic();
        let full = provider.load("SPY").unwrap();

        let mut config = BatchConfig::for_symbols(["SPY", "SPY"]);
        config.start_date = Some(full.bars()[0].date);
        config.end_date = Some(full.bars()[40].date);
        config.runs[1].start = Some(full.bars()[60].date);
        config.runs[1].end = Some(full.bars()[100].date);
        config.runs[1].strategy = Some(StrategyConfig::ma_rsi());

        let batch = run_batch(&config, &provider).unwrap();
        let outcomes: Vec<&RunOutcome> = batch.completed().collect();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].result.start, full.bars()[0].date);
        assert_eq!(outcomes[0].result.end, full.bars()[40].date);
        assert_eq!(outcomes[1].result.start, full.bars()[60].date);
        assert_eq!(outcomes[1].result.end, full.bars()[100].date);
        assert_eq!(outcomes[0].strategy, "breakout_atr");
        assert_eq!(outcomes[1].strategy, "ma_rsi");
    }

    #[test]
    fn window_with_no_bars_is_an_error_for_single_runs() {
        let provider = synthetic();
        let mut config = BatchConfig::for_symbols(["SPY"]);
        // Far in the past: no synthetic bars fall inside.
        config.start_date = NaiveDate::from_ymd_opt(1990, 1, 1);
        config.end_date = NaiveDate::from_ymd_opt(1990, 12, 31);

        assert!(matches!(
            run_single("SPY", &config, &provider),
            Err(RunError::Data(DataError::Unavailable { .. }))
        ));
    }

    #[test]
    fn source_fault_aborts_the_whole_batch() {
        struct BrokenProvider;

        impl BarProvider for BrokenProvider {
            fn name(&self) -> &str {
                "broken"
            }
            fn load(&self, _symbol: &str) -> Result<BarSeries, DataError> {
                Err(DataError::Source("backing store unreadable".to_string()))
            }
        }

        let config = BatchConfig::for_symbols(["A", "B"]);
        assert!(matches!(
            run_batch(&config, &BrokenProvider),
            Err(RunError::Data(DataError::Source(_)))
        ));
    }

    #[test]
    fn run_single_fails_hard_on_missing_data() {
        let provider = InMemoryProvider::new();
        let config = BatchConfig::for_symbols(["GHOST"]);
        assert!(matches!(
            run_single("GHOST", &config, &provider),
            Err(RunError::Data(DataError::Unavailable { .. }))
        ));
    }

    #[test]
    fn outcomes_carry_batch_run_id_and_schema() {
        let config = BatchConfig::for_symbols(["SPY"]);
        let batch = run_batch(&config, &synthetic()).unwrap();

        let outcome = batch.completed().next().unwrap();
        assert_eq!(outcome.run_id, batch.run_id);
        assert_eq!(outcome.schema_version, SCHEMA_VERSION);
    }
}

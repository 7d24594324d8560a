//! Barback CLI — single-run and batch backtest commands.
//!
//! Commands:
//! - `run` — backtest one symbol with a selected strategy, print the result
//!   summary, and save run artifacts
//! - `batch` — execute every symbol in a TOML config, print the summary
//!   table, and write `backtest_summary.csv`
//!
//! Bars come from a CSV directory (`--data`) or, when that flag is omitted,
//! from the seeded synthetic source so both commands work without any local
//! market data.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use barback_core::data::{BarProvider, CsvBarProvider, SyntheticProvider};
use barback_core::engine::EngineConfig;
use barback_core::strategy::StrategyConfig;
use barback_runner::runner::{run_batch, run_single, RunOutcome};
use barback_runner::{render_summary_table, save_artifacts, write_summary_csv, BatchConfig};

#[derive(Parser)]
#[command(name = "barback", about = "Barback — bar-by-bar backtesting engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest a single symbol and print the result summary.
    Run {
        /// Symbol to run (e.g., SPY).
        symbol: String,

        /// Strategy selector: moving-average-rsi or breakout-atr.
        #[arg(long, default_value = "breakout-atr")]
        strategy: String,

        /// Start date (YYYY-MM-DD). Defaults to the first available bar.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to the last available bar.
        #[arg(long)]
        end: Option<String>,

        /// Directory of SYMBOL.csv bar files. Omit to use synthetic data.
        #[arg(long)]
        data: Option<PathBuf>,

        /// Master seed for the synthetic source (ignored with --data).
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Bars of synthetic history to generate (ignored with --data).
        #[arg(long, default_value_t = 756)]
        bars: usize,

        /// Starting cash.
        #[arg(long, default_value_t = 10_000.0)]
        cash: f64,

        /// Shares per trade.
        #[arg(long, default_value_t = 10)]
        stake: u32,

        /// Commission rate per leg (0.001 = 10 bps).
        #[arg(long, default_value_t = 0.001)]
        commission: f64,

        /// Output directory for run artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Execute a batch of runs from a TOML config file.
    Batch {
        /// Path to the batch TOML config.
        config: PathBuf,

        /// Directory of SYMBOL.csv bar files. Omit to use synthetic data.
        #[arg(long)]
        data: Option<PathBuf>,

        /// Master seed for the synthetic source (ignored with --data).
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Bars of synthetic history to generate (ignored with --data).
        #[arg(long, default_value_t = 756)]
        bars: usize,

        /// Output directory for the summary CSV and artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Also save per-run artifact directories for completed symbols.
        #[arg(long, default_value_t = false)]
        artifacts: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "barback_cli=info,barback_runner=info,barback_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            symbol,
            strategy,
            start,
            end,
            data,
            seed,
            bars,
            cash,
            stake,
            commission,
            output_dir,
        } => run_cmd(
            symbol, strategy, start, end, data, seed, bars, cash, stake, commission, output_dir,
        ),
        Commands::Batch {
            config,
            data,
            seed,
            bars,
            output_dir,
            artifacts,
        } => batch_cmd(config, data, seed, bars, output_dir, artifacts),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_cmd(
    symbol: String,
    strategy: String,
    start: Option<String>,
    end: Option<String>,
    data: Option<PathBuf>,
    seed: u64,
    bars: usize,
    cash: f64,
    stake: u32,
    commission: f64,
    output_dir: PathBuf,
) -> Result<()> {
    let start = start
        .as_deref()
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("Invalid --start date, expected YYYY-MM-DD")?;
    let end = end
        .as_deref()
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("Invalid --end date, expected YYYY-MM-DD")?;

    let mut config = BatchConfig::for_symbols([symbol.as_str()]);
    config.start_date = start;
    config.end_date = end;
    config.strategy = StrategyConfig::from_selector(&strategy);
    config.engine = EngineConfig {
        initial_cash: cash,
        fixed_stake: stake,
        commission_rate: commission,
    };

    let provider = build_provider(data, seed, synthetic_start(start), bars);
    info!(
        symbol = %symbol,
        strategy = config.strategy.name(),
        provider = provider.name(),
        "starting run"
    );
    let outcome = run_single(&symbol, &config, provider.as_ref())?;

    print_summary(&outcome);

    let paths = save_artifacts(&output_dir, &outcome)?;
    println!("Artifacts saved to: {}", paths.run_dir.display());

    Ok(())
}

fn batch_cmd(
    config_path: PathBuf,
    data: Option<PathBuf>,
    seed: u64,
    bars: usize,
    output_dir: PathBuf,
    artifacts: bool,
) -> Result<()> {
    let config = BatchConfig::from_toml_path(&config_path)
        .with_context(|| format!("Failed to load batch config {}", config_path.display()))?;

    let provider = build_provider(data, seed, synthetic_start(config.start_date), bars);
    info!(
        config = %config_path.display(),
        provider = provider.name(),
        "starting batch"
    );
    let batch = run_batch(&config, provider.as_ref())?;

    println!();
    print!("{}", render_summary_table(&batch));

    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;
    let summary_path = output_dir.join("backtest_summary.csv");
    write_summary_csv(&summary_path, &batch)?;
    println!();
    println!("Summary written to: {}", summary_path.display());

    if artifacts {
        for outcome in batch.completed() {
            let paths = save_artifacts(&output_dir, outcome)?;
            println!("Artifacts saved to: {}", paths.run_dir.display());
        }
    }

    Ok(())
}

/// First bar date for generated data when no explicit start is given.
fn synthetic_start(start: Option<NaiveDate>) -> NaiveDate {
    start.unwrap_or_else(|| NaiveDate::from_ymd_opt(2020, 1, 2).unwrap())
}

fn build_provider(
    data: Option<PathBuf>,
    seed: u64,
    start: NaiveDate,
    bars: usize,
) -> Box<dyn BarProvider> {
    match data {
        Some(dir) => Box::new(CsvBarProvider::new(dir)),
        None => Box::new(SyntheticProvider::new(seed, start, bars)),
    }
}

fn print_summary(outcome: &RunOutcome) {
    let r = &outcome.result;
    println!();
    println!("=== Backtest Result ===");
    println!("Symbol:                   {}", r.symbol);
    println!("Period:                   {} to {}", r.start, r.end);
    println!("Bars:                     {}", outcome.run.bar_count);
    println!("Trades:                   {}", r.trade_count);
    println!();
    println!("--- Performance ---");
    println!(
        "Starting Portfolio Value: {:.2}",
        outcome.run.initial_cash
    );
    println!("Final Portfolio Value:    {:.2}", r.final_portfolio_value);
    println!("Buy & Hold Value:         {:.2}", r.buy_and_hold_value);
    println!("Total Return:             {:.2}%", r.total_return * 100.0);
    println!("Sharpe Ratio:             {:.3}", r.sharpe_ratio);
    println!("Max Drawdown:             {:.2}%", r.max_drawdown * 100.0);
    println!("Win Rate:                 {:.1}%", r.win_rate * 100.0);
    if let Some(position) = &outcome.run.final_position {
        println!();
        println!(
            "NOTE: position still open at the last bar ({:?} {} @ {:.2})",
            position.side, position.size, position.entry_price
        );
    }
    println!();
}

//! Integration tests for the batch pipeline.
//!
//! These run the whole chain the CLI uses: a TOML config file and a
//! directory of CSV bar files in, per-symbol records, a summary CSV,
//! and per-run artifact directories out.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use barback_core::data::CsvBarProvider;
use barback_runner::runner::{run_batch, run_single, SymbolRecord, SCHEMA_VERSION};
use barback_runner::{load_manifest, save_artifacts, write_summary_csv, BatchConfig, ConfigError};

/// Write `{symbol}.csv` with `bar_count` daily bars starting 2023-01-02.
///
/// Closes follow a slow sinusoid around 100 with an uptrend, so both
/// built-in strategies see crossable signals without any bar tripping
/// sanity validation.
fn write_bars_csv(dir: &Path, symbol: &str, bar_count: usize) {
    let mut file = std::fs::File::create(dir.join(format!("{symbol}.csv"))).unwrap();
    writeln!(file, "date,open,high,low,close,volume").unwrap();

    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let mut prev_close = 100.0_f64;
    for i in 0..bar_count {
        let date = start + chrono::Duration::days(i as i64);
        let close = 100.0 + (i as f64 * 0.22).sin() * 8.0 + i as f64 * 0.05;
        let open = prev_close;
        let high = open.max(close) + 0.5;
        let low = open.min(close) - 0.5;
        writeln!(
            file,
            "{date},{open:.2},{high:.2},{low:.2},{close:.2},1000000"
        )
        .unwrap();
        prev_close = close;
    }
}

fn write_config(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("batch.toml");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn csv_pipeline_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    write_bars_csv(dir.path(), "GOOD", 200);
    // No OTHER.csv on disk: that symbol must skip, not abort the batch.
    let config_path = write_config(
        dir.path(),
        r#"
            start_date = "2023-02-01"
            end_date = "2023-06-30"
            parallel = false

            [[runs]]
            symbol = "GOOD"

            [[runs]]
            symbol = "OTHER"

            [strategy]
            type = "MA_RSI"

            [engine]
            initial_cash = 10000.0
            fixed_stake = 10
            commission_rate = 0.001
        "#,
    );

    let config = BatchConfig::from_toml_path(&config_path).unwrap();
    let provider = CsvBarProvider::new(dir.path());
    let batch = run_batch(&config, &provider).unwrap();

    // Records in config order, skip included.
    assert_eq!(batch.records.len(), 2);
    let outcome = match &batch.records[0] {
        SymbolRecord::Completed(outcome) => outcome,
        other => panic!("GOOD should complete, got {other:?}"),
    };
    match &batch.records[1] {
        SymbolRecord::Skipped(skip) => {
            assert_eq!(skip.symbol, "OTHER");
            assert!(
                skip.reason.contains("no data available"),
                "skip reason should name the data problem: {}",
                skip.reason
            );
        }
        other => panic!("OTHER should skip, got {other:?}"),
    }

    // Strategy choice from the TOML reaches the outcome.
    assert_eq!(outcome.strategy, "ma_rsi");

    // The date window trimmed the series.
    let window_start = NaiveDate::from_ymd_opt(2023, 2, 1).unwrap();
    let window_end = NaiveDate::from_ymd_opt(2023, 6, 30).unwrap();
    assert!(outcome.result.start >= window_start);
    assert!(outcome.result.end <= window_end);
    assert!(outcome.run.bar_count < 200, "window should drop bars");

    // Summary CSV: header plus one row per configured symbol.
    let summary_path = dir.path().join("backtest_summary.csv");
    write_summary_csv(&summary_path, &batch).unwrap();
    let text = std::fs::read_to_string(&summary_path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "stock,start,end,final_portfolio_value,buy_and_hold_value,sharpe_ratio,max_drawdown,status"
    );
    assert!(lines[1].starts_with("GOOD,"));
    assert!(lines[1].ends_with(",ok"));
    assert!(lines[2].starts_with("OTHER,,,,,,,"));
    assert!(lines[2].contains("no data available"));
}

#[test]
fn rerun_of_same_config_is_identical() {
    let dir = tempfile::tempdir().unwrap();
    write_bars_csv(dir.path(), "ACME", 150);

    let config = BatchConfig::for_symbols(["ACME"]);
    let provider = CsvBarProvider::new(dir.path());

    let first = run_batch(&config, &provider).unwrap();
    let second = run_batch(&config, &provider).unwrap();

    assert_eq!(first.run_id, second.run_id);
    let (a, b) = match (&first.records[0], &second.records[0]) {
        (SymbolRecord::Completed(a), SymbolRecord::Completed(b)) => (a, b),
        other => panic!("both runs should complete: {other:?}"),
    };

    // Everything except wall-clock duration must match bit for bit.
    assert_eq!(a.run.equity_curve, b.run.equity_curve);
    assert_eq!(a.run.trades, b.run.trades);
    assert_eq!(a.run.final_equity, b.run.final_equity);
    assert_eq!(
        serde_json::to_string(&a.result).unwrap(),
        serde_json::to_string(&b.result).unwrap()
    );
}

#[test]
fn artifact_round_trip_preserves_identity() {
    let dir = tempfile::tempdir().unwrap();
    write_bars_csv(dir.path(), "SPY", 120);

    let config = BatchConfig::for_symbols(["SPY"]);
    let provider = CsvBarProvider::new(dir.path());
    let outcome = run_single("SPY", &config, &provider).unwrap();

    let out_dir = dir.path().join("results");
    let paths = save_artifacts(&out_dir, &outcome).unwrap();
    assert!(paths.manifest.exists());
    assert!(paths.equity_csv.exists());
    assert!(paths.trades_csv.exists());
    assert!(paths.diagnostics_json.exists());

    let manifest = load_manifest(&paths.manifest).unwrap();
    assert_eq!(manifest.schema_version, SCHEMA_VERSION);
    assert_eq!(manifest.run_id, outcome.run_id);
    assert_eq!(manifest.symbol, "SPY");
    assert_eq!(manifest.strategy, outcome.strategy);
    assert_eq!(
        manifest.stats.final_portfolio_value,
        outcome.result.final_portfolio_value
    );
}

#[test]
fn invalid_config_files_are_refused() {
    let dir = tempfile::tempdir().unwrap();

    let empty = write_config(dir.path(), "runs = []\n");
    assert!(matches!(
        BatchConfig::from_toml_path(&empty),
        Err(ConfigError::NoRuns)
    ));

    let inverted = dir.path().join("inverted.toml");
    std::fs::write(
        &inverted,
        "start_date = \"2024-06-01\"\nend_date = \"2024-01-01\"\n\n[[runs]]\nsymbol = \"SPY\"\n",
    )
    .unwrap();
    assert!(matches!(
        BatchConfig::from_toml_path(&inverted),
        Err(ConfigError::InvalidDateRange { .. })
    ));

    let garbage = dir.path().join("garbage.toml");
    std::fs::write(&garbage, "this is not toml {{{").unwrap();
    assert!(matches!(
        BatchConfig::from_toml_path(&garbage),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn default_strategy_applies_when_toml_omits_it() {
    let dir = tempfile::tempdir().unwrap();
    write_bars_csv(dir.path(), "QQQ", 120);
    let config_path = write_config(dir.path(), "[[runs]]\nsymbol = \"QQQ\"\n");

    let config = BatchConfig::from_toml_path(&config_path).unwrap();
    let provider = CsvBarProvider::new(dir.path());
    let outcome = run_single("QQQ", &config, &provider).unwrap();

    assert_eq!(outcome.strategy, "breakout_atr");
    assert_eq!(outcome.run.bar_count, 120);
}

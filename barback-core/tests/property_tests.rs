//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. Equity accounting — one equity point per bar, dates strictly ordered,
//!    and the cash ledger implied by the trade tape never goes negative
//! 2. Sizing — every fill is for exactly the fixed stake
//! 3. Determinism — identical inputs produce bit-identical runs
//! 4. No look-ahead — a prefix run reproduces the prefix of the full run
//! 5. Analytics bounds — zero-variance Sharpe is 0, drawdown in [-1, 0],
//!    RSI in [0, 100]

use proptest::prelude::*;

use barback_core::analytics::{self, BacktestResult};
use barback_core::domain::{Bar, BarSeries};
use barback_core::engine::{run_backtest, EngineConfig, RunResult};
use barback_core::indicators::{Indicator, Rsi};
use barback_core::strategy::MaRsiStrategy;

// ── Strategies (proptest) ────────────────────────────────────────────

/// Cent-rounded closes, cheap enough that a 10-share stake always fits
/// in the default cash, so runs differ only by strategy decisions.
fn arb_closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(20.0..180.0_f64, 5..120)
        .prop_map(|closes| closes.iter().map(|c| (c * 100.0).round() / 100.0).collect())
}

fn series_from_closes(closes: &[f64]) -> BarSeries {
    let base = chrono::NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    let bars: Vec<Bar> = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 0.5,
                low: open.min(close) - 0.5,
                close,
                volume: 1_000_000,
            }
        })
        .collect();
    BarSeries::new("PROP".to_string(), bars).unwrap()
}

fn config() -> EngineConfig {
    EngineConfig {
        initial_cash: 10_000.0,
        fixed_stake: 10,
        commission_rate: 0.001,
    }
}

/// Short-period crossover so trades occur within small generated series.
fn run_ma_rsi(series: &BarSeries) -> RunResult {
    let mut strategy = MaRsiStrategy::new(3, 6, 3);
    run_backtest(series, &mut strategy, &config())
}

// ── 1. Equity Accounting ─────────────────────────────────────────────

proptest! {
    /// The engine emits exactly one equity point per bar, in date order.
    #[test]
    fn one_equity_point_per_bar(closes in arb_closes()) {
        let series = series_from_closes(&closes);
        let run = run_ma_rsi(&series);

        prop_assert_eq!(run.equity_curve.len(), closes.len());
        prop_assert_eq!(run.bar_count, closes.len());
        for pair in run.equity_curve.windows(2) {
            prop_assert!(pair[0].date < pair[1].date, "equity dates out of order");
        }
        for point in &run.equity_curve {
            prop_assert!(point.equity.is_finite(), "equity became non-finite");
        }
    }

    /// Replaying the trade tape leg by leg never drives cash below zero,
    /// and the replayed cash matches final equity minus mark-to-market.
    #[test]
    fn cash_ledger_never_negative(closes in arb_closes()) {
        let series = series_from_closes(&closes);
        let run = run_ma_rsi(&series);

        let mut cash = 10_000.0;
        for trade in &run.trades {
            cash -= trade.entry_price * 10.0 * 1.001;
            prop_assert!(cash >= -1e-9, "cash negative after entry: {cash}");
            cash += trade.exit_price * 10.0 * 0.999;
        }
        if let Some(position) = &run.final_position {
            cash -= position.entry_price * 10.0 * 1.001;
            prop_assert!(cash >= -1e-9, "cash negative after open entry: {cash}");
        }

        let mark = run
            .final_position
            .as_ref()
            .map_or(0.0, |p| 10.0 * p.side.sign() * closes[closes.len() - 1]);
        prop_assert!(
            (cash - (run.final_equity - mark)).abs() < 1e-6,
            "ledger cash {cash} disagrees with final equity {}",
            run.final_equity
        );
    }
}

// ── 2. Sizing ────────────────────────────────────────────────────────

proptest! {
    /// Fills are all-or-nothing at the fixed stake; no partial sizes.
    #[test]
    fn position_size_is_stake_or_nothing(closes in arb_closes()) {
        let series = series_from_closes(&closes);
        let run = run_ma_rsi(&series);

        for trade in &run.trades {
            prop_assert_eq!(trade.size, 10, "trade size must equal the stake");
        }
        if let Some(position) = &run.final_position {
            prop_assert_eq!(position.size, 10, "open size must equal the stake");
        }
    }
}

// ── 3. Determinism ───────────────────────────────────────────────────

proptest! {
    /// Same series, same config, fresh strategy: bit-identical results.
    #[test]
    fn identical_runs_are_identical(closes in arb_closes()) {
        let series = series_from_closes(&closes);
        let first = run_ma_rsi(&series);
        let second = run_ma_rsi(&series);

        prop_assert_eq!(&first.equity_curve, &second.equity_curve);
        prop_assert_eq!(&first.trades, &second.trades);
        prop_assert_eq!(&first.final_position, &second.final_position);
        prop_assert_eq!(first.final_equity, second.final_equity);

        let result_a = BacktestResult::compute(&series, &first);
        let result_b = BacktestResult::compute(&series, &second);
        prop_assert_eq!(
            serde_json::to_string(&result_a).unwrap(),
            serde_json::to_string(&result_b).unwrap()
        );
    }
}

// ── 4. No Look-Ahead ─────────────────────────────────────────────────

proptest! {
    /// Running on a prefix of the series reproduces the prefix of the
    /// full run's equity curve exactly: later bars never leak backward.
    #[test]
    fn prefix_run_reproduces_prefix(closes in arb_closes(), cut in 0.2..0.95_f64) {
        let k = ((closes.len() as f64) * cut).floor().max(1.0) as usize;
        let full = run_ma_rsi(&series_from_closes(&closes));
        let prefix = run_ma_rsi(&series_from_closes(&closes[..k]));

        prop_assert_eq!(&prefix.equity_curve[..], &full.equity_curve[..k]);
    }
}

// ── 5. Analytics Bounds ──────────────────────────────────────────────

proptest! {
    /// A flat equity curve has zero variance, so Sharpe is exactly 0.
    #[test]
    fn zero_variance_sharpe_is_zero(value in 50.0..150.0_f64, n in 2..60usize) {
        let curve = vec![value; n];
        prop_assert_eq!(analytics::sharpe_ratio(&curve), 0.0);
    }

    /// Max drawdown is a fraction of peak equity, so it lives in [-1, 0].
    #[test]
    fn drawdown_stays_in_bounds(curve in prop::collection::vec(1.0..100_000.0_f64, 2..200)) {
        let dd = analytics::max_drawdown(&curve);
        prop_assert!((-1.0..=0.0).contains(&dd), "drawdown {dd} out of range");
    }

    /// RSI is a normalized oscillator; any close sequence stays in [0, 100].
    #[test]
    fn rsi_stays_in_bounds(closes in arb_closes()) {
        let series = series_from_closes(&closes);
        let mut rsi = Rsi::new(5);
        for bar in series.bars() {
            rsi.update(bar);
            if let Some(value) = rsi.value() {
                prop_assert!(
                    (0.0..=100.0).contains(&value),
                    "RSI {value} escaped [0, 100]"
                );
            }
        }
    }
}

//! Performance metrics — pure functions that compute run statistics.
//!
//! Every metric is a pure function: equity curve and/or trade list in,
//! scalar out. No dependencies on the engine loop or the data layer, so
//! each can be tested against hand-computed values.

use serde::{Deserialize, Serialize};

use crate::domain::{BarSeries, TradeRecord};
use crate::engine::RunResult;

/// Annualization basis for daily bars.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Aggregate statistics for a single backtest run.
///
/// Field names mirror the batch summary columns, so a result row
/// serializes straight into the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub symbol: String,
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
    pub final_portfolio_value: f64,
    pub buy_and_hold_value: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub total_return: f64,
    pub trade_count: usize,
    pub win_rate: f64,
}

impl BacktestResult {
    /// Compute all metrics for a finished run over `series`.
    pub fn compute(series: &BarSeries, run: &RunResult) -> Self {
        let equity: Vec<f64> = run.equity_curve.iter().map(|p| p.equity).collect();
        Self {
            symbol: run.symbol.clone(),
            start: series.start_date(),
            end: series.end_date(),
            final_portfolio_value: run.final_equity,
            buy_and_hold_value: buy_and_hold_value(series, run.initial_cash),
            sharpe_ratio: sharpe_ratio(&equity),
            max_drawdown: max_drawdown(&equity),
            total_return: total_return(&equity),
            trade_count: run.trades.len(),
            win_rate: win_rate(&run.trades),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Total return as a fraction: (final - initial) / initial.
pub fn total_return(equity_curve: &[f64]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }
    let initial = equity_curve[0];
    let final_eq = equity_curve[equity_curve.len() - 1];
    if initial <= 0.0 {
        return 0.0;
    }
    (final_eq - initial) / initial
}

/// Annualized Sharpe ratio from daily equity returns.
///
/// Sharpe = mean(daily returns) / std(daily returns) * sqrt(252).
/// Returns 0.0 if variance is zero or fewer than 2 returns.
pub fn sharpe_ratio(equity_curve: &[f64]) -> f64 {
    let returns = daily_returns(equity_curve);
    if returns.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(&returns);
    let std = std_dev(&returns);
    if std < 1e-15 {
        return 0.0;
    }
    (mean / std) * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Maximum drawdown as a negative fraction (e.g., -0.15 = 15% drawdown).
///
/// Returns 0.0 if equity is constant or monotonically increasing. The
/// result always lies in [-1.0, 0.0] for non-negative equity curves.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }
    let mut peak = equity_curve[0];
    let mut max_dd = 0.0_f64;

    for &eq in equity_curve {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            let dd = (eq - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Win rate: fraction of trades with positive net PnL.
pub fn win_rate(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

/// Whole-share buy-and-hold baseline.
///
/// Buys as many whole shares as the initial cash covers at the first
/// close (no commission), keeps the remainder as cash, and marks the lot
/// at the last close.
pub fn buy_and_hold_value(series: &BarSeries, initial_cash: f64) -> f64 {
    let first_close = series.first_close();
    if first_close <= 0.0 {
        return initial_cash;
    }
    let shares = (initial_cash / first_close).floor();
    let cash_left = initial_cash - shares * first_close;
    cash_left + shares * series.last_close()
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Daily returns from an equity curve. A non-positive previous value
/// yields a 0.0 return rather than a division blowup.
pub fn daily_returns(equity_curve: &[f64]) -> Vec<f64> {
    if equity_curve.len() < 2 {
        return Vec::new();
    }
    equity_curve
        .windows(2)
        .map(|w| {
            if w[0] > 0.0 {
                (w[1] - w[0]) / w[0]
            } else {
                0.0
            }
        })
        .collect()
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

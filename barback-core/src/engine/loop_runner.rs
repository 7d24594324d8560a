//! Bar-by-bar event loop — the heart of the engine.
//!
//! Four phases per bar:
//! 1. Observe: fold the bar into the strategy's indicators
//! 2. Decide: let the strategy emit at most one intent
//! 3. Submit & fill: validate the intent, fill pending orders at the close
//! 4. Mark-to-market: record cash plus signed position value as equity

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{BarSeries, OpenPosition, Symbol, TradeRecord};
use crate::engine::account::Account;
use crate::engine::manager::{OrderManager, RejectedIntent, SkippedEntry};
use crate::strategy::{DecisionContext, Strategy};

fn default_initial_cash() -> f64 {
    10_000.0
}

fn default_fixed_stake() -> u32 {
    10
}

fn default_commission_rate() -> f64 {
    0.001
}

/// Broker parameters for a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_initial_cash")]
    pub initial_cash: f64,
    /// Shares per entry; every fill uses this fixed size.
    #[serde(default = "default_fixed_stake")]
    pub fixed_stake: u32,
    /// Fraction of notional charged on every buy and sell leg.
    #[serde(default = "default_commission_rate")]
    pub commission_rate: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_cash: default_initial_cash(),
            fixed_stake: default_fixed_stake(),
            commission_rate: default_commission_rate(),
        }
    }
}

/// Equity marked at one bar's close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

/// Everything a single backtest run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub symbol: Symbol,
    pub initial_cash: f64,
    /// Equity at the final bar's close.
    pub final_equity: f64,
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<TradeRecord>,
    pub rejected_intents: Vec<RejectedIntent>,
    pub skipped_entries: Vec<SkippedEntry>,
    /// Position still open at the final bar, marked but never force-closed.
    pub final_position: Option<OpenPosition>,
    pub commission_paid: f64,
    pub bar_count: usize,
}

/// Run one strategy over one series.
///
/// The loop is a single pass: every bar is observed exactly once, intents
/// fill at the close of the bar that produced them, and equity is marked
/// after fills settle. A position open at the last bar stays open and is
/// reported in `final_position`.
pub fn run_backtest(
    series: &BarSeries,
    strategy: &mut dyn Strategy,
    config: &EngineConfig,
) -> RunResult {
    assert!(config.fixed_stake >= 1, "fixed_stake must be >= 1");

    let mut account = Account::new(config.initial_cash, config.commission_rate);
    let mut manager = OrderManager::new();
    let mut equity_curve = Vec::with_capacity(series.len());

    for (bar_index, bar) in series.bars().iter().enumerate() {
        // ─── Phase 1: Observe ───
        strategy.observe(bar);

        // ─── Phase 2: Decide ───
        let intent = {
            let ctx = DecisionContext {
                bar_index,
                bar,
                position: manager.position(),
                order_pending: manager.order_pending(),
            };
            strategy.decide(&ctx)
        };

        // ─── Phase 3: Submit & fill ───
        if let Some(intent) = intent {
            manager.submit(intent, bar_index);
        }
        manager.resolve(bar_index, bar, &mut account, config.fixed_stake);

        // ─── Phase 4: Mark-to-market ───
        equity_curve.push(EquityPoint {
            date: bar.date,
            equity: account.equity(manager.position(), bar.close),
        });
    }

    let final_equity = equity_curve
        .last()
        .map_or(config.initial_cash, |point| point.equity);
    let report = manager.finish();

    tracing::debug!(
        symbol = series.symbol(),
        strategy = strategy.name(),
        bars = series.len(),
        trades = report.trades.len(),
        final_equity,
        "backtest run complete"
    );

    RunResult {
        symbol: series.symbol().to_string(),
        initial_cash: config.initial_cash,
        final_equity,
        equity_curve,
        trades: report.trades,
        rejected_intents: report.rejected_intents,
        skipped_entries: report.skipped_entries,
        final_position: report.final_position,
        commission_paid: account.commission_paid(),
        bar_count: series.len(),
    }
}

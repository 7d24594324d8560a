//! Trading strategies — observe bars, emit order intents.
//!
//! A strategy is a small state machine fed one bar at a time. `observe`
//! folds the bar into the strategy's indicators; `decide` then reads the
//! indicator values plus the account's position snapshot and may emit a
//! single [`OrderIntent`]. Strategies never touch cash or fills: sizing
//! and affordability belong to the engine.

pub mod breakout_atr;
pub mod ma_rsi;

pub use breakout_atr::BreakoutAtrStrategy;
pub use ma_rsi::MaRsiStrategy;

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, OpenPosition, OrderIntent};

/// Read-only snapshot handed to [`Strategy::decide`] each bar.
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    /// Index of the current bar in the series.
    pub bar_index: usize,
    /// The bar just observed.
    pub bar: &'a Bar,
    /// Open position, if any.
    pub position: Option<&'a OpenPosition>,
    /// True while an unresolved order sits with the order manager.
    pub order_pending: bool,
}

/// Trait for bar-by-bar strategies.
///
/// # Architecture invariant
/// `decide` must base its output only on bars already passed to `observe`
/// and on the provided context. It receives no cash balance and no future
/// bars, so a decision can never depend on data the strategy could not
/// have seen at that bar's close.
pub trait Strategy: Send {
    /// Stable identifier (e.g., "breakout_atr"). Used in logs and reports.
    fn name(&self) -> &'static str;

    /// Bars that must be observed before `decide` can emit an intent.
    fn warmup_bars(&self) -> usize;

    /// Fold the next bar into indicator state. Called once per bar, in order.
    fn observe(&mut self, bar: &Bar);

    /// Emit at most one intent for the bar just observed.
    fn decide(&self, ctx: &DecisionContext) -> Option<OrderIntent>;
}

// ─── Strategy configuration ───

fn default_fast_period() -> usize {
    10
}

fn default_slow_period() -> usize {
    30
}

fn default_rsi_period() -> usize {
    14
}

fn default_channel_period() -> usize {
    20
}

fn default_atr_period() -> usize {
    14
}

fn default_risk_mult() -> f64 {
    2.0
}

fn default_reward_mult() -> f64 {
    3.0
}

/// Declarative strategy selection with parameters.
///
/// Serializes with a `type` tag so run configs stay readable:
/// `{ "type": "BREAKOUT_ATR", "channel_period": 20, ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyConfig {
    MaRsi {
        #[serde(default = "default_fast_period")]
        fast_period: usize,
        #[serde(default = "default_slow_period")]
        slow_period: usize,
        #[serde(default = "default_rsi_period")]
        rsi_period: usize,
    },
    BreakoutAtr {
        #[serde(default = "default_channel_period")]
        channel_period: usize,
        #[serde(default = "default_atr_period")]
        atr_period: usize,
        #[serde(default = "default_risk_mult")]
        risk_mult: f64,
        #[serde(default = "default_reward_mult")]
        reward_mult: f64,
    },
}

impl StrategyConfig {
    /// Default-parameter MA + RSI configuration.
    pub fn ma_rsi() -> Self {
        Self::MaRsi {
            fast_period: default_fast_period(),
            slow_period: default_slow_period(),
            rsi_period: default_rsi_period(),
        }
    }

    /// Default-parameter channel breakout configuration.
    pub fn breakout_atr() -> Self {
        Self::BreakoutAtr {
            channel_period: default_channel_period(),
            atr_period: default_atr_period(),
            risk_mult: default_risk_mult(),
            reward_mult: default_reward_mult(),
        }
    }

    /// Resolve a selector string to a default-parameter configuration.
    ///
    /// Accepts the hyphenated command-line form and the snake_case name
    /// the strategy reports for itself. Unknown selectors fall back to
    /// the channel breakout so a batch of runs keeps going instead of
    /// failing on one mistyped name.
    pub fn from_selector(selector: &str) -> Self {
        match selector {
            "moving-average-rsi" | "ma_rsi" => Self::ma_rsi(),
            "breakout-atr" | "breakout_atr" => Self::breakout_atr(),
            other => {
                tracing::warn!(
                    selector = other,
                    "unknown strategy selector, falling back to breakout_atr"
                );
                Self::breakout_atr()
            }
        }
    }

    /// The name the built strategy will report.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MaRsi { .. } => "ma_rsi",
            Self::BreakoutAtr { .. } => "breakout_atr",
        }
    }

    /// Instantiate the strategy described by this configuration.
    pub fn build(&self) -> Box<dyn Strategy> {
        match *self {
            Self::MaRsi {
                fast_period,
                slow_period,
                rsi_period,
            } => Box::new(MaRsiStrategy::new(fast_period, slow_period, rsi_period)),
            Self::BreakoutAtr {
                channel_period,
                atr_period,
                risk_mult,
                reward_mult,
            } => Box::new(BreakoutAtrStrategy::new(
                channel_period,
                atr_period,
                risk_mult,
                reward_mult,
            )),
        }
    }
}

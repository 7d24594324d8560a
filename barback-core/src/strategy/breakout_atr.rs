//! Channel breakout with ATR-sized stop and target brackets.
//!
//! Enters long when the close clears the highest high of the trailing
//! channel (measured through the previous bar), short when it breaks the
//! lowest low. Each entry carries a bracket: stop at `risk_mult * ATR`
//! against the position, target at `reward_mult * ATR` in its favor.
//! While a position is open the strategy only watches the bracket.

use crate::domain::{Bar, Bracket, OrderIntent, Side};
use crate::indicators::{Atr, Indicator, RollingHigh, RollingLow};
use crate::strategy::{DecisionContext, Strategy};

/// Donchian-style breakout strategy with ATR brackets.
#[derive(Debug, Clone)]
pub struct BreakoutAtrStrategy {
    highest: RollingHigh,
    lowest: RollingLow,
    atr: Atr,
    risk_mult: f64,
    reward_mult: f64,
}

impl BreakoutAtrStrategy {
    pub fn new(channel_period: usize, atr_period: usize, risk_mult: f64, reward_mult: f64) -> Self {
        assert!(channel_period >= 1, "channel_period must be >= 1");
        assert!(atr_period >= 1, "atr_period must be >= 1");
        assert!(risk_mult > 0.0, "risk_mult must be > 0");
        assert!(reward_mult > 0.0, "reward_mult must be > 0");

        Self {
            highest: RollingHigh::new(channel_period),
            lowest: RollingLow::new(channel_period),
            atr: Atr::new(atr_period),
            risk_mult,
            reward_mult,
        }
    }

    pub fn default_params() -> Self {
        Self::new(20, 14, 2.0, 3.0)
    }

    /// Bracket for an entry at `close` with the current ATR.
    fn bracket_for(&self, side: Side, close: f64, atr: f64) -> Bracket {
        let risk = self.risk_mult * atr;
        let reward = self.reward_mult * atr;
        match side {
            Side::Long => Bracket {
                stop: close - risk,
                target: close + reward,
            },
            Side::Short => Bracket {
                stop: close + risk,
                target: close - reward,
            },
        }
    }
}

impl Strategy for BreakoutAtrStrategy {
    fn name(&self) -> &'static str {
        "breakout_atr"
    }

    fn warmup_bars(&self) -> usize {
        // Entries compare against the channel ending at the previous bar,
        // which needs one bar beyond the channel window itself.
        (self.highest.warmup_bars() + 1).max(self.atr.warmup_bars())
    }

    fn observe(&mut self, bar: &Bar) {
        self.highest.update(bar);
        self.lowest.update(bar);
        self.atr.update(bar);
    }

    fn decide(&self, ctx: &DecisionContext) -> Option<OrderIntent> {
        if ctx.order_pending {
            return None;
        }
        let close = ctx.bar.close;

        if let Some(position) = ctx.position {
            // Bracket watch: stop and target touches are inclusive.
            let bracket = position.bracket.as_ref()?;
            let touched = match position.side {
                Side::Long => close <= bracket.stop || close >= bracket.target,
                Side::Short => close >= bracket.stop || close <= bracket.target,
            };
            return touched.then(OrderIntent::exit);
        }

        // The channel is read through the previous bar so the bar that
        // sets a new extreme cannot break out against itself.
        let highest_prev = self.highest.prev()?;
        let lowest_prev = self.lowest.prev()?;
        let atr = self.atr.value()?;

        if close > highest_prev {
            let bracket = self.bracket_for(Side::Long, close, atr);
            return Some(OrderIntent::enter_long().with_bracket(bracket));
        }
        if close < lowest_prev {
            let bracket = self.bracket_for(Side::Short, close, atr);
            return Some(OrderIntent::enter_short().with_bracket(bracket));
        }
        None
    }
}

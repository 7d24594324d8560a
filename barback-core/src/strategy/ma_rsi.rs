//! Moving-average trend filter gated by RSI — long only.
//!
//! Enters long when the fast SMA sits above the slow SMA while RSI is
//! above its entry floor. Exits when the fast SMA drops below the slow
//! SMA or RSI pushes into overbought territory.

use crate::domain::{Bar, OrderIntent, Side};
use crate::indicators::{Indicator, Rsi, Sma};
use crate::strategy::{DecisionContext, Strategy};

/// RSI must exceed this for an entry to fire.
const RSI_ENTRY_FLOOR: f64 = 30.0;
/// RSI above this forces an exit (overbought).
const RSI_EXIT_CEILING: f64 = 70.0;

/// SMA-crossover strategy with an RSI gate.
#[derive(Debug, Clone)]
pub struct MaRsiStrategy {
    fast: Sma,
    slow: Sma,
    rsi: Rsi,
}

impl MaRsiStrategy {
    pub fn new(fast_period: usize, slow_period: usize, rsi_period: usize) -> Self {
        assert!(fast_period >= 1, "fast_period must be >= 1");
        assert!(
            slow_period > fast_period,
            "slow_period must be > fast_period"
        );
        assert!(rsi_period >= 1, "rsi_period must be >= 1");

        Self {
            fast: Sma::new(fast_period),
            slow: Sma::new(slow_period),
            rsi: Rsi::new(rsi_period),
        }
    }

    pub fn default_params() -> Self {
        Self::new(10, 30, 14)
    }
}

impl Strategy for MaRsiStrategy {
    fn name(&self) -> &'static str {
        "ma_rsi"
    }

    fn warmup_bars(&self) -> usize {
        self.slow.warmup_bars().max(self.rsi.warmup_bars())
    }

    fn observe(&mut self, bar: &Bar) {
        self.fast.update(bar);
        self.slow.update(bar);
        self.rsi.update(bar);
    }

    fn decide(&self, ctx: &DecisionContext) -> Option<OrderIntent> {
        if ctx.order_pending {
            return None;
        }
        let fast = self.fast.value()?;
        let slow = self.slow.value()?;
        let rsi = self.rsi.value()?;

        match ctx.position {
            None => (fast > slow && rsi > RSI_ENTRY_FLOOR).then(OrderIntent::enter_long),
            Some(position) if position.side == Side::Long => {
                (fast < slow || rsi > RSI_EXIT_CEILING).then(OrderIntent::exit)
            }
            // This strategy never opens shorts; leave any foreign position alone.
            Some(_) => None,
        }
    }
}

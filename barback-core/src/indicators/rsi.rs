//! Relative Strength Index with Wilder smoothing.

use crate::domain::Bar;
use crate::indicators::Indicator;

/// Wilder-smoothed RSI over closing prices.
///
/// The first `period` close-to-close changes seed the averages with a
/// plain arithmetic mean; every change after that folds in with
/// `avg = (avg * (period - 1) + x) / period`. The first reading needs
/// `period + 1` bars since a change requires two closes.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    prev_close: Option<f64>,
    avg_gain: f64,
    avg_loss: f64,
    changes_seen: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            prev_close: None,
            avg_gain: 0.0,
            avg_loss: 0.0,
            changes_seen: 0,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Rsi {
    fn warmup_bars(&self) -> usize {
        self.period + 1
    }

    fn update(&mut self, bar: &Bar) {
        if let Some(prev) = self.prev_close {
            let change = bar.close - prev;
            let gain = change.max(0.0);
            let loss = (-change).max(0.0);

            if self.changes_seen < self.period {
                // Seed phase: accumulate sums, divide once the window fills.
                self.avg_gain += gain;
                self.avg_loss += loss;
                self.changes_seen += 1;
                if self.changes_seen == self.period {
                    self.avg_gain /= self.period as f64;
                    self.avg_loss /= self.period as f64;
                }
            } else {
                let period = self.period as f64;
                self.avg_gain = (self.avg_gain * (period - 1.0) + gain) / period;
                self.avg_loss = (self.avg_loss * (period - 1.0) + loss) / period;
                self.changes_seen += 1;
            }
        }
        self.prev_close = Some(bar.close);
    }

    fn value(&self) -> Option<f64> {
        (self.changes_seen >= self.period).then(|| compute_rsi(self.avg_gain, self.avg_loss))
    }
}

/// RSI from average gain and average loss, handling degenerate cases.
fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return 50.0; // No movement at all: neutral
        }
        return 100.0; // All gains
    }
    if avg_gain == 0.0 {
        return 0.0; // All losses
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

//! Average True Range with Wilder smoothing.

use crate::domain::Bar;
use crate::indicators::Indicator;

/// Wilder-smoothed ATR.
///
/// The first bar has no previous close and so contributes no true range.
/// The next `period` true ranges seed the average with an arithmetic
/// mean; later bars fold in with `atr = (atr * (period - 1) + tr) / period`.
/// The first reading therefore needs `period + 1` bars.
#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    prev_close: Option<f64>,
    atr: f64,
    trs_seen: usize,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            prev_close: None,
            atr: 0.0,
            trs_seen: 0,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Atr {
    fn warmup_bars(&self) -> usize {
        self.period + 1
    }

    fn update(&mut self, bar: &Bar) {
        if let Some(prev_close) = self.prev_close {
            let tr = bar.true_range(prev_close);
            if self.trs_seen < self.period {
                // Seed phase: accumulate sums, divide once the window fills.
                self.atr += tr;
                self.trs_seen += 1;
                if self.trs_seen == self.period {
                    self.atr /= self.period as f64;
                }
            } else {
                let period = self.period as f64;
                self.atr = (self.atr * (period - 1.0) + tr) / period;
                self.trs_seen += 1;
            }
        }
        self.prev_close = Some(bar.close);
    }

    fn value(&self) -> Option<f64> {
        (self.trs_seen >= self.period).then(|| self.atr)
    }
}

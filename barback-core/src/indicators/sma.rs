//! Simple moving average over closing prices.

use std::collections::VecDeque;

use crate::domain::Bar;
use crate::indicators::Indicator;

/// Rolling arithmetic mean of the last `period` closes.
///
/// Maintains a running sum alongside the window, so each update is O(1)
/// rather than re-summing the window.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    window: VecDeque<f64>,
    sum: f64,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            window: VecDeque::with_capacity(period + 1),
            sum: 0.0,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    fn warmup_bars(&self) -> usize {
        self.period
    }

    fn update(&mut self, bar: &Bar) {
        self.window.push_back(bar.close);
        self.sum += bar.close;
        if self.window.len() > self.period {
            if let Some(leaving) = self.window.pop_front() {
                self.sum -= leaving;
            }
        }
    }

    fn value(&self) -> Option<f64> {
        (self.window.len() == self.period).then(|| self.sum / self.period as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    fn feed(sma: &mut Sma, closes: &[f64]) -> Vec<Option<f64>> {
        make_bars(closes)
            .iter()
            .map(|bar| {
                sma.update(bar);
                sma.value()
            })
            .collect()
    }

    #[test]
    fn sma_none_until_window_filled() {
        let mut sma = Sma::new(3);
        let values = feed(&mut sma, &[10.0, 20.0, 30.0]);

        assert_eq!(values[0], None);
        assert_eq!(values[1], None);
        assert_approx(values[2].unwrap(), 20.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_slides_window() {
        let mut sma = Sma::new(3);
        let values = feed(&mut sma, &[10.0, 20.0, 30.0, 40.0, 50.0]);

        // (20+30+40)/3 then (30+40+50)/3
        assert_approx(values[3].unwrap(), 30.0, DEFAULT_EPSILON);
        assert_approx(values[4].unwrap(), 40.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_period_one_tracks_close() {
        let mut sma = Sma::new(1);
        let values = feed(&mut sma, &[42.0, 7.0]);

        assert_approx(values[0].unwrap(), 42.0, DEFAULT_EPSILON);
        assert_approx(values[1].unwrap(), 7.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_constant_series() {
        let mut sma = Sma::new(4);
        let values = feed(&mut sma, &[100.0; 10]);

        for value in values.iter().skip(3) {
            assert_approx(value.unwrap(), 100.0, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn warmup_matches_first_value() {
        let sma = Sma::new(5);
        assert_eq!(sma.warmup_bars(), 5);
    }

    #[test]
    #[should_panic(expected = "SMA period must be >= 1")]
    fn sma_rejects_zero_period() {
        Sma::new(0);
    }
}

//! Streaming indicators consumed by strategies.
//!
//! Each indicator is a small stateful struct fed one bar at a time in
//! series order. Updates are O(1) amortized, so the engine loop stays
//! linear in series length. Reads return `Option<f64>`: `None` until the
//! warm-up window is filled, forcing callers to handle the not-ready
//! case instead of trading on a default value.

pub mod atr;
pub mod rolling;
pub mod rsi;
pub mod sma;

pub use atr::Atr;
pub use rolling::{RollingHigh, RollingLow};
pub use rsi::Rsi;
pub use sma::Sma;

use crate::domain::Bar;

/// Streaming indicator over a bar-series prefix.
pub trait Indicator {
    /// Bars that must be observed before `value()` turns Some.
    fn warmup_bars(&self) -> usize;

    /// Fold in the next bar. Must be called exactly once per bar, in order.
    fn update(&mut self, bar: &Bar);

    /// Current value, or None while warming up.
    fn value(&self) -> Option<f64>;
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            let high = open.max(close) + 1.0;
            let low = open.min(close) - 1.0;
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high,
                low,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Create bars with explicit OHLC values for testing range-sensitive
/// indicators (ATR, rolling extrema).
#[cfg(test)]
pub fn make_ohlc_bars(ohlc: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    ohlc.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| Bar {
            date: base_date + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume: 1000,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

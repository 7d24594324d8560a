//! Deterministic synthetic bar generation.
//!
//! Each symbol's series is a geometric random walk seeded from
//! `BLAKE3(master_seed, symbol)`, so a given (seed, symbol) pair always
//! produces identical bars regardless of the order symbols are generated
//! in. Weekends are skipped to mimic a daily equity calendar.

use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::provider::{BarProvider, DataError};
use crate::domain::{Bar, BarSeries};

/// Generates reproducible random-walk series on demand.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    master_seed: u64,
    start: NaiveDate,
    bar_count: usize,
}

impl SyntheticProvider {
    pub fn new(master_seed: u64, start: NaiveDate, bar_count: usize) -> Self {
        assert!(bar_count >= 1, "bar_count must be >= 1");
        Self {
            master_seed,
            start,
            bar_count,
        }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derive the per-symbol seed. Hash-based, so independent of the
    /// order in which symbols are requested.
    fn sub_seed(&self, symbol: &str) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(symbol.as_bytes());
        let hash = hasher.finalize();
        u64::from_le_bytes(hash.as_bytes()[..8].try_into().unwrap())
    }
}

impl BarProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn load(&self, symbol: &str) -> Result<BarSeries, DataError> {
        let mut rng = StdRng::seed_from_u64(self.sub_seed(symbol));
        let mut close = 80.0 + rng.gen::<f64>() * 40.0;
        let mut date = self.start;
        let mut bars = Vec::with_capacity(self.bar_count);

        while bars.len() < self.bar_count {
            if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                date = date + chrono::Duration::days(1);
                continue;
            }

            let open = close;
            let drift: f64 = rng.gen_range(-0.02..0.02);
            let next_close = (close * (1.0 + drift)).max(1.0);
            let wick_up: f64 = rng.gen_range(0.0..0.01);
            let wick_down: f64 = rng.gen_range(0.0..0.01);
            let high = open.max(next_close) * (1.0 + wick_up);
            let low = open.min(next_close) * (1.0 - wick_down);
            let volume = rng.gen_range(100_000u64..5_000_000);

            bars.push(Bar {
                date,
                open,
                high,
                low,
                close: next_close,
                volume,
            });
            close = next_close;
            date = date + chrono::Duration::days(1);
        }

        Ok(BarSeries::new(symbol.to_string(), bars)?)
    }
}

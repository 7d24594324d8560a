//! Bar and BarSeries — the fundamental market data units.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV bar for a single instrument on a single trading day.
///
/// Bars are immutable once loaded; validation happens when a `BarSeries`
/// is constructed, never mid-run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Basic OHLC sanity: all prices finite and non-negative, high >= low,
    /// high caps open/close, low floors open/close.
    pub fn is_sane(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.low >= 0.0
            && self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }

    /// True range against the previous close:
    /// max(high-low, |high-prev_close|, |low-prev_close|).
    pub fn true_range(&self, prev_close: f64) -> f64 {
        (self.high - self.low)
            .max((self.high - prev_close).abs())
            .max((self.low - prev_close).abs())
    }
}

/// Validation failures when constructing a `BarSeries`.
#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("series for '{0}' has no bars")]
    Empty(String),

    #[error("bar {index} ({date}) is not strictly after the previous bar")]
    OutOfOrder { index: usize, date: NaiveDate },

    #[error("bar {index} ({date}) fails OHLC sanity")]
    InsaneBar { index: usize, date: NaiveDate },
}

/// Ordered, validated sequence of daily bars for one instrument.
///
/// Invariants enforced at construction: non-empty, dates strictly
/// ascending, every bar passes [`Bar::is_sane`]. The fields are private so
/// the invariants cannot be broken after the fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        let symbol = symbol.into();
        if bars.is_empty() {
            return Err(SeriesError::Empty(symbol));
        }
        for (index, bar) in bars.iter().enumerate() {
            if !bar.is_sane() {
                return Err(SeriesError::InsaneBar {
                    index,
                    date: bar.date,
                });
            }
            if index > 0 && bar.date <= bars[index - 1].date {
                return Err(SeriesError::OutOfOrder {
                    index,
                    date: bar.date,
                });
            }
        }
        Ok(Self { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false for a constructed series; present for slice-like symmetry.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_close(&self) -> f64 {
        self.bars[0].close
    }

    pub fn last_close(&self) -> f64 {
        self.bars[self.bars.len() - 1].close
    }

    pub fn start_date(&self) -> NaiveDate {
        self.bars[0].date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.bars[self.bars.len() - 1].date
    }

    /// Sub-series covering [start, end] inclusive. Returns `Empty` if no
    /// bars fall inside the window.
    pub fn slice_dates(&self, start: NaiveDate, end: NaiveDate) -> Result<Self, SeriesError> {
        let bars: Vec<Bar> = self
            .bars
            .iter()
            .filter(|b| b.date >= start && b.date <= end)
            .cloned()
            .collect();
        Self::new(self.symbol.clone(), bars)
    }
}

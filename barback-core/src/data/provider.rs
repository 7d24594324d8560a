//! Data provider trait and structured error types.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{BarSeries, SeriesError};

/// Structured error types for data operations.
///
/// A batch runner treats these as per-symbol skips, not fatal errors.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("no data available for symbol '{symbol}'")]
    Unavailable { symbol: String },

    #[error("malformed bar data: {0}")]
    Format(String),

    #[error("data source error: {0}")]
    Source(String),

    #[error("series validation failed: {0}")]
    Series(#[from] SeriesError),
}

/// Trait for bar data sources.
///
/// Implementations return the full series they hold for a symbol;
/// [`BarProvider::fetch_bars`] layers date windowing on top.
pub trait BarProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Load daily OHLCV bars for a symbol.
    fn load(&self, symbol: &str) -> Result<BarSeries, DataError>;

    /// Load a symbol's bars trimmed to a date window.
    ///
    /// Open bounds fall back to the loaded series' own edges. A window
    /// holding no bars reports [`DataError::Unavailable`], the same as a
    /// symbol the source has never heard of.
    fn fetch_bars(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<BarSeries, DataError> {
        let series = self.load(symbol)?;
        match (start, end) {
            (None, None) => Ok(series),
            (start, end) => {
                let start = start.unwrap_or_else(|| series.start_date());
                let end = end.unwrap_or_else(|| series.end_date());
                match series.slice_dates(start, end) {
                    Ok(windowed) => Ok(windowed),
                    Err(SeriesError::Empty(symbol)) => Err(DataError::Unavailable { symbol }),
                    Err(err) => Err(err.into()),
                }
            }
        }
    }
}

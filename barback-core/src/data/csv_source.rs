//! CSV directory provider — one `{symbol}.csv` file per symbol.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::data::provider::{BarProvider, DataError};
use crate::domain::{Bar, BarSeries};

/// Row shape expected in each CSV file. Dates are ISO `YYYY-MM-DD` and
/// rows must already be ascending by date; unordered or duplicate rows
/// fail series validation rather than being silently repaired.
#[derive(Debug, Deserialize)]
struct CsvBar {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

impl From<CsvBar> for Bar {
    fn from(row: CsvBar) -> Self {
        Bar {
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        }
    }
}

/// Loads `{root}/{SYMBOL}.csv` files with a `date,open,high,low,close,volume` header.
#[derive(Debug, Clone)]
pub struct CsvBarProvider {
    root: PathBuf,
}

impl CsvBarProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.root.join(format!("{symbol}.csv"))
    }
}

impl BarProvider for CsvBarProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn load(&self, symbol: &str) -> Result<BarSeries, DataError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(DataError::Unavailable {
                symbol: symbol.to_string(),
            });
        }

        let mut reader =
            csv::Reader::from_path(&path).map_err(|e| DataError::Source(e.to_string()))?;
        let mut bars = Vec::new();
        for record in reader.deserialize() {
            let row: CsvBar = record.map_err(|e| DataError::Format(e.to_string()))?;
            bars.push(Bar::from(row));
        }
        if bars.is_empty() {
            return Err(DataError::Unavailable {
                symbol: symbol.to_string(),
            });
        }

        let series = BarSeries::new(symbol.to_string(), bars)?;
        tracing::debug!(symbol, bars = series.len(), path = %path.display(), "loaded csv series");
        Ok(series)
    }
}

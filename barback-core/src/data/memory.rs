//! In-memory provider for tests and embedded use.

use std::collections::HashMap;

use crate::data::provider::{BarProvider, DataError};
use crate::domain::BarSeries;

/// Holds pre-built series keyed by symbol.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    series: HashMap<String, BarSeries>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(series: impl IntoIterator<Item = BarSeries>) -> Self {
        let mut provider = Self::new();
        for s in series {
            provider.insert(s);
        }
        provider
    }

    /// Register a series under its own symbol, replacing any previous one.
    pub fn insert(&mut self, series: BarSeries) {
        self.series.insert(series.symbol().to_string(), series);
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }
}

impl BarProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    fn load(&self, symbol: &str) -> Result<BarSeries, DataError> {
        self.series
            .get(symbol)
            .cloned()
            .ok_or_else(|| DataError::Unavailable {
                symbol: symbol.to_string(),
            })
    }
}

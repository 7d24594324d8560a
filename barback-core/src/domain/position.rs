//! Position side and the open-position record.

use serde::{Deserialize, Serialize};

use super::order::Bracket;
use chrono::NaiveDate;

/// Direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// Mark-to-market sign: +1 for long, -1 for short.
    pub fn sign(&self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }
}

/// An open position with its protective levels.
///
/// Exists only while the order/position state machine is in `Open` or
/// `PendingExit`, so stop/target can never be read while flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub side: Side,
    /// Shares held; always the configured fixed stake.
    pub size: u32,
    pub entry_price: f64,
    pub entry_bar: usize,
    pub entry_date: NaiveDate,
    /// Stop/target carried from the entry intent; None for strategies
    /// that exit on signal only.
    pub bracket: Option<Bracket>,
}

impl OpenPosition {
    /// Signed mark-to-market value at the given price.
    pub fn market_value(&self, price: f64) -> f64 {
        self.side.sign() * self.size as f64 * price
    }

    /// Unrealized PnL at the given price, before commission.
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.side.sign() * self.size as f64 * (price - self.entry_price)
    }
}

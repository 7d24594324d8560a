//! TradeRecord — a completed round-trip trade.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::position::Side;

/// A complete round trip: entry fill → exit fill.
///
/// Built by the order/position manager when an exit fill closes a
/// position; a position still open at the last bar produces no record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub side: Side,

    // ── Entry ──
    pub entry_bar: usize,
    pub entry_date: NaiveDate,
    pub entry_price: f64,

    // ── Exit ──
    pub exit_bar: usize,
    pub exit_date: NaiveDate,
    pub exit_price: f64,

    // ── Size / PnL ──
    /// Shares; always the configured fixed stake.
    pub size: u32,
    /// Commission paid across both legs.
    pub commission: f64,
    /// PnL net of commission.
    pub net_pnl: f64,

    pub bars_held: usize,
}

impl TradeRecord {
    /// Return on the trade as a fraction of entry notional.
    pub fn return_pct(&self) -> f64 {
        if self.entry_price == 0.0 || self.size == 0 {
            return 0.0;
        }
        self.net_pnl / (self.entry_price * self.size as f64)
    }

    pub fn is_winner(&self) -> bool {
        self.net_pnl > 0.0
    }
}

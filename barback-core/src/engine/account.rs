//! Cash ledger with percentage commission on every leg.

use crate::domain::OpenPosition;

/// Cash and commission tracker.
///
/// Entries and exits settle as explicit buy/sell legs: a long entry and a
/// short exit are buys, a long exit and a short entry are sells. Sells
/// credit proceeds, buys debit cost, and every leg pays
/// `notional * commission_rate`. With per-leg settlement,
/// `cash + signed position value` is continuous across fills except for
/// the commission itself.
#[derive(Debug, Clone)]
pub struct Account {
    initial_cash: f64,
    cash: f64,
    commission_rate: f64,
    commission_paid: f64,
}

impl Account {
    pub fn new(initial_cash: f64, commission_rate: f64) -> Self {
        assert!(
            initial_cash.is_finite() && initial_cash >= 0.0,
            "initial_cash must be finite and >= 0"
        );
        assert!(
            commission_rate.is_finite() && commission_rate >= 0.0,
            "commission_rate must be finite and >= 0"
        );
        Self {
            initial_cash,
            cash: initial_cash,
            commission_rate,
            commission_paid: 0.0,
        }
    }

    pub fn initial_cash(&self) -> f64 {
        self.initial_cash
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn commission_paid(&self) -> f64 {
        self.commission_paid
    }

    /// Cash needed to open a position of `size` at `price`, commission
    /// included. Short entries post the same amount as margin.
    pub fn cost_with_commission(&self, size: u32, price: f64) -> f64 {
        let notional = size as f64 * price;
        notional + notional * self.commission_rate
    }

    /// Whether an entry of `size` at `price` can be funded.
    pub fn can_afford(&self, size: u32, price: f64) -> bool {
        self.cost_with_commission(size, price) <= self.cash
    }

    /// Settle a buy leg. Returns the commission charged.
    pub fn settle_buy(&mut self, size: u32, price: f64) -> f64 {
        let notional = size as f64 * price;
        let commission = notional * self.commission_rate;
        self.cash -= notional + commission;
        self.commission_paid += commission;
        commission
    }

    /// Settle a sell leg. Returns the commission charged.
    pub fn settle_sell(&mut self, size: u32, price: f64) -> f64 {
        let notional = size as f64 * price;
        let commission = notional * self.commission_rate;
        self.cash += notional - commission;
        self.commission_paid += commission;
        commission
    }

    /// Mark-to-market equity at `close`: cash plus signed position value.
    pub fn equity(&self, position: Option<&OpenPosition>, close: f64) -> f64 {
        self.cash + position.map_or(0.0, |p| p.market_value(close))
    }
}

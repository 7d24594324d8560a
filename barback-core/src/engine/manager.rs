//! Order lifecycle — one position, one pending order, explicit states.
//!
//! The manager is a four-state machine:
//! `Flat -> PendingEntry -> Open -> PendingExit -> Flat`. Intents that do
//! not fit the current state are recorded as rejections, never panics.
//! Entries that cannot be funded at fill time are recorded as skips and
//! the machine drops back to `Flat`.

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, IntentKind, OpenPosition, OrderIntent, PendingOrder, Side, TradeRecord};
use crate::engine::account::Account;

/// An intent refused because it did not fit the position state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedIntent {
    pub bar_index: usize,
    pub kind: IntentKind,
    pub reason: String,
}

/// An entry order that could not be funded at fill time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub bar_index: usize,
    pub kind: IntentKind,
    pub price: f64,
    pub required_cash: f64,
    pub available_cash: f64,
}

#[derive(Debug, Clone, PartialEq)]
enum PositionState {
    Flat,
    PendingEntry(PendingOrder),
    Open(OpenPosition),
    PendingExit {
        position: OpenPosition,
        order: PendingOrder,
    },
}

/// Everything the manager accumulated over a run.
#[derive(Debug)]
pub struct ManagerReport {
    pub trades: Vec<TradeRecord>,
    pub rejected_intents: Vec<RejectedIntent>,
    pub skipped_entries: Vec<SkippedEntry>,
    /// Position still open when the series ended, if any.
    pub final_position: Option<OpenPosition>,
}

/// Single-position order manager.
#[derive(Debug)]
pub struct OrderManager {
    state: PositionState,
    /// Commission paid on the open leg of the live position.
    entry_commission: f64,
    trades: Vec<TradeRecord>,
    rejected: Vec<RejectedIntent>,
    skipped: Vec<SkippedEntry>,
}

impl OrderManager {
    pub fn new() -> Self {
        Self {
            state: PositionState::Flat,
            entry_commission: 0.0,
            trades: Vec::new(),
            rejected: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Open position, if the machine is in `Open` or `PendingExit`.
    pub fn position(&self) -> Option<&OpenPosition> {
        match &self.state {
            PositionState::Open(position) | PositionState::PendingExit { position, .. } => {
                Some(position)
            }
            PositionState::Flat | PositionState::PendingEntry(_) => None,
        }
    }

    /// True while an unresolved order is parked with the manager.
    pub fn order_pending(&self) -> bool {
        matches!(
            self.state,
            PositionState::PendingEntry(_) | PositionState::PendingExit { .. }
        )
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    /// Accept or reject an intent against the current state.
    ///
    /// Accepted intents park as a pending order until [`resolve`] runs.
    ///
    /// [`resolve`]: OrderManager::resolve
    pub fn submit(&mut self, intent: OrderIntent, bar_index: usize) {
        let state = std::mem::replace(&mut self.state, PositionState::Flat);
        match (state, intent.kind) {
            (PositionState::Flat, IntentKind::EnterLong | IntentKind::EnterShort) => {
                self.state = PositionState::PendingEntry(PendingOrder {
                    intent,
                    requested_at_bar: bar_index,
                });
            }
            (PositionState::Open(position), IntentKind::Exit) => {
                self.state = PositionState::PendingExit {
                    position,
                    order: PendingOrder {
                        intent,
                        requested_at_bar: bar_index,
                    },
                };
            }
            (
                state @ (PositionState::PendingEntry(_) | PositionState::PendingExit { .. }),
                _,
            ) => {
                self.reject(bar_index, intent.kind, "an order is already pending");
                self.state = state;
            }
            (state @ PositionState::Open(_), IntentKind::EnterLong | IntentKind::EnterShort) => {
                self.reject(bar_index, intent.kind, "a position is already open");
                self.state = state;
            }
            (PositionState::Flat, IntentKind::Exit) => {
                self.reject(bar_index, intent.kind, "no open position to exit");
            }
        }
    }

    /// Fill the pending order, if any, at the bar's close.
    pub fn resolve(&mut self, bar_index: usize, bar: &Bar, account: &mut Account, stake: u32) {
        let state = std::mem::replace(&mut self.state, PositionState::Flat);
        self.state = match state {
            PositionState::PendingEntry(order) => {
                self.fill_entry(order, bar_index, bar, account, stake)
            }
            PositionState::PendingExit { position, .. } => {
                self.fill_exit(position, bar_index, bar, account)
            }
            settled => settled,
        };
    }

    /// Consume the manager and return everything it accumulated.
    pub fn finish(self) -> ManagerReport {
        let final_position = match self.state {
            PositionState::Open(position) | PositionState::PendingExit { position, .. } => {
                Some(position)
            }
            PositionState::Flat | PositionState::PendingEntry(_) => None,
        };
        ManagerReport {
            trades: self.trades,
            rejected_intents: self.rejected,
            skipped_entries: self.skipped,
            final_position,
        }
    }

    fn reject(&mut self, bar_index: usize, kind: IntentKind, reason: &str) {
        tracing::debug!(bar_index, ?kind, reason, "order intent rejected");
        self.rejected.push(RejectedIntent {
            bar_index,
            kind,
            reason: reason.to_string(),
        });
    }

    fn fill_entry(
        &mut self,
        order: PendingOrder,
        bar_index: usize,
        bar: &Bar,
        account: &mut Account,
        stake: u32,
    ) -> PositionState {
        let side = match order.intent.kind {
            IntentKind::EnterLong => Side::Long,
            IntentKind::EnterShort => Side::Short,
            // submit never parks an exit in PendingEntry.
            IntentKind::Exit => return PositionState::Flat,
        };
        let price = bar.close;
        if !account.can_afford(stake, price) {
            let required = account.cost_with_commission(stake, price);
            tracing::debug!(
                bar_index,
                ?side,
                price,
                required,
                available = account.cash(),
                "entry skipped: insufficient cash"
            );
            self.skipped.push(SkippedEntry {
                bar_index,
                kind: order.intent.kind,
                price,
                required_cash: required,
                available_cash: account.cash(),
            });
            return PositionState::Flat;
        }

        let commission = match side {
            Side::Long => account.settle_buy(stake, price),
            Side::Short => account.settle_sell(stake, price),
        };
        self.entry_commission = commission;
        tracing::debug!(bar_index, ?side, price, size = stake, "entry filled");
        PositionState::Open(OpenPosition {
            side,
            size: stake,
            entry_price: price,
            entry_bar: bar_index,
            entry_date: bar.date,
            bracket: order.intent.bracket,
        })
    }

    fn fill_exit(
        &mut self,
        position: OpenPosition,
        bar_index: usize,
        bar: &Bar,
        account: &mut Account,
    ) -> PositionState {
        let price = bar.close;
        let exit_commission = match position.side {
            Side::Long => account.settle_sell(position.size, price),
            Side::Short => account.settle_buy(position.size, price),
        };
        let commission = self.entry_commission + exit_commission;
        self.entry_commission = 0.0;

        let gross = position.side.sign() * (price - position.entry_price) * position.size as f64;
        let trade = TradeRecord {
            side: position.side,
            entry_bar: position.entry_bar,
            entry_date: position.entry_date,
            entry_price: position.entry_price,
            exit_bar: bar_index,
            exit_date: bar.date,
            exit_price: price,
            size: position.size,
            commission,
            net_pnl: gross - commission,
            bars_held: bar_index - position.entry_bar,
        };
        tracing::debug!(
            bar_index,
            side = ?position.side,
            net_pnl = trade.net_pnl,
            "exit filled"
        );
        self.trades.push(trade);
        PositionState::Flat
    }
}

impl Default for OrderManager {
    fn default() -> Self {
        Self::new()
    }
}

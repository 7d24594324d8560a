//! Bar-by-bar backtest engine.
//!
//! The engine owns everything a strategy must not touch: cash, fills,
//! commissions, and the order/position lifecycle. Each bar runs four
//! phases — observe, decide, submit-and-fill, mark-to-market — and the
//! whole run is a single pass over the series.

pub mod account;
pub mod loop_runner;
pub mod manager;

pub use account::Account;
pub use loop_runner::{run_backtest, EngineConfig, EquityPoint, RunResult};
pub use manager::{ManagerReport, OrderManager, RejectedIntent, SkippedEntry};

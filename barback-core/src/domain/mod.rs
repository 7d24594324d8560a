//! Domain types: bars, intents, positions, trades.

pub mod bar;
pub mod order;
pub mod position;
pub mod trade;

pub use bar::{Bar, BarSeries, SeriesError};
pub use order::{Bracket, IntentKind, OrderIntent, PendingOrder};
pub use position::{OpenPosition, Side};
pub use trade::TradeRecord;

/// Symbol type alias
pub type Symbol = String;

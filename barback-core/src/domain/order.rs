//! Order intents and the single pending-order slot.

use serde::{Deserialize, Serialize};

use super::position::Side;

/// What a strategy wants done on the current bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentKind {
    EnterLong,
    EnterShort,
    Exit,
}

/// Protective stop/target pair attached to an entry intent.
///
/// Levels are checked against closing prices only, never intrabar extremes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub stop: f64,
    pub target: f64,
}

/// A strategy decision. At most one per bar, and only while no other
/// order is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub kind: IntentKind,
    /// Carried by entry intents that want protective levels on the
    /// resulting position.
    pub bracket: Option<Bracket>,
}

impl OrderIntent {
    pub fn enter_long() -> Self {
        Self {
            kind: IntentKind::EnterLong,
            bracket: None,
        }
    }

    pub fn enter_short() -> Self {
        Self {
            kind: IntentKind::EnterShort,
            bracket: None,
        }
    }

    pub fn exit() -> Self {
        Self {
            kind: IntentKind::Exit,
            bracket: None,
        }
    }

    pub fn with_bracket(mut self, bracket: Bracket) -> Self {
        self.bracket = Some(bracket);
        self
    }

    pub fn is_entry(&self) -> bool {
        matches!(self.kind, IntentKind::EnterLong | IntentKind::EnterShort)
    }

    /// Side this intent would open; None for exits.
    pub fn entry_side(&self) -> Option<Side> {
        match self.kind {
            IntentKind::EnterLong => Some(Side::Long),
            IntentKind::EnterShort => Some(Side::Short),
            IntentKind::Exit => None,
        }
    }
}

/// The single outstanding order. Created from an intent, consumed by a
/// fill or a skip within the same bar, then destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingOrder {
    pub intent: OrderIntent,
    pub requested_at_bar: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_sides() {
        assert_eq!(OrderIntent::enter_long().entry_side(), Some(Side::Long));
        assert_eq!(OrderIntent::enter_short().entry_side(), Some(Side::Short));
        assert_eq!(OrderIntent::exit().entry_side(), None);
    }

    #[test]
    fn exit_is_not_entry() {
        assert!(OrderIntent::enter_long().is_entry());
        assert!(OrderIntent::enter_short().is_entry());
        assert!(!OrderIntent::exit().is_entry());
    }

    #[test]
    fn with_bracket_attaches_levels() {
        let intent = OrderIntent::enter_long().with_bracket(Bracket {
            stop: 95.0,
            target: 110.0,
        });
        let bracket = intent.bracket.unwrap();
        assert_eq!(bracket.stop, 95.0);
        assert_eq!(bracket.target, 110.0);
    }
}

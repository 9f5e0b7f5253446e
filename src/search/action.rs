use serde::{Deserialize, Serialize};

/// The closed trading alphabet. Legality and transitions are matched
/// exhaustively; there is no open-ended action dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeAction {
    Buy,
    Sell,
    DoNothing,
}

impl std::fmt::Display for TradeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "BUY"),
            TradeAction::Sell => write!(f, "SELL"),
            TradeAction::DoNothing => write!(f, "DO_NOTHING"),
        }
    }
}

/// Legal successor actions for a state described by the action that reached
/// it and the holding it carries.
///
/// Three-state machine:
/// - FLAT (no holding)            -> {Buy, DoNothing}
/// - HOLDING (any nonzero holding) -> {Sell, DoNothing}
/// - SOLD                          -> terminal, no successors
///
/// A nonzero holding behaves as HOLDING regardless of how it was acquired:
/// a root seeded with `holding > 0` but no explicit prior Buy gets the same
/// {Sell, DoNothing} set as a just-executed Buy.
///
/// Slice order is the tie-break order everywhere downstream (expansion
/// creates children in this order, selection takes the first maximum).
pub fn legal_actions(action: TradeAction, holding: f64) -> &'static [TradeAction] {
    match action {
        TradeAction::Sell => &[],
        TradeAction::Buy => &[TradeAction::Sell, TradeAction::DoNothing],
        TradeAction::DoNothing => {
            if holding > 0.0 {
                &[TradeAction::Sell, TradeAction::DoNothing]
            } else {
                &[TradeAction::Buy, TradeAction::DoNothing]
            }
        }
    }
}

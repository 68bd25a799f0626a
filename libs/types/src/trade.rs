//! Virtual trades tracked per symbol

use crate::signal::{Direction, Signal};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeStatus {
    Open,
}

/// Active trade plan. At most one exists per symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub symbol: String,
    pub direction: Direction,
    pub entry: Decimal,
    pub stop_loss: Decimal,
    pub tp1: Decimal,
    pub tp2: Decimal,
    pub tp3: Decimal,
    /// Stop moved to entry. Stored only; nothing in the engine flips it.
    pub breakeven: bool,
    pub status: TradeStatus,
}

impl From<&Signal> for Trade {
    fn from(signal: &Signal) -> Self {
        Self {
            symbol: signal.symbol.clone(),
            direction: signal.direction,
            entry: signal.entry,
            stop_loss: signal.stop_loss,
            tp1: signal.tp1,
            tp2: signal.tp2,
            tp3: signal.tp3,
            breakeven: false,
            status: TradeStatus::Open,
        }
    }
}

//! Confirmed crossover signals

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade direction of a crossover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => f.write_str("LONG"),
            Direction::Short => f.write_str("SHORT"),
        }
    }
}

/// Risk-managed trade plan produced once per confirmed crossover.
///
/// Converted into a [`crate::Trade`] as soon as it is emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub symbol: String,
    pub direction: Direction,
    pub entry: Decimal,
    pub stop_loss: Decimal,
    pub tp1: Decimal,
    pub tp2: Decimal,
    pub tp3: Decimal,
    /// Position size in base units, rounded to 3 decimals
    pub size: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl Signal {
    /// Distance between entry and stop
    pub fn risk_per_unit(&self) -> Decimal {
        (self.entry - self.stop_loss).abs()
    }
}

//! Daily performance counters

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Resolution of a trade, counted in the daily stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Tp1,
    Tp2,
    Tp3,
    StopLoss,
}

/// Counters for one UTC day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub date: NaiveDate,
    pub signals: u64,
    pub tp1: u64,
    pub tp2: u64,
    pub tp3: u64,
    pub sl: u64,
}

impl StatsSnapshot {
    /// All-zero snapshot stamped with `date`
    pub fn fresh(date: NaiveDate) -> Self {
        Self {
            date,
            signals: 0,
            tp1: 0,
            tp2: 0,
            tp3: 0,
            sl: 0,
        }
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Tp1 => self.tp1 += 1,
            Outcome::Tp2 => self.tp2 += 1,
            Outcome::Tp3 => self.tp3 += 1,
            Outcome::StopLoss => self.sl += 1,
        }
    }

    pub fn wins(&self) -> u64 {
        self.tp1 + self.tp2 + self.tp3
    }

    /// `wins / signals * 100` rounded to 2 decimals, 0 without signals
    pub fn win_rate(&self) -> Decimal {
        if self.signals == 0 {
            return Decimal::ZERO;
        }
        let rate = Decimal::from(self.wins()) * Decimal::ONE_HUNDRED / Decimal::from(self.signals);
        rate.round_dp(2).normalize()
    }
}

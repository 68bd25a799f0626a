//! In-memory trade registry and daily statistics
//!
//! One owner for the active trades and the day's counters. Every operation
//! is a single critical section, so a scan task writing a signal and the
//! stats command reading a snapshot never observe a half-applied update.

use chrono::NaiveDate;
use parking_lot::Mutex;
use std::collections::HashMap;
use types::{Outcome, Signal, StatsSnapshot, Trade};

#[derive(Debug)]
struct RegistryState {
    trades: HashMap<String, Trade>,
    stats: StatsSnapshot,
}

/// Active trades keyed by symbol plus the current day's stats
#[derive(Debug)]
pub struct TradeRegistry {
    state: Mutex<RegistryState>,
}

impl TradeRegistry {
    /// Empty registry with stats stamped `today`
    pub fn new(today: NaiveDate) -> Self {
        Self {
            state: Mutex::new(RegistryState {
                trades: HashMap::new(),
                stats: StatsSnapshot::fresh(today),
            }),
        }
    }

    /// Store a trade, replacing any existing trade for the symbol
    pub fn upsert_trade(&self, symbol: &str, trade: Trade) -> Option<Trade> {
        self.state.lock().trades.insert(symbol.to_string(), trade)
    }

    /// Store the signal's trade and count the signal in one step.
    ///
    /// Returns the trade it replaced, if any.
    pub fn record_signal(&self, signal: &Signal) -> Option<Trade> {
        let mut state = self.state.lock();
        let replaced = state
            .trades
            .insert(signal.symbol.clone(), Trade::from(signal));
        state.stats.signals += 1;
        replaced
    }

    pub fn get_trade(&self, symbol: &str) -> Option<Trade> {
        self.state.lock().trades.get(symbol).cloned()
    }

    /// Number of distinct symbols with a stored trade
    pub fn active_count(&self) -> usize {
        self.state.lock().trades.len()
    }

    pub fn stats_snapshot(&self) -> StatsSnapshot {
        self.state.lock().stats.clone()
    }

    /// Stats and active count read under the same lock
    pub fn dashboard(&self) -> (StatsSnapshot, usize) {
        let state = self.state.lock();
        (state.stats.clone(), state.trades.len())
    }

    /// Count a trade outcome. Nothing in the scanner resolves trades yet; this
    /// is the hook a price-tracking loop would call.
    pub fn increment_outcome(&self, outcome: Outcome) {
        self.state.lock().stats.record(outcome);
    }

    /// Replace the stats with a zeroed snapshot when `today` differs from the
    /// stored date. Returns whether a roll happened.
    pub fn maybe_roll_day(&self, today: NaiveDate) -> bool {
        let mut state = self.state.lock();
        if state.stats.date == today {
            return false;
        }
        state.stats = StatsSnapshot::fresh(today);
        true
    }
}

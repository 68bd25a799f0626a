//! Technical indicators for signal generation
//!
//! Pure functions over closes and candles. Anything that needs more history
//! than it is given returns `None` instead of extrapolating.

use rust_decimal::Decimal;
use std::collections::VecDeque;
use types::Candle;

/// Simple Moving Average calculator
#[derive(Debug, Clone)]
pub struct MovingAverage {
    period: usize,
    values: VecDeque<Decimal>,
    sum: Decimal,
}

impl MovingAverage {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            values: VecDeque::with_capacity(period),
            sum: Decimal::ZERO,
        }
    }

    /// Add a new value and return current MA
    pub fn update(&mut self, value: Decimal) -> Option<Decimal> {
        self.values.push_back(value);
        self.sum += value;

        if self.values.len() > self.period {
            if let Some(old_value) = self.values.pop_front() {
                self.sum -= old_value;
            }
        }

        self.current()
    }

    /// Get current moving average without adding new value
    pub fn current(&self) -> Option<Decimal> {
        if self.period > 0 && self.values.len() == self.period {
            Some(self.sum / Decimal::from(self.period))
        } else {
            None
        }
    }
}

/// Mean of the last `period` values
pub fn sma(values: &[Decimal], period: usize) -> Option<Decimal> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    let sum: Decimal = window.iter().sum();
    Some(sum / Decimal::from(period))
}

/// SMA ending at each of the last `count` positions, oldest first.
///
/// `None` unless every requested position has a full window.
pub fn sma_tail(values: &[Decimal], period: usize, count: usize) -> Option<Vec<Decimal>> {
    if period == 0 || count == 0 || values.len() < period + count - 1 {
        return None;
    }

    let start = values.len() - (period + count - 1);
    let mut ma = MovingAverage::new(period);
    let averages: Vec<Decimal> = values[start..]
        .iter()
        .filter_map(|&value| ma.update(value))
        .collect();

    (averages.len() == count).then_some(averages)
}

/// `max(high - low, |high - prev_close|, |low - prev_close|)`
pub fn true_range(candle: &Candle, prev_close: Decimal) -> Decimal {
    let range = candle.high - candle.low;
    let up = (candle.high - prev_close).abs();
    let down = (candle.low - prev_close).abs();
    range.max(up).max(down)
}

/// Average True Range over the trailing `period` bars ending at the latest bar.
///
/// Every bar in the window needs a previous close, so `period + 1` candles
/// are required.
pub fn atr(candles: &[Candle], period: usize) -> Option<Decimal> {
    if period == 0 || candles.len() < period + 1 {
        return None;
    }

    let window = &candles[candles.len() - (period + 1)..];
    let total: Decimal = window
        .windows(2)
        .map(|pair| true_range(&pair[1], pair[0].close))
        .sum();

    Some(total / Decimal::from(period))
}

/// Close prices in series order
pub fn closes(candles: &[Candle]) -> Vec<Decimal> {
    candles.iter().map(|c| c.close).collect()
}

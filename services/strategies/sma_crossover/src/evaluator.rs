//! Per-symbol signal evaluation
//!
//! Fetches the entry (15m) and confirmation (1h, 4h) series concurrently,
//! looks for a crossover on the entry series, checks it against the higher
//! timeframes and, if confirmed, sizes the trade. The evaluator never writes
//! state; the scanner records and delivers what it returns.

use adapter_service::MarketDataSource;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use types::{CandleSeries, Direction, Signal, Timeframe};

use crate::config::{IndicatorConfig, RiskConfig, ScannerConfig};
use crate::error::{Result, StrategyError};
use crate::indicators::{atr, closes};
use crate::signals::{build_signal, detect_crossover, is_confirmed, is_uptrend};

/// Timeframe crossovers are detected on
pub const ENTRY_TIMEFRAME: Timeframe = Timeframe::M15;

/// Timeframes that must agree with the entry cross
pub const CONFIRMATION_TIMEFRAMES: [Timeframe; 2] = [Timeframe::H1, Timeframe::H4];

/// What one symbol produced in one cycle
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// Confirmed crossover with a full trade plan
    Signal(Signal),
    /// No crossover on the entry timeframe
    NoCross,
    /// Crossover the higher timeframes did not back
    Unconfirmed(Direction),
    /// A series was too short for the indicators
    InsufficientHistory { timeframe: Timeframe, bars: usize },
    /// Zero ATR, so no stop distance to size against
    DegenerateRisk,
    /// At least one fetch failed
    FetchFailed(String),
}

impl Evaluation {
    pub fn is_signal(&self) -> bool {
        matches!(self, Evaluation::Signal(_))
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluation::Signal(signal) => write!(f, "{} signal", signal.direction),
            Evaluation::NoCross => f.write_str("no cross"),
            Evaluation::Unconfirmed(direction) => write!(f, "unconfirmed {} cross", direction),
            Evaluation::InsufficientHistory { timeframe, bars } => {
                write!(f, "insufficient {} history ({} bars)", timeframe, bars)
            }
            Evaluation::DegenerateRisk => f.write_str("zero ATR"),
            Evaluation::FetchFailed(reason) => write!(f, "fetch failed: {}", reason),
        }
    }
}

pub struct SignalEvaluator {
    source: Arc<dyn MarketDataSource>,
    periods: IndicatorConfig,
    risk: RiskConfig,
    candle_limit: u32,
    entry_bars: usize,
    confirmation_bars: usize,
}

impl SignalEvaluator {
    pub fn new(source: Arc<dyn MarketDataSource>, config: &ScannerConfig) -> Self {
        Self {
            source,
            periods: config.indicators,
            risk: config.risk.clone(),
            candle_limit: config.candle_limit,
            entry_bars: config.entry_bars_required(),
            confirmation_bars: config.confirmation_bars_required(),
        }
    }

    pub async fn evaluate(&self, symbol: &str, now: DateTime<Utc>) -> Evaluation {
        let (entry, h1, h4) = match self.fetch_all(symbol).await {
            Ok(series) => series,
            Err(e) => return Evaluation::FetchFailed(e.to_string()),
        };

        if entry.len() < self.entry_bars {
            return Evaluation::InsufficientHistory {
                timeframe: ENTRY_TIMEFRAME,
                bars: entry.len(),
            };
        }

        let entry_closes = closes(entry.candles());
        let Some(direction) = detect_crossover(&entry_closes, self.periods) else {
            return Evaluation::NoCross;
        };

        for series in [&h1, &h4] {
            if series.len() < self.confirmation_bars {
                return Evaluation::InsufficientHistory {
                    timeframe: series.timeframe,
                    bars: series.len(),
                };
            }
        }

        let h1_up = is_uptrend(&closes(h1.candles()), self.periods);
        let h4_up = is_uptrend(&closes(h4.candles()), self.periods);
        if !is_confirmed(direction, h1_up, h4_up) {
            debug!(
                symbol = %symbol,
                h1_uptrend = h1_up,
                h4_uptrend = h4_up,
                "{} cross not confirmed",
                direction
            );
            return Evaluation::Unconfirmed(direction);
        }

        // Length checked above, so both are defined
        let (Some(entry_price), Some(atr)) =
            (entry.last_close(), atr(entry.candles(), self.risk.atr_period))
        else {
            return Evaluation::InsufficientHistory {
                timeframe: ENTRY_TIMEFRAME,
                bars: entry.len(),
            };
        };

        match build_signal(symbol, direction, entry_price, atr, &self.risk, now) {
            Some(signal) => Evaluation::Signal(signal),
            None => Evaluation::DegenerateRisk,
        }
    }

    async fn fetch_all(&self, symbol: &str) -> Result<(CandleSeries, CandleSeries, CandleSeries)> {
        let [h1_tf, h4_tf] = CONFIRMATION_TIMEFRAMES;
        let fetch = |timeframe: Timeframe| async move {
            self.source
                .fetch_candles(symbol, timeframe, self.candle_limit)
                .await
                .map_err(|source| StrategyError::MarketData {
                    symbol: symbol.to_string(),
                    source,
                })
        };

        tokio::try_join!(fetch(ENTRY_TIMEFRAME), fetch(h1_tf), fetch(h4_tf))
    }
}

impl fmt::Debug for SignalEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalEvaluator")
            .field("periods", &self.periods)
            .field("risk", &self.risk)
            .field("candle_limit", &self.candle_limit)
            .finish_non_exhaustive()
    }
}

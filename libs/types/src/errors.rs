//! Validation errors for domain values parsed from configuration or the wire

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Interval string not understood by the scanner
    #[error("Unknown timeframe: '{0}'")]
    UnknownTimeframe(String),

    /// Candle whose high is below its low
    #[error("Invalid candle at {open_time_ms}: high {high} < low {low}")]
    InvertedRange {
        open_time_ms: i64,
        high: String,
        low: String,
    },

    /// Open time not representable as a UTC timestamp
    #[error("Invalid open time: {0}")]
    InvalidTimestamp(i64),
}

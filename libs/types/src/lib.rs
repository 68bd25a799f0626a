//! # Scanner Domain Types
//!
//! Shared vocabulary for every crate in the workspace: the market data the
//! adapters produce, the signals the strategy derives from it and the
//! in-memory trade/stat records the registry keeps.
//!
//! ## Design Philosophy
//!
//! - **No Precision Loss**: prices, sizes and levels are `rust_decimal::Decimal`
//! - **Immutable Market Data**: a [`Candle`] never changes once fetched, a
//!   [`CandleSeries`] is owned by exactly one (symbol, timeframe) pair
//! - **Derived, Not Stored**: the win rate is computed from the counters in
//!   [`StatsSnapshot`] on demand
//!
//! ## Quick Start
//!
//! ```rust
//! use types::{Direction, StatsSnapshot, Timeframe};
//! use chrono::NaiveDate;
//!
//! let tf: Timeframe = "15m".parse().unwrap();
//! assert_eq!(tf, Timeframe::M15);
//! assert_eq!(Direction::Long.to_string(), "LONG");
//!
//! let stats = StatsSnapshot::fresh(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
//! assert_eq!(stats.signals, 0);
//! ```

pub mod candle;
pub mod errors;
pub mod signal;
pub mod stats;
pub mod timeframe;
pub mod trade;

pub use candle::{Candle, CandleSeries};
pub use errors::ValidationError;
pub use signal::{Direction, Signal};
pub use stats::{Outcome, StatsSnapshot};
pub use timeframe::Timeframe;
pub use trade::{Trade, TradeStatus};

pub use rust_decimal::Decimal;

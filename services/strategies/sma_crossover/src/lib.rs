//! # SMA Crossover Scanner
//!
//! Polls Binance USDT-M futures for 15m/1h/4h candles across a fixed
//! universe, detects SMA(5)/SMA(50) crossovers on the 15m series, confirms
//! them against the 1h and 4h trend and turns confirmed crosses into
//! ATR-based trade plans with risk-sized positions.
//!
//! ## Components
//!
//! - [`indicators`]: SMA and ATR over candle series
//! - [`signals`]: crossover detection, trend confirmation, levels and sizing
//! - [`evaluator`]: one symbol, three timeframes, one [`Evaluation`]
//! - [`registry`]: active trades and daily stats behind one lock
//! - [`scanner`]: the cycle loop and per-cycle reporting
//! - [`commands`]: the read-only `/stats` command
//!
//! Market data and alert delivery go through the traits in `adapter_service`,
//! so everything here runs against in-memory fakes in tests.

pub mod commands;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod registry;
pub mod scanner;
pub mod signals;

pub use config::{IndicatorConfig, RiskConfig, ScannerConfig};
pub use error::{Result, StrategyError};
pub use evaluator::{Evaluation, SignalEvaluator};
pub use metrics::{MetricsSnapshot, ScanMetrics};
pub use registry::TradeRegistry;
pub use scanner::{CycleReport, Scanner, SymbolOutcome};

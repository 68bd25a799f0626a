//! # Scanner Adapters
//!
//! Boundary between the crossover scanner and the outside world.
//!
//! ## Input
//!
//! - [`input::MarketDataSource`]: candles and prices, implemented by
//!   [`BinanceFuturesClient`] over the USDT-M futures REST API
//! - [`input::CommandSource`]: bot commands, implemented by
//!   [`TelegramCommandSource`] over `getUpdates` long polling
//!
//! ## Output
//!
//! - [`output::Notifier`]: alert delivery, implemented by
//!   [`TelegramNotifier`] and [`LogNotifier`] (dry runs)
//!
//! Adapters hold no trading state. Failures are returned as [`AdapterError`]
//! and the caller decides whether a failure costs a symbol, a cycle or nothing.
//! Outbound exchange requests share one [`RateLimiter`] per client and are
//! retried while [`AdapterError::is_recoverable`] holds.

pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod rate_limit;
pub mod telegram;

pub use config::{BinanceConfig, TelegramConfig};
pub use error::{AdapterError, Result};
pub use input::{
    BinanceFuturesClient, CommandSource, InboundCommand, MarketDataSource, TelegramCommandSource,
};
pub use output::{LogNotifier, Notifier, TelegramNotifier};
pub use rate_limit::RateLimiter;
pub use telegram::TelegramClient;

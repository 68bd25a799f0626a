//! Service configuration defaults
//!
//! Default values shared by the adapters and the strategy so that a missing
//! setting resolves to the same value everywhere.

/// Binance USDT-M futures REST defaults
pub mod binance {
    /// Futures REST base URL
    pub const FUTURES_BASE_URL: &str = "https://fapi.binance.com";

    /// Per-request timeout (milliseconds)
    pub const REQUEST_TIMEOUT_MS: u64 = 10_000;

    /// Retries after the first failed attempt
    pub const MAX_RETRIES: u32 = 2;

    /// Highest accepted `max_retries`
    pub const MAX_RETRIES_LIMIT: u32 = 10;

    /// Base delay for exponential retry backoff (milliseconds)
    pub const RETRY_BACKOFF_BASE_MS: u64 = 250;

    /// Ceiling for a single retry delay (milliseconds)
    pub const MAX_RETRY_BACKOFF_MS: u64 = 30_000;

    /// Request budget, well under the exchange weight limit
    pub const REQUESTS_PER_MINUTE: u32 = 1_200;
}

/// Telegram Bot API defaults
pub mod telegram {
    /// Bot API base URL
    pub const API_BASE_URL: &str = "https://api.telegram.org";

    /// Long-poll timeout for getUpdates (seconds)
    pub const POLL_TIMEOUT_SECS: u64 = 30;

    /// Delay after a failed poll before retrying (milliseconds)
    pub const POLL_ERROR_BACKOFF_MS: u64 = 5_000;
}

/// Scanner cadence defaults
pub mod scanner {
    /// Pause between scan cycles (seconds)
    pub const SCAN_INTERVAL_SECS: u64 = 25;

    /// Candles requested per timeframe
    pub const CANDLE_LIMIT: u32 = 150;

    /// Upper bound on symbols evaluated at once
    pub const MAX_CONCURRENT_SYMBOLS: usize = 32;

    /// Default configuration file, relative to the working directory
    pub const CONFIG_PATH: &str = "config/scanner.toml";
}

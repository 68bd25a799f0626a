//! Configuration for the Binance and Telegram adapters

use serde::{Deserialize, Serialize};
use service_config::service::{binance, telegram};

/// Binance USDT-M futures REST client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BinanceConfig {
    /// REST base URL
    pub base_url: String,

    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,

    /// Retries after the first failed attempt
    pub max_retries: u32,

    /// Base delay for exponential backoff in milliseconds
    pub retry_backoff_ms: u64,

    /// Client-side request budget; 0 disables limiting
    pub requests_per_minute: u32,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            base_url: binance::FUTURES_BASE_URL.to_string(),
            request_timeout_ms: binance::REQUEST_TIMEOUT_MS,
            max_retries: binance::MAX_RETRIES,
            retry_backoff_ms: binance::RETRY_BACKOFF_BASE_MS,
            requests_per_minute: binance::REQUESTS_PER_MINUTE,
        }
    }
}

/// Telegram bot settings for alerts and the stats command
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Send alerts and answer commands through the Bot API
    pub enabled: bool,

    /// Bot API base URL
    pub api_base_url: String,

    /// Bot token issued by BotFather
    pub bot_token: String,

    /// Chat receiving alerts
    pub chat_id: String,

    /// Long-poll timeout for getUpdates in seconds
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_base_url: telegram::API_BASE_URL.to_string(),
            bot_token: String::new(),
            chat_id: String::new(),
            poll_timeout_secs: telegram::POLL_TIMEOUT_SECS,
        }
    }
}

impl TelegramConfig {
    /// Token hidden for logging
    pub fn redacted_token(&self) -> String {
        match self.bot_token.split_once(':') {
            Some((bot_id, _)) => format!("{}:***", bot_id),
            None if self.bot_token.is_empty() => String::new(),
            None => "***".to_string(),
        }
    }
}

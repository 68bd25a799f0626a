//! Error types for the crossover scanner

use adapter_service::AdapterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Market data error for {symbol}: {source}")]
    MarketData {
        symbol: String,
        #[source]
        source: AdapterError,
    },

    #[error("Notification error via {channel}: {source}")]
    Notification {
        channel: String,
        #[source]
        source: AdapterError,
    },
}

impl StrategyError {
    pub fn configuration(message: impl Into<String>) -> Self {
        StrategyError::Configuration {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StrategyError>;

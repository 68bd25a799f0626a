//! Error types for the adapters module

use thiserror::Error;

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Main error type for adapter operations
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Transport-level failure (connect, TLS, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the remote API
    #[error("HTTP {status} from {endpoint}: {body}")]
    HttpStatus {
        /// Path that was requested
        endpoint: String,
        /// Status code returned
        status: u16,
        /// Response body, truncated
        body: String,
    },

    /// Request exceeded the configured timeout
    #[error("Request to {endpoint} timed out after {timeout_ms}ms")]
    Timeout {
        /// Path that was requested
        endpoint: String,
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// JSON parsing error from the response body
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Parse error in exchange data
    #[error("Parse error: {message} - {error}")]
    ParseError {
        /// Description of what was being parsed
        message: String,
        /// Underlying error message
        error: String,
    },

    /// Required field missing from exchange message
    #[error("Missing required field: {field}")]
    MissingField {
        /// The field that was missing
        field: String,
    },

    /// Candle data failed domain validation
    #[error("Invalid market data: {0}")]
    Validation(#[from] types::ValidationError),

    /// Telegram Bot API answered `ok: false`
    #[error("Telegram API error: {description}")]
    TelegramApi {
        /// Description returned by the Bot API
        description: String,
    },

    /// Configuration error in adapter settings
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AdapterError {
    /// Check if this error is recoverable through retry
    pub fn is_recoverable(&self) -> bool {
        match self {
            AdapterError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            AdapterError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            AdapterError::Timeout { .. } => true,
            _ => false,
        }
    }
}

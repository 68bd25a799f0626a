//! Binance USDT-M futures REST collector
//!
//! Polls `/fapi/v1/klines` and `/fapi/v1/ticker/price`. Every request goes
//! through the shared rate limiter, carries a timeout, and is retried with
//! exponential backoff while the failure is recoverable (timeouts, connection
//! errors, 429 and 5xx).

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use service_config::service::binance::MAX_RETRY_BACKOFF_MS;
use std::str::FromStr;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};
use types::{Candle, CandleSeries, Timeframe};

use super::MarketDataSource;
use crate::config::BinanceConfig;
use crate::rate_limit::RateLimiter;
use crate::{AdapterError, Result};

const KLINES_PATH: &str = "/fapi/v1/klines";
const TICKER_PRICE_PATH: &str = "/fapi/v1/ticker/price";

/// Longest response body kept in an error message
const ERROR_BODY_LIMIT: usize = 256;

#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: String,
}

/// REST client for Binance USDT-M futures market data
#[derive(Debug, Clone)]
pub struct BinanceFuturesClient {
    config: BinanceConfig,
    http: reqwest::Client,
    rate_limiter: RateLimiter,
}

impl BinanceFuturesClient {
    pub fn new(config: BinanceConfig) -> Result<Self> {
        if !config.base_url.starts_with("https://") && !config.base_url.starts_with("http://") {
            return Err(AdapterError::Configuration(format!(
                "Invalid Binance base URL: {}",
                config.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| {
                AdapterError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        let rate_limiter = RateLimiter::per_minute(config.requests_per_minute);

        Ok(Self {
            config,
            http,
            rate_limiter,
        })
    }

    /// GET with rate limiting and bounded retry
    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let mut attempt: u32 = 0;

        loop {
            self.rate_limiter.wait().await;

            match self.get_once(path, query).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_recoverable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    let backoff = retry_delay(self.config.retry_backoff_ms, attempt);
                    warn!(
                        "GET {} failed (attempt {}/{}): {}. Retrying in {:?}",
                        path,
                        attempt,
                        self.config.max_retries + 1,
                        e,
                        backoff
                    );
                    sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);

        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.classify(path, e))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.classify(path, e))?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            return Err(AdapterError::HttpStatus {
                endpoint: path.to_string(),
                status: status.as_u16(),
                body: text.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }

    fn classify(&self, path: &str, error: reqwest::Error) -> AdapterError {
        if error.is_timeout() {
            AdapterError::Timeout {
                endpoint: path.to_string(),
                timeout_ms: self.config.request_timeout_ms,
            }
        } else {
            AdapterError::Http(error)
        }
    }
}

/// Delay before retry `attempt` (1-based): `base * 2^(attempt-1)`, capped
/// at `MAX_RETRY_BACKOFF_MS`
pub fn retry_delay(base_ms: u64, attempt: u32) -> Duration {
    let factor = 1u64
        .checked_shl(attempt.saturating_sub(1))
        .unwrap_or(u64::MAX);
    Duration::from_millis(base_ms.saturating_mul(factor).min(MAX_RETRY_BACKOFF_MS))
}

#[async_trait]
impl MarketDataSource for BinanceFuturesClient {
    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: u32,
    ) -> Result<CandleSeries> {
        let query = [
            ("symbol", symbol.to_string()),
            ("interval", timeframe.as_str().to_string()),
            ("limit", limit.to_string()),
        ];
        let rows: Vec<Vec<Value>> = self.get_json(KLINES_PATH, &query).await?;
        let series = parse_klines(symbol, timeframe, &rows)?;

        debug!(
            symbol = %symbol,
            timeframe = %timeframe,
            "Fetched {} candles",
            series.len()
        );
        Ok(series)
    }

    async fn fetch_price(&self, symbol: &str) -> Result<Decimal> {
        let query = [("symbol", symbol.to_string())];
        let ticker: TickerPrice = self.get_json(TICKER_PRICE_PATH, &query).await?;
        parse_decimal(&Value::String(ticker.price), "price")
    }
}

/// Convert kline rows (oldest first) into a candle series.
///
/// Row layout: `[open_time, open, high, low, close, volume, close_time, ...]`
/// with prices as decimal strings.
pub fn parse_klines(symbol: &str, timeframe: Timeframe, rows: &[Vec<Value>]) -> Result<CandleSeries> {
    let candles = rows
        .iter()
        .map(|row| parse_kline_row(row))
        .collect::<Result<Vec<Candle>>>()?;

    Ok(CandleSeries::new(symbol, timeframe, candles))
}

fn parse_kline_row(row: &[Value]) -> Result<Candle> {
    if row.len() < 6 {
        return Err(AdapterError::ParseError {
            message: "Kline row too short".to_string(),
            error: format!("expected at least 6 fields, got {}", row.len()),
        });
    }

    let open_time_ms = row[0].as_i64().ok_or_else(|| AdapterError::MissingField {
        field: "open_time".to_string(),
    })?;

    let candle = Candle::from_millis(
        open_time_ms,
        parse_decimal(&row[1], "open")?,
        parse_decimal(&row[2], "high")?,
        parse_decimal(&row[3], "low")?,
        parse_decimal(&row[4], "close")?,
        parse_decimal(&row[5], "volume")?,
    )?;
    Ok(candle)
}

fn parse_decimal(value: &Value, field: &str) -> Result<Decimal> {
    let raw = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => {
            return Err(AdapterError::MissingField {
                field: field.to_string(),
            })
        }
    };

    Decimal::from_str(&raw).map_err(|e| AdapterError::ParseError {
        message: format!("Invalid {}: {}", field, raw),
        error: e.to_string(),
    })
}

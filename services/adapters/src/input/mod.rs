//! Input adapters: market data and inbound bot commands

pub mod binance;
pub mod telegram;

pub use binance::BinanceFuturesClient;
pub use telegram::TelegramCommandSource;

use crate::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use types::{CandleSeries, Timeframe};

/// Source of historical candles and spot prices
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Most recent `limit` candles, oldest first. The last candle may still be forming.
    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: u32,
    ) -> Result<CandleSeries>;

    /// Latest traded price
    async fn fetch_price(&self, symbol: &str) -> Result<Decimal>;
}

/// A text message addressed to the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundCommand {
    pub chat_id: String,
    pub text: String,
}

impl InboundCommand {
    /// Command name without the leading slash or `@botname` suffix
    pub fn command(&self) -> Option<&str> {
        let first = self.text.split_whitespace().next()?;
        let name = first.strip_prefix('/')?;
        Some(name.split('@').next().unwrap_or(name))
    }
}

/// Source of commands sent to the bot
#[async_trait]
pub trait CommandSource: Send {
    /// Wait for the next batch of commands; may return an empty batch
    async fn poll(&mut self) -> Result<Vec<InboundCommand>>;

    /// Answer the chat a command came from
    async fn reply(&self, chat_id: &str, text: &str) -> Result<()>;
}

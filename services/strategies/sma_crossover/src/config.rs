//! Scanner configuration
//!
//! Every field has a default so the scanner starts with no file at all.
//! Values are layered: defaults, then `config/scanner.toml` (or the path from
//! `--config` / `SCANNER_CONFIG_PATH`), then `SCANNER__*` environment
//! variables, then the bare `BOT_TOKEN` / `CHAT_ID` variables.
//!
//! ```toml
//! symbols = ["BTCUSDT", "ETHUSDT"]
//! scan_interval_secs = 25
//!
//! [risk]
//! account_balance = 1000
//! risk_percent = 2
//!
//! [telegram]
//! chat_id = "123456"
//! ```

use adapter_service::{BinanceConfig, TelegramConfig};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use service_config::service::{binance, scanner};
use service_config::{resolve_config_path, ConfigLoader};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::StrategyError;

/// Environment prefix for `SCANNER__SECTION__KEY` overrides
pub const ENV_PREFIX: &str = "SCANNER";

/// Variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "SCANNER_CONFIG_PATH";

/// Default USDT-M perpetual universe
pub const DEFAULT_SYMBOLS: [&str; 30] = [
    "BTCUSDT", "ETHUSDT", "BNBUSDT", "SOLUSDT", "XRPUSDT", "ADAUSDT", "AVAXUSDT", "LINKUSDT",
    "DOGEUSDT", "LTCUSDT", "TRXUSDT", "DOTUSDT", "ATOMUSDT", "NEARUSDT", "APTUSDT", "ARBUSDT",
    "OPUSDT", "INJUSDT", "FILUSDT", "SUIUSDT", "RNDRUSDT", "SEIUSDT", "TIAUSDT", "AAVEUSDT",
    "FTMUSDT", "GALAUSDT", "ALGOUSDT", "EGLDUSDT", "ICPUSDT", "THETAUSDT",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Symbols scanned every cycle, in order
    pub symbols: Vec<String>,

    /// Minimum time between the starts of two cycles
    pub scan_interval_secs: u64,

    /// Candles requested per timeframe
    pub candle_limit: u32,

    /// Symbols evaluated at once; every symbol is still attempted each cycle
    pub max_concurrent_symbols: usize,

    /// Emit JSON log lines instead of human-readable ones
    pub log_json: bool,

    pub indicators: IndicatorConfig,
    pub risk: RiskConfig,
    pub binance: BinanceConfig,
    pub telegram: TelegramConfig,
}

/// Moving average periods shared by crossover detection and trend confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub fast_period: usize,
    pub slow_period: usize,
}

/// Position sizing and stop distance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Notional account size the risk percentage applies to
    pub account_balance: Decimal,

    /// Percentage of the balance lost if the stop is hit
    pub risk_percent: Decimal,

    /// ATR lookback on the entry timeframe
    pub atr_period: usize,

    /// Stop distance in ATRs
    pub atr_multiplier: Decimal,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            scan_interval_secs: scanner::SCAN_INTERVAL_SECS,
            candle_limit: scanner::CANDLE_LIMIT,
            max_concurrent_symbols: scanner::MAX_CONCURRENT_SYMBOLS,
            log_json: false,
            indicators: IndicatorConfig::default(),
            risk: RiskConfig::default(),
            binance: BinanceConfig::default(),
            telegram: TelegramConfig::default(),
        }
    }
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            fast_period: 5,
            slow_period: 50,
        }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            account_balance: dec!(1000),
            risk_percent: dec!(2),
            atr_period: 14,
            atr_multiplier: dec!(1.5),
        }
    }
}

impl ScannerConfig {
    /// Load from the resolved file (if any) and the environment.
    ///
    /// An explicit path must exist; the environment/default path is optional.
    pub fn load(explicit_path: Option<PathBuf>) -> Result<Self> {
        let loader = match explicit_path {
            Some(path) => ConfigLoader::new(ENV_PREFIX).with_file(path),
            None => ConfigLoader::new(ENV_PREFIX).with_optional_file(resolve_config_path(
                None,
                CONFIG_PATH_ENV,
                scanner::CONFIG_PATH,
            )),
        };

        let mut config: ScannerConfig = loader
            .list_key("symbols")
            .env_alias("BOT_TOKEN", "telegram.bot_token")
            .env_alias("CHAT_ID", "telegram.chat_id")
            .load()
            .context("Failed to load scanner configuration")?;

        config.normalize_symbols();
        Ok(config)
    }

    /// Uppercase, trim and de-duplicate symbols, keeping first occurrence order
    pub fn normalize_symbols(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.symbols = self
            .symbols
            .iter()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty() && seen.insert(s.clone()))
            .collect();
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    /// Bars the entry timeframe needs: a crossover compares two bars of the
    /// slow average and ATR needs one bar before its window
    pub fn entry_bars_required(&self) -> usize {
        (self.indicators.slow_period + 1).max(self.risk.atr_period + 1)
    }

    /// Bars a confirmation timeframe needs for the trend check
    pub fn confirmation_bars_required(&self) -> usize {
        self.indicators.slow_period
    }

    pub fn validate(&self) -> std::result::Result<(), StrategyError> {
        if self.symbols.is_empty() {
            return Err(StrategyError::configuration("Symbol universe is empty"));
        }
        if self.scan_interval_secs == 0 {
            return Err(StrategyError::configuration(
                "scan_interval_secs must be greater than zero",
            ));
        }
        if self.max_concurrent_symbols == 0 {
            return Err(StrategyError::configuration(
                "max_concurrent_symbols must be greater than zero",
            ));
        }
        if self.indicators.fast_period == 0
            || self.indicators.fast_period >= self.indicators.slow_period
        {
            return Err(StrategyError::configuration(format!(
                "fast_period ({}) must be positive and below slow_period ({})",
                self.indicators.fast_period, self.indicators.slow_period
            )));
        }
        if self.risk.atr_period == 0 {
            return Err(StrategyError::configuration("atr_period must be positive"));
        }
        if (self.candle_limit as usize) < self.entry_bars_required() {
            return Err(StrategyError::configuration(format!(
                "candle_limit {} is below the {} bars the indicators need",
                self.candle_limit,
                self.entry_bars_required()
            )));
        }
        if self.binance.max_retries > binance::MAX_RETRIES_LIMIT {
            return Err(StrategyError::configuration(format!(
                "binance.max_retries {} exceeds the limit of {}",
                self.binance.max_retries,
                binance::MAX_RETRIES_LIMIT
            )));
        }
        if self.risk.account_balance <= Decimal::ZERO {
            return Err(StrategyError::configuration(
                "account_balance must be positive",
            ));
        }
        if self.risk.risk_percent <= Decimal::ZERO || self.risk.risk_percent > dec!(100) {
            return Err(StrategyError::configuration(format!(
                "risk_percent {} must be in (0, 100]",
                self.risk.risk_percent
            )));
        }
        if self.risk.atr_multiplier <= Decimal::ZERO {
            return Err(StrategyError::configuration(
                "atr_multiplier must be positive",
            ));
        }
        if self.telegram.enabled
            && (self.telegram.bot_token.trim().is_empty() || self.telegram.chat_id.trim().is_empty())
        {
            return Err(StrategyError::configuration(
                "Telegram is enabled but bot_token or chat_id is missing \
                 (set BOT_TOKEN and CHAT_ID, or run with --dry-run)",
            ));
        }
        Ok(())
    }
}

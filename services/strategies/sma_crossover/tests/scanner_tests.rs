//! Scanner and evaluator behaviour against in-memory market data

use adapter_service::{
    AdapterError, BinanceConfig, BinanceFuturesClient, MarketDataSource, Notifier,
    Result as AdapterResult,
};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sma_crossover::{
    Evaluation, ScanMetrics, Scanner, ScannerConfig, SignalEvaluator, TradeRegistry,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Barrier;
use types::{Candle, CandleSeries, Direction, Outcome, Timeframe};

/// Candle data keyed by (symbol, timeframe); missing keys fail like a dead endpoint
#[derive(Default)]
struct FakeMarket {
    series: HashMap<(String, Timeframe), Vec<Decimal>>,
    requests: AtomicUsize,
}

impl FakeMarket {
    fn with(mut self, symbol: &str, timeframe: Timeframe, closes: Vec<Decimal>) -> Self {
        self.series.insert((symbol.to_string(), timeframe), closes);
        self
    }

    /// Same closes for 15m, 1h and 4h
    fn with_symbol(self, symbol: &str, m15: Vec<Decimal>, h1: Vec<Decimal>, h4: Vec<Decimal>) -> Self {
        self.with(symbol, Timeframe::M15, m15)
            .with(symbol, Timeframe::H1, h1)
            .with(symbol, Timeframe::H4, h4)
    }
}

#[async_trait]
impl MarketDataSource for FakeMarket {
    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: u32,
    ) -> AdapterResult<CandleSeries> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let closes = self
            .series
            .get(&(symbol.to_string(), timeframe))
            .ok_or_else(|| AdapterError::HttpStatus {
                endpoint: "/fapi/v1/klines".to_string(),
                status: 503,
                body: "unavailable".to_string(),
            })?;

        let start = closes.len().saturating_sub(limit as usize);
        let candles = closes[start..]
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let open_time = (i as i64) * timeframe.duration_secs() as i64 * 1_000;
                Candle::from_millis(open_time, close, close + dec!(1), close - dec!(1), close, dec!(10))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CandleSeries::new(symbol, timeframe, candles))
    }

    async fn fetch_price(&self, symbol: &str) -> AdapterResult<Decimal> {
        self.series
            .get(&(symbol.to_string(), Timeframe::M15))
            .and_then(|closes| closes.last().copied())
            .ok_or_else(|| AdapterError::MissingField {
                field: "price".to_string(),
            })
    }
}

/// Holds every candle request until three are in flight at once
struct GatedMarket {
    inner: FakeMarket,
    gate: Barrier,
}

#[async_trait]
impl MarketDataSource for GatedMarket {
    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: u32,
    ) -> AdapterResult<CandleSeries> {
        self.gate.wait().await;
        self.inner.fetch_candles(symbol, timeframe, limit).await
    }

    async fn fetch_price(&self, symbol: &str) -> AdapterResult<Decimal> {
        self.inner.fetch_price(symbol).await
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
    fail: bool,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, text: &str) -> AdapterResult<()> {
        if self.fail {
            return Err(AdapterError::TelegramApi {
                description: "Forbidden: bot was blocked by the user".to_string(),
            });
        }
        self.sent.lock().push(text.to_string());
        Ok(())
    }
}

/// 45 bars at 100, five at 99, then 110: SMA5 crosses above SMA50 on the last bar
fn bullish_entry() -> Vec<Decimal> {
    let mut closes = vec![dec!(100); 45];
    closes.extend([dec!(99); 5]);
    closes.push(dec!(110));
    closes
}

/// Mirror of `bullish_entry`: crosses below on the last bar
fn bearish_entry() -> Vec<Decimal> {
    let mut closes = vec![dec!(100); 45];
    closes.extend([dec!(101); 5]);
    closes.push(dec!(90));
    closes
}

fn rising(n: usize) -> Vec<Decimal> {
    (1..=n).map(|i| Decimal::from(100 + i)).collect()
}

fn falling(n: usize) -> Vec<Decimal> {
    (1..=n).map(|i| Decimal::from(1_000 - i)).collect()
}

fn flat(n: usize) -> Vec<Decimal> {
    vec![dec!(100); n]
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

fn config(symbols: &[&str]) -> ScannerConfig {
    let mut config = ScannerConfig::default();
    config.symbols = symbols.iter().map(|s| s.to_string()).collect();
    config.telegram.enabled = false;
    config.max_concurrent_symbols = 4;
    config
}

struct Harness {
    scanner: Scanner,
    registry: Arc<TradeRegistry>,
    notifier: Arc<RecordingNotifier>,
    metrics: Arc<ScanMetrics>,
}

fn harness(config: &ScannerConfig, market: FakeMarket, notifier: RecordingNotifier) -> Harness {
    let evaluator = Arc::new(SignalEvaluator::new(Arc::new(market), config));
    let registry = Arc::new(TradeRegistry::new(today()));
    let notifier = Arc::new(notifier);
    let metrics = Arc::new(ScanMetrics::new());
    let scanner = Scanner::new(
        config,
        evaluator,
        Arc::clone(&registry),
        notifier.clone(),
        Arc::clone(&metrics),
    );
    Harness {
        scanner,
        registry,
        notifier,
        metrics,
    }
}

#[tokio::test]
async fn test_confirmed_long_end_to_end() {
    let market = FakeMarket::default()
        .with_symbol("BTCUSDT", bullish_entry(), rising(60), rising(60))
        .with_symbol("ETHUSDT", flat(60), rising(60), rising(60));
    let config = config(&["BTCUSDT", "ETHUSDT"]);
    let h = harness(&config, market, RecordingNotifier::default());

    let report = h.scanner.run_cycle(today()).await;

    assert_eq!(report.symbols, 2);
    assert_eq!(report.signals, 1);
    assert_eq!(report.no_cross, 1);
    assert_eq!(report.delivery_failures, 0);

    let trade = h.registry.get_trade("BTCUSDT").unwrap();
    assert_eq!(trade.direction, Direction::Long);
    assert_eq!(trade.entry, dec!(110));
    assert!(trade.stop_loss < trade.entry);
    assert!(trade.entry < trade.tp1 && trade.tp1 < trade.tp2 && trade.tp2 < trade.tp3);
    assert!(h.registry.get_trade("ETHUSDT").is_none());
    assert_eq!(h.registry.active_count(), 1);
    assert_eq!(h.registry.stats_snapshot().signals, 1);

    let sent = h.notifier.sent.lock();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].starts_with("LONG BTCUSDT\nEntry: 110.0000\nSL: "));
    assert!(sent[0].contains("\nSize: "));

    assert_eq!(h.metrics.get_metrics().signals, 1);
}

#[tokio::test]
async fn test_long_levels_follow_atr() {
    let market = FakeMarket::default().with_symbol("BTCUSDT", bullish_entry(), rising(60), rising(60));
    let config = config(&["BTCUSDT"]);
    let evaluator = SignalEvaluator::new(Arc::new(market), &config);

    let Evaluation::Signal(signal) = evaluator.evaluate("BTCUSDT", Utc::now()).await else {
        panic!("expected a signal");
    };

    // Ranges of 2 on every bar; the jump to 110 has a true range of 12
    let atr = (dec!(2) * dec!(13) + dec!(12)) / dec!(14);
    let risk = atr * dec!(1.5);
    assert_eq!(signal.stop_loss, dec!(110) - risk);
    assert_eq!(signal.tp1, dec!(110) + risk * dec!(1.5));
    assert_eq!(signal.tp2, dec!(110) + risk * dec!(2));
    assert_eq!(signal.tp3, dec!(110) + risk * dec!(3));
    assert_eq!(signal.size, (dec!(20) / risk).round_dp(3));
}

#[tokio::test]
async fn test_confirmed_short() {
    let market = FakeMarket::default().with_symbol("SOLUSDT", bearish_entry(), falling(60), falling(60));
    let config = config(&["SOLUSDT"]);
    let h = harness(&config, market, RecordingNotifier::default());

    let report = h.scanner.run_cycle(today()).await;

    assert_eq!(report.signals, 1);
    let trade = h.registry.get_trade("SOLUSDT").unwrap();
    assert_eq!(trade.direction, Direction::Short);
    assert!(trade.stop_loss > trade.entry);
    assert!(trade.tp3 < trade.tp2 && trade.tp2 < trade.tp1 && trade.tp1 < trade.entry);
}

#[tokio::test]
async fn test_flat_higher_timeframes_confirm_short_but_not_long() {
    let config = config(&["SOLUSDT"]);

    let market = FakeMarket::default().with_symbol("SOLUSDT", bearish_entry(), flat(60), flat(60));
    let evaluator = SignalEvaluator::new(Arc::new(market), &config);
    assert!(evaluator.evaluate("SOLUSDT", Utc::now()).await.is_signal());

    let market = FakeMarket::default().with_symbol("SOLUSDT", bullish_entry(), flat(60), flat(60));
    let evaluator = SignalEvaluator::new(Arc::new(market), &config);
    assert_eq!(
        evaluator.evaluate("SOLUSDT", Utc::now()).await,
        Evaluation::Unconfirmed(Direction::Long)
    );
}

#[tokio::test]
async fn test_long_needs_both_timeframes() {
    let market = FakeMarket::default().with_symbol("BTCUSDT", bullish_entry(), rising(60), falling(60));
    let config = config(&["BTCUSDT"]);
    let h = harness(&config, market, RecordingNotifier::default());

    let report = h.scanner.run_cycle(today()).await;

    assert_eq!(report.signals, 0);
    assert_eq!(report.unconfirmed, 1);
    assert_eq!(h.registry.active_count(), 0);
    assert_eq!(h.registry.stats_snapshot().signals, 0);
    assert!(h.notifier.sent.lock().is_empty());
}

#[tokio::test]
async fn test_short_history_is_no_signal() {
    let market = FakeMarket::default()
        .with_symbol("NEWUSDT", bullish_entry()[..50].to_vec(), rising(60), rising(60))
        .with_symbol("BTCUSDT", bullish_entry(), rising(30), rising(60));
    let config = config(&["NEWUSDT", "BTCUSDT"]);
    let evaluator = SignalEvaluator::new(Arc::new(market), &config);

    assert_eq!(
        evaluator.evaluate("NEWUSDT", Utc::now()).await,
        Evaluation::InsufficientHistory {
            timeframe: Timeframe::M15,
            bars: 50
        }
    );
    assert_eq!(
        evaluator.evaluate("BTCUSDT", Utc::now()).await,
        Evaluation::InsufficientHistory {
            timeframe: Timeframe::H1,
            bars: 30
        }
    );
}

#[tokio::test]
async fn test_fetch_failure_isolated_to_symbol() {
    let market = FakeMarket::default()
        .with_symbol("BTCUSDT", bullish_entry(), rising(60), rising(60))
        // 4h missing: that fetch fails
        .with("ETHUSDT", Timeframe::M15, bullish_entry())
        .with("ETHUSDT", Timeframe::H1, rising(60));
    let config = config(&["ETHUSDT", "BTCUSDT", "DOGEUSDT"]);
    let h = harness(&config, market, RecordingNotifier::default());

    let report = h.scanner.run_cycle(today()).await;

    assert_eq!(report.symbols, 3);
    assert_eq!(report.fetch_failures, 2);
    assert_eq!(report.signals, 1);
    assert_eq!(report.task_failures, 0);
    assert!(h.registry.get_trade("BTCUSDT").is_some());
    assert!(h.registry.get_trade("ETHUSDT").is_none());
    assert_eq!(h.metrics.get_metrics().fetch_failures, 2);
}

#[tokio::test]
async fn test_delivery_failure_keeps_registry_write() {
    let market = FakeMarket::default().with_symbol("BTCUSDT", bullish_entry(), rising(60), rising(60));
    let config = config(&["BTCUSDT"]);
    let notifier = RecordingNotifier {
        fail: true,
        ..RecordingNotifier::default()
    };
    let h = harness(&config, market, notifier);

    let report = h.scanner.run_cycle(today()).await;

    assert_eq!(report.signals, 1);
    assert_eq!(report.delivery_failures, 1);
    assert_eq!(h.registry.active_count(), 1);
    assert_eq!(h.registry.stats_snapshot().signals, 1);
}

#[tokio::test]
async fn test_repeat_signal_replaces_trade() {
    let market = FakeMarket::default().with_symbol("BTCUSDT", bullish_entry(), rising(60), rising(60));
    let config = config(&["BTCUSDT"]);
    let h = harness(&config, market, RecordingNotifier::default());

    h.scanner.run_cycle(today()).await;
    h.scanner.run_cycle(today()).await;

    assert_eq!(h.registry.active_count(), 1);
    assert_eq!(h.registry.stats_snapshot().signals, 2);
    assert_eq!(h.notifier.sent.lock().len(), 2);
}

#[tokio::test]
async fn test_cycle_rolls_day_before_processing() {
    let market = FakeMarket::default().with_symbol("BTCUSDT", bullish_entry(), rising(60), rising(60));
    let config = config(&["BTCUSDT"]);
    let h = harness(&config, market, RecordingNotifier::default());

    h.scanner.run_cycle(today()).await;
    h.registry.increment_outcome(Outcome::Tp1);

    let tomorrow = today().succ_opt().unwrap();
    h.scanner.run_cycle(tomorrow).await;

    let stats = h.registry.stats_snapshot();
    assert_eq!(stats.date, tomorrow);
    assert_eq!(stats.signals, 1);
    assert_eq!(stats.tp1, 0);
}

#[tokio::test]
async fn test_every_symbol_attempted_with_small_concurrency() {
    let symbols: Vec<String> = (0..12).map(|i| format!("S{}USDT", i)).collect();
    let mut market = FakeMarket::default();
    for symbol in &symbols {
        market = market.with_symbol(symbol, flat(60), flat(60), flat(60));
    }
    let market = Arc::new(market);

    let mut config = config(&[]);
    config.symbols = symbols.clone();
    config.max_concurrent_symbols = 2;

    let evaluator = Arc::new(SignalEvaluator::new(market.clone(), &config));
    let registry = Arc::new(TradeRegistry::new(today()));
    let scanner = Scanner::new(
        &config,
        evaluator,
        registry,
        Arc::new(RecordingNotifier::default()),
        Arc::new(ScanMetrics::new()),
    );

    let report = scanner.run_cycle(today()).await;

    assert_eq!(report.no_cross, 12);
    assert_eq!(report.evaluated(), 12);
    assert_eq!(market.requests.load(Ordering::SeqCst), 36);
}

#[tokio::test]
async fn test_run_stops_on_shutdown() {
    let market = FakeMarket::default().with_symbol("BTCUSDT", flat(60), flat(60), flat(60));
    let config = config(&["BTCUSDT"]);
    let h = harness(&config, market, RecordingNotifier::default());
    let (tx, rx) = tokio::sync::watch::channel(false);

    let scanner = h.scanner.clone();
    let handle = tokio::spawn(async move { scanner.run(rx).await });

    // First tick fires immediately
    while h.metrics.get_metrics().cycles == 0 {
        tokio::task::yield_now().await;
    }
    tx.send(true).unwrap();

    handle.await.unwrap();
    assert!(h.metrics.get_metrics().cycles >= 1);
}

#[tokio::test]
async fn test_timeframes_fetched_concurrently() {
    let market = GatedMarket {
        inner: FakeMarket::default().with_symbol("BTCUSDT", bullish_entry(), rising(60), rising(60)),
        gate: Barrier::new(3),
    };
    let config = config(&["BTCUSDT"]);
    let evaluator = SignalEvaluator::new(Arc::new(market), &config);

    let evaluation = tokio::time::timeout(
        Duration::from_secs(5),
        evaluator.evaluate("BTCUSDT", Utc::now()),
    )
    .await
    .expect("timeframe fetches did not overlap");

    assert!(evaluation.is_signal());
}

#[tokio::test]
async fn test_hung_exchange_degrades_to_fetch_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    let mut config = config(&["BTCUSDT"]);
    config.binance = BinanceConfig {
        base_url,
        request_timeout_ms: 50,
        max_retries: 0,
        retry_backoff_ms: 1,
        requests_per_minute: 0,
    };
    let client = BinanceFuturesClient::new(config.binance.clone()).unwrap();
    let evaluator = SignalEvaluator::new(Arc::new(client), &config);

    match evaluator.evaluate("BTCUSDT", Utc::now()).await {
        Evaluation::FetchFailed(reason) => {
            assert!(reason.contains("BTCUSDT"));
            assert!(reason.contains("timed out after 50ms"));
        }
        other => panic!("unexpected evaluation: {other}"),
    }
}

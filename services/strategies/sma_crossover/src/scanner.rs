//! Scan cycle scheduling
//!
//! One cycle at a time: roll the day, evaluate every symbol concurrently
//! (bounded by `max_concurrent_symbols`), record and deliver signals, then
//! wait for the next tick. A failing symbol costs only itself.

use adapter_service::Notifier;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};
use types::Signal;

use crate::config::ScannerConfig;
use crate::error::{Result, StrategyError};
use crate::evaluator::{Evaluation, SignalEvaluator};
use crate::metrics::ScanMetrics;
use crate::registry::TradeRegistry;
use crate::signals::format_alert;

/// Result for one symbol in one cycle
#[derive(Debug, Clone)]
pub struct SymbolOutcome {
    pub symbol: String,
    pub evaluation: Evaluation,
    /// Alert reached the notifier; only meaningful for signals
    pub delivered: bool,
}

/// Per-cycle tally
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub date: NaiveDate,
    pub symbols: usize,
    pub signals: usize,
    pub delivery_failures: usize,
    pub no_cross: usize,
    pub unconfirmed: usize,
    pub insufficient_history: usize,
    pub degenerate: usize,
    pub fetch_failures: usize,
    /// Evaluation tasks that panicked
    pub task_failures: usize,
    pub elapsed: Duration,
}

impl CycleReport {
    pub fn new(date: NaiveDate, symbols: usize) -> Self {
        Self {
            date,
            symbols,
            signals: 0,
            delivery_failures: 0,
            no_cross: 0,
            unconfirmed: 0,
            insufficient_history: 0,
            degenerate: 0,
            fetch_failures: 0,
            task_failures: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn record(&mut self, outcome: &SymbolOutcome) {
        match &outcome.evaluation {
            Evaluation::Signal(_) => {
                self.signals += 1;
                if !outcome.delivered {
                    self.delivery_failures += 1;
                }
            }
            Evaluation::NoCross => self.no_cross += 1,
            Evaluation::Unconfirmed(_) => self.unconfirmed += 1,
            Evaluation::InsufficientHistory { .. } => self.insufficient_history += 1,
            Evaluation::DegenerateRisk => self.degenerate += 1,
            Evaluation::FetchFailed(_) => self.fetch_failures += 1,
        }
    }

    /// Symbols whose evaluation ran to an outcome
    pub fn evaluated(&self) -> usize {
        self.signals
            + self.no_cross
            + self.unconfirmed
            + self.insufficient_history
            + self.degenerate
            + self.fetch_failures
    }
}

#[derive(Clone)]
pub struct Scanner {
    symbols: Arc<[String]>,
    evaluator: Arc<SignalEvaluator>,
    registry: Arc<TradeRegistry>,
    notifier: Arc<dyn Notifier>,
    metrics: Arc<ScanMetrics>,
    scan_interval: Duration,
    max_concurrent: usize,
}

impl Scanner {
    pub fn new(
        config: &ScannerConfig,
        evaluator: Arc<SignalEvaluator>,
        registry: Arc<TradeRegistry>,
        notifier: Arc<dyn Notifier>,
        metrics: Arc<ScanMetrics>,
    ) -> Self {
        Self {
            symbols: config.symbols.clone().into(),
            evaluator,
            registry,
            notifier,
            metrics,
            scan_interval: config.scan_interval(),
            max_concurrent: config.max_concurrent_symbols.max(1),
        }
    }

    pub fn registry(&self) -> &Arc<TradeRegistry> {
        &self.registry
    }

    /// Run cycles until `shutdown` flips to `true` or its sender is dropped.
    ///
    /// A new cycle starts at most every `scan_interval`; a cycle that overruns
    /// is followed immediately by the next. Shutdown is only observed between
    /// cycles, so an in-flight cycle always completes.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.scan_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Scanner started: {} symbols every {:?}",
            self.symbols.len(),
            self.scan_interval
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => {}
            }
            if *shutdown.borrow() || shutdown.has_changed().is_err() {
                break;
            }

            self.run_cycle(Utc::now().date_naive()).await;
        }

        info!("Scanner stopped");
    }

    /// One full pass over the universe
    pub async fn run_cycle(&self, today: NaiveDate) -> CycleReport {
        let started = Instant::now();

        if self.registry.maybe_roll_day(today) {
            info!(
                "{} New UTC day {}, daily stats reset",
                crate::logging::LogEmoji::CLOCK,
                today
            );
        }

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = JoinSet::new();

        for symbol in self.symbols.iter().cloned() {
            let scanner = self.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                // The semaphore is never closed
                let _permit = semaphore.acquire_owned().await.ok();
                scanner.process_symbol(symbol).await
            });
        }

        let mut report = CycleReport::new(today, self.symbols.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => report.record(&outcome),
                Err(e) => {
                    crate::log_error!("Symbol evaluation task failed: {}", e);
                    report.task_failures += 1;
                }
            }
        }

        report.elapsed = started.elapsed();
        self.metrics.record_cycle(&report);

        crate::log_metrics!(
            "Cycle done in {:?}: {} symbols, {} signals, {} unconfirmed, {} no cross, \
             {} short history, {} fetch failures, {} delivery failures",
            report.elapsed,
            report.symbols,
            report.signals,
            report.unconfirmed,
            report.no_cross,
            report.insufficient_history,
            report.fetch_failures,
            report.delivery_failures
        );

        report
    }

    async fn process_symbol(&self, symbol: String) -> SymbolOutcome {
        let evaluation = self.evaluator.evaluate(&symbol, Utc::now()).await;

        let delivered = match &evaluation {
            Evaluation::Signal(signal) => {
                if self.registry.record_signal(signal).is_some() {
                    debug!(symbol = %symbol, "Replaced active trade");
                }
                crate::log_signal!(
                    "{} {} entry={} sl={} risk/unit={} size={}",
                    signal.direction,
                    signal.symbol,
                    signal.entry.round_dp(4),
                    signal.stop_loss.round_dp(4),
                    signal.risk_per_unit().round_dp(4),
                    signal.size
                );

                match self.deliver(signal).await {
                    Ok(()) => true,
                    Err(e) => {
                        crate::log_network!("Alert for {} not delivered: {}", symbol, e);
                        false
                    }
                }
            }
            Evaluation::FetchFailed(reason) => {
                warn!(symbol = %symbol, "Market data unavailable: {}", reason);
                false
            }
            other => {
                debug!(symbol = %symbol, "{}", other);
                false
            }
        };

        SymbolOutcome {
            symbol,
            evaluation,
            delivered,
        }
    }

    async fn deliver(&self, signal: &Signal) -> Result<()> {
        self.notifier
            .send(&format_alert(signal))
            .await
            .map_err(|source| StrategyError::Notification {
                channel: self.notifier.name().to_string(),
                source,
            })
    }
}

impl std::fmt::Debug for Scanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("symbols", &self.symbols.len())
            .field("notifier", &self.notifier.name())
            .field("scan_interval", &self.scan_interval)
            .field("max_concurrent", &self.max_concurrent)
            .finish()
    }
}

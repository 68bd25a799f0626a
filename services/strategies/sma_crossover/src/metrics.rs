//! Scanner metrics collection

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::scanner::CycleReport;

/// Cumulative counters since startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub cycles: u64,
    pub symbols_evaluated: u64,
    pub signals: u64,
    pub unconfirmed: u64,
    pub insufficient_history: u64,
    pub fetch_failures: u64,
    pub delivery_failures: u64,
    pub task_failures: u64,
}

/// Thread-safe metrics collector for the scanner
#[derive(Debug)]
pub struct ScanMetrics {
    start_time: Instant,
    cycles: AtomicU64,
    symbols_evaluated: AtomicU64,
    signals: AtomicU64,
    unconfirmed: AtomicU64,
    insufficient_history: AtomicU64,
    fetch_failures: AtomicU64,
    delivery_failures: AtomicU64,
    task_failures: AtomicU64,
    last_cycle_ms: AtomicU64,
}

impl ScanMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: AtomicU64::new(0),
            symbols_evaluated: AtomicU64::new(0),
            signals: AtomicU64::new(0),
            unconfirmed: AtomicU64::new(0),
            insufficient_history: AtomicU64::new(0),
            fetch_failures: AtomicU64::new(0),
            delivery_failures: AtomicU64::new(0),
            task_failures: AtomicU64::new(0),
            last_cycle_ms: AtomicU64::new(0),
        }
    }

    /// Fold one finished cycle into the totals
    pub fn record_cycle(&self, report: &CycleReport) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        self.symbols_evaluated
            .fetch_add(report.evaluated() as u64, Ordering::Relaxed);
        self.signals
            .fetch_add(report.signals as u64, Ordering::Relaxed);
        self.unconfirmed
            .fetch_add(report.unconfirmed as u64, Ordering::Relaxed);
        self.insufficient_history
            .fetch_add(report.insufficient_history as u64, Ordering::Relaxed);
        self.fetch_failures
            .fetch_add(report.fetch_failures as u64, Ordering::Relaxed);
        self.delivery_failures
            .fetch_add(report.delivery_failures as u64, Ordering::Relaxed);
        self.task_failures
            .fetch_add(report.task_failures as u64, Ordering::Relaxed);
        self.last_cycle_ms
            .store(report.elapsed.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn get_metrics(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            symbols_evaluated: self.symbols_evaluated.load(Ordering::Relaxed),
            signals: self.signals.load(Ordering::Relaxed),
            unconfirmed: self.unconfirmed.load(Ordering::Relaxed),
            insufficient_history: self.insufficient_history.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
            task_failures: self.task_failures.load(Ordering::Relaxed),
        }
    }

    pub fn last_cycle_duration(&self) -> Duration {
        Duration::from_millis(self.last_cycle_ms.load(Ordering::Relaxed))
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl Default for ScanMetrics {
    fn default() -> Self {
        Self::new()
    }
}

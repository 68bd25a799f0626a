//! SMA Crossover Scanner entry point

use adapter_service::{
    BinanceFuturesClient, LogNotifier, Notifier, TelegramClient, TelegramCommandSource,
    TelegramNotifier,
};
use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use sma_crossover::commands::run_command_loop;
use sma_crossover::logging::{init_logging, LogEmoji};
use sma_crossover::{ScanMetrics, Scanner, ScannerConfig, SignalEvaluator, TradeRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a single scan cycle and exit
    #[arg(long)]
    once: bool,

    /// Log alerts instead of sending them; disables Telegram entirely
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ScannerConfig::load(args.config.clone())?;
    if args.dry_run {
        config.telegram.enabled = false;
    }

    init_logging(config.log_json)?;
    config.validate().context("Invalid scanner configuration")?;

    info!(
        "{} Starting SMA crossover scanner v{}",
        LogEmoji::ROCKET,
        env!("CARGO_PKG_VERSION")
    );
    info!(
        "Universe: {} symbols | SMA {}/{} | ATR {} x {} | balance {} risking {}% | every {}s",
        config.symbols.len(),
        config.indicators.fast_period,
        config.indicators.slow_period,
        config.risk.atr_period,
        config.risk.atr_multiplier,
        config.risk.account_balance,
        config.risk.risk_percent,
        config.scan_interval_secs
    );

    let market = Arc::new(
        BinanceFuturesClient::new(config.binance.clone())
            .context("Failed to create Binance client")?,
    );
    let registry = Arc::new(TradeRegistry::new(Utc::now().date_naive()));
    let metrics = Arc::new(ScanMetrics::new());

    let telegram = if config.telegram.enabled {
        info!(
            "Telegram alerts to chat {} (bot {})",
            config.telegram.chat_id,
            config.telegram.redacted_token()
        );
        Some(TelegramClient::new(&config.telegram).context("Failed to create Telegram client")?)
    } else {
        info!("Telegram disabled, alerts go to the log");
        None
    };

    let notifier: Arc<dyn Notifier> = match &telegram {
        Some(client) => Arc::new(TelegramNotifier::new(
            client.clone(),
            config.telegram.chat_id.clone(),
        )),
        None => Arc::new(LogNotifier),
    };

    let evaluator = Arc::new(SignalEvaluator::new(market, &config));
    let scanner = Scanner::new(
        &config,
        evaluator,
        Arc::clone(&registry),
        notifier,
        Arc::clone(&metrics),
    );

    if args.once {
        let report = scanner.run_cycle(Utc::now().date_naive()).await;
        info!(
            "Single cycle finished: {} signals from {} symbols",
            report.signals, report.symbols
        );
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let command_handle = telegram.map(|client| {
        let source = TelegramCommandSource::new(client, config.telegram.poll_timeout_secs);
        tokio::spawn(run_command_loop(
            source,
            Arc::clone(&registry),
            shutdown_rx.clone(),
        ))
    });

    let scanner_handle = {
        let scanner = scanner.clone();
        let shutdown_rx = shutdown_rx.clone();
        tokio::spawn(async move { scanner.run(shutdown_rx).await })
    };

    sma_crossover::log_success!("Scanner running. Press Ctrl+C to stop.");

    signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    info!("Shutdown requested, finishing the current cycle");
    let _ = shutdown_tx.send(true);

    if let Err(e) = scanner_handle.await {
        sma_crossover::log_error!("Scanner task failed: {}", e);
    }
    if let Some(handle) = command_handle {
        if let Err(e) = handle.await {
            sma_crossover::log_error!("Command task failed: {}", e);
        }
    }

    let totals = metrics.get_metrics();
    info!(
        "{} Stopped after {:?}: {} cycles, {} signals, {} fetch failures, {} delivery failures",
        LogEmoji::CHART,
        metrics.uptime(),
        totals.cycles,
        totals.signals,
        totals.fetch_failures,
        totals.delivery_failures
    );

    Ok(())
}

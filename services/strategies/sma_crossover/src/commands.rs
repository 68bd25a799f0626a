//! Bot command surface
//!
//! Answers `/stats` from the registry. Read-only: nothing here mutates trades
//! or counters, and the loop runs beside the scanner rather than inside it.

use adapter_service::{CommandSource, InboundCommand};
use service_config::service::telegram::POLL_ERROR_BACKOFF_MS;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};
use types::StatsSnapshot;

use crate::registry::TradeRegistry;

/// Daily stats message
pub fn format_stats(stats: &StatsSnapshot, active_trades: usize) -> String {
    format!(
        "📊 DAILY STATS\n\nSignals: {}\nTP1: {}  TP2: {}  TP3: {}  SL: {}\nWin Rate: {}%\nActive Trades: {}",
        stats.signals,
        stats.tp1,
        stats.tp2,
        stats.tp3,
        stats.sl,
        stats.win_rate(),
        active_trades
    )
}

/// Reply text for a command, `None` for anything unrecognised
pub fn handle_command(command: &InboundCommand, registry: &TradeRegistry) -> Option<String> {
    match command.command()? {
        "stats" => {
            let (stats, active) = registry.dashboard();
            Some(format_stats(&stats, active))
        }
        _ => None,
    }
}

/// Poll for commands and answer them until `shutdown` flips
pub async fn run_command_loop<S: CommandSource>(
    mut source: S,
    registry: Arc<TradeRegistry>,
    mut shutdown: watch::Receiver<bool>,
) {
    info!("Command listener started");
    let backoff = Duration::from_millis(POLL_ERROR_BACKOFF_MS);

    loop {
        let polled = tokio::select! {
            result = source.poll() => result,
            _ = shutdown.changed() => break,
        };

        match polled {
            Ok(commands) => {
                for command in commands {
                    let Some(reply) = handle_command(&command, &registry) else {
                        debug!(chat_id = %command.chat_id, "Ignoring message");
                        continue;
                    };
                    if let Err(e) = source.reply(&command.chat_id, &reply).await {
                        crate::log_network!("Failed to answer {}: {}", command.text, e);
                    }
                }
            }
            Err(e) => {
                crate::log_network!("Command poll failed: {}. Retrying in {:?}", e, backoff);
                tokio::select! {
                    _ = tokio::time::sleep(backoff) => {}
                    _ = shutdown.changed() => break,
                }
            }
        }
    }

    info!("Command listener stopped");
}

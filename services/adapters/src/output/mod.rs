//! Output adapters for delivering alerts
//!
//! Formatting is the strategy's concern; a [`Notifier`] only moves text.

pub mod telegram;

pub use telegram::TelegramNotifier;

use crate::Result;
use async_trait::async_trait;
use tracing::info;

/// Delivers an already formatted alert
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    async fn send(&self, text: &str) -> Result<()>;
}

/// Writes alerts to the log instead of sending them
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, text: &str) -> Result<()> {
        info!(target: "alerts", "\n{}", text);
        Ok(())
    }
}

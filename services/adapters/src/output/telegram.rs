//! Telegram alert delivery

use async_trait::async_trait;

use super::Notifier;
use crate::telegram::TelegramClient;
use crate::Result;

/// Sends alerts to one configured chat
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: TelegramClient,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(client: TelegramClient, chat_id: impl Into<String>) -> Self {
        Self {
            client,
            chat_id: chat_id.into(),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, text: &str) -> Result<()> {
        self.client.send_message(&self.chat_id, text).await
    }
}

//! Telegram `getUpdates` command source

use async_trait::async_trait;
use tracing::debug;

use super::{CommandSource, InboundCommand};
use crate::telegram::{TelegramClient, Update};
use crate::Result;

/// Long-polls the Bot API and tracks the update offset
#[derive(Debug)]
pub struct TelegramCommandSource {
    client: TelegramClient,
    offset: Option<i64>,
    poll_timeout_secs: u64,
}

impl TelegramCommandSource {
    pub fn new(client: TelegramClient, poll_timeout_secs: u64) -> Self {
        Self {
            client,
            offset: None,
            poll_timeout_secs,
        }
    }

    /// Offset to request next; updates below it are acknowledged
    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    fn absorb(&mut self, updates: Vec<Update>) -> Vec<InboundCommand> {
        if let Some(max_id) = updates.iter().map(|u| u.update_id).max() {
            self.offset = Some(max_id + 1);
        }

        updates
            .into_iter()
            .filter_map(|update| {
                let message = update.message?;
                let text = message.text?;
                Some(InboundCommand {
                    chat_id: message.chat.id.to_string(),
                    text,
                })
            })
            .collect()
    }
}

#[async_trait]
impl CommandSource for TelegramCommandSource {
    async fn poll(&mut self) -> Result<Vec<InboundCommand>> {
        let updates = self
            .client
            .get_updates(self.offset, self.poll_timeout_secs)
            .await?;
        debug!("Received {} Telegram updates", updates.len());
        Ok(self.absorb(updates))
    }

    async fn reply(&self, chat_id: &str, text: &str) -> Result<()> {
        self.client.send_message(chat_id, text).await
    }
}

//! Telegram Bot API client
//!
//! Thin wrapper over the two Bot API methods the scanner needs:
//! `sendMessage` for alerts and replies, `getUpdates` for long polling
//! incoming commands. Every Bot API answer is an envelope
//! `{"ok": bool, "description": ..., "result": ...}`; `ok: false` surfaces
//! as [`AdapterError::TelegramApi`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::TelegramConfig;
use crate::{AdapterError, Result};

/// Extra time on top of the long-poll timeout before the HTTP client gives up
const POLL_GRACE_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: [&'static str; 1],
}

/// One entry of a `getUpdates` result
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Bot API client bound to one bot token
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    api_base_url: String,
    bot_token: String,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        if config.bot_token.trim().is_empty() {
            return Err(AdapterError::Configuration(
                "Telegram bot token is not set".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.poll_timeout_secs + POLL_GRACE_SECS))
            .build()
            .map_err(|e| {
                AdapterError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
        })
    }

    /// Post a plain-text message to a chat
    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<()> {
        let _: serde_json::Value = self
            .call("sendMessage", &SendMessageRequest { chat_id, text })
            .await?;
        debug!(chat_id = %chat_id, "Telegram message sent");
        Ok(())
    }

    /// Long-poll for message updates after `offset`
    pub async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>> {
        let request = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
            allowed_updates: ["message"],
        };
        self.call("getUpdates", &request).await
    }

    async fn call<B: Serialize, T: DeserializeOwned>(&self, method: &str, body: &B) -> Result<T> {
        let url = format!("{}/bot{}/{}", self.api_base_url, self.bot_token, method);

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            // reqwest errors embed the URL, which carries the token
            .map_err(|e| AdapterError::Http(e.without_url()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AdapterError::Http(e.without_url()))?;

        let envelope: ApiResponse<T> = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(AdapterError::HttpStatus {
                    endpoint: method.to_string(),
                    status: status.as_u16(),
                    body: String::from_utf8_lossy(&bytes).chars().take(256).collect(),
                });
            }
            Err(e) => return Err(AdapterError::JsonParse(e)),
        };

        if !envelope.ok {
            return Err(AdapterError::TelegramApi {
                description: envelope
                    .description
                    .unwrap_or_else(|| format!("{} failed with HTTP {}", method, status)),
            });
        }

        envelope.result.ok_or_else(|| AdapterError::MissingField {
            field: "result".to_string(),
        })
    }
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("api_base_url", &self.api_base_url)
            .finish_non_exhaustive()
    }
}

//! Telegram Bot API client
//!
//! Outbound delivery only: the bot never polls, updates arrive via webhook.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tokio_retry::strategy::jitter;
use tokio_retry::{Retry, strategy::ExponentialBackoff};

use crate::core::models::OutboundReply;
use crate::errors::BotError;

/// Something that can deliver one already-sized reply segment.
#[async_trait]
pub trait ReplySink: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when the segment could not be delivered.
    async fn send(&self, reply: &OutboundReply) -> Result<(), BotError>;
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    error_code: Option<i64>,
    description: Option<String>,
}

/// Build the JSON payload for `sendMessage`.
#[must_use]
pub fn build_send_message_payload(reply: &OutboundReply) -> Value {
    // Telegram rejects empty text.
    let text = if reply.text.is_empty() { " " } else { reply.text.as_str() };
    let mut payload = json!({
        "chat_id": reply.chat_id,
        "text": text,
    });

    if let Some(mode) = reply.formatting.parse_mode() {
        payload["parse_mode"] = Value::String(mode.to_string());
    }

    if let Some(message_id) = reply.reply_to_message_id {
        payload["reply_to_message_id"] = json!(message_id);
        payload["allow_sending_without_reply"] = Value::Bool(true);
    }

    payload
}

/// Telegram Bot API client with retry logic and error handling
pub struct TelegramClient {
    http: Client,
    api_base: String,
    token: String,
}

impl TelegramClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(token: String, api_base: &str) -> Result<Self, BotError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| BotError::TelegramError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    async fn with_retry<F, Fut, T>(&self, operation: F) -> Result<T, BotError>
    where
        F: FnMut() -> Fut + Send,
        Fut: std::future::Future<Output = Result<T, BotError>> + Send,
        T: Send,
    {
        let strategy = ExponentialBackoff::from_millis(100).map(jitter).take(5);

        Retry::spawn(strategy, operation).await
    }

    /// Send one message segment as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if every attempt failed or Telegram answered `ok: false`.
    pub async fn send_message(&self, reply: &OutboundReply) -> Result<(), BotError> {
        let payload = build_send_message_payload(reply);
        let url = self.method_url("sendMessage");

        self.with_retry(|| async {
            let response = self.http.post(&url).json(&payload).send().await?;
            let status = response.status();
            let body: TelegramResponse = response.json().await.map_err(|e| {
                BotError::TelegramError(format!("Invalid sendMessage response ({status}): {e}"))
            })?;

            if body.ok {
                Ok(())
            } else {
                Err(BotError::TelegramError(format!(
                    "sendMessage failed: {} {}",
                    body.error_code.unwrap_or_else(|| i64::from(status.as_u16())),
                    body.description.unwrap_or_else(|| "no description".to_string())
                )))
            }
        })
        .await
    }
}

#[async_trait]
impl ReplySink for TelegramClient {
    async fn send(&self, reply: &OutboundReply) -> Result<(), BotError> {
        self.send_message(reply).await
    }
}

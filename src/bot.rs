//! Composition root: wires the store, summarizer and reply channel together
//! and turns routed commands into replies.

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::ai::HfClient;
use crate::core::config::AppConfig;
use crate::core::models::{ChatType, InboundEvent, OutboundReply};
use crate::core::router::{Command, route};
use crate::errors::BotError;
use crate::storage::MessageStore;
use crate::summarize::{Summarizer, summarize_last_n};
use crate::telegram::{ReplySink, TelegramClient};
use crate::utils::formatter::{escape_markdown_v2, split_message};

/// Canonical failure message shown to users when summarization fails.
pub const CANONICAL_FAILURE_MESSAGE: &str =
    "Sorry, I couldn't generate a summary at this time. Please try again later.";

pub const NO_MESSAGES_MESSAGE: &str = "No messages stored for this chat yet.\n\n\
     In groups, make the bot an admin (or turn off its privacy mode) so it can see messages.";

pub const START_MESSAGE: &str =
    "*Chat summarizer*\n\nSend `/last 200` to get a summary of the last 200 messages\\.";

const HELP_MESSAGE: &str = "Send `/last 200` to summarize recent messages\\.";

/// Help text for private chats; names the bot's `@username` when it is known.
#[must_use]
pub fn help_message(bot_username: &str) -> String {
    if bot_username.is_empty() {
        return HELP_MESSAGE.to_string();
    }
    format!(
        "{HELP_MESSAGE}\n\nIn groups, write {} `last 200` or reply `last 200` to one of my messages\\.",
        escape_markdown_v2(&format!("@{bot_username}"))
    )
}

/// Delivery knobs for outbound replies.
#[derive(Debug, Clone, Copy)]
pub struct DeliveryOptions {
    pub segment_limit: usize,
    pub segment_delay: Duration,
}

/// Who the bot is on the chat platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BotIdentity {
    /// Numeric user id; matched against the author of replied-to messages.
    pub id: String,
    /// Lower-cased username without `@`.
    pub username: String,
}

/// The chat summarizer bot.
pub struct SummaryBot {
    store: MessageStore,
    summarizer: Summarizer,
    sink: Arc<dyn ReplySink>,
    identity: BotIdentity,
    retention_days: i64,
    delivery: DeliveryOptions,
}

impl SummaryBot {
    #[must_use]
    pub fn new(
        store: MessageStore,
        summarizer: Summarizer,
        sink: Arc<dyn ReplySink>,
        identity: BotIdentity,
        retention_days: i64,
        delivery: DeliveryOptions,
    ) -> Self {
        Self {
            store,
            summarizer,
            sink,
            identity,
            retention_days,
            delivery,
        }
    }

    /// Build the production bot: SQLite store, Hugging Face backend, Telegram delivery.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or an HTTP client cannot be built.
    pub async fn from_config(config: &AppConfig) -> Result<Self, BotError> {
        let store = MessageStore::open(&config.database_url()).await?;
        let backend = Arc::new(HfClient::new(config)?);
        let summarizer = Summarizer::new(backend, &config.tuning);
        let telegram = Arc::new(TelegramClient::new(
            config.bot_token.clone(),
            &config.telegram_api_base,
        )?);

        Ok(Self::new(
            store,
            summarizer,
            telegram,
            BotIdentity {
                id: config.bot_id.clone(),
                username: config.bot_username.clone(),
            },
            config.cleanup_days,
            DeliveryOptions {
                segment_limit: config.tuning.segment_limit,
                segment_delay: Duration::from_millis(config.tuning.segment_delay_ms),
            },
        ))
    }

    #[must_use]
    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    #[must_use]
    pub fn summarizer(&self) -> &Summarizer {
        &self.summarizer
    }

    /// Release the database pool.
    pub async fn shutdown(&self) {
        self.store.close().await;
    }

    /// Log the event's text (human senders only), route it and reply.
    ///
    /// Returns the routed command. Delivery failures are logged, not returned.
    pub async fn handle_event(&self, event: &InboundEvent) -> Command {
        let text = event.text.trim();
        if text.is_empty() {
            return Command::None;
        }

        if !event.is_bot_sender {
            self.store
                .save(
                    &event.chat_id,
                    event.message_id,
                    &event.from_id,
                    event.timestamp,
                    text,
                )
                .await;
        }

        let command = route(
            event.chat_type,
            text,
            &self.identity.username,
            event.is_reply_to_bot(&self.identity.id),
        );
        info!(
            "Routed message {} in chat {} ({:?}) to {:?}",
            event.message_id, event.chat_id, event.chat_type, command
        );

        self.execute(command, event).await;
        command
    }

    async fn execute(&self, command: Command, event: &InboundEvent) {
        let chat_id = event.chat_id.as_str();
        match command {
            Command::Ping => self.deliver(OutboundReply::plain(chat_id, "pong")).await,
            Command::Count => {
                let total = self.store.count(chat_id).await;
                self.deliver(OutboundReply::markdown(
                    chat_id,
                    format!("*Stored messages:* `{total}`"),
                ))
                .await;
            }
            Command::Start => self.deliver(OutboundReply::markdown(chat_id, START_MESSAGE)).await,
            Command::Clear => {
                let removed = self.store.clear_chat(chat_id).await;
                info!("Cleared {} messages from chat {}", removed, chat_id);
                self.deliver(OutboundReply::plain(chat_id, "History cleared."))
                    .await;
            }
            Command::Summarize(n) => self.summarize_and_reply(n, event).await,
            Command::None if event.chat_type == ChatType::Private => {
                self.deliver(OutboundReply::markdown(
                    chat_id,
                    help_message(&self.identity.username),
                ))
                    .await;
            }
            Command::None => {}
        }
    }

    async fn summarize_and_reply(&self, n: u32, event: &InboundEvent) {
        let chat_id = event.chat_id.as_str();
        self.deliver(OutboundReply::markdown(
            chat_id,
            format!("Summarizing the last *{n}* messages\\.\\.\\."),
        ))
        .await;

        let now = chrono::Utc::now().timestamp();
        let text = match summarize_last_n(
            &self.store,
            &self.summarizer,
            chat_id,
            n,
            self.retention_days,
            now,
        )
        .await
        {
            Ok(Some(summary)) => summary,
            Ok(None) => NO_MESSAGES_MESSAGE.to_string(),
            Err(e) => {
                error!("Failed to summarize chat {}: {}", chat_id, e);
                CANONICAL_FAILURE_MESSAGE.to_string()
            }
        };

        let reply_to = (event.chat_type.is_group() && event.is_reply_to_bot(&self.identity.id))
            .then_some(event.message_id);
        self.deliver(OutboundReply::plain(chat_id, text).replying_to(reply_to))
            .await;
    }

    /// Split `reply` into segments and send them in order, pausing between sends.
    pub async fn deliver(&self, reply: OutboundReply) {
        let segments = split_message(&reply.text, self.delivery.segment_limit);
        let total = segments.len();

        for (idx, segment) in segments.into_iter().enumerate() {
            if idx > 0 {
                tokio::time::sleep(self.delivery.segment_delay).await;
            }
            let part = OutboundReply {
                text: segment,
                ..reply.clone()
            };
            if let Err(e) = self.sink.send(&part).await {
                warn!(
                    "Failed to deliver segment {}/{} to chat {}: {}",
                    idx + 1,
                    total,
                    reply.chat_id,
                    e
                );
            }
        }
    }

    /// Store reachability and inference readiness, for the health route.
    ///
    /// # Errors
    ///
    /// Returns the first failing dependency.
    pub async fn health(&self) -> Result<(), BotError> {
        self.store.ping().await?;
        if !self.summarizer.is_ready() {
            return Err(BotError::InferenceError(
                "inference client is not configured".to_string(),
            ));
        }
        Ok(())
    }
}

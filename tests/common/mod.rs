#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tldr_chat::ai::SummaryBackend;
use tldr_chat::bot::{BotIdentity, DeliveryOptions, SummaryBot};
use tldr_chat::core::config::Tuning;
use tldr_chat::core::models::{ChatType, InboundEvent, OutboundReply, ReplyContext};
use tldr_chat::errors::{BotError, ServiceError};
use tldr_chat::storage::MessageStore;
use tldr_chat::summarize::Summarizer;
use tldr_chat::telegram::ReplySink;

pub const BOT_USERNAME: &str = "tldrbot";
pub const BOT_ID: &str = "999";

type Script = dyn Fn(u32, &str) -> Result<String, ServiceError> + Send + Sync;

/// Backend whose answers come from a closure of `(call_number, input)`.
///
/// Every call is counted and its input and token budget recorded.
pub struct ScriptedBackend {
    script: Box<Script>,
    calls: AtomicU32,
    inputs: Mutex<Vec<(String, u32)>>,
}

impl ScriptedBackend {
    pub fn new<F>(script: F) -> Arc<Self>
    where
        F: Fn(u32, &str) -> Result<String, ServiceError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            script: Box::new(script),
            calls: AtomicU32::new(0),
            inputs: Mutex::new(Vec::new()),
        })
    }

    /// Answers every map call with `partial:<input>` and returns the reduce input verbatim.
    pub fn echo() -> Arc<Self> {
        Self::new(|_, text| {
            if text.starts_with("Combine") {
                Ok(format!("FINAL\n{text}"))
            } else {
                Ok(format!("partial:{text}"))
            }
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inputs(&self) -> Vec<(String, u32)> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl SummaryBackend for ScriptedBackend {
    async fn summarize(&self, text: &str, max_tokens: u32) -> Result<String, ServiceError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.inputs
            .lock()
            .unwrap()
            .push((text.to_string(), max_tokens));
        (self.script)(call, text)
    }
}

/// Reply sink that keeps every delivered segment.
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<OutboundReply>>,
}

impl RecordingSink {
    pub fn sent(&self) -> Vec<OutboundReply> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReplySink for RecordingSink {
    async fn send(&self, reply: &OutboundReply) -> Result<(), BotError> {
        self.sent.lock().unwrap().push(reply.clone());
        Ok(())
    }
}

pub fn summarizer(backend: Arc<ScriptedBackend>) -> Summarizer {
    Summarizer::new(backend, &Tuning::default())
}

pub async fn bot_with(
    backend: Arc<ScriptedBackend>,
    segment_limit: usize,
) -> (SummaryBot, Arc<RecordingSink>) {
    let store = MessageStore::in_memory().await.unwrap();
    let sink = Arc::new(RecordingSink::default());
    let bot = SummaryBot::new(
        store,
        summarizer(backend),
        sink.clone(),
        BotIdentity {
            id: BOT_ID.to_string(),
            username: BOT_USERNAME.to_string(),
        },
        30,
        DeliveryOptions {
            segment_limit,
            segment_delay: Duration::ZERO,
        },
    );
    (bot, sink)
}

pub fn event(chat_type: ChatType, message_id: i64, text: &str) -> InboundEvent {
    InboundEvent {
        chat_id: "-100".to_string(),
        chat_type,
        message_id,
        timestamp: chrono::Utc::now().timestamp(),
        from_id: "7".to_string(),
        is_bot_sender: false,
        text: text.to_string(),
        reply_to: None,
    }
}

pub fn reply_to_bot(event: InboundEvent) -> InboundEvent {
    reply_to_author(event, BOT_ID, true)
}

pub fn reply_to_author(mut event: InboundEvent, from_id: &str, is_bot: bool) -> InboundEvent {
    event.reply_to = Some(ReplyContext {
        from_id: from_id.to_string(),
        is_bot,
    });
    event
}

use serde::{Deserialize, Serialize};

/// Kind of conversation an event arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    Private,
    Group,
    Supergroup,
    Channel,
}

impl ChatType {
    #[must_use]
    pub fn is_group(self) -> bool {
        matches!(self, ChatType::Group | ChatType::Supergroup)
    }

    /// Parses Telegram's `chat.type` string.
    #[must_use]
    pub fn from_telegram(raw: &str) -> Option<Self> {
        match raw {
            "private" => Some(ChatType::Private),
            "group" => Some(ChatType::Group),
            "supergroup" => Some(ChatType::Supergroup),
            "channel" => Some(ChatType::Channel),
            _ => None,
        }
    }
}

/// One persisted chat message. Keyed by `(chat_id, message_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub chat_id: String,
    pub message_id: i64,
    pub from_id: String,
    pub timestamp: i64,
    pub text: String,
}

/// Author of the message an inbound event replies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyContext {
    pub from_id: String,
    pub is_bot: bool,
}

/// Platform-neutral inbound chat event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub chat_id: String,
    pub chat_type: ChatType,
    pub message_id: i64,
    pub timestamp: i64,
    pub from_id: String,
    pub is_bot_sender: bool,
    pub text: String,
    pub reply_to: Option<ReplyContext>,
}

impl InboundEvent {
    /// Whether this event replies to a message sent by the bot with user id `bot_id`.
    ///
    /// Replies to other bots never count. An empty `bot_id` accepts any bot.
    #[must_use]
    pub fn is_reply_to_bot(&self, bot_id: &str) -> bool {
        self.reply_to
            .as_ref()
            .is_some_and(|r| r.is_bot && (bot_id.is_empty() || r.from_id == bot_id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Formatting {
    Plain,
    /// Text is already valid Telegram MarkdownV2.
    MarkdownV2,
}

impl Formatting {
    #[must_use]
    pub fn parse_mode(self) -> Option<&'static str> {
        match self {
            Formatting::Plain => None,
            Formatting::MarkdownV2 => Some("MarkdownV2"),
        }
    }
}

/// A reply to deliver; may be split into several sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundReply {
    pub chat_id: String,
    pub text: String,
    pub formatting: Formatting,
    pub reply_to_message_id: Option<i64>,
}

impl OutboundReply {
    pub fn plain(chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            text: text.into(),
            formatting: Formatting::Plain,
            reply_to_message_id: None,
        }
    }

    pub fn markdown(chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            text: text.into(),
            formatting: Formatting::MarkdownV2,
            reply_to_message_id: None,
        }
    }

    #[must_use]
    pub fn replying_to(mut self, message_id: Option<i64>) -> Self {
        self.reply_to_message_id = message_id;
        self
    }
}

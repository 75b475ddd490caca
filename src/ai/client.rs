//! Hugging Face inference client
//!
//! Encapsulates every call to the remote text-generation service. One call is
//! one attempt: retries live in `super::retry`.

use async_trait::async_trait;
use openai_api_rs::v1::chat_completion::{ChatCompletionMessage, Content, MessageRole};
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info};

use super::prompt::{TEXT_TO_TEXT_PREFIX, sanitize_model_input, system_prompt};
use crate::core::config::AppConfig;
use crate::errors::{BotError, ServiceError};

/// Response fields holding generated text, in order of preference.
pub const TEXT_FIELDS: [&str; 2] = ["summary_text", "generated_text"];

/// JSON pointer to the reply of an OpenAI-compatible chat completion.
const CHAT_CONTENT_POINTER: &str = "/choices/0/message/content";

/// The opaque remote summarizer: one prompt in, one text out.
#[async_trait]
pub trait SummaryBackend: Send + Sync {
    /// Make exactly one attempt to summarize `text` within `max_tokens`.
    async fn summarize(&self, text: &str, max_tokens: u32) -> Result<String, ServiceError>;

    /// Whether the backend is configured well enough to try calls.
    fn is_ready(&self) -> bool {
        true
    }
}

/// How a model expects its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStyle {
    /// T5-style models: raw `text-generation` with a `summarize:` prefix.
    TextToText,
    /// Instruct models behind the OpenAI-compatible chat route.
    Chat,
}

impl PromptStyle {
    #[must_use]
    pub fn for_model(model_id: &str) -> Self {
        let lower = model_id.to_lowercase();
        if lower.contains("t5") {
            PromptStyle::TextToText
        } else {
            PromptStyle::Chat
        }
    }
}

/// Pull the generated text out of an inference payload.
///
/// Looks at the payload itself, or at its first element when it is an array,
/// and takes the first of `summary_text`, `generated_text`, the chat
/// completion content. Falls back to the raw payload serialized as JSON.
#[must_use]
pub fn extract_summary_text(payload: &Value) -> String {
    let item = match payload {
        Value::Array(items) => items.first().unwrap_or(payload),
        _ => payload,
    };

    TEXT_FIELDS
        .iter()
        .find_map(|field| item.get(*field).and_then(Value::as_str))
        .or_else(|| item.pointer(CHAT_CONTENT_POINTER).and_then(Value::as_str))
        .map_or_else(|| payload.to_string(), |text| text.trim().to_string())
}

fn has_text_field(payload: &Value) -> bool {
    let item = match payload {
        Value::Array(items) => items.first().unwrap_or(payload),
        _ => payload,
    };
    TEXT_FIELDS.iter().any(|field| item.get(*field).is_some())
        || item.pointer(CHAT_CONTENT_POINTER).is_some()
}

/// Inference client for the Hugging Face router.
pub struct HfClient {
    http: Client,
    api_key: String,
    model_id: String,
    base_url: String,
    language: String,
    style: PromptStyle,
}

impl HfClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, BotError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.tuning.inference_timeout_secs))
            .build()
            .map_err(|e| BotError::InferenceError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key: config.hf_api_key.clone(),
            model_id: config.model_id.clone(),
            base_url: config.inference_base_url.trim_end_matches('/').to_string(),
            language: config.summary_language.clone(),
            style: PromptStyle::for_model(&config.model_id),
        })
    }

    #[must_use]
    pub fn style(&self) -> PromptStyle {
        self.style
    }

    #[must_use]
    pub fn endpoint(&self) -> String {
        match self.style {
            PromptStyle::Chat => format!("{}/v1/chat/completions", self.base_url),
            PromptStyle::TextToText => {
                format!("{}/hf-inference/models/{}", self.base_url, self.model_id)
            }
        }
    }

    #[must_use]
    pub fn build_chat_messages(&self, text: &str) -> Vec<ChatCompletionMessage> {
        vec![
            ChatCompletionMessage {
                role: MessageRole::system,
                content: Content::Text(system_prompt(&self.language)),
                name: None,
                tool_calls: None,
                tool_call_id: None,
            },
            ChatCompletionMessage {
                role: MessageRole::user,
                content: Content::Text(sanitize_model_input(text)),
                name: None,
                tool_calls: None,
                tool_call_id: None,
            },
        ]
    }

    /// JSON body for one summarization request in this client's prompt style.
    #[must_use]
    pub fn build_request_body(&self, text: &str, max_tokens: u32) -> Value {
        match self.style {
            PromptStyle::Chat => {
                let messages: Vec<Value> = self
                    .build_chat_messages(text)
                    .iter()
                    .map(|msg| {
                        let role = match msg.role {
                            MessageRole::system => "system",
                            MessageRole::user => "user",
                            MessageRole::assistant => "assistant",
                            MessageRole::function => "function",
                            MessageRole::tool => "tool",
                        };
                        let content = match &msg.content {
                            Content::Text(text) => json!(text),
                            Content::ImageUrl(_) => json!(""),
                        };
                        json!({ "role": role, "content": content })
                    })
                    .collect();

                json!({
                    "model": self.model_id,
                    "messages": messages,
                    "max_tokens": max_tokens,
                    "temperature": 0.2,
                    "stream": false
                })
            }
            PromptStyle::TextToText => json!({
                "inputs": format!("{TEXT_TO_TEXT_PREFIX}{}", sanitize_model_input(text)),
                "parameters": {
                    "max_new_tokens": max_tokens,
                    "do_sample": false,
                    "repetition_penalty": 1.1,
                    "return_full_text": false
                }
            }),
        }
    }
}

#[async_trait]
impl SummaryBackend for HfClient {
    async fn summarize(&self, text: &str, max_tokens: u32) -> Result<String, ServiceError> {
        #[cfg(feature = "debug-logs")]
        debug!("Inference input:\n{}", text);

        info!(
            "Requesting summary from {} ({} chars, max_tokens={})",
            self.model_id,
            text.chars().count(),
            max_tokens
        );

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&self.build_request_body(text, max_tokens))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ServiceError::from_status(status.as_u16(), &body));
        }

        let payload: Value = serde_json::from_str(&body)
            .map_err(|e| ServiceError::other(format!("Invalid inference response: {e}")))?;

        // Some deployments answer 200 with only an `error` field.
        if !has_text_field(&payload)
            && let Some(message) = payload.get("error").and_then(Value::as_str)
        {
            return Err(ServiceError::from_status(status.as_u16(), message));
        }

        let summary = extract_summary_text(&payload);
        debug!("Inference returned {} chars", summary.chars().count());
        Ok(summary)
    }

    fn is_ready(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.model_id.trim().is_empty()
    }
}

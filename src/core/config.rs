use std::env;
use std::str::FromStr;

use crate::errors::BotError;
use crate::summarize::chunker::DEFAULT_CHUNK_MAX_CHARS;
use crate::utils::formatter::DEFAULT_SEGMENT_LIMIT;

pub const DEFAULT_MODEL_ID: &str = "meta-llama/Meta-Llama-3.1-8B-Instruct";
pub const DEFAULT_DB_PATH: &str = "/tmp/messages.db";
pub const DEFAULT_INFERENCE_BASE_URL: &str = "https://router.huggingface.co";
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bot_token: String,
    /// Numeric user id of the bot itself, used to recognise replies to its own messages.
    /// Empty accepts a reply to any bot.
    pub bot_id: String,
    pub hf_api_key: String,
    pub model_id: String,
    /// Lower-cased, without the leading `@`. Empty disables mention routing.
    pub bot_username: String,
    pub db_path: String,
    /// Retention in days; `<= 0` disables the sweep.
    pub cleanup_days: i64,
    pub inference_base_url: String,
    pub telegram_api_base: String,
    pub webhook_secret: Option<String>,
    pub summary_language: String,
    pub tuning: Tuning,
}

/// Numeric knobs of the summarization pipeline and delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuning {
    pub chunk_max_chars: usize,
    pub max_retries: u32,
    pub backoff_cap_secs: u64,
    pub inference_timeout_secs: u64,
    pub partial_max_tokens: u32,
    pub final_max_tokens: u32,
    pub segment_limit: usize,
    pub segment_delay_ms: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            chunk_max_chars: DEFAULT_CHUNK_MAX_CHARS,
            max_retries: 5,
            backoff_cap_secs: 12,
            inference_timeout_secs: 120,
            partial_max_tokens: 180,
            final_max_tokens: 250,
            segment_limit: DEFAULT_SEGMENT_LIMIT,
            segment_delay_ms: 350,
        }
    }
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns `BotError::ConfigError` when a required variable is missing or a
    /// numeric one does not parse.
    pub fn from_env() -> Result<Self, BotError> {
        let defaults = Tuning::default();
        let bot_token = required_var("BOT_TOKEN")?;
        let bot_id = env::var("BOT_ID")
            .ok()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| bot_id_from_token(&bot_token));

        Ok(Self {
            bot_token,
            bot_id,
            hf_api_key: required_var("HF_API_KEY")?,
            model_id: env::var("MODEL_ID").unwrap_or_else(|_| DEFAULT_MODEL_ID.to_string()),
            bot_username: normalize_username(&env::var("BOT_USERNAME").unwrap_or_default()),
            db_path: env::var("DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string()),
            cleanup_days: parse_var("CLEANUP_DAYS", 30)?,
            inference_base_url: env::var("INFERENCE_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_INFERENCE_BASE_URL.to_string()),
            telegram_api_base: env::var("TELEGRAM_API_BASE")
                .unwrap_or_else(|_| DEFAULT_TELEGRAM_API_BASE.to_string()),
            webhook_secret: env::var("TELEGRAM_WEBHOOK_SECRET")
                .ok()
                .filter(|s| !s.is_empty()),
            summary_language: env::var("SUMMARY_LANGUAGE")
                .unwrap_or_else(|_| "English".to_string()),
            tuning: Tuning {
                chunk_max_chars: parse_var("CHUNK_MAX_CHARS", defaults.chunk_max_chars)?,
                max_retries: parse_var("MAX_RETRIES", defaults.max_retries)?,
                backoff_cap_secs: parse_var("BACKOFF_CAP_SECS", defaults.backoff_cap_secs)?,
                inference_timeout_secs: parse_var(
                    "INFERENCE_TIMEOUT_SECS",
                    defaults.inference_timeout_secs,
                )?,
                partial_max_tokens: parse_var("PARTIAL_MAX_TOKENS", defaults.partial_max_tokens)?,
                final_max_tokens: parse_var("FINAL_MAX_TOKENS", defaults.final_max_tokens)?,
                segment_limit: parse_var("SEGMENT_LIMIT", defaults.segment_limit)?,
                segment_delay_ms: parse_var("SEGMENT_DELAY_MS", defaults.segment_delay_ms)?,
            },
        })
    }

    /// `sqlx` connection URL for `db_path`.
    #[must_use]
    pub fn database_url(&self) -> String {
        if self.db_path.starts_with("sqlite:") {
            self.db_path.clone()
        } else {
            format!("sqlite://{}", self.db_path)
        }
    }
}

/// The bot's user id: the numeric part of a `<id>:<secret>` token.
///
/// Returns an empty string when the token has no numeric prefix.
#[must_use]
pub fn bot_id_from_token(token: &str) -> String {
    token
        .split_once(':')
        .map(|(id, _)| id.trim())
        .filter(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
        .unwrap_or_default()
}

/// Lower-case a bot username and drop any leading `@`.
#[must_use]
pub fn normalize_username(raw: &str) -> String {
    raw.trim().trim_start_matches('@').to_lowercase()
}

fn required_var(name: &str) -> Result<String, BotError> {
    env::var(name).map_err(|e| BotError::ConfigError(format!("{}: {}", name, e)))
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, BotError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| BotError::ConfigError(format!("{}: {}", name, e))),
        _ => Ok(default),
    }
}

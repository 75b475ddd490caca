use thiserror::Error;

/// Crate-level error for everything outside the remote summarization calls.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Failed to access message store: {0}")]
    StorageError(String),

    #[error("Failed to access Telegram API: {0}")]
    TelegramError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Failed to parse inbound update: {0}")]
    ParseError(String),

    #[error("Failed to access inference API: {0}")]
    InferenceError(String),
}

impl From<sqlx::Error> for BotError {
    fn from(error: sqlx::Error) -> Self {
        BotError::StorageError(error.to_string())
    }
}

impl From<reqwest::Error> for BotError {
    fn from(error: reqwest::Error) -> Self {
        BotError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for BotError {
    fn from(error: serde_json::Error) -> Self {
        BotError::ParseError(error.to_string())
    }
}

/// Classification of a single failed call to the inference service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Overloaded, cold-starting, rate-limited or unreachable. Worth retrying.
    Transient,
    /// Credentials rejected. Never retried.
    Auth,
    /// Anything we could not classify. Never retried.
    Other,
}

/// Error from one attempt against the inference service.
#[derive(Debug, Clone, Error)]
#[error("{kind:?} inference failure: {message}")]
pub struct ServiceError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ServiceError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Transient,
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Auth,
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Other,
            message: message.into(),
        }
    }

    /// Map an HTTP status from the inference API onto an `ErrorKind`.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        let kind = match status {
            401 | 403 => ErrorKind::Auth,
            408 | 425 | 429 | 500 | 502 | 503 | 504 => ErrorKind::Transient,
            _ if looks_like_cold_start(body) => ErrorKind::Transient,
            _ => ErrorKind::Other,
        };
        Self {
            kind,
            message: format!("HTTP {status}: {}", truncate_body(body)),
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() || error.is_connect() || error.is_request() {
            ServiceError::transient(error.to_string())
        } else if let Some(status) = error.status() {
            ServiceError::from_status(status.as_u16(), &error.to_string())
        } else {
            ServiceError::other(error.to_string())
        }
    }
}

/// Outcome of a whole retried call, once the retry loop has given up.
#[derive(Debug, Clone, Error)]
pub enum SummarizeError {
    #[error("Inference service rejected credentials: {0}")]
    Auth(String),

    #[error("Inference service still unavailable after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: String },

    #[error("Inference call failed: {0}")]
    Failed(String),
}

impl SummarizeError {
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, SummarizeError::Auth(_))
    }
}

fn looks_like_cold_start(body: &str) -> bool {
    let lower = body.to_ascii_lowercase();
    lower.contains("currently loading") || lower.contains("estimated_time")
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 300;
    if body.chars().count() > MAX {
        let head: String = body.chars().take(MAX).collect();
        format!("{head}...")
    } else {
        body.to_string()
    }
}

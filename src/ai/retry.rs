//! Retry state machine around single inference attempts.
//!
//! Only transient failures are retried, with capped exponential backoff
//! (`min(2^attempt, cap)` seconds). Auth and unclassified failures abort on
//! the spot.

use std::iter::Take;
use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{error, warn};

use super::client::SummaryBackend;
use crate::core::config::Tuning;
use crate::errors::{ErrorKind, SummarizeError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_retries: u32,
    /// Upper bound of a single backoff sleep.
    pub cap: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            cap: Duration::from_secs(12),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            max_retries: tuning.max_retries,
            cap: Duration::from_secs(tuning.backoff_cap_secs),
        }
    }

    /// Sleeps between consecutive attempts: 2s, 4s, 8s, ... capped at `cap`.
    #[must_use]
    pub fn delays(&self) -> Take<ExponentialBackoff> {
        let gaps = self.max_retries.max(1) - 1;
        ExponentialBackoff::from_millis(2)
            .factor(1000)
            .max_delay(self.cap)
            .take(gaps as usize)
    }
}

/// Progress of one retried call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryState {
    pub attempt: u32,
    pub last_error: Option<ErrorKind>,
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep this long, then try again.
    Retry(Duration),
    /// Stop; `RetryState::into_error` names the outcome.
    GiveUp,
}

impl RetryState {
    /// Record a failed attempt of `kind` and decide the next step.
    ///
    /// Only transient failures draw a delay from `delays`; an exhausted
    /// schedule gives up.
    pub fn on_failure<I>(&mut self, kind: ErrorKind, delays: &mut I) -> RetryDecision
    where
        I: Iterator<Item = Duration>,
    {
        self.attempt += 1;
        self.last_error = Some(kind);
        match kind {
            ErrorKind::Transient => delays.next().map_or(RetryDecision::GiveUp, RetryDecision::Retry),
            ErrorKind::Auth | ErrorKind::Other => RetryDecision::GiveUp,
        }
    }

    /// Final error for a call that gave up after the last recorded failure.
    #[must_use]
    pub fn into_error(self, message: String) -> SummarizeError {
        match self.last_error {
            Some(ErrorKind::Auth) => SummarizeError::Auth(message),
            Some(ErrorKind::Transient) => SummarizeError::Exhausted {
                attempts: self.attempt,
                last: message,
            },
            Some(ErrorKind::Other) | None => SummarizeError::Failed(message),
        }
    }
}

/// Summarize `text` through `backend`, retrying transient failures per `policy`.
///
/// # Errors
///
/// - `SummarizeError::Auth` on the first credential failure, without retrying.
/// - `SummarizeError::Failed` on the first unclassified failure.
/// - `SummarizeError::Exhausted` when every attempt failed transiently.
pub async fn summarize_one(
    backend: &dyn SummaryBackend,
    policy: &RetryPolicy,
    text: &str,
    max_tokens: u32,
) -> Result<String, SummarizeError> {
    let mut state = RetryState::default();
    let mut delays = policy.delays();

    loop {
        let err = match backend.summarize(text, max_tokens).await {
            Ok(summary) => return Ok(summary),
            Err(err) => err,
        };

        match state.on_failure(err.kind, &mut delays) {
            RetryDecision::Retry(wait) => {
                warn!(
                    attempt = state.attempt,
                    last_error = ?state.last_error,
                    "Inference attempt failed, retrying in {:?}: {}",
                    wait,
                    err.message
                );
                tokio::time::sleep(wait).await;
            }
            RetryDecision::GiveUp => {
                error!(
                    attempt = state.attempt,
                    last_error = ?state.last_error,
                    "Inference call gave up: {}",
                    err.message
                );
                return Err(state.into_error(err.message));
            }
        }
    }
}

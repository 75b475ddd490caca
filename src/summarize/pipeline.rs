//! Map/reduce summarization of stored chat history.

use std::sync::Arc;
use tracing::{info, warn};

use super::chunker::chunk_texts;
use crate::ai::prompt::{build_reduce_input, chunk_placeholder};
use crate::ai::{RetryPolicy, SummaryBackend, summarize_one};
use crate::core::config::Tuning;
use crate::errors::SummarizeError;
use crate::storage::MessageStore;

/// Chunk, map and reduce message texts into one summary.
#[derive(Clone)]
pub struct Summarizer {
    backend: Arc<dyn SummaryBackend>,
    policy: RetryPolicy,
    chunk_max_chars: usize,
    partial_max_tokens: u32,
    final_max_tokens: u32,
}

impl Summarizer {
    #[must_use]
    pub fn new(backend: Arc<dyn SummaryBackend>, tuning: &Tuning) -> Self {
        Self {
            backend,
            policy: RetryPolicy::from_tuning(tuning),
            chunk_max_chars: tuning.chunk_max_chars,
            partial_max_tokens: tuning.partial_max_tokens,
            final_max_tokens: tuning.final_max_tokens,
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.backend.is_ready()
    }

    /// Summarize texts given in chronological order. `Ok(None)` when nothing is left
    /// after dropping blank texts.
    ///
    /// # Errors
    ///
    /// Only an auth failure of the inference service is returned; every other
    /// failure degrades to placeholders or unreduced partials.
    pub async fn summarize_texts(&self, texts: &[String]) -> Result<Option<String>, SummarizeError> {
        let chunks = chunk_texts(texts, self.chunk_max_chars);
        if chunks.is_empty() {
            return Ok(None);
        }
        self.summarize_chunks(&chunks).await.map(Some)
    }

    /// Map every chunk to a partial summary, then reduce the partials.
    ///
    /// # Errors
    ///
    /// Returns `SummarizeError::Auth` as soon as the service rejects the
    /// credentials; no further calls are made.
    pub async fn summarize_chunks(&self, chunks: &[String]) -> Result<String, SummarizeError> {
        info!("Summarizing {} chunk(s)", chunks.len());

        let mut partials = Vec::with_capacity(chunks.len());
        for (idx, chunk) in chunks.iter().enumerate() {
            match summarize_one(
                self.backend.as_ref(),
                &self.policy,
                chunk,
                self.partial_max_tokens,
            )
            .await
            {
                Ok(partial) => partials.push(partial),
                Err(e) if e.is_auth() => return Err(e),
                Err(e) => {
                    warn!("Chunk {} of {} failed: {}", idx + 1, chunks.len(), e);
                    partials.push(chunk_placeholder(idx + 1));
                }
            }
        }

        let merged = partials.join("\n\n");
        let reduce_input = build_reduce_input(&merged);

        match summarize_one(
            self.backend.as_ref(),
            &self.policy,
            &reduce_input,
            self.final_max_tokens,
        )
        .await
        {
            Ok(summary) => Ok(summary),
            Err(e) if e.is_auth() => Err(e),
            Err(e) => {
                warn!("Reduce step failed, returning partial summaries: {}", e);
                Ok(merged)
            }
        }
    }
}

/// Fetch, order and summarize the last `n` stored messages of `chat_id`.
///
/// Runs the retention sweep first. `Ok(None)` means there was nothing to summarize.
///
/// # Errors
///
/// Propagates `SummarizeError::Auth` from the summarizer.
pub async fn summarize_last_n(
    store: &MessageStore,
    summarizer: &Summarizer,
    chat_id: &str,
    n: u32,
    retention_days: i64,
    now: i64,
) -> Result<Option<String>, SummarizeError> {
    store.cleanup_expired(retention_days, now).await;

    let mut texts = store.fetch_last(chat_id, n).await;
    if texts.is_empty() {
        return Ok(None);
    }
    // Newest-first from the store; the model needs chronological order.
    texts.reverse();
    info!("Summarizing {} messages for chat {}", texts.len(), chat_id);

    summarizer.summarize_texts(&texts).await
}

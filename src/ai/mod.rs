//! Remote summarization: inference client, prompts and retry policy

pub mod client;
pub mod prompt;
pub mod retry;

// Re-export main types for convenience
pub use client::{HfClient, PromptStyle, SummaryBackend, extract_summary_text};
pub use retry::{RetryDecision, RetryPolicy, RetryState, summarize_one};

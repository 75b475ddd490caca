/// TLDR chat - a Telegram bot that logs group messages and summarizes the most recent ones.
///
/// The crate runs as a single webhook Lambda:
/// 1. Telegram posts every update to `/webhook`
/// 2. Human-authored text is stored in SQLite, keyed by chat and message id
/// 3. Commands such as `/last 200` chunk the stored history, summarize each chunk
///    with a Hugging Face model and merge the partial summaries into one reply
///
/// # Architecture
///
/// The system uses:
/// - AWS Lambda for serverless execution
/// - sqlx (SQLite) for the message log
/// - reqwest for the Telegram Bot API and Hugging Face inference
/// - tokio-retry for backoff on transient failures
/// - Tokio for async runtime
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tldr_chat::core::config::Tuning;
/// use tldr_chat::storage::MessageStore;
/// use tldr_chat::summarize::{Summarizer, summarize_last_n};
///
/// # async fn run(backend: Arc<dyn tldr_chat::ai::SummaryBackend>) -> Result<(), Box<dyn std::error::Error>> {
/// tldr_chat::setup_logging();
///
/// let store = MessageStore::in_memory().await?;
/// store.save("42", 1, "7", 1_700_000_000, "deploy moved to friday").await;
///
/// let summarizer = Summarizer::new(backend, &Tuning::default());
/// if let Some(summary) = summarize_last_n(&store, &summarizer, "42", 200, 30, 1_700_000_100).await? {
///     println!("Summary: {summary}");
/// }
/// # Ok(())
/// # }
/// ```
// Module declarations
pub mod ai;
pub mod api;
pub mod bot;
pub mod core;
pub mod errors;
pub mod storage;
pub mod summarize;
pub mod telegram;
pub mod utils;

pub use bot::SummaryBot;
pub use errors::BotError;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// Sets up tracing-subscriber with a JSON formatter suitable for `CloudWatch`
/// Logs. The level comes from `RUST_LOG` and defaults to `info`. Calling it more
/// than once is harmless; later calls leave the first subscriber in place.
///
/// # Example
///
/// ```
/// // Initialize structured logging at the start of your Lambda handler
/// tldr_chat::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

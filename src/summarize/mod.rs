//! Summarization pipeline: chunking plus map/reduce over the inference service

pub mod chunker;
pub mod pipeline;

pub use chunker::chunk_texts;
pub use pipeline::{Summarizer, summarize_last_n};

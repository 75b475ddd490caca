//! Telegram delivery

pub mod client;

pub use client::{ReplySink, TelegramClient};

//! Persistent message storage

pub mod messages;

pub use messages::MessageStore;

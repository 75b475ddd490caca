//! Configuration, domain types and command routing.

pub mod config;
pub mod models;
pub mod router;

//! Webhook Lambda handler and request processing

pub mod handler;
pub mod helpers;
pub mod parsing;
pub mod signature;

pub use handler::function_handler;

//! Request/response correlation over a message channel
//!
//! The mediator assigns each outbound request a fresh correlation id, parks
//! the caller until the response carrying that id arrives, and answers
//! inbound requests with the handler registered for their command.

mod config;
mod core;
mod error;
mod metrics;
mod pending;

pub use config::MediatorConfig;
pub use self::core::Mediator;
pub use error::MediatorError;
pub use metrics::MediatorMetrics;

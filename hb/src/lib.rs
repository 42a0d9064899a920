//! hostbridge - correlated request/response messaging between two peers
//!
//! Two sides of an application (a UI and its host) exchange messages over a
//! channel that offers ordered delivery and nothing else. A [`Mediator`] on
//! each side turns that into request/response calls: every request carries a
//! fresh correlation id, the response echoes it, and the waiting caller is
//! resumed with the response body.
//!
//! # Modules
//!
//! - [`message`] - Wire envelope (`Headers` + `Body`)
//! - [`correlation`] - Correlation id generator
//! - [`channel`] - Channel contract, in-process pair, and JSON-lines transport
//! - [`handlers`] - Request handlers, registry, and built-ins
//! - [`commands`] - Command names and their typed request/response bodies
//! - [`mediator`] - Request correlation and inbound dispatch
//! - [`ipc`] - Unix socket deployment
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod channel;
pub mod cli;
pub mod commands;
pub mod config;
pub mod correlation;
pub mod handlers;
pub mod ipc;
pub mod mediator;
pub mod message;

// Re-export commonly used types
pub use channel::{Channel, ChannelError, JsonLinesChannel, MemoryChannel, pair};
pub use commands::Command;
pub use config::{Config, TransportConfig};
pub use correlation::{Clock, CorrelationIdGenerator, SystemClock};
pub use handlers::{CommandHandler, HandlerRegistry, RequestHandler, handler_fn};
pub use mediator::{Mediator, MediatorConfig, MediatorError, MediatorMetrics};
pub use message::{CorrelationId, Headers, Message, MessageType};

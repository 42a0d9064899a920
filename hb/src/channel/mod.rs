//! Channel contract between the two sides of the bridge
//!
//! A channel delivers [`Message`]s in FIFO order, at most once, with no
//! request/response pairing of its own. The outbound half is the [`Channel`]
//! trait; the inbound half is an ordered `mpsc::Receiver<Message>` that the
//! mediator's receive loop drains.

use async_trait::async_trait;
use thiserror::Error;

use crate::message::Message;

pub mod lines;
pub mod memory;

pub use lines::{JsonLinesChannel, spawn_reader, split};
pub use memory::{MemoryChannel, pair};

/// Errors raised while sending a message
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChannelError {
    #[error("Channel closed")]
    Closed,

    #[error("IO error: {0}")]
    Io(String),

    #[error("Failed to encode message: {0}")]
    Encode(String),

    #[error("Message too large: {size} bytes (limit {limit})")]
    TooLarge { size: usize, limit: usize },
}

impl From<std::io::Error> for ChannelError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// Outbound half of a channel
#[async_trait]
pub trait Channel: Send + Sync {
    /// Send one message to the peer
    async fn send(&self, message: Message) -> Result<(), ChannelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_large_message() {
        let err = ChannelError::TooLarge { size: 2048, limit: 1024 };
        let msg = err.to_string();
        assert!(msg.contains("2048"));
        assert!(msg.contains("1024"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: ChannelError = io.into();
        assert!(matches!(err, ChannelError::Io(ref m) if m.contains("pipe closed")));
    }
}

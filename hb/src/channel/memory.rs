//! In-process channel pair
//!
//! Two cross-wired endpoints: whatever one side sends arrives on the other
//! side's inbound receiver. Used to run both sides of the bridge in one process.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use super::{Channel, ChannelError};
use crate::message::Message;

/// Outbound half of an in-process endpoint
#[derive(Debug, Clone)]
pub struct MemoryChannel {
    tx: mpsc::Sender<Message>,
}

#[async_trait]
impl Channel for MemoryChannel {
    async fn send(&self, message: Message) -> Result<(), ChannelError> {
        debug!(
            command = %message.command(),
            correlation_id = message.correlation_id(),
            message_type = %message.message_type(),
            "MemoryChannel::send: called"
        );
        self.tx.send(message).await.map_err(|_| ChannelError::Closed)
    }
}

/// One side of a [`pair`]: its outbound channel and its inbound receiver
pub type Endpoint = (MemoryChannel, mpsc::Receiver<Message>);

/// Create two connected endpoints with `buffer` slots per direction
pub fn pair(buffer: usize) -> (Endpoint, Endpoint) {
    debug!(buffer, "memory::pair: called");
    let (a_tx, a_rx) = mpsc::channel(buffer);
    let (b_tx, b_rx) = mpsc::channel(buffer);
    ((MemoryChannel { tx: b_tx }, a_rx), (MemoryChannel { tx: a_tx }, b_rx))
}

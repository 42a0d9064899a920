//! Newline-delimited JSON transport
//!
//! Each message is one line of JSON followed by `\n`. Works over any async
//! byte stream; the Unix-socket deployment uses [`split`].

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::net::unix::OwnedWriteHalf;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{Channel, ChannelError};
use crate::message::Message;

/// Writer half of a JSON-lines channel
///
/// Writes are serialized so concurrent senders never interleave lines.
pub struct JsonLinesChannel<W> {
    writer: Mutex<W>,
    max_message_size: usize,
}

impl<W> JsonLinesChannel<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W, max_message_size: usize) -> Self {
        Self {
            writer: Mutex::new(writer),
            max_message_size,
        }
    }
}

#[async_trait]
impl<W> Channel for JsonLinesChannel<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send(&self, message: Message) -> Result<(), ChannelError> {
        let line = serde_json::to_string(&message).map_err(|e| ChannelError::Encode(e.to_string()))?;
        if line.len() > self.max_message_size {
            return Err(ChannelError::TooLarge {
                size: line.len(),
                limit: self.max_message_size,
            });
        }

        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        debug!(
            command = %message.command(),
            correlation_id = message.correlation_id(),
            bytes = line.len(),
            "JsonLinesChannel::send: sent"
        );
        Ok(())
    }
}

/// Spawn a task decoding lines from `reader` into an ordered message stream
///
/// Oversized or undecodable lines are logged and skipped. The stream ends at
/// EOF, on a read error, or when the receiver is dropped.
pub fn spawn_reader<R>(reader: R, max_message_size: usize, buffer: usize) -> (mpsc::Receiver<Message>, JoinHandle<()>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(buffer);

    let task = tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = match reader.read_line(&mut line).await {
                Ok(0) => {
                    debug!("spawn_reader: end of stream");
                    break;
                }
                Ok(n) => n,
                Err(e) => {
                    warn!(error = %e, "Failed to read from channel");
                    break;
                }
            };

            if bytes_read > max_message_size {
                warn!(bytes_read, limit = max_message_size, "Dropping oversized message");
                continue;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let message: Message = match serde_json::from_str(trimmed) {
                Ok(message) => message,
                Err(e) => {
                    warn!(error = %e, "Dropping undecodable message");
                    continue;
                }
            };

            if tx.send(message).await.is_err() {
                debug!("spawn_reader: receiver dropped");
                break;
            }
        }

        info!("Channel reader stopped");
    });

    (rx, task)
}

/// Split a connected Unix stream into a JSON-lines channel and its inbound stream
pub fn split(
    stream: UnixStream,
    max_message_size: usize,
    buffer: usize,
) -> (JsonLinesChannel<OwnedWriteHalf>, mpsc::Receiver<Message>, JoinHandle<()>) {
    let (read_half, write_half) = stream.into_split();
    let (inbound, reader_task) = spawn_reader(read_half, max_message_size, buffer);
    (JsonLinesChannel::new(write_half, max_message_size), inbound, reader_task)
}

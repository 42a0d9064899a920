//! IPC client for the UI side
//!
//! Connects to the host bridge socket and wraps the stream in a mediator.

use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{Context, Result};
use tokio::net::UnixStream;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::channel::split;
use crate::config::Config;
use crate::mediator::{Mediator, MediatorConfig};

/// Connector for the host bridge socket
#[derive(Debug, Clone)]
pub struct BridgeClient {
    socket_path: PathBuf,
    timeout: Duration,
    max_message_size: usize,
    mediator: MediatorConfig,
}

impl BridgeClient {
    /// Create a client from the transport and mediator settings in `config`
    pub fn new(config: &Config) -> Self {
        Self {
            socket_path: config.transport.socket_path(),
            timeout: config.transport.connect_timeout(),
            max_message_size: config.transport.max_message_size,
            mediator: config.mediator.clone(),
        }
    }

    /// Use a custom socket path
    pub fn with_socket_path(mut self, socket_path: PathBuf) -> Self {
        self.socket_path = socket_path;
        self
    }

    /// Set a custom connect timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Check if the bridge socket exists
    pub fn socket_exists(&self) -> bool {
        self.socket_path.exists()
    }

    /// Connect and start the receive loop
    pub async fn connect(&self) -> Result<Connection> {
        debug!(?self.socket_path, "BridgeClient: connecting");

        let stream = tokio::time::timeout(self.timeout, UnixStream::connect(&self.socket_path))
            .await
            .context("Connection timeout")?
            .context("Failed to connect to bridge socket")?;

        let (channel, inbound, reader) = split(stream, self.max_message_size, self.mediator.inbound_buffer);
        let mediator = Mediator::new(channel, self.mediator.clone());
        let receive_loop = mediator.spawn(inbound);

        debug!(?self.socket_path, "BridgeClient: connected");
        Ok(Connection {
            mediator,
            receive_loop,
            reader,
        })
    }
}

/// Connect to the bridge socket at `socket_path` using `config`
pub async fn connect(socket_path: &Path, config: &Config) -> Result<Connection> {
    BridgeClient::new(config)
        .with_socket_path(socket_path.to_path_buf())
        .connect()
        .await
}

/// A live connection to the host
pub struct Connection {
    mediator: Mediator,
    receive_loop: JoinHandle<()>,
    reader: JoinHandle<()>,
}

impl Connection {
    /// Mediator bound to this connection; register UI-side handlers on it
    pub fn mediator(&self) -> &Mediator {
        &self.mediator
    }

    /// Stop reading and wait for the receive loop to finish
    ///
    /// Requests still waiting fail with `ResponseMissing`.
    pub async fn close(self) {
        debug!("Connection::close: called");
        self.reader.abort();
        let _ = self.reader.await;
        let _ = self.receive_loop.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_client_uses_config_socket_path() {
        let mut config = Config::default();
        config.transport.socket_path = Some(PathBuf::from("/custom/path/bridge.sock"));

        let client = BridgeClient::new(&config);
        assert_eq!(client.socket_path(), Path::new("/custom/path/bridge.sock"));
    }

    #[test]
    fn test_client_default_socket_path() {
        let client = BridgeClient::new(&Config::default());
        assert!(client.socket_path().ends_with("bridge.sock"));
    }

    #[test]
    fn test_client_with_timeout() {
        let client = BridgeClient::new(&Config::default()).with_timeout(Duration::from_secs(10));
        assert_eq!(client.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_socket_exists_false() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nonexistent.sock");
        let client = BridgeClient::new(&Config::default()).with_socket_path(path);
        assert!(!client.socket_exists());
    }

    #[tokio::test]
    async fn test_connect_missing_socket_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nonexistent.sock");

        let result = connect(&path, &Config::default()).await;
        assert!(result.is_err());
    }
}

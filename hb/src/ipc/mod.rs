//! Unix Domain Socket deployment of the bridge
//!
//! The host side listens on a socket and runs one [`Mediator`](crate::mediator::Mediator)
//! per accepted connection, with the built-in handlers registered. The UI side
//! connects and gets a mediator of its own over the same newline-delimited
//! JSON stream.

use std::path::PathBuf;

pub mod client;
pub mod listener;

pub use client::{BridgeClient, Connection, connect};
pub use listener::{cleanup_socket, create_listener_at, serve, serve_connection};

/// Get the default socket path for the bridge
pub fn get_socket_path() -> PathBuf {
    dirs::runtime_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("hostbridge")
        .join("bridge.sock")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_path_ends_with_bridge_sock() {
        let path = get_socket_path();
        assert!(path.ends_with("hostbridge/bridge.sock"));
    }
}

//! IPC listener for the host side
//!
//! Binds the bridge socket and runs a host mediator for each connection.

use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, info, warn};

use crate::channel::split;
use crate::config::Config;
use crate::handlers::builtin;
use crate::mediator::{Mediator, MediatorMetrics};

/// Bind the bridge socket at `socket_path`
///
/// Missing parent directories are created, and a socket file left behind by
/// an earlier host is replaced. Returns the listener with the bound path.
pub fn create_listener_at(socket_path: &Path) -> Result<(UnixListener, PathBuf)> {
    debug!(?socket_path, "create_listener_at: called");
    if let Some(dir) = socket_path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create socket directory {}", dir.display()))?;
    }

    if remove_socket_file(socket_path).context("Failed to remove stale bridge socket")? {
        debug!(?socket_path, "create_listener_at: replaced stale socket");
    }

    let listener = UnixListener::bind(socket_path)
        .with_context(|| format!("Failed to bind bridge socket {}", socket_path.display()))?;
    info!(?socket_path, "Bridge socket bound");

    Ok((listener, socket_path.to_path_buf()))
}

/// Remove the bridge socket once the host stops
pub fn cleanup_socket(socket_path: &Path) {
    match remove_socket_file(socket_path) {
        Ok(true) => debug!(?socket_path, "cleanup_socket: removed"),
        Ok(false) => debug!(?socket_path, "cleanup_socket: already gone"),
        Err(e) => warn!(?socket_path, error = %e, "Failed to remove bridge socket"),
    }
}

/// Returns whether a file was there to remove
fn remove_socket_file(socket_path: &Path) -> std::io::Result<bool> {
    match std::fs::remove_file(socket_path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Run a host mediator over one accepted connection until the peer hangs up
///
/// `register` installs the handlers this connection answers.
pub async fn serve_connection<F>(stream: UnixStream, config: &Config, register: F) -> MediatorMetrics
where
    F: FnOnce(&Mediator),
{
    debug!("serve_connection: called");
    let (channel, inbound, reader) = split(
        stream,
        config.transport.max_message_size,
        config.mediator.inbound_buffer,
    );

    let mediator = Mediator::new(channel, config.mediator.clone());
    register(&mediator);

    mediator.clone().run(inbound).await;
    if let Err(e) = reader.await {
        warn!(error = %e, "Connection reader task failed");
    }

    let metrics = mediator.metrics();
    debug!(?metrics, "serve_connection: finished");
    metrics
}

/// Accept connections until SIGINT or SIGTERM
///
/// With `once`, returns after the first connection closes.
pub async fn serve(listener: UnixListener, config: Config, once: bool) -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    debug!(once, "serve: called");
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    info!("Host bridge listening");
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, _) = accepted.context("Failed to accept connection")?;
                info!("Accepted bridge connection");

                let config = config.clone();
                let connection = tokio::spawn(async move {
                    let metrics = serve_connection(stream, &config, builtin::register_all).await;
                    info!(
                        requests_handled = metrics.requests_handled,
                        handler_failures = metrics.handler_failures,
                        "Bridge connection closed"
                    );
                });

                if once {
                    debug!("serve: single connection mode, waiting for it to close");
                    if let Err(e) = connection.await {
                        warn!(error = %e, "Connection task failed");
                    }
                    break;
                }
            }
            _ = sigint.recv() => {
                warn!("SIGINT received");
                break;
            }
            _ = sigterm.recv() => {
                warn!("SIGTERM received");
                break;
            }
        }
    }

    info!("Host bridge shutting down");
    Ok(())
}

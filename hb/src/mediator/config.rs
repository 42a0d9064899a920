//! Mediator configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Mediator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediatorConfig {
    /// Timeout applied by `request_with_default_timeout`, in milliseconds
    #[serde(rename = "request-timeout-ms", default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Buffer size of the inbound message stream
    #[serde(rename = "inbound-buffer", default = "default_inbound_buffer")]
    pub inbound_buffer: usize,

    /// Max handler invocations running at once
    #[serde(rename = "max-concurrent-handlers", default = "default_max_concurrent_handlers")]
    pub max_concurrent_handlers: usize,

    /// How many abandoned correlation ids are remembered for late responses
    #[serde(rename = "abandoned-capacity", default = "default_abandoned_capacity")]
    pub abandoned_capacity: usize,

    /// Buffer size of the report broadcast
    #[serde(rename = "report-buffer", default = "default_report_buffer")]
    pub report_buffer: usize,
}

fn default_request_timeout_ms() -> u64 {
    debug!("default_request_timeout_ms: called");
    30_000
}

fn default_inbound_buffer() -> usize {
    debug!("default_inbound_buffer: called");
    1000
}

fn default_max_concurrent_handlers() -> usize {
    debug!("default_max_concurrent_handlers: called");
    64
}

fn default_abandoned_capacity() -> usize {
    debug!("default_abandoned_capacity: called");
    1024
}

fn default_report_buffer() -> usize {
    debug!("default_report_buffer: called");
    256
}

impl Default for MediatorConfig {
    fn default() -> Self {
        debug!("MediatorConfig::default: called");
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            inbound_buffer: default_inbound_buffer(),
            max_concurrent_handlers: default_max_concurrent_handlers(),
            abandoned_capacity: default_abandoned_capacity(),
            report_buffer: default_report_buffer(),
        }
    }
}

impl MediatorConfig {
    /// Get the default request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        debug!(request_timeout_ms = %self.request_timeout_ms, "MediatorConfig::request_timeout: called");
        Duration::from_millis(self.request_timeout_ms)
    }
}

//! Mediator error types

use thiserror::Error;

use crate::channel::ChannelError;
use crate::message::CorrelationId;

/// Protocol and dispatch errors
///
/// Errors raised in the receive context have no waiting caller; they are
/// logged and broadcast through [`Mediator::reports`](super::Mediator::reports).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MediatorError {
    #[error("No handler registered for command: {command}")]
    NoHandlerRegistered { command: String, correlation_id: CorrelationId },

    #[error("No pending request for correlation id {correlation_id} (command {command})")]
    UnknownCorrelationId { command: String, correlation_id: CorrelationId },

    #[error("Message type not recognized: {message_type}")]
    UnrecognizedMessageType {
        message_type: String,
        correlation_id: CorrelationId,
    },

    #[error("Request {correlation_id} ({command}) was released without a response")]
    ResponseMissing { command: String, correlation_id: CorrelationId },

    #[error("Handler for {command} failed on request {correlation_id}: {message}")]
    HandlerFailure {
        command: String,
        correlation_id: CorrelationId,
        message: String,
    },

    #[error("Correlation id {correlation_id} is already pending")]
    DuplicateCorrelationId { correlation_id: CorrelationId },

    #[error("Request {correlation_id} ({command}) timed out after {timeout_ms}ms")]
    Timeout {
        command: String,
        correlation_id: CorrelationId,
        timeout_ms: u64,
    },

    #[error("Failed to encode or decode {command} body: {message}")]
    Codec { command: String, message: String },

    #[error(transparent)]
    Channel(#[from] ChannelError),
}

impl MediatorError {
    /// Short stable name of the error kind, for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoHandlerRegistered { .. } => "no-handler-registered",
            Self::UnknownCorrelationId { .. } => "unknown-correlation-id",
            Self::UnrecognizedMessageType { .. } => "unrecognized-message-type",
            Self::ResponseMissing { .. } => "response-missing",
            Self::HandlerFailure { .. } => "handler-failure",
            Self::DuplicateCorrelationId { .. } => "duplicate-correlation-id",
            Self::Timeout { .. } => "timeout",
            Self::Codec { .. } => "codec",
            Self::Channel(_) => "channel",
        }
    }
}

//! Wire envelope exchanged between the UI and host sides
//!
//! Every message is a single record with a `Headers` block and an opaque `Body`:
//!
//! ```json
//! {"Headers":{"Type":"REQUEST","Command":"ECHO","CorrelationId":170000000000001},"Body":{"v":1}}
//! ```
//!
//! The body schema belongs to the command's handler pair; nothing in the
//! mediator looks inside it.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Integer tag linking one outbound request to its eventual response
pub type CorrelationId = u64;

const REQUEST: &str = "REQUEST";
const RESPONSE: &str = "RESPONSE";

/// Value of the `Type` header
///
/// Unknown wire values decode into `Unrecognized` so the receiving side can
/// report them instead of failing at the decoding stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageType {
    Request,
    Response,
    Unrecognized(String),
}

impl MessageType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Request => REQUEST,
            Self::Response => RESPONSE,
            Self::Unrecognized(other) => other,
        }
    }
}

impl From<String> for MessageType {
    fn from(value: String) -> Self {
        match value.as_str() {
            REQUEST => Self::Request,
            RESPONSE => Self::Response,
            _ => Self::Unrecognized(value),
        }
    }
}

impl From<MessageType> for String {
    fn from(value: MessageType) -> Self {
        match value {
            MessageType::Unrecognized(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routing metadata of a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Headers {
    #[serde(rename = "Type")]
    pub message_type: MessageType,

    /// Command name; echoed back on responses for traceability
    pub command: String,

    pub correlation_id: CorrelationId,
}

/// The unit exchanged over a [`Channel`](crate::channel::Channel)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Message {
    pub headers: Headers,

    #[serde(default)]
    pub body: Value,
}

impl Message {
    /// Build a request for `command`
    pub fn request(command: impl Into<String>, correlation_id: CorrelationId, body: Value) -> Self {
        Self {
            headers: Headers {
                message_type: MessageType::Request,
                command: command.into(),
                correlation_id,
            },
            body,
        }
    }

    /// Build a response for `command`
    pub fn response(command: impl Into<String>, correlation_id: CorrelationId, body: Value) -> Self {
        Self {
            headers: Headers {
                message_type: MessageType::Response,
                command: command.into(),
                correlation_id,
            },
            body,
        }
    }

    /// Build the response answering this message, echoing its command and correlation id
    pub fn reply(&self, body: Value) -> Self {
        Self::response(self.headers.command.clone(), self.headers.correlation_id, body)
    }

    pub fn message_type(&self) -> &MessageType {
        &self.headers.message_type
    }

    pub fn command(&self) -> &str {
        &self.headers.command
    }

    pub fn correlation_id(&self) -> CorrelationId {
        self.headers.correlation_id
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Command, ECHO, PING};

/// Returns its request body unchanged
pub struct Echo;

impl Command for Echo {
    const NAME: &'static str = ECHO;
    type Request = Value;
    type Response = Value;
}

/// Liveness check answered with the peer's version
pub struct Ping;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PingResponse {
    pub version: String,
}

impl Command for Ping {
    const NAME: &'static str = PING;
    type Request = super::Empty;
    type Response = PingResponse;
}

use async_trait::async_trait;
use eyre::Result;
use tracing::debug;

use crate::commands::{Empty, Ping, PingResponse};
use crate::handlers::CommandHandler;

/// Answers with the bridge version
pub struct PingHandler {
    version: String,
}

impl PingHandler {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }
}

impl Default for PingHandler {
    fn default() -> Self {
        Self::new(env!("GIT_DESCRIBE"))
    }
}

#[async_trait]
impl CommandHandler<Ping> for PingHandler {
    async fn handle(&self, _request: Empty) -> Result<PingResponse> {
        debug!(version = %self.version, "PingHandler::handle: called");
        Ok(PingResponse {
            version: self.version.clone(),
        })
    }
}

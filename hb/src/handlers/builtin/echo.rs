use async_trait::async_trait;
use eyre::Result;
use serde_json::Value;

use crate::commands::Echo;
use crate::handlers::CommandHandler;

/// Answers with the request body unchanged
pub struct EchoHandler;

#[async_trait]
impl CommandHandler<Echo> for EchoHandler {
    async fn handle(&self, request: Value) -> Result<Value> {
        Ok(request)
    }
}

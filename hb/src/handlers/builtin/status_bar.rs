use async_trait::async_trait;
use eyre::{Result, eyre};
use tracing::info;

use crate::commands::{Empty, UpdateStatusBar, UpdateStatusBarRequest};
use crate::handlers::CommandHandler;

/// Logs progress the UI reports for long-running work
pub struct StatusBarHandler;

#[async_trait]
impl CommandHandler<UpdateStatusBar> for StatusBarHandler {
    async fn handle(&self, request: UpdateStatusBarRequest) -> Result<Empty> {
        match request.percentage {
            Some(p) if !(0.0..=100.0).contains(&p) => Err(eyre!("Percentage out of range: {}", p)),
            Some(p) => {
                info!(percentage = p, message = request.message.as_deref().unwrap_or(""), "Status bar");
                Ok(Empty {})
            }
            None => {
                info!("Status bar hidden");
                Ok(Empty {})
            }
        }
    }
}

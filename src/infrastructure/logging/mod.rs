use crate::core::errors::TallyError;
use crate::core::models::log::AppLog;
use async_trait::async_trait;

#[async_trait]
pub trait LoggingService: Send + Sync {
    async fn log_action(
        &self,
        action: &str,
        details: serde_json::Value,
        user_id: Option<&str>,
    ) -> Result<(), TallyError>;
    async fn get_logs(&self) -> Result<Vec<AppLog>, TallyError>;
}

pub mod in_memory;

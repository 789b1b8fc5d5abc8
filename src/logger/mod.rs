use crate::error::PortalError;
use crate::models::audit::AppLog;
use async_trait::async_trait;

#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn log_action(
        &self,
        action: &str,
        details: serde_json::Value,
        actor: Option<&str>,
    ) -> Result<(), PortalError>;

    async fn get_logs(&self) -> Result<Vec<AppLog>, PortalError>;
}

pub mod in_memory;

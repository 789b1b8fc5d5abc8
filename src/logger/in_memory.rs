use crate::error::PortalError;
use crate::logger::AuditLog;
use crate::models::audit::AppLog;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone)]
pub struct InMemoryAuditLog {
    logs: Arc<RwLock<Vec<AppLog>>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        InMemoryAuditLog {
            logs: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryAuditLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn log_action(
        &self,
        action: &str,
        details: serde_json::Value,
        actor: Option<&str>,
    ) -> Result<(), PortalError> {
        let mut logs = self.logs.write().await;
        logs.push(AppLog {
            id: Uuid::new_v4().to_string(),
            action: action.to_string(),
            actor: actor.map(String::from),
            details,
            timestamp: chrono::Utc::now(),
        });
        Ok(())
    }

    async fn get_logs(&self) -> Result<Vec<AppLog>, PortalError> {
        let logs = self.logs.read().await;
        Ok(logs.clone())
    }
}

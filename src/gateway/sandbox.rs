use crate::error::PortalError;
use crate::gateway::PaymentGateway;
use crate::models::transaction::{GatewayOrder, PaymentStatusReport};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Gateway stand-in for local runs and tests: mints order handles and
/// tracks per-order payment status. `settle` and `fail` stand in for the
/// checkout UI completing or abandoning a payment.
#[derive(Clone)]
pub struct SandboxGateway {
    orders: Arc<Mutex<HashMap<String, (GatewayOrder, PaymentStatusReport)>>>,
}

impl SandboxGateway {
    pub fn new() -> Self {
        SandboxGateway {
            orders: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn settle(&self, order_id: &str) -> Result<(), PortalError> {
        self.set_status(order_id, PaymentStatusReport::Captured).await
    }

    pub async fn fail(&self, order_id: &str) -> Result<(), PortalError> {
        self.set_status(order_id, PaymentStatusReport::Failed).await
    }

    async fn set_status(
        &self,
        order_id: &str,
        status: PaymentStatusReport,
    ) -> Result<(), PortalError> {
        let mut orders = self.orders.lock().await;
        let entry = orders
            .get_mut(order_id)
            .ok_or_else(|| PortalError::OrderNotFound(order_id.to_string()))?;
        entry.1 = status;
        Ok(())
    }
}

impl Default for SandboxGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for SandboxGateway {
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
        payment_capture: bool,
    ) -> Result<GatewayOrder, PortalError> {
        let order = GatewayOrder {
            id: format!("order_{}", Uuid::new_v4().simple()),
            amount: amount_minor,
            currency: currency.to_string(),
            receipt: receipt.to_string(),
            payment_capture,
        };
        self.orders
            .lock()
            .await
            .insert(order.id.clone(), (order.clone(), PaymentStatusReport::Created));
        Ok(order)
    }

    async fn payment_status(&self, order_id: &str) -> Result<PaymentStatusReport, PortalError> {
        self.orders
            .lock()
            .await
            .get(order_id)
            .map(|(_, status)| status.clone())
            .ok_or_else(|| PortalError::OrderNotFound(order_id.to_string()))
    }
}

use crate::error::PortalError;
use crate::models::transaction::{GatewayOrder, PaymentStatusReport};
use async_trait::async_trait;

/// The external payment gateway: an opaque order-creation and checkout
/// service. Orders live on the gateway's side until a transaction is
/// recorded against them; `payment_status` is the server-side check used
/// before accepting a client-reported success.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
        payment_capture: bool,
    ) -> Result<GatewayOrder, PortalError>;

    async fn payment_status(&self, order_id: &str) -> Result<PaymentStatusReport, PortalError>;
}

pub mod sandbox;

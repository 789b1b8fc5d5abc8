use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order object minted by the payment gateway. Ephemeral: nothing is
/// persisted locally until a transaction is recorded against it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    /// Amount in minor units (paise).
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    /// Immediate/auto capture is the only mode used.
    pub payment_capture: bool,
}

/// Response of the order-creation endpoint: the gateway order echoed back
/// with the caller's student and description context.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutOrder {
    pub order: GatewayOrder,
    pub student_id: String,
    pub description: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatusReport {
    Created,
    Captured,
    Failed,
}

/// Append-only record of a completed payment attempt. Never updated after
/// insertion; linked to the fee ledger only by student id and description.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    pub student_id: String,
    pub amount_paid: f64,
    pub platform_fee: f64,
    pub description: String,
    pub transaction_id: String,
    pub gateway_payment_id: String,
    pub gateway_order_id: String,
    pub receipt_id: String,
    pub payment_method: String,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

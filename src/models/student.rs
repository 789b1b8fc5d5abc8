use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
}

/// Roster record. The billing core reads these rows but never mutates
/// them; `payment_status` is maintained independently of campaign
/// membership.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub school_id: String,
    pub name: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub section: String,
    pub mob: String,
    pub payment_status: PaymentStatus,
}

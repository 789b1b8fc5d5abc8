use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Serialize)]
pub enum PortalError {
    /// School with given ID not found
    #[error("School {0} not found")]
    SchoolNotFound(String),

    /// Student with given ID not found
    #[error("Student {0} not found")]
    StudentNotFound(String),

    /// No attendance row exists for the student
    #[error("Attendance for student {0} not found")]
    AttendanceNotFound(String),

    /// Magic-link authentication failed. Deliberately generic: the caller
    /// cannot tell an unknown link from a wrong passcode.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Payment amount is not a positive finite number
    #[error("Invalid payment amount: {0}")]
    InvalidAmount(f64),

    /// Gateway order with given ID not found
    #[error("Order {0} not found")]
    OrderNotFound(String),

    /// The gateway does not report the referenced order as captured
    #[error("Payment for order {0} is not verified")]
    PaymentUnverified(String),

    /// A transaction for this gateway order was already recorded
    #[error("Transaction for order {0} already recorded")]
    DuplicateTransaction(String),

    /// Payment gateway call failed
    #[error("Gateway error: {0}")]
    GatewayError(String),

    /// Record store operation failed
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Audit logging failed
    #[error("Logging error: {0}")]
    LoggingError(String),
}

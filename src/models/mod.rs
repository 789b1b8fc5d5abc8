pub mod attendance;
pub mod audit;
pub mod campaign;
pub mod magic_link;
pub mod school;
pub mod student;
pub mod transaction;

pub use attendance::AttendanceRow;
pub use audit::AppLog;
pub use campaign::{Campaign, CampaignEntry, FeeLedgerRow};
pub use magic_link::{MagicLink, MagicSession};
pub use school::School;
pub use student::{PaymentStatus, Student};
pub use transaction::{CheckoutOrder, GatewayOrder, PaymentStatusReport, TransactionRecord};

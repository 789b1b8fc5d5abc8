// Audit action names
pub const CAMPAIGN_CREATED: &str = "campaign_created";
pub const CAMPAIGN_DELETED: &str = "campaign_deleted";
pub const ATTENDANCE_MARKED: &str = "attendance_marked";
pub const SECTION_ATTENDANCE_SAVED: &str = "section_attendance_saved";
pub const ORDER_CREATED: &str = "order_created";
pub const TRANSACTION_RECORDED: &str = "transaction_recorded";
pub const MAGIC_LINK_SAVED: &str = "magic_link_saved";
pub const MAGIC_LOGIN: &str = "magic_login";

/// Attendance maps are keyed by `dd/mm/yyyy`.
pub const DATE_KEY_FORMAT: &str = "%d/%m/%Y";

/// The gateway rejects receipts longer than this.
pub const RECEIPT_MAX_LEN: usize = 40;
pub const RECEIPT_PREFIX: &str = "rcpt";

/// Minor units per major currency unit (paise per rupee).
pub const MINOR_UNITS: i64 = 100;
pub const CURRENCY: &str = "INR";

/// Share of the paid amount retained as platform fee.
pub const PLATFORM_FEE_RATE: f64 = 0.02;

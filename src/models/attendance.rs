use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-student attendance ledger: date key (`dd/mm/yyyy`) -> present flag.
/// The whole map is written back on every update.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttendanceRow {
    pub student_id: String,
    pub school_id: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub section: String,
    pub attendance_data: HashMap<String, bool>,
}

impl AttendanceRow {
    pub fn is_present(&self, date_key: &str) -> bool {
        self.attendance_data.get(date_key).copied().unwrap_or(false)
    }
}

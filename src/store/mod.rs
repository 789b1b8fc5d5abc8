use crate::error::PortalError;
use crate::models::{
    attendance::AttendanceRow, campaign::FeeLedgerRow, magic_link::MagicLink, school::School,
    student::Student, transaction::TransactionRecord,
};
use async_trait::async_trait;
use std::collections::HashMap;

/// The hosted record store, seen as a record-oriented K/V service with
/// query filters. Every call is one network round trip; nothing here is
/// transactional across calls.
#[async_trait]
pub trait Store: Send + Sync {
    async fn save_school(&self, school: School) -> Result<(), PortalError>;
    async fn get_school(&self, school_id: &str) -> Result<Option<School>, PortalError>;
    async fn get_school_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<School>, PortalError>;

    async fn save_student(&self, student: Student) -> Result<(), PortalError>;
    async fn get_student(&self, student_id: &str) -> Result<Option<Student>, PortalError>;
    async fn get_students_by_ids(&self, ids: &[String]) -> Result<Vec<Student>, PortalError>;
    async fn list_section_students(
        &self,
        school_id: &str,
        class_name: &str,
        section: &str,
    ) -> Result<Vec<Student>, PortalError>;

    async fn save_fee_row(&self, row: FeeLedgerRow) -> Result<(), PortalError>;
    async fn list_fee_rows(&self, school_id: &str) -> Result<Vec<FeeLedgerRow>, PortalError>;
    async fn get_student_fee_rows(
        &self,
        student_id: &str,
        school_id: &str,
    ) -> Result<Vec<FeeLedgerRow>, PortalError>;
    async fn update_fee_description(
        &self,
        row_id: &str,
        description: String,
    ) -> Result<(), PortalError>;

    async fn get_attendance(&self, student_id: &str)
    -> Result<Option<AttendanceRow>, PortalError>;
    async fn insert_attendance(&self, row: AttendanceRow) -> Result<(), PortalError>;
    async fn update_attendance_data(
        &self,
        student_id: &str,
        attendance_data: HashMap<String, bool>,
    ) -> Result<(), PortalError>;

    async fn get_magic_link(&self, link_id: &str) -> Result<Option<MagicLink>, PortalError>;
    async fn list_magic_links(
        &self,
        school_external_id: &str,
    ) -> Result<Vec<MagicLink>, PortalError>;
    async fn save_magic_link(&self, link: MagicLink) -> Result<(), PortalError>;

    /// Fails with `DuplicateTransaction` when a record with the same
    /// `gateway_order_id` already exists; the check and the insert are one
    /// atomic operation.
    async fn insert_transaction(&self, tx: TransactionRecord) -> Result<(), PortalError>;
    async fn get_transaction_by_order(
        &self,
        gateway_order_id: &str,
    ) -> Result<Option<TransactionRecord>, PortalError>;
    async fn list_student_transactions(
        &self,
        student_id: &str,
    ) -> Result<Vec<TransactionRecord>, PortalError>;
}

pub mod in_memory;

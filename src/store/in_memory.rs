use crate::error::PortalError;
use crate::models::{
    attendance::AttendanceRow, campaign::FeeLedgerRow, magic_link::MagicLink, school::School,
    student::Student, transaction::TransactionRecord,
};
use crate::store::Store;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct InMemoryStore {
    schools: Arc<Mutex<HashMap<String, School>>>,
    students: Arc<Mutex<HashMap<String, Student>>>,
    fee_rows: Arc<Mutex<HashMap<String, FeeLedgerRow>>>,
    attendance: Arc<Mutex<HashMap<String, AttendanceRow>>>, // student_id -> row
    magic_links: Arc<Mutex<HashMap<String, MagicLink>>>,
    transactions: Arc<Mutex<HashMap<String, TransactionRecord>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore {
            schools: Arc::new(Mutex::new(HashMap::new())),
            students: Arc::new(Mutex::new(HashMap::new())),
            fee_rows: Arc::new(Mutex::new(HashMap::new())),
            attendance: Arc::new(Mutex::new(HashMap::new())),
            magic_links: Arc::new(Mutex::new(HashMap::new())),
            transactions: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn save_school(&self, school: School) -> Result<(), PortalError> {
        self.schools.lock().await.insert(school.id.clone(), school);
        Ok(())
    }

    async fn get_school(&self, school_id: &str) -> Result<Option<School>, PortalError> {
        Ok(self.schools.lock().await.get(school_id).cloned())
    }

    async fn get_school_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<School>, PortalError> {
        // For production: use a database index on external_id
        Ok(self
            .schools
            .lock()
            .await
            .values()
            .find(|s| s.external_id == external_id)
            .cloned())
    }

    async fn save_student(&self, student: Student) -> Result<(), PortalError> {
        self.students
            .lock()
            .await
            .insert(student.id.clone(), student);
        Ok(())
    }

    async fn get_student(&self, student_id: &str) -> Result<Option<Student>, PortalError> {
        Ok(self.students.lock().await.get(student_id).cloned())
    }

    async fn get_students_by_ids(&self, ids: &[String]) -> Result<Vec<Student>, PortalError> {
        let students = self.students.lock().await;
        Ok(ids.iter().filter_map(|id| students.get(id).cloned()).collect())
    }

    async fn list_section_students(
        &self,
        school_id: &str,
        class_name: &str,
        section: &str,
    ) -> Result<Vec<Student>, PortalError> {
        let mut students: Vec<Student> = self
            .students
            .lock()
            .await
            .values()
            .filter(|s| {
                s.school_id == school_id && s.class_name == class_name && s.section == section
            })
            .cloned()
            .collect();
        students.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(students)
    }

    async fn save_fee_row(&self, row: FeeLedgerRow) -> Result<(), PortalError> {
        self.fee_rows.lock().await.insert(row.id.clone(), row);
        Ok(())
    }

    async fn list_fee_rows(&self, school_id: &str) -> Result<Vec<FeeLedgerRow>, PortalError> {
        // Sorted by row id so repeated scans see a stable order.
        let mut rows: Vec<FeeLedgerRow> = self
            .fee_rows
            .lock()
            .await
            .values()
            .filter(|r| r.school_id == school_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(rows)
    }

    async fn get_student_fee_rows(
        &self,
        student_id: &str,
        school_id: &str,
    ) -> Result<Vec<FeeLedgerRow>, PortalError> {
        let mut rows: Vec<FeeLedgerRow> = self
            .fee_rows
            .lock()
            .await
            .values()
            .filter(|r| r.student_id == student_id && r.school_id == school_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(rows)
    }

    async fn update_fee_description(
        &self,
        row_id: &str,
        description: String,
    ) -> Result<(), PortalError> {
        let mut rows = self.fee_rows.lock().await;
        let row = rows
            .get_mut(row_id)
            .ok_or_else(|| PortalError::StorageError(format!("fee row {} not found", row_id)))?;
        row.description = description;
        Ok(())
    }

    async fn get_attendance(
        &self,
        student_id: &str,
    ) -> Result<Option<AttendanceRow>, PortalError> {
        Ok(self.attendance.lock().await.get(student_id).cloned())
    }

    async fn insert_attendance(&self, row: AttendanceRow) -> Result<(), PortalError> {
        self.attendance
            .lock()
            .await
            .insert(row.student_id.clone(), row);
        Ok(())
    }

    async fn update_attendance_data(
        &self,
        student_id: &str,
        attendance_data: HashMap<String, bool>,
    ) -> Result<(), PortalError> {
        let mut rows = self.attendance.lock().await;
        let row = rows.get_mut(student_id).ok_or_else(|| {
            PortalError::StorageError(format!("attendance row {} not found", student_id))
        })?;
        // Full-map overwrite, matching the remote store's update semantics.
        row.attendance_data = attendance_data;
        Ok(())
    }

    async fn get_magic_link(&self, link_id: &str) -> Result<Option<MagicLink>, PortalError> {
        Ok(self.magic_links.lock().await.get(link_id).cloned())
    }

    async fn list_magic_links(
        &self,
        school_external_id: &str,
    ) -> Result<Vec<MagicLink>, PortalError> {
        let mut links: Vec<MagicLink> = self
            .magic_links
            .lock()
            .await
            .values()
            .filter(|l| l.school_id == school_external_id)
            .cloned()
            .collect();
        links.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(links)
    }

    async fn save_magic_link(&self, link: MagicLink) -> Result<(), PortalError> {
        self.magic_links.lock().await.insert(link.id.clone(), link);
        Ok(())
    }

    async fn insert_transaction(&self, tx: TransactionRecord) -> Result<(), PortalError> {
        let mut txs = self.transactions.lock().await;
        // Checked under the same lock as the insert, so concurrent retries
        // of one order cannot both land.
        if txs
            .values()
            .any(|t| t.gateway_order_id == tx.gateway_order_id)
        {
            return Err(PortalError::DuplicateTransaction(tx.gateway_order_id));
        }
        txs.insert(tx.id.clone(), tx);
        Ok(())
    }

    async fn get_transaction_by_order(
        &self,
        gateway_order_id: &str,
    ) -> Result<Option<TransactionRecord>, PortalError> {
        // For production: use a database index on gateway_order_id
        Ok(self
            .transactions
            .lock()
            .await
            .values()
            .find(|t| t.gateway_order_id == gateway_order_id)
            .cloned())
    }

    async fn list_student_transactions(
        &self,
        student_id: &str,
    ) -> Result<Vec<TransactionRecord>, PortalError> {
        let mut txs: Vec<TransactionRecord> = self
            .transactions
            .lock()
            .await
            .values()
            .filter(|t| t.student_id == student_id)
            .cloned()
            .collect();
        txs.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(txs)
    }
}

use crate::constants::{
    ATTENDANCE_MARKED, CAMPAIGN_CREATED, CAMPAIGN_DELETED, CURRENCY, DATE_KEY_FORMAT, MAGIC_LINK_SAVED,
    MAGIC_LOGIN, MINOR_UNITS, ORDER_CREATED, PLATFORM_FEE_RATE, RECEIPT_MAX_LEN, RECEIPT_PREFIX,
    SECTION_ATTENDANCE_SAVED, TRANSACTION_RECORDED,
};
use crate::error::PortalError;
use crate::gateway::PaymentGateway;
use crate::ledger;
use crate::logger::AuditLog;
use crate::models::{
    attendance::AttendanceRow,
    audit::AppLog,
    campaign::{Campaign, CampaignEntry, FeeLedgerRow},
    magic_link::{MagicLink, MagicSession},
    school::School,
    student::{PaymentStatus, Student},
    transaction::{CheckoutOrder, PaymentStatusReport, TransactionRecord},
};
use crate::store::Store;
use chrono::{NaiveDate, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

/// Result of a multi-row mutation. Individual row failures are logged and
/// counted, never fatal: the batch keeps going and still reports success.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub updated: usize,
    pub failed: usize,
}

/// One line of the staff attendance month view.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttendanceSheetRow {
    pub student: Student,
    pub attendance_data: HashMap<String, bool>,
}

/// One line of the magic-link roster: the student plus their present flag
/// for the requested date (missing keys read as absent).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RosterEntry {
    pub student: Student,
    pub present: bool,
}

pub struct PortalService<S: Store, G: PaymentGateway, L: AuditLog> {
    store: S,
    gateway: G,
    audit: L,
}

impl<S: Store, G: PaymentGateway, L: AuditLog> PortalService<S, G, L> {
    pub fn new(store: S, gateway: G, audit: L) -> Self {
        info!("Initializing PortalService");
        PortalService {
            store,
            gateway,
            audit,
        }
    }

    // SCHOOLS & ROSTER

    pub async fn register_school(
        &self,
        external_id: String,
        name: String,
    ) -> Result<School, PortalError> {
        let school = School {
            id: Uuid::new_v4().to_string(),
            external_id,
            name,
        };
        self.store.save_school(school.clone()).await?;
        debug!("School registered with ID: {}", school.id);
        Ok(school)
    }

    pub async fn get_school(&self, school_id: &str) -> Result<Option<School>, PortalError> {
        self.store.get_school(school_id).await
    }

    pub async fn get_student(&self, student_id: &str) -> Result<Option<Student>, PortalError> {
        self.store.get_student(student_id).await
    }

    /// Adds a student to the roster and seeds their fee ledger row. The
    /// ledger row exists from enrollment on; campaigns only ever append to
    /// or trim its entry sequence.
    pub async fn enroll_student(
        &self,
        school_id: String,
        name: String,
        class_name: String,
        section: String,
        mob: String,
    ) -> Result<Student, PortalError> {
        let student = Student {
            id: Uuid::new_v4().to_string(),
            school_id: school_id.clone(),
            name,
            class_name,
            section,
            mob,
            payment_status: PaymentStatus::Unpaid,
        };
        self.store.save_student(student.clone()).await?;
        self.store
            .save_fee_row(FeeLedgerRow {
                id: Uuid::new_v4().to_string(),
                student_id: student.id.clone(),
                school_id,
                description: "[]".to_string(),
            })
            .await?;
        debug!("Student enrolled with ID: {}", student.id);
        Ok(student)
    }

    // CAMPAIGN AGGREGATION

    /// Rebuilds the campaign projection from every fee ledger of the
    /// school. Grouped by title in first-seen order; the first occurrence
    /// of a title fixes the charge map, later conflicting ones are ignored.
    pub async fn list_campaigns(&self, school_id: &str) -> Result<Vec<Campaign>, PortalError> {
        let rows = self.store.list_fee_rows(school_id).await?;
        debug!("Aggregating campaigns over {} fee rows", rows.len());

        let mut campaigns: Vec<Campaign> = Vec::new();
        let mut by_title: HashMap<String, usize> = HashMap::new();

        for row in &rows {
            for value in ledger::decode(Some(&row.description)) {
                let Some(entry) = CampaignEntry::from_value(&value) else {
                    // Corrupt entry; skipped, never surfaced.
                    continue;
                };
                let idx = *by_title.entry(entry.title.clone()).or_insert_with(|| {
                    campaigns.push(Campaign {
                        title: entry.title.clone(),
                        desc: entry.desc.clone(),
                        student_ids: Vec::new(),
                    });
                    campaigns.len() - 1
                });
                campaigns[idx].student_ids.push(row.student_id.clone());
            }
        }

        Ok(campaigns)
    }

    /// Distinct classes of students currently holding a fee ledger row,
    /// used to populate the campaign class picker.
    pub async fn ledger_classes(&self, school_id: &str) -> Result<Vec<String>, PortalError> {
        let rows = self.store.list_fee_rows(school_id).await?;
        let ids: Vec<String> = rows.into_iter().map(|r| r.student_id).collect();
        let students = self.store.get_students_by_ids(&ids).await?;
        let mut classes: Vec<String> = students
            .into_iter()
            .map(|s| s.class_name)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        classes.sort();
        Ok(classes)
    }

    /// Roster details for a campaign's defaulter id list. Ids without a
    /// roster row are silently dropped.
    pub async fn defaulter_details(
        &self,
        student_ids: &[String],
    ) -> Result<Vec<Student>, PortalError> {
        if student_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.store.get_students_by_ids(student_ids).await
    }

    // CAMPAIGN MUTATION

    /// Appends one campaign entry to the fee ledger of every student whose
    /// class is selected. Per-row read-modify-write with no batch
    /// transaction: a failed row is logged and skipped, the rest proceed.
    pub async fn create_campaign(
        &self,
        school_id: &str,
        selected_classes: &[String],
        start_month: &str,
        end_month: &str,
        charges: BTreeMap<String, f64>,
    ) -> Result<BatchOutcome, PortalError> {
        let entry = CampaignEntry::new(format!("{} - {}", start_month, end_month), charges);
        info!(
            "Creating campaign '{}' for school {} across {} classes",
            entry.title,
            school_id,
            selected_classes.len()
        );

        let rows = self.store.list_fee_rows(school_id).await?;
        let ids: Vec<String> = rows.iter().map(|r| r.student_id.clone()).collect();
        let students = self.store.get_students_by_ids(&ids).await?;
        let class_of: HashMap<String, String> = students
            .into_iter()
            .map(|s| (s.id, s.class_name))
            .collect();
        let selected: HashSet<&str> = selected_classes.iter().map(String::as_str).collect();

        let mut outcome = BatchOutcome {
            updated: 0,
            failed: 0,
        };
        for row in rows {
            let Some(class_name) = class_of.get(&row.student_id) else {
                continue;
            };
            if !selected.contains(class_name.as_str()) {
                continue;
            }

            let mut entries = ledger::decode(Some(&row.description));
            entries.push(entry.to_value());
            match self
                .store
                .update_fee_description(&row.id, ledger::encode(&entries))
                .await
            {
                Ok(()) => outcome.updated += 1,
                Err(err) => {
                    warn!("Failed to append campaign to row {}: {}", row.id, err);
                    outcome.failed += 1;
                }
            }
        }

        self.audit
            .log_action(
                CAMPAIGN_CREATED,
                json!({
                    "school_id": school_id,
                    "title": entry.title,
                    "updated": outcome.updated,
                    "failed": outcome.failed,
                }),
                None,
            )
            .await?;

        Ok(outcome)
    }

    /// Removes the entry at the given ordinal position from every fee
    /// ledger of the school. Index-addressed by contract: when ledgers
    /// hold entries in different relative orders, the same index names a
    /// different campaign per row, so callers must only pass indices taken
    /// from a fresh aggregation over a sorted row scan.
    pub async fn delete_campaign_at(
        &self,
        school_id: &str,
        index: usize,
    ) -> Result<BatchOutcome, PortalError> {
        info!(
            "Deleting campaign at index {} for school {}",
            index, school_id
        );
        let rows = self.store.list_fee_rows(school_id).await?;

        let mut outcome = BatchOutcome {
            updated: 0,
            failed: 0,
        };
        for row in rows {
            let mut entries = ledger::decode(Some(&row.description));
            if index < entries.len() {
                entries.remove(index);
            }
            match self
                .store
                .update_fee_description(&row.id, ledger::encode(&entries))
                .await
            {
                Ok(()) => outcome.updated += 1,
                Err(err) => {
                    warn!("Failed to trim campaign from row {}: {}", row.id, err);
                    outcome.failed += 1;
                }
            }
        }

        self.audit
            .log_action(
                CAMPAIGN_DELETED,
                json!({
                    "school_id": school_id,
                    "index": index,
                    "updated": outcome.updated,
                    "failed": outcome.failed,
                }),
                None,
            )
            .await?;

        Ok(outcome)
    }

    /// Fee ledger rows of one student, decoded into typed entries. Feeds
    /// the checkout screen that computes the amount owed per campaign.
    pub async fn student_fee_entries(
        &self,
        student_id: &str,
        school_id: &str,
    ) -> Result<Vec<CampaignEntry>, PortalError> {
        let rows = self
            .store
            .get_student_fee_rows(student_id, school_id)
            .await?;
        Ok(rows
            .iter()
            .flat_map(|row| ledger::decode(Some(&row.description)))
            .filter_map(|value| CampaignEntry::from_value(&value))
            .collect())
    }

    // ATTENDANCE

    /// Marks one student for one date. A failed read is reported to the
    /// caller; a missing row is created seeded with exactly this date key;
    /// an existing row has the key merged in and the whole map written
    /// back (last-writer-wins per date).
    pub async fn mark_attendance(
        &self,
        student_id: &str,
        date_key: &str,
        present: bool,
    ) -> Result<AttendanceRow, PortalError> {
        let existing = self.store.get_attendance(student_id).await?;

        let row = match existing {
            Some(mut row) => {
                row.attendance_data.insert(date_key.to_string(), present);
                self.store
                    .update_attendance_data(student_id, row.attendance_data.clone())
                    .await?;
                row
            }
            None => {
                let student = self
                    .store
                    .get_student(student_id)
                    .await?
                    .ok_or_else(|| PortalError::StudentNotFound(student_id.to_string()))?;
                let row = AttendanceRow {
                    student_id: student.id,
                    school_id: student.school_id,
                    class_name: student.class_name,
                    section: student.section,
                    attendance_data: HashMap::from([(date_key.to_string(), present)]),
                };
                self.store.insert_attendance(row.clone()).await?;
                row
            }
        };

        self.audit
            .log_action(
                ATTENDANCE_MARKED,
                json!({ "student_id": student_id, "date": date_key, "present": present }),
                None,
            )
            .await?;

        Ok(row)
    }

    /// The magic-link batch save: one read-modify-write per student of the
    /// authorized section, inserts carrying the session's scope. A failed
    /// student is logged and skipped; the save still reports success.
    pub async fn save_section_attendance(
        &self,
        session: &MagicSession,
        marks: &HashMap<String, bool>,
        date_key: &str,
    ) -> Result<BatchOutcome, PortalError> {
        let students = self
            .store
            .list_section_students(&session.school_id, &session.class_name, &session.section)
            .await?;
        info!(
            "Saving attendance for {} students in {}/{} on {}",
            students.len(),
            session.class_name,
            session.section,
            date_key
        );

        let mut outcome = BatchOutcome {
            updated: 0,
            failed: 0,
        };
        for student in students {
            let present = marks.get(&student.id).copied().unwrap_or(false);
            match self
                .write_attendance_cell(&student, session, date_key, present)
                .await
            {
                Ok(()) => outcome.updated += 1,
                Err(err) => {
                    warn!("Attendance save failed for student {}: {}", student.id, err);
                    outcome.failed += 1;
                }
            }
        }

        self.audit
            .log_action(
                SECTION_ATTENDANCE_SAVED,
                json!({
                    "link_id": session.link_id,
                    "date": date_key,
                    "updated": outcome.updated,
                    "failed": outcome.failed,
                }),
                Some(&session.link_id),
            )
            .await?;

        Ok(outcome)
    }

    async fn write_attendance_cell(
        &self,
        student: &Student,
        session: &MagicSession,
        date_key: &str,
        present: bool,
    ) -> Result<(), PortalError> {
        match self.store.get_attendance(&student.id).await? {
            Some(mut row) => {
                row.attendance_data.insert(date_key.to_string(), present);
                self.store
                    .update_attendance_data(&student.id, row.attendance_data)
                    .await
            }
            None => {
                self.store
                    .insert_attendance(AttendanceRow {
                        student_id: student.id.clone(),
                        school_id: session.school_id.clone(),
                        class_name: session.class_name.clone(),
                        section: session.section.clone(),
                        attendance_data: HashMap::from([(date_key.to_string(), present)]),
                    })
                    .await
            }
        }
    }

    pub async fn get_attendance(
        &self,
        student_id: &str,
    ) -> Result<AttendanceRow, PortalError> {
        self.store
            .get_attendance(student_id)
            .await?
            .ok_or_else(|| PortalError::AttendanceNotFound(student_id.to_string()))
    }

    /// Staff month view: the section roster joined with each student's
    /// attendance map (empty when no row exists yet).
    pub async fn attendance_sheet(
        &self,
        school_id: &str,
        class_name: &str,
        section: &str,
    ) -> Result<Vec<AttendanceSheetRow>, PortalError> {
        let students = self
            .store
            .list_section_students(school_id, class_name, section)
            .await?;
        let mut sheet = Vec::with_capacity(students.len());
        for student in students {
            let attendance_data = self
                .store
                .get_attendance(&student.id)
                .await?
                .map(|row| row.attendance_data)
                .unwrap_or_default();
            sheet.push(AttendanceSheetRow {
                student,
                attendance_data,
            });
        }
        Ok(sheet)
    }

    /// Roster of the session's section with each student's present flag
    /// for the given date.
    pub async fn section_roster(
        &self,
        session: &MagicSession,
        date_key: &str,
    ) -> Result<Vec<RosterEntry>, PortalError> {
        let students = self
            .store
            .list_section_students(&session.school_id, &session.class_name, &session.section)
            .await?;
        let mut roster = Vec::with_capacity(students.len());
        for student in students {
            let present = self
                .store
                .get_attendance(&student.id)
                .await?
                .map(|row| row.is_present(date_key))
                .unwrap_or(false);
            roster.push(RosterEntry { student, present });
        }
        Ok(roster)
    }

    // PAYMENTS

    /// Asks the gateway for an auto-capture order over the given amount.
    /// Nothing is persisted locally; the order lives on the gateway until
    /// a transaction is recorded against it.
    pub async fn create_order(
        &self,
        amount: f64,
        student_id: &str,
        description: String,
    ) -> Result<CheckoutOrder, PortalError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(PortalError::InvalidAmount(amount));
        }
        let amount_minor = to_minor_units(amount);
        let receipt = build_receipt(student_id, Utc::now().timestamp_millis());
        info!(
            "Creating order of {} minor units for student {} (receipt {})",
            amount_minor, student_id, receipt
        );

        let order = self
            .gateway
            .create_order(amount_minor, CURRENCY, &receipt, true)
            .await?;

        self.audit
            .log_action(
                ORDER_CREATED,
                json!({ "order_id": order.id, "student_id": student_id, "amount": amount_minor }),
                None,
            )
            .await?;

        Ok(CheckoutOrder {
            order,
            student_id: student_id.to_string(),
            description,
        })
    }

    /// Persists a completed payment attempt. The client's success callback
    /// is not trusted: the referenced order must report captured on the
    /// gateway side, and the order id doubles as idempotency key so a
    /// client retry cannot insert a second row.
    pub async fn record_transaction(
        &self,
        record: TransactionRecord,
    ) -> Result<TransactionRecord, PortalError> {
        let status = self
            .gateway
            .payment_status(&record.gateway_order_id)
            .await?;
        if status != PaymentStatusReport::Captured {
            warn!(
                "Rejecting unverified transaction for order {} (status {:?})",
                record.gateway_order_id, status
            );
            return Err(PortalError::PaymentUnverified(
                record.gateway_order_id.clone(),
            ));
        }

        // Fast path only; `insert_transaction` enforces the same uniqueness
        // atomically.
        if self
            .store
            .get_transaction_by_order(&record.gateway_order_id)
            .await?
            .is_some()
        {
            return Err(PortalError::DuplicateTransaction(
                record.gateway_order_id.clone(),
            ));
        }

        self.store.insert_transaction(record.clone()).await?;
        debug!("Transaction recorded with ID: {}", record.id);

        self.audit
            .log_action(
                TRANSACTION_RECORDED,
                json!({
                    "transaction_id": record.id,
                    "student_id": record.student_id,
                    "order_id": record.gateway_order_id,
                    "amount_paid": record.amount_paid,
                }),
                None,
            )
            .await?;

        Ok(record)
    }

    pub async fn student_transactions(
        &self,
        student_id: &str,
    ) -> Result<Vec<TransactionRecord>, PortalError> {
        self.store.list_student_transactions(student_id).await
    }

    // MAGIC LINKS

    /// Exchanges `(link id, passcode)` for a section-scoped session.
    /// Unknown link and wrong passcode fail identically so link ids cannot
    /// be enumerated.
    pub async fn authenticate_magic_link(
        &self,
        link_id: &str,
        passcode: &str,
    ) -> Result<MagicSession, PortalError> {
        let link = self.store.get_magic_link(link_id).await?;
        let Some(link) = link else {
            warn!("Magic login failed: unknown link");
            return Err(PortalError::InvalidCredentials);
        };
        if link.magic_pass != passcode {
            warn!("Magic login failed: wrong passcode for link {}", link_id);
            return Err(PortalError::InvalidCredentials);
        }

        let school = self
            .store
            .get_school_by_external_id(&link.school_id)
            .await?
            .ok_or_else(|| PortalError::SchoolNotFound(link.school_id.clone()))?;

        self.audit
            .log_action(
                MAGIC_LOGIN,
                json!({ "link_id": link_id, "school_id": school.id }),
                Some(link_id),
            )
            .await?;

        Ok(MagicSession {
            link_id: link.id,
            school_id: school.id,
            class_name: link.class_name,
            section: link.section,
        })
    }

    /// Creates a link, or edits one in place when `link_id` is given. The
    /// passcode is stored as entered; it travels out-of-band, never in the
    /// link URL.
    pub async fn upsert_magic_link(
        &self,
        link_id: Option<String>,
        school_external_id: String,
        magic_pass: String,
        class_name: String,
        section: String,
    ) -> Result<MagicLink, PortalError> {
        let link = MagicLink {
            id: link_id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            magic_pass,
            school_id: school_external_id,
            class_name,
            section,
        };
        self.store.save_magic_link(link.clone()).await?;

        self.audit
            .log_action(
                MAGIC_LINK_SAVED,
                json!({ "link_id": link.id, "class": link.class_name, "section": link.section }),
                None,
            )
            .await?;

        Ok(link)
    }

    pub async fn magic_links(
        &self,
        school_external_id: &str,
    ) -> Result<Vec<MagicLink>, PortalError> {
        self.store.list_magic_links(school_external_id).await
    }

    // AUDIT

    pub async fn app_logs(&self) -> Result<Vec<AppLog>, PortalError> {
        self.audit.get_logs().await
    }
}

/// Present-count over the date range as a percentage. Dates missing from
/// the map count as absent, not unknown.
pub fn attendance_percentage(data: &HashMap<String, bool>, dates: &[String]) -> f64 {
    if dates.is_empty() {
        return 0.0;
    }
    let present = dates
        .iter()
        .filter(|d| data.get(d.as_str()).copied().unwrap_or(false))
        .count();
    (present as f64 / dates.len() as f64) * 100.0
}

/// Every `dd/mm/yyyy` key of the given month, in day order.
pub fn month_date_keys(year: i32, month: u32) -> Vec<String> {
    let mut keys = Vec::new();
    let mut day = 1;
    while let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
        keys.push(date.format(DATE_KEY_FORMAT).to_string());
        day += 1;
    }
    keys
}

pub fn today_key() -> String {
    Utc::now().format(DATE_KEY_FORMAT).to_string()
}

/// Major-unit amount to minor units, round-half-up on the product. Plain
/// float truncation would turn some exact amounts into an off-by-one paise
/// value.
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * MINOR_UNITS as f64).round() as i64
}

/// Platform's cut of a paid amount, in major units.
pub fn platform_fee(amount: f64) -> f64 {
    amount * PLATFORM_FEE_RATE
}

/// Bounded gateway receipt token: prefix, a truncated student id chunk and
/// a millisecond timestamp, capped at 40 ASCII characters. Non-ASCII and
/// punctuation id characters are dropped from the chunk.
pub fn build_receipt(student_id: &str, timestamp_millis: i64) -> String {
    let chunk: String = student_id
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(6)
        .collect();
    let chunk = if chunk.is_empty() {
        "std".to_string()
    } else {
        chunk
    };
    let raw = format!("{}_{}_{}", RECEIPT_PREFIX, chunk, timestamp_millis);
    raw.chars().take(RECEIPT_MAX_LEN).collect()
}

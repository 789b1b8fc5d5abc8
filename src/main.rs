use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use campusfee::models::{
    attendance::AttendanceRow,
    audit::AppLog,
    campaign::Campaign,
    magic_link::{MagicLink, MagicSession},
    school::School,
    student::Student,
    transaction::{CheckoutOrder, TransactionRecord},
};
use campusfee::service::{
    AttendanceSheetRow, BatchOutcome, PortalService, RosterEntry, today_key,
};
use campusfee::{InMemoryAuditLog, InMemoryStore, PortalError, SandboxGateway, config::CONFIG};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use uuid::Uuid;

type Service = Arc<PortalService<InMemoryStore, SandboxGateway, InMemoryAuditLog>>;

// Request structs for JSON payloads
#[derive(Deserialize)]
struct RegisterSchoolRequest {
    external_id: String,
    name: String,
}

#[derive(Deserialize)]
struct EnrollStudentRequest {
    school_id: String,
    name: String,
    class: String,
    section: String,
    mob: String,
}

#[derive(Deserialize)]
struct CreateCampaignRequest {
    classes: Vec<String>,
    from_month: String,
    to_month: String,
    charges: BTreeMap<String, f64>,
}

#[derive(Deserialize)]
struct DeleteCampaignRequest {
    index: usize,
}

#[derive(Deserialize)]
struct DefaultersRequest {
    student_ids: Vec<String>,
}

#[derive(Deserialize)]
struct MarkAttendanceRequest {
    student_id: String,
    date: Option<String>,
    present: bool,
}

#[derive(Deserialize)]
struct AttendanceSheetRequest {
    school_id: String,
    class: String,
    section: String,
}

#[derive(Deserialize)]
struct PayRequest {
    amount: f64,
    student_id: String,
    description: String,
}

#[derive(Deserialize)]
struct RecordTransactionRequest {
    student_id: String,
    amount_paid: f64,
    platform_fee: f64,
    description: String,
    transaction_id: String,
    gateway_payment_id: String,
    gateway_order_id: String,
    receipt_id: String,
    payment_method: String,
    currency: String,
    status: String,
}

#[derive(Serialize)]
struct RecordTransactionResponse {
    message: String,
    data: TransactionRecord,
}

#[derive(Deserialize)]
struct MagicAuthRequest {
    passcode: String,
}

#[derive(Serialize)]
struct MagicAuthResponse {
    session: MagicSession,
    date: String,
    roster: Vec<RosterEntry>,
}

#[derive(Deserialize)]
struct MagicAttendanceRequest {
    passcode: String,
    date: Option<String>,
    marks: HashMap<String, bool>,
}

#[derive(Deserialize)]
struct SaveMagicLinkRequest {
    link_id: Option<String>,
    school_id: String,
    magic_pass: String,
    class: String,
    section: String,
}

// Error response struct
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// Newtype wrapper for PortalError to implement IntoResponse
struct ApiError(PortalError);

impl From<PortalError> for ApiError {
    fn from(err: PortalError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            PortalError::SchoolNotFound(_)
            | PortalError::StudentNotFound(_)
            | PortalError::AttendanceNotFound(_)
            | PortalError::OrderNotFound(_) => StatusCode::NOT_FOUND,
            PortalError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            PortalError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
            PortalError::PaymentUnverified(_) => StatusCode::PAYMENT_REQUIRED,
            PortalError::DuplicateTransaction(_) => StatusCode::CONFLICT,
            PortalError::GatewayError(_) => StatusCode::BAD_GATEWAY,
            PortalError::StorageError(_) | PortalError::LoggingError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let error = self.0.to_string();
        (status, Json(ErrorResponse { error })).into_response()
    }
}

async fn register_school(
    State(service): State<Service>,
    Json(req): Json<RegisterSchoolRequest>,
) -> Result<Json<School>, ApiError> {
    let school = service.register_school(req.external_id, req.name).await?;
    Ok(Json(school))
}

async fn enroll_student(
    State(service): State<Service>,
    Json(req): Json<EnrollStudentRequest>,
) -> Result<Json<Student>, ApiError> {
    let student = service
        .enroll_student(req.school_id, req.name, req.class, req.section, req.mob)
        .await?;
    Ok(Json(student))
}

async fn list_campaigns(
    State(service): State<Service>,
    Path(school_id): Path<String>,
) -> Result<Json<Vec<Campaign>>, ApiError> {
    let campaigns = service.list_campaigns(&school_id).await?;
    Ok(Json(campaigns))
}

async fn create_campaign(
    State(service): State<Service>,
    Path(school_id): Path<String>,
    Json(req): Json<CreateCampaignRequest>,
) -> Result<Json<BatchOutcome>, ApiError> {
    let outcome = service
        .create_campaign(
            &school_id,
            &req.classes,
            &req.from_month,
            &req.to_month,
            req.charges,
        )
        .await?;
    Ok(Json(outcome))
}

async fn delete_campaign(
    State(service): State<Service>,
    Path(school_id): Path<String>,
    Json(req): Json<DeleteCampaignRequest>,
) -> Result<Json<BatchOutcome>, ApiError> {
    let outcome = service.delete_campaign_at(&school_id, req.index).await?;
    Ok(Json(outcome))
}

async fn ledger_classes(
    State(service): State<Service>,
    Path(school_id): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    let classes = service.ledger_classes(&school_id).await?;
    Ok(Json(classes))
}

async fn defaulter_details(
    State(service): State<Service>,
    Json(req): Json<DefaultersRequest>,
) -> Result<Json<Vec<Student>>, ApiError> {
    let students = service.defaulter_details(&req.student_ids).await?;
    Ok(Json(students))
}

async fn mark_attendance(
    State(service): State<Service>,
    Json(req): Json<MarkAttendanceRequest>,
) -> Result<Json<AttendanceRow>, ApiError> {
    let date = req.date.unwrap_or_else(today_key);
    let row = service
        .mark_attendance(&req.student_id, &date, req.present)
        .await?;
    Ok(Json(row))
}

async fn get_attendance(
    State(service): State<Service>,
    Path(student_id): Path<String>,
) -> Result<Json<AttendanceRow>, ApiError> {
    let row = service.get_attendance(&student_id).await?;
    Ok(Json(row))
}

async fn attendance_sheet(
    State(service): State<Service>,
    Json(req): Json<AttendanceSheetRequest>,
) -> Result<Json<Vec<AttendanceSheetRow>>, ApiError> {
    let sheet = service
        .attendance_sheet(&req.school_id, &req.class, &req.section)
        .await?;
    Ok(Json(sheet))
}

async fn create_order(
    State(service): State<Service>,
    Json(req): Json<PayRequest>,
) -> Result<Json<CheckoutOrder>, ApiError> {
    let checkout = service
        .create_order(req.amount, &req.student_id, req.description)
        .await?;
    Ok(Json(checkout))
}

async fn record_transaction(
    State(service): State<Service>,
    Json(req): Json<RecordTransactionRequest>,
) -> Result<Json<RecordTransactionResponse>, ApiError> {
    let record = TransactionRecord {
        id: Uuid::new_v4().to_string(),
        student_id: req.student_id,
        amount_paid: req.amount_paid,
        platform_fee: req.platform_fee,
        description: req.description,
        transaction_id: req.transaction_id,
        gateway_payment_id: req.gateway_payment_id,
        gateway_order_id: req.gateway_order_id,
        receipt_id: req.receipt_id,
        payment_method: req.payment_method,
        currency: req.currency,
        status: req.status,
        created_at: Utc::now(),
    };
    let data = service.record_transaction(record).await?;
    Ok(Json(RecordTransactionResponse {
        message: "Transaction recorded".to_string(),
        data,
    }))
}

async fn student_transactions(
    State(service): State<Service>,
    Path(student_id): Path<String>,
) -> Result<Json<Vec<TransactionRecord>>, ApiError> {
    let txs = service.student_transactions(&student_id).await?;
    Ok(Json(txs))
}

async fn magic_auth(
    State(service): State<Service>,
    Path(magic_id): Path<String>,
    Json(req): Json<MagicAuthRequest>,
) -> Result<Json<MagicAuthResponse>, ApiError> {
    let session = service
        .authenticate_magic_link(&magic_id, &req.passcode)
        .await?;
    let date = today_key();
    let roster = service.section_roster(&session, &date).await?;
    Ok(Json(MagicAuthResponse {
        session,
        date,
        roster,
    }))
}

async fn magic_attendance(
    State(service): State<Service>,
    Path(magic_id): Path<String>,
    Json(req): Json<MagicAttendanceRequest>,
) -> Result<Json<BatchOutcome>, ApiError> {
    // No server-side session: every save re-presents the passcode.
    let session = service
        .authenticate_magic_link(&magic_id, &req.passcode)
        .await?;
    let date = req.date.unwrap_or_else(today_key);
    let outcome = service
        .save_section_attendance(&session, &req.marks, &date)
        .await?;
    Ok(Json(outcome))
}

async fn save_magic_link(
    State(service): State<Service>,
    Json(req): Json<SaveMagicLinkRequest>,
) -> Result<Json<MagicLink>, ApiError> {
    let link = service
        .upsert_magic_link(
            req.link_id,
            req.school_id,
            req.magic_pass,
            req.class,
            req.section,
        )
        .await?;
    Ok(Json(link))
}

async fn list_magic_links(
    State(service): State<Service>,
    Path(school_external_id): Path<String>,
) -> Result<Json<Vec<MagicLink>>, ApiError> {
    let links = service.magic_links(&school_external_id).await?;
    Ok(Json(links))
}

async fn get_app_logs(State(service): State<Service>) -> Result<Json<Vec<AppLog>>, ApiError> {
    let logs = service.app_logs().await?;
    Ok(Json(logs))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(CONFIG.log_level.as_str())
        .init();

    let store = InMemoryStore::new();
    let gateway = SandboxGateway::new();
    let audit = InMemoryAuditLog::new();
    let portal = Arc::new(PortalService::new(store, gateway, audit));

    // Define API routes
    let app = Router::new()
        // add / route with a simple health check
        .route("/", get(|| async { "OK" }))
        .route("/schools", post(register_school))
        .route("/students", post(enroll_student))
        .route("/schools/{school_id}/campaigns", get(list_campaigns))
        .route("/schools/{school_id}/campaigns", post(create_campaign))
        .route("/schools/{school_id}/campaigns/delete", post(delete_campaign))
        .route("/schools/{school_id}/classes", get(ledger_classes))
        .route("/defaulters", post(defaulter_details))
        .route("/attendance/mark", post(mark_attendance))
        .route("/attendance/sheet", post(attendance_sheet))
        .route("/attendance/{student_id}", get(get_attendance))
        .route("/pay", post(create_order))
        .route("/record-transaction", post(record_transaction))
        .route("/students/{student_id}/transactions", get(student_transactions))
        .route("/magic/{magic_id}/auth", post(magic_auth))
        .route("/magic/{magic_id}/attendance", post(magic_attendance))
        .route("/magic-links", post(save_magic_link))
        .route("/magic-links/{school_external_id}", get(list_magic_links))
        .route("/logs", get(get_app_logs))
        .layer(CompressionLayer::new()) // Gzip compression
        .layer(TimeoutLayer::new(Duration::from_secs(30))) // 30-second timeout
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([http::Method::GET, http::Method::POST])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http()) // Request tracing
        .with_state(portal);

    // Start server
    let addr = SocketAddr::from(([127, 0, 0, 1], CONFIG.port));
    info!("Portal running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

//! # Casa Tracker Backend
//!
//! Shared-household expense tracking: members record expenses (optionally
//! split into credit-card installments), the service aggregates them into a
//! monthly financial summary, and plain-text reports are generated from that
//! summary. Authentication and group membership live in the external auth
//! layer; this service scopes everything by an opaque group id.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! ```text
//! IO Layer (REST API, handlers, DTO mappers)
//!     ↓
//! Domain Layer (business logic, services)
//!     ↓
//! Storage Layer (CSV repositories)
//! ```

pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use log::info;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::domain::{
    InstallmentService, MemberService, RecurringService, ReportService, SummaryService,
    TransactionService,
};
use crate::storage::CsvConnection;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub transaction_service: TransactionService<CsvConnection>,
    pub installment_service: InstallmentService<CsvConnection>,
    pub summary_service: SummaryService<CsvConnection>,
    pub recurring_service: RecurringService<CsvConnection>,
    pub report_service: ReportService,
    pub member_service: MemberService<CsvConnection>,
}

/// Wire every service over one storage connection.
pub fn build_state(connection: Arc<CsvConnection>) -> AppState {
    AppState {
        transaction_service: TransactionService::new(connection.clone()),
        installment_service: InstallmentService::new(connection.clone()),
        summary_service: SummaryService::new(connection.clone()),
        recurring_service: RecurringService::new(connection.clone()),
        report_service: ReportService::new(),
        member_service: MemberService::new(connection),
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend() -> Result<AppState> {
    info!("Setting up storage");
    let connection = Arc::new(CsvConnection::new_default()?);

    info!("Setting up domain services");
    Ok(build_state(connection))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    // CORS setup to allow the frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin("http://localhost:8080".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/transactions",
            get(io::list_transactions)
                .post(io::create_transaction)
                .delete(io::delete_transactions),
        )
        .route("/installments", get(io::list_installments))
        .route("/installments/pay", post(io::mark_installment_paid))
        .route("/summary/month", get(io::get_monthly_summary))
        .route("/reports", get(io::get_report))
        .route("/reports/export", post(io::export_report))
        .route("/recurring/materialize", post(io::materialize_recurring))
        .route("/members", get(io::list_members).post(io::upsert_member));

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state)
}

/// Build an AppState over a temporary data directory for handler tests.
#[cfg(test)]
pub(crate) fn test_state() -> (AppState, tempfile::TempDir) {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let connection = Arc::new(CsvConnection::new(temp_dir.path()).unwrap());
    (build_state(connection), temp_dir)
}

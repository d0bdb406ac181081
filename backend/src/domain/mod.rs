//! # Domain Module
//!
//! Contains all business logic for the tracker, independent of any storage
//! backend or transport.
//!
//! ## Module Organization
//!
//! - **transaction_service**: Expense CRUD and installment-plan creation
//! - **installment_service**: Installment lifecycle (list, mark paid)
//! - **summary_service**: The monthly financial aggregation
//! - **recurring_service**: Monthly materialization of recurring expenses
//! - **report_service**: Plain-text report generation from a summary
//! - **member_service**: Member display profiles for per-user attribution
//! - **commands**: Internal command/query types the services speak
//! - **models**: Domain entities
//!
//! ## Core Rules
//!
//! - Amounts are positive; a split purchase stores the full price on the
//!   transaction and the monthly shares on its installment records
//! - Installments exist only for credit purchases with more than one payment
//! - Monthly totals count a split purchase through its installment records,
//!   never through the raw transaction row
//! - The reference month is always an explicit parameter

pub mod commands;
pub mod installment_service;
pub mod member_service;
pub mod models;
pub mod recurring_service;
pub mod report_service;
pub mod summary_service;
pub mod transaction_service;

pub use installment_service::InstallmentService;
pub use member_service::MemberService;
pub use recurring_service::RecurringService;
pub use report_service::ReportService;
pub use summary_service::SummaryService;
pub use transaction_service::TransactionService;

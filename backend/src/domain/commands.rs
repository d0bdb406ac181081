//! Domain-level command and query types.
//!
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer is responsible for mapping the
//! public DTOs defined in the `shared` crate to these internal types.

pub mod transactions {
    use crate::domain::models::transaction::{
        CardType, InstallmentRecord, Transaction as DomainTransaction,
    };
    use chrono::NaiveDate;

    /// Input for recording a new expense.
    #[derive(Debug, Clone)]
    pub struct CreateTransactionCommand {
        pub group_id: String,
        pub description: String,
        pub amount: f64,
        /// Uses the current date when absent.
        pub date: Option<NaiveDate>,
        pub category: String,
        pub card_name: String,
        pub card_type: CardType,
        pub installments: Option<u32>,
        pub is_recurring: bool,
        pub created_by: String,
    }

    /// Result of recording an expense: the stored transaction plus the
    /// installment plan created alongside it, if any.
    #[derive(Debug, Clone)]
    pub struct CreateTransactionResult {
        pub transaction: DomainTransaction,
        pub installments: Vec<InstallmentRecord>,
    }

    /// Query parameters for listing transactions.
    #[derive(Debug, Clone, Default)]
    pub struct TransactionListQuery {
        pub group_id: String,
        pub after: Option<String>,
        pub limit: Option<u32>,
    }

    /// Generic pagination info returned by list queries.
    #[derive(Debug, Clone)]
    pub struct PaginationInfo {
        pub has_more: bool,
        pub next_cursor: Option<String>,
    }

    /// Result of listing transactions.
    #[derive(Debug, Clone)]
    pub struct TransactionListResult {
        pub transactions: Vec<DomainTransaction>,
        pub pagination: PaginationInfo,
    }

    /// Command for deleting multiple transactions.
    #[derive(Debug, Clone)]
    pub struct DeleteTransactionsCommand {
        pub group_id: String,
        pub transaction_ids: Vec<String>,
    }

    /// Result of deleting transactions.
    #[derive(Debug, Clone)]
    pub struct DeleteTransactionsResult {
        pub deleted_count: usize,
        pub not_found_ids: Vec<String>,
        pub success_message: String,
    }
}

pub mod installments {
    use crate::domain::models::summary::MonthRef;

    /// Query for listing a group's installment records, optionally
    /// restricted to those falling due in one month.
    #[derive(Debug, Clone)]
    pub struct InstallmentListQuery {
        pub group_id: String,
        pub due: Option<MonthRef>,
    }

    /// Command for marking an installment as paid.
    #[derive(Debug, Clone)]
    pub struct MarkInstallmentPaidCommand {
        pub group_id: String,
        pub installment_id: String,
    }
}

pub mod summary {
    use crate::domain::models::summary::MonthRef;

    /// Query for the monthly financial summary.
    #[derive(Debug, Clone)]
    pub struct MonthlySummaryQuery {
        pub group_id: String,
        pub month: MonthRef,
    }
}

pub mod reports {
    use crate::domain::models::summary::MonthRef;

    /// Which pre-computed breakdown a report renders.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ReportKind {
        Full,
        ByCategory,
        ByCard,
        ByUser,
    }

    impl ReportKind {
        /// Stable lowercase tag used in generated filenames.
        pub fn tag(&self) -> &'static str {
            match self {
                ReportKind::Full => "full",
                ReportKind::ByCategory => "category",
                ReportKind::ByCard => "card",
                ReportKind::ByUser => "user",
            }
        }
    }

    /// Query for generating a report.
    #[derive(Debug, Clone)]
    pub struct ReportQuery {
        pub group_id: String,
        pub kind: ReportKind,
        pub month: MonthRef,
    }

    /// Result of generating a report.
    #[derive(Debug, Clone)]
    pub struct ReportResult {
        pub report_text: String,
        pub filename: String,
        pub kind: ReportKind,
        pub month: MonthRef,
    }

    /// Command for writing a generated report to disk.
    #[derive(Debug, Clone)]
    pub struct ExportReportCommand {
        pub group_id: String,
        pub kind: ReportKind,
        pub month: MonthRef,
        /// Target directory; falls back to the current directory when absent.
        pub custom_path: Option<String>,
    }

    /// Outcome of writing a report to disk. I/O failures are reported here
    /// rather than raised, so a denied directory does not read as a crash.
    #[derive(Debug, Clone)]
    pub struct ExportReportResult {
        pub success: bool,
        pub message: String,
        pub file_path: String,
    }
}

pub mod recurring {
    use crate::domain::models::summary::MonthRef;

    /// Command for materializing the month's pending recurring expenses.
    #[derive(Debug, Clone)]
    pub struct MaterializeRecurringCommand {
        pub group_id: String,
        pub month: MonthRef,
    }

    /// Result of materializing recurring expenses.
    #[derive(Debug, Clone)]
    pub struct MaterializeRecurringResult {
        pub created_count: u32,
        pub success_message: String,
    }
}

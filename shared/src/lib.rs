use serde::{Deserialize, Serialize};
use std::fmt;

/// Which kind of card a transaction was made with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardType {
    Credit,
    Debit,
}

/// A single recorded expense.
///
/// Transaction ID format: "tx-<epoch_millis>-<hex suffix>". Synthesized view
/// rows (installment payments projected into a month) carry a prefixed id
/// derived from the installment record instead and are never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    /// ID of the group this transaction belongs to
    pub group_id: String,
    /// Description of the expense (max 256 characters)
    pub description: String,
    /// Amount in currency units, positive by convention.
    /// For a purchase split into installments this is the FULL purchase
    /// price; the per-month share lives on the installment records.
    pub amount: f64,
    /// Calendar date of the expense (YYYY-MM-DD, no time component)
    pub date: String,
    /// Category name, matched exactly against configured categories
    pub category: String,
    /// Display name of the card used
    pub card_name: String,
    pub card_type: CardType,
    /// Total installment count when the purchase is split (None or 1 otherwise)
    pub installments: Option<u32>,
    /// 1-based installment position, set only on synthesized view rows
    pub installment_number: Option<u32>,
    pub is_recurring: bool,
    /// Member id of whoever recorded the expense
    pub created_by: String,
    /// RFC 3339 creation timestamp
    pub created_at: String,
}

/// One scheduled monthly payment derived from a multi-installment purchase.
///
/// Installment ID format: "inst-<owning tx epoch_millis>-<number>".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentRecord {
    pub id: String,
    /// Owning transaction
    pub transaction_id: String,
    pub group_id: String,
    /// 1-based position within the plan
    pub installment_number: u32,
    pub total_installments: u32,
    /// This installment's share of the purchase price
    pub amount: f64,
    /// Due month, 1-12
    pub due_month: u32,
    pub due_year: i32,
    pub is_paid: bool,
    /// RFC 3339 timestamp, set when the installment is marked paid
    pub paid_at: Option<String>,
    pub created_by: String,
}

/// A group member's display profile, used for per-user attribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberProfile {
    pub id: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

/// Per-category slice of a monthly summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub name: String,
    pub total: f64,
    /// Share of the month's total expenses, 0-100
    pub percentage: f64,
    /// Contributing rows, synthesized installment rows included
    pub transactions: Vec<Transaction>,
}

/// Per-card slice of a monthly summary.
///
/// The transaction list carries the card's full history so card views can
/// render it, but `total` only counts the reference month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSummary {
    pub name: String,
    pub total: f64,
    pub percentage: f64,
    pub transactions: Vec<Transaction>,
}

/// Per-member slice of a monthly summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub total_spent: f64,
    pub percentage: f64,
    pub transactions: Vec<Transaction>,
}

/// The monthly aggregation result consumed by views and report generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    /// Reference month, 1-12
    pub month: u32,
    pub year: i32,
    pub total_expenses: f64,
    /// Subtotal of recurring transactions in the month
    pub total_fixed: f64,
    /// Subtotal of the configured fixed-expense categories
    pub fixed_expenses: f64,
    pub credit_card_expenses: f64,
    pub debit_expenses: f64,
    /// Sorted descending by total
    pub categories: Vec<CategorySummary>,
    pub cards: Vec<CardSummary>,
    pub users: Vec<UserSummary>,
    /// First three categories by total
    pub top_categories: Vec<CategorySummary>,
    pub top_card: Option<CardSummary>,
    pub top_user: Option<UserSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    pub group_id: String,
    /// Description of the expense (max 256 characters)
    pub description: String,
    /// Positive amount; the full purchase price for installment purchases
    pub amount: f64,
    /// Optional date override (YYYY-MM-DD) - uses the current date if not provided
    pub date: Option<String>,
    pub category: String,
    pub card_name: String,
    pub card_type: CardType,
    /// Split the purchase into this many monthly installments (credit only)
    pub installments: Option<u32>,
    pub is_recurring: bool,
    pub created_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTransactionResponse {
    pub transaction: Transaction,
    /// The installment plan created alongside a split credit purchase
    pub installments: Vec<InstallmentRecord>,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionListRequest {
    pub group_id: String,
    /// Cursor for pagination - transaction ID to start after
    pub after: Option<String>,
    /// Maximum number of transactions to return
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionListResponse {
    pub transactions: Vec<Transaction>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteTransactionsRequest {
    pub group_id: String,
    pub transaction_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteTransactionsResponse {
    pub deleted_count: usize,
    pub success_message: String,
    pub not_found_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentListResponse {
    pub installments: Vec<InstallmentRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkInstallmentPaidRequest {
    pub group_id: String,
    pub installment_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkInstallmentPaidResponse {
    pub installment: InstallmentRecord,
    pub success_message: String,
}

/// Which pre-computed breakdown a report renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportKind {
    Full,
    ByCategory,
    ByCard,
    ByUser,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportResponse {
    pub report_text: String,
    pub filename: String,
    pub kind: ReportKind,
    pub month: u32,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportReportRequest {
    pub group_id: String,
    pub kind: ReportKind,
    pub month: u32,
    pub year: i32,
    /// Target directory; falls back to the current directory when empty
    pub custom_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportReportResponse {
    pub success: bool,
    pub message: String,
    pub file_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterializeRecurringRequest {
    pub group_id: String,
    pub month: u32,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterializeRecurringResponse {
    pub created_count: u32,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertMemberRequest {
    pub group_id: String,
    pub member: MemberProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberListResponse {
    pub members: Vec<MemberProfile>,
}

impl Transaction {
    /// Parse a transaction ID to extract its creation epoch millis.
    /// Synthesized view row ids (prefixed) are rejected.
    pub fn parse_id(id: &str) -> Result<u64, IdError> {
        let parts: Vec<&str> = id.split('-').collect();
        if parts.len() != 3 || parts[0] != "tx" {
            return Err(IdError::InvalidFormat);
        }
        parts[1].parse::<u64>().map_err(|_| IdError::InvalidTimestamp)
    }

    /// Whether this row was synthesized from an installment record rather
    /// than read from storage.
    pub fn is_synthetic(&self) -> bool {
        self.id.starts_with("synthetic-") || self.id.starts_with("card-installment-")
    }
}

impl InstallmentRecord {
    /// Parse an installment ID into (owning transaction millis, position).
    pub fn parse_id(id: &str) -> Result<(u64, u32), IdError> {
        let parts: Vec<&str> = id.split('-').collect();
        if parts.len() != 3 || parts[0] != "inst" {
            return Err(IdError::InvalidFormat);
        }
        let millis = parts[1].parse::<u64>().map_err(|_| IdError::InvalidTimestamp)?;
        let number = parts[2].parse::<u32>().map_err(|_| IdError::InvalidFormat)?;
        Ok((millis, number))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IdError {
    InvalidFormat,
    InvalidTimestamp,
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdError::InvalidFormat => write!(f, "Invalid ID format"),
            IdError::InvalidTimestamp => write!(f, "Invalid timestamp in ID"),
        }
    }
}

impl std::error::Error for IdError {}

//! REST handlers, one module per resource, plus the DTO mappers.

pub mod installment_apis;
pub mod mappers;
pub mod member_apis;
pub mod recurring_apis;
pub mod report_apis;
pub mod summary_apis;
pub mod transaction_apis;

pub use installment_apis::{list_installments, mark_installment_paid};
pub use member_apis::{list_members, upsert_member};
pub use recurring_apis::materialize_recurring;
pub use report_apis::{export_report, get_report};
pub use summary_apis::get_monthly_summary;
pub use transaction_apis::{create_transaction, delete_transactions, list_transactions};

use crate::domain::models::summary::MonthRef;

/// Validate month/year query input before it reaches the domain.
pub(crate) fn month_ref_from_params(month: u32, year: i32) -> Result<MonthRef, String> {
    if !(1..=12).contains(&month) {
        return Err(format!("Invalid month: {}. Must be between 1 and 12", month));
    }
    Ok(MonthRef::new(month, year))
}

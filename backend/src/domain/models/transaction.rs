//! Domain models for transactions and installment plans.
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

use super::summary::MonthRef;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransactionIdError {
    #[error("invalid transaction ID format: {0}")]
    InvalidFormat(String),
    #[error("invalid timestamp in transaction ID: {0}")]
    InvalidTimestamp(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InstallmentPlanError {
    #[error("transaction {0} is not an installment purchase")]
    NotInstallmentPurchase(String),
    #[error(transparent)]
    Id(#[from] TransactionIdError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardType {
    Credit,
    Debit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub group_id: String,
    pub description: String,
    /// Positive by convention; the full purchase price when installments are used
    pub amount: f64,
    pub date: NaiveDate,
    pub category: String,
    pub card_name: String,
    pub card_type: CardType,
    /// Total installment count when the purchase is split (None or 1 otherwise)
    pub installments: Option<u32>,
    pub is_recurring: bool,
    pub created_by: String,
    pub created_at: DateTime<FixedOffset>,
}

impl Transaction {
    /// Generate a unique transaction ID from a creation timestamp.
    /// Format: tx-<timestamp_ms>-<random_suffix>
    /// Example: tx-1625846400123-af3c
    pub fn generate_id(timestamp_ms: u64) -> String {
        format!("tx-{}-{}", timestamp_ms, Self::generate_random_suffix(4))
    }

    /// Parse a transaction ID to extract its creation timestamp.
    pub fn parse_id(id: &str) -> Result<u64, TransactionIdError> {
        let parts: Vec<&str> = id.split('-').collect();
        if parts.len() != 3 || parts[0] != "tx" {
            return Err(TransactionIdError::InvalidFormat(id.to_string()));
        }
        parts[1]
            .parse::<u64>()
            .map_err(|_| TransactionIdError::InvalidTimestamp(parts[1].to_string()))
    }

    /// Whether this purchase is split into more than one installment.
    /// Such transactions are represented in monthly totals exclusively
    /// through their installment records.
    pub fn is_installment_purchase(&self) -> bool {
        self.installments.map_or(false, |n| n > 1)
    }

    fn generate_random_suffix(len: usize) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards")
            .as_nanos();
        format!("{:x}", now % (16_u128.pow(len as u32)))
            .chars()
            .take(len)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentRecord {
    pub id: String,
    pub transaction_id: String,
    pub group_id: String,
    /// 1-based position within the plan
    pub installment_number: u32,
    pub total_installments: u32,
    pub amount: f64,
    pub due_month: u32,
    pub due_year: i32,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<FixedOffset>>,
    pub created_by: String,
}

impl InstallmentRecord {
    /// Installment IDs are derived from the owning transaction so a plan can
    /// never collide with another transaction's plan.
    /// Format: inst-<owning tx timestamp_ms>-<number>
    pub fn id_for(owner_timestamp_ms: u64, number: u32) -> String {
        format!("inst-{}-{}", owner_timestamp_ms, number)
    }

    /// Build the full installment plan for a credit purchase.
    ///
    /// The purchase price is split in cents: every installment gets the base
    /// share and the remainder cents are spread over the earliest
    /// installments, so the shares always sum exactly to the price. The
    /// first installment falls due in the purchase month.
    pub fn build_plan(owner: &Transaction) -> Result<Vec<InstallmentRecord>, InstallmentPlanError> {
        let count = match owner.installments {
            Some(n) if n > 1 => n,
            _ => return Err(InstallmentPlanError::NotInstallmentPurchase(owner.id.clone())),
        };
        let owner_ms = Transaction::parse_id(&owner.id)?;

        let total_cents = (owner.amount * 100.0).round() as i64;
        let base = total_cents / count as i64;
        let remainder = total_cents % count as i64;

        let mut due = MonthRef::from_date(owner.date);
        let mut plan = Vec::with_capacity(count as usize);
        for number in 1..=count {
            let cents = if (number as i64) <= remainder { base + 1 } else { base };
            plan.push(InstallmentRecord {
                id: Self::id_for(owner_ms, number),
                transaction_id: owner.id.clone(),
                group_id: owner.group_id.clone(),
                installment_number: number,
                total_installments: count,
                amount: cents as f64 / 100.0,
                due_month: due.month,
                due_year: due.year,
                is_paid: false,
                paid_at: None,
                created_by: owner.created_by.clone(),
            });
            due = due.next();
        }
        Ok(plan)
    }
}

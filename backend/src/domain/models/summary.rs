//! Domain model for the monthly financial aggregation.
//!
//! The aggregator is a pure computation over transactions and installment
//! records, so everything here is plain data: the reference month, the
//! tagged entry type that unifies real transactions with installment-derived
//! rows, and the bucket types the summary is made of.

use chrono::{Datelike, NaiveDate};
use std::collections::HashSet;

use super::transaction::{CardType, InstallmentRecord, Transaction};

/// The reference month a summary is computed for. Always passed in
/// explicitly; the aggregator never reads the wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRef {
    /// 1-12
    pub month: u32,
    pub year: i32,
}

impl MonthRef {
    pub fn new(month: u32, year: i32) -> Self {
        Self { month, year }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self { month: date.month(), year: date.year() }
    }

    /// Whether a calendar date falls within this month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.month() == self.month && date.year() == self.year
    }

    /// First day of the month, used to date synthesized installment rows.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("month is validated to 1-12 on construction")
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { month: 1, year: self.year + 1 }
        } else {
            Self { month: self.month + 1, year: self.year }
        }
    }

    pub fn month_name(&self) -> &'static str {
        match self.month {
            1 => "January", 2 => "February", 3 => "March", 4 => "April",
            5 => "May", 6 => "June", 7 => "July", 8 => "August",
            9 => "September", 10 => "October", 11 => "November", 12 => "December",
            _ => "Invalid Month",
        }
    }
}

/// The categories counted as fixed household expenses.
///
/// Kept as an explicit value rather than a string match buried in the
/// aggregation; matching is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedCategorySet {
    names: HashSet<String>,
}

impl FixedCategorySet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { names: names.into_iter().map(Into::into).collect() }
    }

    pub fn contains(&self, category: &str) -> bool {
        self.names.contains(category)
    }
}

impl Default for FixedCategorySet {
    fn default() -> Self {
        Self::new(["Aluguel", "Contas", "Assinaturas"])
    }
}

/// One unit of monthly expense mass: either a real transaction dated in the
/// month, or one installment of a split purchase falling due in the month,
/// paired with its owning transaction.
///
/// Installment-derived entries take their descriptive fields (category,
/// card, recurrence) from the owner but their amount from the installment
/// record, so a dollar spent this month reads the same either way.
#[derive(Debug, Clone, PartialEq)]
pub enum MonthlyEntry {
    Actual(Transaction),
    Installment {
        record: InstallmentRecord,
        owner: Transaction,
    },
}

impl MonthlyEntry {
    pub fn amount(&self) -> f64 {
        match self {
            MonthlyEntry::Actual(tx) => tx.amount.abs(),
            MonthlyEntry::Installment { record, .. } => record.amount.abs(),
        }
    }

    pub fn category(&self) -> &str {
        match self {
            MonthlyEntry::Actual(tx) => &tx.category,
            MonthlyEntry::Installment { owner, .. } => &owner.category,
        }
    }

    pub fn card_name(&self) -> &str {
        match self {
            MonthlyEntry::Actual(tx) => &tx.card_name,
            MonthlyEntry::Installment { owner, .. } => &owner.card_name,
        }
    }

    pub fn card_type(&self) -> CardType {
        match self {
            MonthlyEntry::Actual(tx) => tx.card_type,
            MonthlyEntry::Installment { owner, .. } => owner.card_type,
        }
    }

    pub fn is_recurring(&self) -> bool {
        match self {
            MonthlyEntry::Actual(tx) => tx.is_recurring,
            MonthlyEntry::Installment { owner, .. } => owner.is_recurring,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            MonthlyEntry::Actual(tx) => &tx.description,
            MonthlyEntry::Installment { owner, .. } => &owner.description,
        }
    }

    /// The date the entry is shown under: the transaction's own date, or the
    /// first day of the installment's due month.
    pub fn display_date(&self) -> NaiveDate {
        match self {
            MonthlyEntry::Actual(tx) => tx.date,
            MonthlyEntry::Installment { record, .. } => {
                MonthRef::new(record.due_month, record.due_year).first_day()
            }
        }
    }

    /// Who the monthly cost is attributed to in per-user buckets. For
    /// installments this is the installment record's own creator, which may
    /// legitimately differ from the owning transaction's creator.
    pub fn spender(&self) -> &str {
        match self {
            MonthlyEntry::Actual(tx) => &tx.created_by,
            MonthlyEntry::Installment { record, .. } => &record.created_by,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBucket {
    pub name: String,
    pub total: f64,
    pub percentage: f64,
    pub entries: Vec<MonthlyEntry>,
}

/// Card buckets carry the card's full transaction history (all months) plus
/// this month's installment entries; `total` counts the reference month only.
#[derive(Debug, Clone, PartialEq)]
pub struct CardBucket {
    /// First-seen casing of the card name
    pub name: String,
    pub total: f64,
    pub percentage: f64,
    pub entries: Vec<MonthlyEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserBucket {
    pub user_id: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub total_spent: f64,
    pub percentage: f64,
    pub entries: Vec<MonthlyEntry>,
}

/// The aggregation result. Bucket lists are sorted descending by total with
/// a name tiebreak, so identical inputs always produce identical output.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySummary {
    pub month: MonthRef,
    pub total_expenses: f64,
    /// Subtotal of recurring transactions in the month
    pub total_fixed: f64,
    /// Subtotal of the fixed-expense categories
    pub fixed_expenses: f64,
    pub credit_card_expenses: f64,
    pub debit_expenses: f64,
    pub categories: Vec<CategoryBucket>,
    pub cards: Vec<CardBucket>,
    pub users: Vec<UserBucket>,
}

impl MonthlySummary {
    pub fn top_categories(&self) -> &[CategoryBucket] {
        &self.categories[..self.categories.len().min(3)]
    }

    pub fn top_card(&self) -> Option<&CardBucket> {
        self.cards.first()
    }

    pub fn top_user(&self) -> Option<&UserBucket> {
        self.users.first()
    }
}

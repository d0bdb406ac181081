//! Mapping the monthly summary into its public DTO.
//!
//! Installment-derived entries only become Transaction-shaped rows here, at
//! the API boundary. They get a prefixed id derived from the installment
//! record ("synthetic-<id>" in category and member lists,
//! "card-installment-<id>" in card lists) so consumers can tell them apart
//! from real transactions and ids never collide with stored ones.

use crate::domain::models::summary::{
    CardBucket, CategoryBucket, MonthRef, MonthlyEntry, MonthlySummary, UserBucket,
};
use crate::io::rest::mappers::transaction_mapper::TransactionMapper;

const SYNTHETIC_PREFIX: &str = "synthetic";
const CARD_INSTALLMENT_PREFIX: &str = "card-installment";

pub struct SummaryMapper;

impl SummaryMapper {
    pub fn to_dto(summary: &MonthlySummary) -> shared::FinancialSummary {
        let categories: Vec<shared::CategorySummary> =
            summary.categories.iter().map(Self::category_to_dto).collect();
        let cards: Vec<shared::CardSummary> = summary.cards.iter().map(Self::card_to_dto).collect();
        let users: Vec<shared::UserSummary> = summary.users.iter().map(Self::user_to_dto).collect();

        shared::FinancialSummary {
            month: summary.month.month,
            year: summary.month.year,
            total_expenses: summary.total_expenses,
            total_fixed: summary.total_fixed,
            fixed_expenses: summary.fixed_expenses,
            credit_card_expenses: summary.credit_card_expenses,
            debit_expenses: summary.debit_expenses,
            top_categories: categories[..categories.len().min(3)].to_vec(),
            top_card: cards.first().cloned(),
            top_user: users.first().cloned(),
            categories,
            cards,
            users,
        }
    }

    fn category_to_dto(bucket: &CategoryBucket) -> shared::CategorySummary {
        shared::CategorySummary {
            name: bucket.name.clone(),
            total: bucket.total,
            percentage: bucket.percentage,
            transactions: Self::entries_to_rows(&bucket.entries, SYNTHETIC_PREFIX),
        }
    }

    fn card_to_dto(bucket: &CardBucket) -> shared::CardSummary {
        shared::CardSummary {
            name: bucket.name.clone(),
            total: bucket.total,
            percentage: bucket.percentage,
            transactions: Self::entries_to_rows(&bucket.entries, CARD_INSTALLMENT_PREFIX),
        }
    }

    fn user_to_dto(bucket: &UserBucket) -> shared::UserSummary {
        shared::UserSummary {
            user_id: bucket.user_id.clone(),
            name: bucket.name.clone(),
            avatar_url: bucket.avatar_url.clone(),
            total_spent: bucket.total_spent,
            percentage: bucket.percentage,
            transactions: Self::entries_to_rows(&bucket.entries, SYNTHETIC_PREFIX),
        }
    }

    fn entries_to_rows(entries: &[MonthlyEntry], prefix: &str) -> Vec<shared::Transaction> {
        entries.iter().map(|e| Self::entry_to_row(e, prefix)).collect()
    }

    fn entry_to_row(entry: &MonthlyEntry, prefix: &str) -> shared::Transaction {
        match entry {
            MonthlyEntry::Actual(tx) => TransactionMapper::to_dto(tx.clone()),
            MonthlyEntry::Installment { record, owner } => shared::Transaction {
                id: format!("{}-{}", prefix, record.id),
                group_id: owner.group_id.clone(),
                description: owner.description.clone(),
                amount: record.amount,
                date: MonthRef::new(record.due_month, record.due_year)
                    .first_day()
                    .to_string(),
                category: owner.category.clone(),
                card_name: owner.card_name.clone(),
                card_type: TransactionMapper::card_type_to_dto(owner.card_type),
                installments: Some(record.total_installments),
                installment_number: Some(record.installment_number),
                is_recurring: owner.is_recurring,
                created_by: record.created_by.clone(),
                created_at: owner.created_at.to_rfc3339(),
            },
        }
    }
}

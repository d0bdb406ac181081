//! Recurring income/expense materialization.
//!
//! Recurring transactions (rent, utilities, subscriptions paid in full) are
//! re-issued month by month. A "template" is simply the most recent prior
//! occurrence of a recurring (description, card) pair; the month's pending
//! set is every template with no occurrence in that month yet.

use anyhow::Result;
use log::{error, info};
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::commands::recurring::{MaterializeRecurringCommand, MaterializeRecurringResult};
use crate::domain::commands::transactions::CreateTransactionCommand;
use crate::domain::models::summary::MonthRef;
use crate::domain::models::transaction::Transaction;
use crate::domain::transaction_service::TransactionService;
use crate::storage::{Connection, TransactionStorage};

#[derive(Clone)]
pub struct RecurringService<C: Connection> {
    transaction_repository: C::TransactionRepository,
}

impl<C: Connection> RecurringService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            transaction_repository: connection.create_transaction_repository(),
        }
    }

    /// The recurring templates that have not been issued for the given month
    /// yet, each represented by its most recent prior occurrence.
    pub async fn pending_recurring(
        &self,
        group_id: &str,
        month: MonthRef,
    ) -> Result<Vec<Transaction>> {
        let all = self.transaction_repository.list_all_transactions(group_id).await?;
        let first_day = month.first_day();

        let mut templates: HashMap<(String, String), Transaction> = HashMap::new();
        // Chronological input, so the last insert per key is the most recent
        // occurrence
        for tx in all
            .iter()
            .filter(|t| t.is_recurring && !t.is_installment_purchase() && t.date < first_day)
        {
            templates.insert(recurring_key(tx), tx.clone());
        }
        for tx in all.iter().filter(|t| t.is_recurring && month.contains(t.date)) {
            templates.remove(&recurring_key(tx));
        }

        let mut pending: Vec<Transaction> = templates.into_values().collect();
        pending.sort_by(|a, b| (&a.description, &a.id).cmp(&(&b.description, &b.id)));
        Ok(pending)
    }

    /// Issue the month's pending recurring expenses, dated the 1st. A
    /// failure on one template is logged and does not abort the batch.
    pub async fn materialize_recurring(
        &self,
        cmd: MaterializeRecurringCommand,
        transaction_service: &TransactionService<C>,
    ) -> Result<MaterializeRecurringResult> {
        let pending = self.pending_recurring(&cmd.group_id, cmd.month).await?;
        let mut created_count = 0u32;

        for template in pending {
            let create = CreateTransactionCommand {
                group_id: cmd.group_id.clone(),
                description: template.description.clone(),
                amount: template.amount,
                date: Some(cmd.month.first_day()),
                category: template.category.clone(),
                card_name: template.card_name.clone(),
                card_type: template.card_type,
                installments: None,
                is_recurring: true,
                created_by: template.created_by.clone(),
            };
            match transaction_service.create_transaction(create).await {
                Ok(result) => {
                    info!(
                        "Issued recurring expense {} ({}) for {}/{}",
                        result.transaction.id,
                        result.transaction.description,
                        cmd.month.month,
                        cmd.month.year
                    );
                    created_count += 1;
                }
                Err(e) => {
                    error!(
                        "Failed to issue recurring expense '{}': {}",
                        template.description, e
                    );
                }
            }
        }

        let success_message = match created_count {
            0 => "No recurring expenses were pending".to_string(),
            1 => "1 recurring expense issued".to_string(),
            n => format!("{} recurring expenses issued", n),
        };

        Ok(MaterializeRecurringResult { created_count, success_message })
    }
}

/// Templates are matched case- and whitespace-insensitively on description
/// and card, tolerating the same input inconsistency card bucketing does.
fn recurring_key(tx: &Transaction) -> (String, String) {
    (
        tx.description.trim().to_lowercase(),
        tx.card_name.trim().to_lowercase(),
    )
}

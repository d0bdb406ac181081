//! Transaction service domain logic for the tracker.

use anyhow::{anyhow, Result};
use chrono::Local;
use log::info;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::commands::transactions::{
    CreateTransactionCommand, CreateTransactionResult, DeleteTransactionsCommand,
    DeleteTransactionsResult, PaginationInfo, TransactionListQuery, TransactionListResult,
};
use crate::domain::models::transaction::{CardType, InstallmentRecord, Transaction};
use crate::storage::{Connection, InstallmentStorage, TransactionStorage};

const MAX_DESCRIPTION_LEN: usize = 256;

#[derive(Clone)]
pub struct TransactionService<C: Connection> {
    transaction_repository: C::TransactionRepository,
    installment_repository: C::InstallmentRepository,
}

impl<C: Connection> TransactionService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            transaction_repository: connection.create_transaction_repository(),
            installment_repository: connection.create_installment_repository(),
        }
    }

    /// Record a new expense. A credit purchase with `installments > 1` also
    /// gets its installment plan created in the same call; the plan carries
    /// the monthly shares while the transaction keeps the full price.
    pub async fn create_transaction(
        &self,
        cmd: CreateTransactionCommand,
    ) -> Result<CreateTransactionResult> {
        if cmd.description.is_empty() || cmd.description.len() > MAX_DESCRIPTION_LEN {
            return Err(anyhow!("Description must be between 1 and 256 characters"));
        }
        if !(cmd.amount > 0.0) {
            return Err(anyhow!("Amount must be positive"));
        }
        if cmd.category.trim().is_empty() {
            return Err(anyhow!("Category must not be empty"));
        }
        if cmd.card_name.trim().is_empty() {
            return Err(anyhow!("Card name must not be empty"));
        }
        match cmd.installments {
            Some(0) => return Err(anyhow!("Installment count must be at least 1")),
            Some(n) if n > 1 && cmd.card_type == CardType::Debit => {
                return Err(anyhow!("Only credit purchases can be split into installments"));
            }
            _ => {}
        }

        let now_millis = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis() as u64;
        let transaction = Transaction {
            id: Transaction::generate_id(now_millis),
            group_id: cmd.group_id,
            description: cmd.description,
            amount: cmd.amount,
            date: cmd.date.unwrap_or_else(|| Local::now().date_naive()),
            category: cmd.category,
            card_name: cmd.card_name,
            card_type: cmd.card_type,
            installments: cmd.installments,
            is_recurring: cmd.is_recurring,
            created_by: cmd.created_by,
            created_at: Local::now().fixed_offset(),
        };

        self.transaction_repository.store_transaction(&transaction).await?;

        let installments = if transaction.is_installment_purchase() {
            let plan = InstallmentRecord::build_plan(&transaction)?;
            self.installment_repository.store_installments(&plan).await?;
            info!(
                "Created {} installments for transaction {}",
                plan.len(),
                transaction.id
            );
            plan
        } else {
            Vec::new()
        };

        Ok(CreateTransactionResult { transaction, installments })
    }

    pub async fn list_transactions(
        &self,
        query: TransactionListQuery,
    ) -> Result<TransactionListResult> {
        let limit = query.limit.unwrap_or(20);
        // Probe one past the page to learn whether more rows exist
        let query_limit = limit + 1;

        let mut transactions = self
            .transaction_repository
            .list_transactions(&query.group_id, Some(query_limit), query.after)
            .await?;

        let has_more = transactions.len() > limit as usize;
        if has_more {
            transactions.truncate(limit as usize);
        }
        let next_cursor = if has_more {
            transactions.last().map(|t| t.id.clone())
        } else {
            None
        };

        Ok(TransactionListResult {
            transactions,
            pagination: PaginationInfo { has_more, next_cursor },
        })
    }

    /// Delete transactions and cascade-delete the installment plans they
    /// own, so no installment record can outlive its purchase.
    pub async fn delete_transactions(
        &self,
        cmd: DeleteTransactionsCommand,
    ) -> Result<DeleteTransactionsResult> {
        let existing_ids = self
            .transaction_repository
            .check_transactions_exist(&cmd.group_id, &cmd.transaction_ids)
            .await?;
        let not_found_ids: Vec<String> = cmd
            .transaction_ids
            .iter()
            .filter(|id| !existing_ids.contains(id))
            .cloned()
            .collect();

        let deleted_count = if !existing_ids.is_empty() {
            self.transaction_repository
                .delete_transactions(&cmd.group_id, &existing_ids)
                .await?
        } else {
            0
        };

        if deleted_count > 0 {
            let cascaded = self
                .installment_repository
                .delete_installments_for_transactions(&cmd.group_id, &existing_ids)
                .await?;
            if cascaded > 0 {
                info!(
                    "Cascade-deleted {} installments for {} transactions",
                    cascaded, deleted_count
                );
            }
        }

        let success_message = match deleted_count {
            0 => "No transactions were deleted".to_string(),
            1 => "1 transaction deleted successfully".to_string(),
            n => format!("{} transactions deleted successfully", n),
        };

        Ok(DeleteTransactionsResult {
            deleted_count: deleted_count as usize,
            not_found_ids,
            success_message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::CsvConnection;
    use crate::storage::InstallmentStorage;
    use tempfile::TempDir;

    fn create_command(description: &str, amount: f64) -> CreateTransactionCommand {
        CreateTransactionCommand {
            group_id: "group-1".to_string(),
            description: description.to_string(),
            amount,
            date: Some("2025-06-14".parse().unwrap()),
            category: "Mercado".to_string(),
            card_name: "Nubank".to_string(),
            card_type: CardType::Credit,
            installments: None,
            is_recurring: false,
            created_by: "member-1".to_string(),
        }
    }

    async fn create_test_service() -> (TransactionService<CsvConnection>, Arc<CsvConnection>, TempDir)
    {
        let temp_dir = TempDir::new().unwrap();
        let connection = Arc::new(CsvConnection::new(temp_dir.path()).unwrap());
        (TransactionService::new(connection.clone()), connection, temp_dir)
    }

    #[tokio::test]
    async fn test_create_transaction_basic() {
        let (service, _conn, _dir) = create_test_service().await;

        let result = service
            .create_transaction(create_command("Mercado da semana", 250.0))
            .await
            .unwrap();
        assert_eq!(result.transaction.amount, 250.0);
        assert_eq!(result.transaction.description, "Mercado da semana");
        assert!(result.transaction.id.starts_with("tx-"));
        assert!(result.installments.is_empty());
    }

    #[tokio::test]
    async fn test_create_transaction_validation() {
        let (service, _conn, _dir) = create_test_service().await;

        assert!(service.create_transaction(create_command("", 10.0)).await.is_err());
        assert!(service
            .create_transaction(create_command(&"x".repeat(257), 10.0))
            .await
            .is_err());
        assert!(service.create_transaction(create_command("ok", 0.0)).await.is_err());
        assert!(service.create_transaction(create_command("ok", -5.0)).await.is_err());

        let mut cmd = create_command("ok", 10.0);
        cmd.category = "  ".to_string();
        assert!(service.create_transaction(cmd).await.is_err());
    }

    #[tokio::test]
    async fn test_create_installment_purchase_creates_plan() {
        let (service, conn, _dir) = create_test_service().await;

        let mut cmd = create_command("Geladeira nova", 300.0);
        cmd.installments = Some(3);
        cmd.date = Some("2025-01-15".parse().unwrap());
        let result = service.create_transaction(cmd).await.unwrap();

        assert_eq!(result.installments.len(), 3);
        assert!(result.installments.iter().all(|i| i.amount == 100.0));
        assert_eq!(result.installments[0].due_month, 1);
        assert_eq!(result.installments[2].due_month, 3);

        let stored = conn
            .create_installment_repository()
            .list_installments("group-1")
            .await
            .unwrap();
        assert_eq!(stored.len(), 3);
    }

    #[tokio::test]
    async fn test_debit_purchases_cannot_be_split() {
        let (service, _conn, _dir) = create_test_service().await;

        let mut cmd = create_command("Mercado", 100.0);
        cmd.card_type = CardType::Debit;
        cmd.installments = Some(3);
        assert!(service.create_transaction(cmd).await.is_err());

        // A single-payment debit purchase is fine
        let mut cmd = create_command("Mercado", 100.0);
        cmd.card_type = CardType::Debit;
        cmd.installments = Some(1);
        assert!(service.create_transaction(cmd).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_transactions_pagination() {
        let (service, _conn, _dir) = create_test_service().await;

        for day in 1..=5 {
            let mut cmd = create_command(&format!("Compra {}", day), 10.0);
            cmd.date = Some(format!("2025-06-{:02}", day).parse().unwrap());
            service.create_transaction(cmd).await.unwrap();
        }

        let page = service
            .list_transactions(TransactionListQuery {
                group_id: "group-1".to_string(),
                after: None,
                limit: Some(2),
            })
            .await
            .unwrap();
        assert_eq!(page.transactions.len(), 2);
        assert!(page.pagination.has_more);
        assert_eq!(page.transactions[0].description, "Compra 5");

        let next = service
            .list_transactions(TransactionListQuery {
                group_id: "group-1".to_string(),
                after: page.pagination.next_cursor.clone(),
                limit: Some(10),
            })
            .await
            .unwrap();
        assert_eq!(next.transactions.len(), 3);
        assert!(!next.pagination.has_more);
        assert!(next.pagination.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_delete_cascades_installments() {
        let (service, conn, _dir) = create_test_service().await;

        let mut cmd = create_command("Sofá", 600.0);
        cmd.installments = Some(6);
        let result = service.create_transaction(cmd).await.unwrap();
        let tx_id = result.transaction.id.clone();

        let outcome = service
            .delete_transactions(DeleteTransactionsCommand {
                group_id: "group-1".to_string(),
                transaction_ids: vec![tx_id, "tx-0-none".to_string()],
            })
            .await
            .unwrap();
        assert_eq!(outcome.deleted_count, 1);
        assert_eq!(outcome.not_found_ids, ["tx-0-none".to_string()]);

        let remaining = conn
            .create_installment_repository()
            .list_installments("group-1")
            .await
            .unwrap();
        assert!(remaining.is_empty());
    }
}

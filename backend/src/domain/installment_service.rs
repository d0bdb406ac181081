//! Installment lifecycle logic.
//!
//! Installment records are created in bulk by the transaction service when a
//! split credit purchase is saved; after that the only mutation is marking
//! one paid. Deletion happens exclusively by cascade from the owning
//! transaction.

use anyhow::{anyhow, Result};
use chrono::Local;
use log::info;
use std::sync::Arc;

use crate::domain::commands::installments::{InstallmentListQuery, MarkInstallmentPaidCommand};
use crate::domain::models::transaction::InstallmentRecord;
use crate::storage::{Connection, InstallmentStorage};

#[derive(Clone)]
pub struct InstallmentService<C: Connection> {
    installment_repository: C::InstallmentRepository,
}

impl<C: Connection> InstallmentService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            installment_repository: connection.create_installment_repository(),
        }
    }

    pub async fn list_installments(
        &self,
        query: InstallmentListQuery,
    ) -> Result<Vec<InstallmentRecord>> {
        match query.due {
            Some(month) => {
                self.installment_repository
                    .list_installments_due(&query.group_id, month.month, month.year)
                    .await
            }
            None => self.installment_repository.list_installments(&query.group_id).await,
        }
    }

    /// Mark an installment as paid. Marking an already-paid installment is a
    /// no-op that returns the stored record unchanged.
    pub async fn mark_paid(&self, cmd: MarkInstallmentPaidCommand) -> Result<InstallmentRecord> {
        let mut installment = self
            .installment_repository
            .get_installment(&cmd.group_id, &cmd.installment_id)
            .await?
            .ok_or_else(|| anyhow!("Installment not found: {}", cmd.installment_id))?;

        if installment.is_paid {
            return Ok(installment);
        }

        installment.is_paid = true;
        installment.paid_at = Some(Local::now().fixed_offset());
        self.installment_repository.update_installment(&installment).await?;
        info!(
            "Marked installment {} ({}/{}) as paid",
            installment.id, installment.installment_number, installment.total_installments
        );
        Ok(installment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::summary::MonthRef;
    use crate::storage::csv::CsvConnection;
    use crate::storage::InstallmentStorage;
    use tempfile::TempDir;

    fn installment(id: &str, month: u32) -> InstallmentRecord {
        InstallmentRecord {
            id: id.to_string(),
            transaction_id: "tx-1-aaaa".to_string(),
            group_id: "group-1".to_string(),
            installment_number: 1,
            total_installments: 3,
            amount: 100.0,
            due_month: month,
            due_year: 2025,
            is_paid: false,
            paid_at: None,
            created_by: "member-1".to_string(),
        }
    }

    async fn create_test_service() -> (InstallmentService<CsvConnection>, Arc<CsvConnection>, TempDir)
    {
        let temp_dir = TempDir::new().unwrap();
        let connection = Arc::new(CsvConnection::new(temp_dir.path()).unwrap());
        (InstallmentService::new(connection.clone()), connection, temp_dir)
    }

    #[tokio::test]
    async fn test_list_with_and_without_due_filter() {
        let (service, conn, _dir) = create_test_service().await;
        conn.create_installment_repository()
            .store_installments(&[installment("inst-1-1", 1), installment("inst-1-2", 2)])
            .await
            .unwrap();

        let all = service
            .list_installments(InstallmentListQuery {
                group_id: "group-1".to_string(),
                due: None,
            })
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let february = service
            .list_installments(InstallmentListQuery {
                group_id: "group-1".to_string(),
                due: Some(MonthRef::new(2, 2025)),
            })
            .await
            .unwrap();
        assert_eq!(february.len(), 1);
        assert_eq!(february[0].id, "inst-1-2");
    }

    #[tokio::test]
    async fn test_mark_paid_sets_timestamp_once() {
        let (service, conn, _dir) = create_test_service().await;
        conn.create_installment_repository()
            .store_installments(&[installment("inst-1-1", 1)])
            .await
            .unwrap();

        let paid = service
            .mark_paid(MarkInstallmentPaidCommand {
                group_id: "group-1".to_string(),
                installment_id: "inst-1-1".to_string(),
            })
            .await
            .unwrap();
        assert!(paid.is_paid);
        let first_paid_at = paid.paid_at.unwrap();

        // Second call is a no-op and keeps the original timestamp
        let again = service
            .mark_paid(MarkInstallmentPaidCommand {
                group_id: "group-1".to_string(),
                installment_id: "inst-1-1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(again.paid_at.unwrap(), first_paid_at);
    }

    #[tokio::test]
    async fn test_mark_paid_unknown_installment_errors() {
        let (service, _conn, _dir) = create_test_service().await;
        assert!(service
            .mark_paid(MarkInstallmentPaidCommand {
                group_id: "group-1".to_string(),
                installment_id: "inst-9-9".to_string(),
            })
            .await
            .is_err());
    }
}

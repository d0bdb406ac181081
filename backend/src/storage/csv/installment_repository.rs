//! CSV-backed installment record repository.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use csv::{Reader, StringRecord, Writer};
use log::warn;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};

use super::connection::{CsvConnection, INSTALLMENTS_HEADER};
use crate::domain::models::transaction::InstallmentRecord;
use crate::storage::traits::InstallmentStorage;

#[derive(Clone)]
pub struct InstallmentRepository {
    connection: CsvConnection,
}

impl InstallmentRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Read all installment records for a group, ordered by due month then
    /// position.
    async fn read_installments(&self, group_id: &str) -> Result<Vec<InstallmentRecord>> {
        let file_path = self.connection.installments_file_path(group_id);
        self.connection.ensure_file_exists(&file_path, INSTALLMENTS_HEADER)?;

        let file = File::open(&file_path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));

        let mut installments = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            match Self::parse_record(&record) {
                Some(installment) => installments.push(installment),
                None => warn!("Skipping malformed installment row: {:?}", record),
            }
        }

        installments.sort_by(|a, b| {
            (a.due_year, a.due_month, a.installment_number, &a.id)
                .cmp(&(b.due_year, b.due_month, b.installment_number, &b.id))
        });
        Ok(installments)
    }

    async fn write_installments(
        &self,
        group_id: &str,
        installments: &[InstallmentRecord],
    ) -> Result<()> {
        let file_path = self.connection.installments_file_path(group_id);
        self.connection.ensure_file_exists(&file_path, INSTALLMENTS_HEADER)?;
        let temp_path = file_path.with_extension("tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;
            let mut csv_writer = Writer::from_writer(BufWriter::new(file));

            csv_writer.write_record(INSTALLMENTS_HEADER.split(','))?;
            for installment in installments {
                csv_writer.write_record(&[
                    installment.id.as_str(),
                    installment.transaction_id.as_str(),
                    installment.group_id.as_str(),
                    &installment.installment_number.to_string(),
                    &installment.total_installments.to_string(),
                    &installment.amount.to_string(),
                    &installment.due_month.to_string(),
                    &installment.due_year.to_string(),
                    &installment.is_paid.to_string(),
                    &installment
                        .paid_at
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_default(),
                    installment.created_by.as_str(),
                ])?;
            }
            csv_writer.flush()?;
        }

        std::fs::rename(&temp_path, &file_path)?;
        Ok(())
    }

    fn parse_record(record: &StringRecord) -> Option<InstallmentRecord> {
        let paid_at_field = record.get(9)?;
        let paid_at = if paid_at_field.is_empty() {
            None
        } else {
            Some(chrono::DateTime::parse_from_rfc3339(paid_at_field).ok()?)
        };

        Some(InstallmentRecord {
            id: record.get(0)?.to_string(),
            transaction_id: record.get(1)?.to_string(),
            group_id: record.get(2)?.to_string(),
            installment_number: record.get(3)?.parse().ok()?,
            total_installments: record.get(4)?.parse().ok()?,
            amount: record.get(5)?.parse().ok()?,
            due_month: record.get(6)?.parse().ok()?,
            due_year: record.get(7)?.parse().ok()?,
            is_paid: record.get(8)?.parse().ok()?,
            paid_at,
            created_by: record.get(10)?.to_string(),
        })
    }
}

#[async_trait]
impl InstallmentStorage for InstallmentRepository {
    async fn store_installments(&self, installments: &[InstallmentRecord]) -> Result<()> {
        let group_id = match installments.first() {
            Some(first) => first.group_id.clone(),
            None => return Ok(()),
        };
        let mut all = self.read_installments(&group_id).await?;
        all.extend_from_slice(installments);
        all.sort_by(|a, b| {
            (a.due_year, a.due_month, a.installment_number, &a.id)
                .cmp(&(b.due_year, b.due_month, b.installment_number, &b.id))
        });
        self.write_installments(&group_id, &all).await
    }

    async fn get_installment(
        &self,
        group_id: &str,
        installment_id: &str,
    ) -> Result<Option<InstallmentRecord>> {
        let installments = self.read_installments(group_id).await?;
        Ok(installments.into_iter().find(|i| i.id == installment_id))
    }

    async fn list_installments(&self, group_id: &str) -> Result<Vec<InstallmentRecord>> {
        self.read_installments(group_id).await
    }

    async fn list_installments_due(
        &self,
        group_id: &str,
        month: u32,
        year: i32,
    ) -> Result<Vec<InstallmentRecord>> {
        let installments = self.read_installments(group_id).await?;
        Ok(installments
            .into_iter()
            .filter(|i| i.due_month == month && i.due_year == year)
            .collect())
    }

    async fn update_installment(&self, installment: &InstallmentRecord) -> Result<()> {
        let mut installments = self.read_installments(&installment.group_id).await?;
        let slot = installments
            .iter_mut()
            .find(|i| i.id == installment.id)
            .ok_or_else(|| anyhow!("Installment not found: {}", installment.id))?;
        *slot = installment.clone();
        self.write_installments(&installment.group_id, &installments).await
    }

    async fn delete_installments_for_transactions(
        &self,
        group_id: &str,
        transaction_ids: &[String],
    ) -> Result<u32> {
        let installments = self.read_installments(group_id).await?;
        let before = installments.len();
        let remaining: Vec<InstallmentRecord> = installments
            .into_iter()
            .filter(|i| !transaction_ids.contains(&i.transaction_id))
            .collect();
        let deleted = (before - remaining.len()) as u32;
        if deleted > 0 {
            self.write_installments(group_id, &remaining).await?;
        }
        Ok(deleted)
    }
}

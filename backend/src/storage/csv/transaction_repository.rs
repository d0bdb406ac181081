//! CSV-backed transaction repository.

use anyhow::Result;
use async_trait::async_trait;
use csv::{Reader, StringRecord, Writer};
use log::warn;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};

use super::connection::{CsvConnection, TRANSACTIONS_HEADER};
use crate::domain::models::transaction::{CardType, Transaction};
use crate::storage::traits::TransactionStorage;

#[derive(Clone)]
pub struct TransactionRepository {
    connection: CsvConnection,
}

impl TransactionRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Read all transactions for a group from its CSV file, oldest first.
    async fn read_transactions(&self, group_id: &str) -> Result<Vec<Transaction>> {
        let file_path = self.connection.transactions_file_path(group_id);
        self.connection.ensure_file_exists(&file_path, TRANSACTIONS_HEADER)?;

        let file = File::open(&file_path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));

        let mut transactions = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            match Self::parse_record(&record) {
                Some(transaction) => transactions.push(transaction),
                None => warn!("Skipping malformed transaction row: {:?}", record),
            }
        }

        transactions.sort_by(|a, b| (a.date, &a.id).cmp(&(b.date, &b.id)));
        Ok(transactions)
    }

    /// Write all transactions for a group to its CSV file atomically.
    async fn write_transactions(&self, group_id: &str, transactions: &[Transaction]) -> Result<()> {
        let file_path = self.connection.transactions_file_path(group_id);
        self.connection.ensure_file_exists(&file_path, TRANSACTIONS_HEADER)?;
        let temp_path = file_path.with_extension("tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;
            let mut csv_writer = Writer::from_writer(BufWriter::new(file));

            csv_writer.write_record(TRANSACTIONS_HEADER.split(','))?;
            for transaction in transactions {
                csv_writer.write_record(&[
                    transaction.id.as_str(),
                    transaction.group_id.as_str(),
                    &transaction.date.to_string(),
                    transaction.description.as_str(),
                    &transaction.amount.to_string(),
                    transaction.category.as_str(),
                    transaction.card_name.as_str(),
                    card_type_to_str(transaction.card_type),
                    &transaction.installments.map(|n| n.to_string()).unwrap_or_default(),
                    &transaction.is_recurring.to_string(),
                    transaction.created_by.as_str(),
                    &transaction.created_at.to_rfc3339(),
                ])?;
            }
            csv_writer.flush()?;
        }

        std::fs::rename(&temp_path, &file_path)?;
        Ok(())
    }

    fn parse_record(record: &StringRecord) -> Option<Transaction> {
        let installments_field = record.get(8)?;
        let installments = if installments_field.is_empty() {
            None
        } else {
            Some(installments_field.parse::<u32>().ok()?)
        };

        Some(Transaction {
            id: record.get(0)?.to_string(),
            group_id: record.get(1)?.to_string(),
            date: record.get(2)?.parse().ok()?,
            description: record.get(3)?.to_string(),
            amount: record.get(4)?.parse::<f64>().ok()?,
            category: record.get(5)?.to_string(),
            card_name: record.get(6)?.to_string(),
            card_type: card_type_from_str(record.get(7)?)?,
            installments,
            is_recurring: record.get(9)?.parse::<bool>().ok()?,
            created_by: record.get(10)?.to_string(),
            created_at: chrono::DateTime::parse_from_rfc3339(record.get(11)?).ok()?,
        })
    }
}

pub(super) fn card_type_to_str(card_type: CardType) -> &'static str {
    match card_type {
        CardType::Credit => "credit",
        CardType::Debit => "debit",
    }
}

pub(super) fn card_type_from_str(value: &str) -> Option<CardType> {
    match value {
        "credit" => Some(CardType::Credit),
        "debit" => Some(CardType::Debit),
        _ => None,
    }
}

#[async_trait]
impl TransactionStorage for TransactionRepository {
    async fn store_transaction(&self, transaction: &Transaction) -> Result<()> {
        let mut transactions = self.read_transactions(&transaction.group_id).await?;
        transactions.push(transaction.clone());
        transactions.sort_by(|a, b| (a.date, &a.id).cmp(&(b.date, &b.id)));
        self.write_transactions(&transaction.group_id, &transactions).await
    }

    async fn get_transaction(
        &self,
        group_id: &str,
        transaction_id: &str,
    ) -> Result<Option<Transaction>> {
        let transactions = self.read_transactions(group_id).await?;
        Ok(transactions.into_iter().find(|t| t.id == transaction_id))
    }

    async fn list_transactions(
        &self,
        group_id: &str,
        limit: Option<u32>,
        after: Option<String>,
    ) -> Result<Vec<Transaction>> {
        let mut transactions = self.read_transactions(group_id).await?;
        transactions.reverse(); // newest first

        if let Some(after_id) = after {
            if let Some(pos) = transactions.iter().position(|t| t.id == after_id) {
                transactions.drain(..=pos);
            }
        }
        if let Some(limit) = limit {
            transactions.truncate(limit as usize);
        }
        Ok(transactions)
    }

    async fn list_all_transactions(&self, group_id: &str) -> Result<Vec<Transaction>> {
        self.read_transactions(group_id).await
    }

    async fn delete_transactions(
        &self,
        group_id: &str,
        transaction_ids: &[String],
    ) -> Result<u32> {
        let transactions = self.read_transactions(group_id).await?;
        let before = transactions.len();
        let remaining: Vec<Transaction> = transactions
            .into_iter()
            .filter(|t| !transaction_ids.contains(&t.id))
            .collect();
        let deleted = (before - remaining.len()) as u32;
        if deleted > 0 {
            self.write_transactions(group_id, &remaining).await?;
        }
        Ok(deleted)
    }

    async fn check_transactions_exist(
        &self,
        group_id: &str,
        transaction_ids: &[String],
    ) -> Result<Vec<String>> {
        let transactions = self.read_transactions(group_id).await?;
        Ok(transaction_ids
            .iter()
            .filter(|id| transactions.iter().any(|t| &t.id == *id))
            .cloned()
            .collect())
    }
}

//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::member::MemberProfile;
use crate::domain::models::transaction::{InstallmentRecord, Transaction};

/// Trait defining the interface for transaction storage operations.
///
/// The domain layer works against this trait so the backing store (CSV
/// files, a SQL database, a remote API) can change without touching it.
#[async_trait]
pub trait TransactionStorage: Send + Sync {
    /// Store a new transaction
    async fn store_transaction(&self, transaction: &Transaction) -> Result<()>;

    /// Retrieve a specific transaction by ID
    async fn get_transaction(
        &self,
        group_id: &str,
        transaction_id: &str,
    ) -> Result<Option<Transaction>>;

    /// List transactions with pagination support.
    /// Returns transactions ordered by date descending (most recent first).
    async fn list_transactions(
        &self,
        group_id: &str,
        limit: Option<u32>,
        after: Option<String>,
    ) -> Result<Vec<Transaction>>;

    /// List every transaction for a group in chronological order.
    async fn list_all_transactions(&self, group_id: &str) -> Result<Vec<Transaction>>;

    /// Delete multiple transactions.
    /// Returns the number of transactions actually deleted.
    async fn delete_transactions(&self, group_id: &str, transaction_ids: &[String])
        -> Result<u32>;

    /// Check which of the given IDs exist for a group.
    async fn check_transactions_exist(
        &self,
        group_id: &str,
        transaction_ids: &[String],
    ) -> Result<Vec<String>>;
}

/// Trait defining the interface for installment record storage operations.
#[async_trait]
pub trait InstallmentStorage: Send + Sync {
    /// Store a batch of installment records (a whole plan at once)
    async fn store_installments(&self, installments: &[InstallmentRecord]) -> Result<()>;

    /// Retrieve a specific installment record by ID
    async fn get_installment(
        &self,
        group_id: &str,
        installment_id: &str,
    ) -> Result<Option<InstallmentRecord>>;

    /// List every installment record for a group, ordered by due month
    async fn list_installments(&self, group_id: &str) -> Result<Vec<InstallmentRecord>>;

    /// List the installment records falling due in a specific month
    async fn list_installments_due(
        &self,
        group_id: &str,
        month: u32,
        year: i32,
    ) -> Result<Vec<InstallmentRecord>>;

    /// Replace a stored installment record (used for marking paid)
    async fn update_installment(&self, installment: &InstallmentRecord) -> Result<()>;

    /// Delete all installment records owned by the given transactions.
    /// Returns the number of records deleted.
    async fn delete_installments_for_transactions(
        &self,
        group_id: &str,
        transaction_ids: &[String],
    ) -> Result<u32>;
}

/// Trait defining the interface for member profile storage operations.
#[async_trait]
pub trait MemberStorage: Send + Sync {
    /// Store or update a member profile for a group
    async fn store_member(&self, group_id: &str, member: &MemberProfile) -> Result<()>;

    /// Retrieve a member profile by ID
    async fn get_member(&self, group_id: &str, member_id: &str) -> Result<Option<MemberProfile>>;

    /// List all member profiles for a group, ordered by name
    async fn list_members(&self, group_id: &str) -> Result<Vec<MemberProfile>>;
}

/// Trait defining the interface for storage connections.
///
/// Provides factory methods for creating repositories so the domain layer
/// can be wired against any storage backend.
pub trait Connection: Send + Sync + Clone + 'static {
    type TransactionRepository: TransactionStorage + Clone;
    type InstallmentRepository: InstallmentStorage + Clone;
    type MemberRepository: MemberStorage + Clone;

    fn create_transaction_repository(&self) -> Self::TransactionRepository;
    fn create_installment_repository(&self) -> Self::InstallmentRepository;
    fn create_member_repository(&self) -> Self::MemberRepository;
}

//! CSV storage connection: manages the data directory layout.
//!
//! Each group owns a subdirectory of the base data directory holding
//! `transactions.csv`, `installments.csv` and `members.csv`.

use anyhow::Result;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use crate::storage::traits::Connection;

pub const TRANSACTIONS_HEADER: &str =
    "id,group_id,date,description,amount,category,card_name,card_type,installments,is_recurring,created_by,created_at";
pub const INSTALLMENTS_HEADER: &str =
    "id,transaction_id,group_id,installment_number,total_installments,amount,due_month,due_year,is_paid,paid_at,created_by";
pub const MEMBERS_HEADER: &str = "id,name,avatar_url";

/// CsvConnection manages file paths and ensures the CSV files exist for each
/// group.
#[derive(Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
}

impl CsvConnection {
    /// Create a new CSV connection with a base directory.
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();
        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
        }
        Ok(Self { base_directory: base_path })
    }

    /// Create a connection in the default data directory:
    /// `$CASA_TRACKER_DATA_DIR` when set, otherwise `~/.casa-tracker`.
    pub fn new_default() -> Result<Self> {
        let data_dir = match std::env::var("CASA_TRACKER_DATA_DIR") {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => {
                let home_dir = std::env::var("HOME")
                    .or_else(|_| std::env::var("USERPROFILE"))
                    .map_err(|_| anyhow::anyhow!("Could not determine home directory"))?;
                PathBuf::from(home_dir).join(".casa-tracker")
            }
        };
        info!("Using data directory: {}", data_dir.display());
        Self::new(data_dir)
    }

    /// Directory names stay filesystem-safe no matter what the group id
    /// contains.
    pub fn safe_directory_name(group_id: &str) -> String {
        let name: String = group_id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        if name.is_empty() { "_".to_string() } else { name }
    }

    /// Get the directory path for a group's data.
    pub fn group_directory(&self, group_id: &str) -> PathBuf {
        self.base_directory.join(Self::safe_directory_name(group_id))
    }

    pub fn transactions_file_path(&self, group_id: &str) -> PathBuf {
        self.group_directory(group_id).join("transactions.csv")
    }

    pub fn installments_file_path(&self, group_id: &str) -> PathBuf {
        self.group_directory(group_id).join("installments.csv")
    }

    pub fn members_file_path(&self, group_id: &str) -> PathBuf {
        self.group_directory(group_id).join("members.csv")
    }

    /// Ensure a CSV file exists with its header row.
    pub fn ensure_file_exists(&self, path: &Path, header: &str) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        if !path.exists() {
            fs::write(path, format!("{}\n", header))?;
        }
        Ok(())
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }
}

impl Connection for CsvConnection {
    type TransactionRepository = super::transaction_repository::TransactionRepository;
    type InstallmentRepository = super::installment_repository::InstallmentRepository;
    type MemberRepository = super::member_repository::MemberRepository;

    fn create_transaction_repository(&self) -> Self::TransactionRepository {
        super::transaction_repository::TransactionRepository::new(self.clone())
    }

    fn create_installment_repository(&self) -> Self::InstallmentRepository {
        super::installment_repository::InstallmentRepository::new(self.clone())
    }

    fn create_member_repository(&self) -> Self::MemberRepository {
        super::member_repository::MemberRepository::new(self.clone())
    }
}

//! # Storage Module
//!
//! Handles all data persistence for the tracker. The domain layer only sees
//! the traits defined here; the CSV backend is the production
//! implementation, with one data directory per group and atomic file
//! rewrites.

pub mod csv;
pub mod traits;

pub use csv::CsvConnection;
pub use traits::{Connection, InstallmentStorage, MemberStorage, TransactionStorage};

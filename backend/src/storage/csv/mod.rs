//! CSV file storage backend: one directory per group, atomic rewrites.

pub mod connection;
pub mod installment_repository;
pub mod member_repository;
pub mod transaction_repository;

pub use connection::CsvConnection;
pub use installment_repository::InstallmentRepository;
pub use member_repository::MemberRepository;
pub use transaction_repository::TransactionRepository;

//! Domain models for the expense simulator

pub mod target;
pub mod transaction;

// Re-exports
pub use target::{TargetError, TargetSheet};
pub use transaction::{Ledger, Transaction, TransactionError};

//! Transaction model
//!
//! Represents one expense line in the generated month.
//! Each transaction has:
//! - Sequential ID (`TXN0001`, `TXN0002`, ...)
//! - Date
//! - Top-level category and sub-category key
//! - Description (slash-joined item names for baskets)
//! - Amount (i64 currency units, never negative)
//!
//! Transactions are only created through [`Ledger::record`]. After creation
//! the amount changes only through [`Transaction::apply_adjustment`], which the
//! calibrator uses once per category.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when recording a transaction
#[derive(Debug, Error, PartialEq)]
pub enum TransactionError {
    #[error("Transaction amount must be non-negative, got {0}")]
    NegativeAmount(i64),

    #[error("Transaction sub-category must not be empty")]
    EmptySubCategory,
}

/// A single generated expense
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use expense_simulator_core_rs::Ledger;
///
/// let mut ledger = Ledger::new();
/// let date = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
/// let idx = ledger
///     .record(date, "Bahan Baku", "Belanja Bahan Baku (COGS)", "susu/gula", 38_000)
///     .unwrap();
/// assert_eq!(ledger[idx].id(), "TXN0001");
/// assert_eq!(ledger[idx].amount(), 38_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Sequential identifier
    id: String,

    /// Booking date
    date: NaiveDate,

    /// Top-level category (e.g. "Operasional")
    category: String,

    /// Sub-category key; matches the target key it counts against
    sub_category: String,

    /// Free-text description
    description: String,

    /// Amount (currency units)
    amount: i64,
}

impl Transaction {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn sub_category(&self) -> &str {
        &self.sub_category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// Add `delta` to the amount, flooring the result at zero
    ///
    /// Returns the delta actually applied (differs from `delta` only when
    /// the floor kicks in).
    pub fn apply_adjustment(&mut self, delta: i64) -> i64 {
        let before = self.amount;
        self.amount = before.saturating_add(delta).max(0);
        self.amount - before
    }
}

/// Owned, append-only sequence of transactions
///
/// Transactions are addressed by their index in the ledger. IDs are handed out
/// in append order starting at `TXN0001`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    transactions: Vec<Transaction>,
    next_id: usize,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            transactions: Vec::new(),
            next_id: 1,
        }
    }

    /// Append a transaction and return its index
    ///
    /// # Errors
    /// `NegativeAmount` for amounts below zero, `EmptySubCategory` for a blank
    /// sub-category key.
    pub fn record(
        &mut self,
        date: NaiveDate,
        category: impl Into<String>,
        sub_category: impl Into<String>,
        description: impl Into<String>,
        amount: i64,
    ) -> Result<usize, TransactionError> {
        if amount < 0 {
            return Err(TransactionError::NegativeAmount(amount));
        }
        let sub_category = sub_category.into();
        if sub_category.trim().is_empty() {
            return Err(TransactionError::EmptySubCategory);
        }

        // Default-constructed ledgers start at zero; IDs are 1-based
        let seq = self.next_id.max(1);
        self.next_id = seq + 1;

        self.transactions.push(Transaction {
            id: format!("TXN{:04}", seq),
            date,
            category: category.into(),
            sub_category,
            description: description.into(),
            amount,
        });
        Ok(self.transactions.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Transaction> {
        self.transactions.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Transaction> {
        self.transactions.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.transactions.iter()
    }

    pub fn as_slice(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn as_mut_slice(&mut self) -> &mut [Transaction] {
        &mut self.transactions
    }

    /// Sum of amounts recorded under `sub_category`
    pub fn total_for(&self, sub_category: &str) -> i64 {
        total_for(&self.transactions, sub_category)
    }

    /// Consume the ledger, yielding transactions in append order
    pub fn into_transactions(self) -> Vec<Transaction> {
        self.transactions
    }
}

impl std::ops::Index<usize> for Ledger {
    type Output = Transaction;

    fn index(&self, index: usize) -> &Self::Output {
        &self.transactions[index]
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.iter()
    }
}

/// Sum of amounts with the given sub-category
pub fn total_for(transactions: &[Transaction], sub_category: &str) -> i64 {
    transactions
        .iter()
        .filter(|tx| tx.sub_category == sub_category)
        .map(|tx| tx.amount)
        .sum()
}

//! Export rows and the target-vs-actual summary

pub mod fingerprint;

pub use fingerprint::{canonical_hash, fingerprint};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationPolicy;
use crate::models::transaction::total_for;
use crate::models::{TargetSheet, Transaction};

/// One exported transaction row, with the bookkeeping column names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    #[serde(rename = "ID_Transaksi")]
    pub id: String,

    #[serde(rename = "Tanggal_Transaksi")]
    pub date: NaiveDate,

    /// Month number of the transaction date
    #[serde(rename = "Bulan")]
    pub month: u32,

    #[serde(rename = "PIC")]
    pub pic: String,

    #[serde(rename = "Kategori_Utama")]
    pub category: String,

    #[serde(rename = "Sub_Kategori")]
    pub sub_category: String,

    #[serde(rename = "Keterangan")]
    pub description: String,

    #[serde(rename = "Nominal")]
    pub amount: i64,
}

impl ExpenseRecord {
    pub fn from_transaction(tx: &Transaction, pic: &str) -> Self {
        Self {
            id: tx.id().to_string(),
            date: tx.date(),
            month: tx.date().month(),
            pic: pic.to_string(),
            category: tx.category().to_string(),
            sub_category: tx.sub_category().to_string(),
            description: tx.description().to_string(),
            amount: tx.amount(),
        }
    }
}

/// Export rows in transaction order
pub fn export_records(transactions: &[Transaction], pic: &str) -> Vec<ExpenseRecord> {
    transactions
        .iter()
        .map(|tx| ExpenseRecord::from_transaction(tx, pic))
        .collect()
}

/// Target vs actual for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub category: String,
    pub target: i64,
    pub actual: i64,

    /// actual − target
    pub deviation: i64,
}

/// Verification table over every spendable target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSummary {
    pub rows: Vec<SummaryRow>,
    pub total_target: i64,
    pub total_actual: i64,
}

impl TargetSummary {
    pub fn build(
        targets: &TargetSheet,
        transactions: &[Transaction],
        policy: &CalibrationPolicy,
    ) -> Self {
        let rows: Vec<SummaryRow> = targets
            .amounts()
            .filter(|(key, _)| policy.is_spendable(key))
            .map(|(key, target)| {
                let actual = total_for(transactions, key);
                SummaryRow {
                    category: key.to_string(),
                    target,
                    actual,
                    deviation: actual - target,
                }
            })
            .collect();

        let total_target = rows.iter().map(|r| r.target).sum();
        let total_actual = rows.iter().map(|r| r.actual).sum();

        Self {
            rows,
            total_target,
            total_actual,
        }
    }

    pub fn total_deviation(&self) -> i64 {
        self.total_actual - self.total_target
    }

    /// True when every row lies within `tolerance`
    pub fn is_reconciled(&self, tolerance: i64) -> bool {
        self.rows.iter().all(|r| r.deviation.abs() <= tolerance)
    }

    /// Plain-text table, one category per line plus a total line
    pub fn to_table(&self) -> String {
        let width = self
            .rows
            .iter()
            .map(|r| r.category.chars().count())
            .max()
            .unwrap_or(0)
            .max("TOTAL".len());

        let mut out = format!(
            "{:<width$}  {:>14}  {:>14}  {:>12}\n",
            "Kategori",
            "Target",
            "Aktual",
            "Selisih",
            width = width
        );
        for r in &self.rows {
            out.push_str(&format!(
                "{:<width$}  {:>14}  {:>14}  {:>12}\n",
                r.category,
                r.target,
                r.actual,
                r.deviation,
                width = width
            ));
        }
        out.push_str(&format!(
            "{:<width$}  {:>14}  {:>14}  {:>12}\n",
            "TOTAL",
            self.total_target,
            self.total_actual,
            self.total_deviation(),
            width = width
        ));
        out
    }
}

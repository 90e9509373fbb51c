//! Final calibration
//!
//! Forces each category's realized total onto its target. Sampling leaves a
//! residual; calibration moves the whole residual onto the category's largest
//! transaction, so a single adjustment per category is exact.
//!
//! # Critical Invariants
//!
//! - Single pass; at most one transaction per category is modified
//! - Adjusted amounts are floored at zero
//! - Running it again on calibrated data changes nothing
//! - Categories without transactions are reported, never fabricated

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{TargetSheet, Transaction};

/// Which target keys are spendable, and how close is close enough
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPolicy {
    /// Maximum tolerated |target − actual| (currency units)
    pub tolerance: i64,

    /// Target keys that are memo fields, not spendable categories
    pub informational_keys: Vec<String>,

    /// Key prefixes marking report metadata
    pub informational_prefixes: Vec<String>,
}

impl Default for CalibrationPolicy {
    fn default() -> Self {
        Self {
            tolerance: 1,
            informational_keys: vec![
                "Operasional|Akumulasi Beban Penyusutan".to_string(),
                "Bulan".to_string(),
                "Tahun".to_string(),
            ],
            informational_prefixes: vec!["Tanggal".to_string()],
        }
    }
}

impl CalibrationPolicy {
    /// False for memo/metadata keys
    pub fn is_spendable(&self, key: &str) -> bool {
        !self.informational_keys.iter().any(|k| k == key)
            && !self
                .informational_prefixes
                .iter()
                .any(|p| key.starts_with(p.as_str()))
    }
}

/// What calibration did for one target category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome")]
pub enum CalibrationOutcome {
    /// Already within tolerance; nothing touched
    WithinTolerance { deviation: i64 },

    /// Residual moved onto the largest transaction
    Adjusted {
        index: usize,
        transaction_id: String,
        delta: i64,
    },

    /// Adjustment hit the zero floor; part of the residual remains
    Floored {
        index: usize,
        transaction_id: String,
        delta: i64,
        residual: i64,
    },

    /// Target has no realized transactions to adjust
    NoTransactions { target: i64 },
}

impl CalibrationOutcome {
    /// True when the category total now matches its target within tolerance
    pub fn is_reconciled(&self) -> bool {
        matches!(
            self,
            CalibrationOutcome::WithinTolerance { .. } | CalibrationOutcome::Adjusted { .. }
        )
    }
}

/// Per-category result of a calibration pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCalibration {
    pub category: String,
    pub target: i64,
    pub actual_before: i64,
    pub outcome: CalibrationOutcome,
}

/// Summary of a calibration pass, in target-key order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub categories: Vec<CategoryCalibration>,
}

impl CalibrationReport {
    pub fn adjusted_count(&self) -> usize {
        self.categories
            .iter()
            .filter(|c| {
                matches!(
                    c.outcome,
                    CalibrationOutcome::Adjusted { .. } | CalibrationOutcome::Floored { .. }
                )
            })
            .count()
    }

    /// Categories left off-target
    pub fn unmet(&self) -> impl Iterator<Item = &CategoryCalibration> {
        self.categories.iter().filter(|c| !c.outcome.is_reconciled())
    }

    pub fn get(&self, category: &str) -> Option<&CategoryCalibration> {
        self.categories.iter().find(|c| c.category == category)
    }
}

/// Index of the largest transaction in `sub_category` (first wins on ties)
pub fn largest_in_category(transactions: &[Transaction], sub_category: &str) -> Option<usize> {
    let mut best: Option<(usize, i64)> = None;
    for (idx, tx) in transactions.iter().enumerate() {
        if tx.sub_category() != sub_category {
            continue;
        }
        match best {
            Some((_, amount)) if tx.amount() <= amount => {}
            _ => best = Some((idx, tx.amount())),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Reconcile every spendable target against the transaction set
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use expense_simulator_core_rs::calibration::{calibrate, CalibrationPolicy};
/// use expense_simulator_core_rs::{Ledger, TargetSheet};
///
/// let date = NaiveDate::from_ymd_opt(2024, 9, 3).unwrap();
/// let mut ledger = Ledger::new();
/// ledger.record(date, "Operasional", "Operasional|Lain-lain", "ATK", 20_000).unwrap();
/// ledger.record(date, "Operasional", "Operasional|Lain-lain", "fotokopi", 12_000).unwrap();
///
/// let targets = TargetSheet::new().with_amount("Operasional|Lain-lain", 50_000);
/// calibrate(ledger.as_mut_slice(), &targets, &CalibrationPolicy::default());
///
/// assert_eq!(ledger.total_for("Operasional|Lain-lain"), 50_000);
/// assert_eq!(ledger[0].amount(), 38_000);
/// ```
pub fn calibrate(
    transactions: &mut [Transaction],
    targets: &TargetSheet,
    policy: &CalibrationPolicy,
) -> CalibrationReport {
    let mut report = CalibrationReport::default();

    for (category, target) in targets.amounts() {
        if !policy.is_spendable(category) {
            continue;
        }

        let actual = crate::models::transaction::total_for(transactions, category);
        let discrepancy = target - actual;

        let outcome = if discrepancy.abs() <= policy.tolerance {
            CalibrationOutcome::WithinTolerance {
                deviation: -discrepancy,
            }
        } else {
            match largest_in_category(transactions, category) {
                None => {
                    warn!(
                        category,
                        target, "no transactions to calibrate; target left unmet"
                    );
                    CalibrationOutcome::NoTransactions { target }
                }
                Some(index) => {
                    let tx = &mut transactions[index];
                    let applied = tx.apply_adjustment(discrepancy);
                    let transaction_id = tx.id().to_string();
                    let residual = discrepancy - applied;

                    if residual.abs() > policy.tolerance {
                        warn!(
                            category,
                            target,
                            residual,
                            transaction = %transaction_id,
                            "calibration floored at zero; target left unmet"
                        );
                        CalibrationOutcome::Floored {
                            index,
                            transaction_id,
                            delta: applied,
                            residual,
                        }
                    } else {
                        CalibrationOutcome::Adjusted {
                            index,
                            transaction_id,
                            delta: applied,
                        }
                    }
                }
            }
        };

        report.categories.push(CategoryCalibration {
            category: category.to_string(),
            target,
            actual_before: actual,
            outcome,
        });
    }

    report
}

//! Expense Simulator Core
//!
//! Synthesizes a month of small-business expense transactions that reconcile
//! to per-category targets while looking locally natural.
//!
//! # Architecture
//!
//! - **catalog**: Item groups and their price distributions
//! - **rng**: Deterministic random source
//! - **basket**: Weighted basket sampling
//! - **budget**: Target tracking and the daily adjustment factor
//! - **scheduler**: Daily loop over the flexible categories
//! - **fixed**: Calendar-driven transactions (payroll, dues, bills)
//! - **calibration**: Final per-category reconciliation
//! - **orchestrator**: One generation run end to end
//! - **report**: Export rows, verification summary, fingerprints
//!
//! # Critical Invariants
//!
//! 1. All money values are i64 (whole currency units)
//! 2. All randomness is deterministic (seeded RNG)
//! 3. Transaction amounts are never negative
//! 4. Adjustment factors stay within their configured bounds

pub mod basket;
pub mod budget;
pub mod calibration;
pub mod catalog;
pub mod core;
pub mod fixed;
pub mod models;
pub mod orchestrator;
pub mod report;
pub mod rng;
pub mod scheduler;

pub use basket::{sample_basket, Basket, GroupWeight, SamplingError};
pub use budget::{adjustment_factor, BudgetTracker, ControllerParams};
pub use calibration::{calibrate, CalibrationOutcome, CalibrationPolicy, CalibrationReport};
pub use catalog::{Catalog, CatalogGroup, CatalogItem};
pub use core::{payment_date, Period};
pub use models::{Ledger, TargetError, TargetSheet, Transaction, TransactionError};
pub use orchestrator::{ExpenseGenerator, GenerationError, GenerationResult, GeneratorConfig};
pub use report::{export_records, fingerprint, ExpenseRecord, TargetSummary};
pub use rng::{RandomSource, RngManager};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn expense_simulator_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::generator::PyExpenseGenerator>()?;
    Ok(())
}

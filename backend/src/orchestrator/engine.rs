//! Generator engine
//!
//! Wires the pieces of a run together:
//!
//! ```text
//! 1. Validate the period (single calendar month, start <= end)
//! 2. Emit the fixed schedule, collecting residual flexible targets
//! 3. Build a fresh budget tracker for the flexible categories
//! 4. Run the daily loop (factor → event → record)
//! 5. Calibrate every spendable target over the combined set
//! 6. Stable sort by date and fingerprint the result
//! ```
//!
//! The RNG is seeded once in [`ExpenseGenerator::new`] and its state carries
//! over between `generate` calls. Ledger and tracker are fresh per call.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use expense_simulator_core_rs::{ExpenseGenerator, GeneratorConfig, TargetSheet};
//!
//! let targets = TargetSheet::new()
//!     .with_amount("Belanja Bahan Baku (COGS)", 6_000_000)
//!     .with_amount("Operasional|Gaji Pegawai", 3_000_000);
//!
//! let mut generator = ExpenseGenerator::new(GeneratorConfig::default()).unwrap();
//! let result = generator
//!     .generate(
//!         &targets,
//!         NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
//!         NaiveDate::from_ymd_opt(2024, 9, 30).unwrap(),
//!     )
//!     .unwrap();
//!
//! assert_eq!(result.days.len(), 30);
//! assert!(result.transactions.iter().all(|t| t.amount() >= 0));
//! ```

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::basket::SamplingError;
use crate::budget::ControllerParams;
use crate::calibration::{calibrate, CalibrationPolicy, CalibrationReport};
use crate::catalog::Catalog;
use crate::core::Period;
use crate::fixed::{FixedSchedule, FixedScheduleConfig};
use crate::models::{Ledger, TargetSheet, Transaction};
use crate::report::fingerprint;
use crate::rng::RngManager;
use crate::scheduler::{default_flexible_categories, DailyScheduler, DaySummary, FlexibleCategoryConfig};

// ============================================================================
// Errors
// ============================================================================

/// Errors that abort a generation run
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenerationError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid period {start}..={end}: {reason}")]
    InvalidPeriod {
        start: NaiveDate,
        end: NaiveDate,
        reason: String,
    },

    #[error("Sampling error: {0}")]
    Sampling(#[from] SamplingError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

// ============================================================================
// Configuration
// ============================================================================

/// Complete generator configuration
///
/// Missing fields fall back to their defaults when deserialized, so a JSON
/// file only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Seed for the run's RNG
    pub rng_seed: u64,

    /// Controller gain
    pub sensitivity: f64,

    /// Division guard in the factor formula
    pub epsilon: f64,

    /// Clamp range for the adjustment factor (min, max)
    pub factor_bounds: (f64, f64),

    /// Calibration tolerance (currency units)
    pub calibration_tolerance: i64,

    /// Person-in-charge written on export rows
    pub pic: String,

    pub catalog: Catalog,

    /// Flexible category policies, in draw order
    pub flexible_categories: Vec<FlexibleCategoryConfig>,

    pub fixed_schedule: FixedScheduleConfig,

    /// Target keys that calibration never touches
    pub informational_keys: Vec<String>,

    /// Target key prefixes that calibration never touches
    pub informational_prefixes: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let controller = ControllerParams::default();
        let policy = CalibrationPolicy::default();
        Self {
            rng_seed: 42,
            sensitivity: controller.sensitivity,
            epsilon: controller.epsilon,
            factor_bounds: (controller.min_factor, controller.max_factor),
            calibration_tolerance: policy.tolerance,
            pic: "SYSTEM".to_string(),
            catalog: Catalog::standard(),
            flexible_categories: default_flexible_categories(),
            fixed_schedule: FixedScheduleConfig::default(),
            informational_keys: policy.informational_keys,
            informational_prefixes: policy.informational_prefixes,
        }
    }
}

impl GeneratorConfig {
    /// Parse a (possibly partial) JSON config
    pub fn from_json_str(json: &str) -> Result<Self, GenerationError> {
        serde_json::from_str(json)
            .map_err(|e| GenerationError::Serialization(format!("config: {}", e)))
    }

    pub fn controller_params(&self) -> ControllerParams {
        ControllerParams {
            sensitivity: self.sensitivity,
            epsilon: self.epsilon,
            min_factor: self.factor_bounds.0,
            max_factor: self.factor_bounds.1,
        }
    }

    pub fn calibration_policy(&self) -> CalibrationPolicy {
        CalibrationPolicy {
            tolerance: self.calibration_tolerance,
            informational_keys: self.informational_keys.clone(),
            informational_prefixes: self.informational_prefixes.clone(),
        }
    }

    /// Check every parameter; the first violation wins
    pub fn validate(&self) -> Result<(), GenerationError> {
        self.controller_params()
            .validate()
            .map_err(GenerationError::InvalidConfig)?;

        if self.calibration_tolerance < 0 {
            return Err(GenerationError::InvalidConfig(format!(
                "calibration_tolerance must be non-negative, got {}",
                self.calibration_tolerance
            )));
        }

        self.catalog
            .validate()
            .map_err(GenerationError::InvalidConfig)?;

        let mut seen = HashSet::new();
        for category in &self.flexible_categories {
            if !seen.insert(category.name.as_str()) {
                return Err(GenerationError::InvalidConfig(format!(
                    "duplicate flexible category '{}'",
                    category.name
                )));
            }
            category
                .validate(&self.catalog)
                .map_err(GenerationError::InvalidConfig)?;
        }

        self.fixed_schedule
            .validate()
            .map_err(GenerationError::InvalidConfig)?;

        Ok(())
    }
}

// ============================================================================
// Result
// ============================================================================

/// Output of one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Calibrated transactions, stably sorted by date
    pub transactions: Vec<Transaction>,

    /// Target each flexible category was driven toward, in draw order
    pub flexible_targets: Vec<(String, i64)>,

    pub calibration: CalibrationReport,

    /// Per-day factors and event counts
    pub days: Vec<DaySummary>,

    /// SHA-256 of the ordered transaction sequence
    pub fingerprint: String,
}

// ============================================================================
// Generator
// ============================================================================

/// Adaptive expense generator
pub struct ExpenseGenerator {
    config: GeneratorConfig,
    rng: RngManager,
}

impl ExpenseGenerator {
    /// Validate `config` and seed the RNG
    pub fn new(config: GeneratorConfig) -> Result<Self, GenerationError> {
        config.validate()?;
        let rng = RngManager::new(config.rng_seed);
        Ok(Self { config, rng })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Current RNG state (advances with every run)
    pub fn rng_state(&self) -> u64 {
        self.rng.get_state()
    }

    /// Generate a calibrated transaction set for `start..=end`
    ///
    /// # Errors
    /// `InvalidPeriod` when the range is reversed or spans months; other
    /// variants only for configurations that slipped past validation. No
    /// partial result is returned on error.
    pub fn generate(
        &mut self,
        targets: &TargetSheet,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<GenerationResult, GenerationError> {
        let period = Period::new(start, end)?;
        info!(
            %start,
            %end,
            days = period.len(),
            seed = self.config.rng_seed,
            "starting expense generation"
        );

        let mut ledger = Ledger::new();

        let residual = FixedSchedule::new(&self.config.fixed_schedule).emit(
            &mut self.rng,
            targets,
            &period,
            &mut ledger,
        )?;
        info!(
            fixed_transactions = ledger.len(),
            ?residual,
            "fixed schedule emitted"
        );

        let flexible_targets: Vec<(String, i64)> = self
            .config
            .flexible_categories
            .iter()
            .map(|c| {
                let target = residual
                    .get(&c.name)
                    .copied()
                    .unwrap_or_else(|| targets.amount(&c.name));
                (c.name.clone(), target)
            })
            .collect();

        let scheduler = DailyScheduler::new(&self.config.catalog, &self.config.flexible_categories);
        let mut tracker =
            scheduler.tracker_for(&period, &flexible_targets, self.config.controller_params());
        let days = scheduler.run(&mut self.rng, &period, &mut tracker, &mut ledger)?;
        info!(transactions = ledger.len(), "daily loop finished");

        let mut transactions = ledger.into_transactions();
        let calibration = calibrate(
            &mut transactions,
            targets,
            &self.config.calibration_policy(),
        );
        info!(
            adjusted = calibration.adjusted_count(),
            unmet = calibration.unmet().count(),
            "calibration finished"
        );

        transactions.sort_by_key(|t| t.date());
        let fingerprint = fingerprint(&transactions)?;

        Ok(GenerationResult {
            transactions,
            flexible_targets,
            calibration,
            days,
            fingerprint,
        })
    }

    /// Convenience wrapper for a whole calendar month
    pub fn generate_month(
        &mut self,
        targets: &TargetSheet,
        year: i32,
        month: u32,
    ) -> Result<GenerationResult, GenerationError> {
        let period = Period::month(year, month)?;
        self.generate(targets, period.start(), period.end())
    }
}

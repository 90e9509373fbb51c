//! Budget tracking and the daily adjustment factor
//!
//! Each flexible category carries a period target and a running actual. Once
//! per simulated day the tracker turns the gap between the pro-rata target
//! and the actual-to-date into a multiplier for that day's spending:
//!
//! ```text
//! pro_rata    = T * d / D
//! discrepancy = pro_rata - A
//! factor      = clamp(1 + discrepancy / (pro_rata + ε) * S, min, max)
//! ```
//!
//! This is a proportional controller only. The residual error it leaves is
//! removed afterwards by the calibrator.

use serde::{Deserialize, Serialize};

/// Controller tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControllerParams {
    /// Gain applied to the relative discrepancy
    pub sensitivity: f64,

    /// Guard added to the pro-rata target before dividing
    pub epsilon: f64,

    /// Lower clamp for the factor
    pub min_factor: f64,

    /// Upper clamp for the factor
    pub max_factor: f64,
}

impl Default for ControllerParams {
    fn default() -> Self {
        Self {
            sensitivity: 0.2,
            epsilon: 1e-6,
            min_factor: 0.1,
            max_factor: 2.0,
        }
    }
}

impl ControllerParams {
    pub fn validate(&self) -> Result<(), String> {
        if !self.sensitivity.is_finite() || self.sensitivity < 0.0 {
            return Err(format!(
                "sensitivity must be finite and non-negative, got {}",
                self.sensitivity
            ));
        }
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(format!("epsilon must be positive, got {}", self.epsilon));
        }
        if !self.min_factor.is_finite()
            || !self.max_factor.is_finite()
            || self.min_factor <= 0.0
            || self.min_factor > self.max_factor
        {
            return Err(format!(
                "factor bounds must satisfy 0 < min <= max, got [{}, {}]",
                self.min_factor, self.max_factor
            ));
        }
        Ok(())
    }
}

/// Linear share of `target` expected to be spent by the end of day `day`
pub fn pro_rata_target(target: i64, day: usize, days_in_period: usize) -> f64 {
    if days_in_period == 0 {
        return target as f64;
    }
    target as f64 * day as f64 / days_in_period as f64
}

/// Adjustment factor for one category on one day
///
/// `actual` is the spend recorded on all prior days (today excluded); `day`
/// is 1-based. The result always lies in `[min_factor, max_factor]`.
///
/// # Example
/// ```
/// use expense_simulator_core_rs::budget::{adjustment_factor, ControllerParams};
///
/// let params = ControllerParams::default();
/// // day 1 of 30, nothing spent yet: push 20% harder
/// let f = adjustment_factor(30_000, 0, 1, 30, &params);
/// assert!((f - 1.2).abs() < 1e-6);
/// // already spent the whole month on day 1: clamp to the floor
/// assert_eq!(adjustment_factor(30_000, 30_000, 1, 30, &params), 0.1);
/// ```
pub fn adjustment_factor(
    target: i64,
    actual: i64,
    day: usize,
    days_in_period: usize,
    params: &ControllerParams,
) -> f64 {
    let pro_rata = pro_rata_target(target, day, days_in_period);
    let discrepancy = pro_rata - actual as f64;
    let raw = 1.0 + (discrepancy / (pro_rata + params.epsilon)) * params.sensitivity;

    if raw.is_nan() {
        return 1.0_f64.clamp(params.min_factor, params.max_factor);
    }
    raw.clamp(params.min_factor, params.max_factor)
}

/// Running target-vs-actual state for one flexible category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetLine {
    pub name: String,
    pub target: i64,
    pub actual: i64,
}

/// Per-category actual spend accumulator
///
/// Lines keep the order they were added in; factors are returned in the same
/// order.
#[derive(Debug, Clone)]
pub struct BudgetTracker {
    lines: Vec<BudgetLine>,
    days_in_period: usize,
    params: ControllerParams,
}

impl BudgetTracker {
    pub fn new(days_in_period: usize, params: ControllerParams) -> Self {
        Self {
            lines: Vec::new(),
            days_in_period,
            params,
        }
    }

    /// Register a category; returns its index
    ///
    /// Registering an existing name returns the existing index and keeps its
    /// original target.
    pub fn add_category(&mut self, name: impl Into<String>, target: i64) -> usize {
        let name = name.into();
        if let Some(idx) = self.index_of(&name) {
            return idx;
        }
        self.lines.push(BudgetLine {
            name,
            target: target.max(0),
            actual: 0,
        });
        self.lines.len() - 1
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.lines.iter().position(|l| l.name == name)
    }

    /// Factors for every category on `day` (1-based), in registration order
    pub fn factors_for_day(&self, day: usize) -> Vec<f64> {
        self.lines
            .iter()
            .map(|line| {
                adjustment_factor(line.target, line.actual, day, self.days_in_period, &self.params)
            })
            .collect()
    }

    /// Add emitted spend to a category
    ///
    /// Non-positive amounts and unknown indices are ignored; actuals only
    /// grow.
    pub fn record(&mut self, index: usize, amount: i64) {
        if amount <= 0 {
            return;
        }
        if let Some(line) = self.lines.get_mut(index) {
            line.actual = line.actual.saturating_add(amount);
        }
    }

    pub fn actual(&self, name: &str) -> Option<i64> {
        self.index_of(name).map(|i| self.lines[i].actual)
    }

    pub fn target(&self, name: &str) -> Option<i64> {
        self.index_of(name).map(|i| self.lines[i].target)
    }

    pub fn lines(&self) -> &[BudgetLine] {
        &self.lines
    }

    pub fn days_in_period(&self) -> usize {
        self.days_in_period
    }

    pub fn params(&self) -> &ControllerParams {
        &self.params
    }
}

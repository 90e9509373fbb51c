//! Daily event scheduler for flexible spending
//!
//! Walks the period one day at a time. For each day:
//!
//! ```text
//! 1. Compute every category's adjustment factor from prior-day actuals
//! 2. For each category, in policy order:
//!    a. Bernoulli(p): does a spending event happen today?
//!    b. On a hit, draw the event (basket or token purchase) with the factor
//!    c. If the amount is positive, record a transaction and the actual spend
//! 3. Advance to the next day
//! ```
//!
//! Budget tracking and event generation form one feedback loop: the actual
//! spend recorded on day `d` feeds the factors used on day `d + 1`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::basket::{round_to_unit, sample_basket, GroupWeight, SamplingError};
use crate::budget::BudgetTracker;
use crate::catalog::{Catalog, BAHAN_BAKU, LAIN_LAIN, MAINTENANCE_ALAT, MAINTENANCE_HABIS_PAKAI, OPERASIONAL_PENDUKUNG};
use crate::core::Period;
use crate::models::Ledger;
use crate::orchestrator::GenerationError;
use crate::rng::RandomSource;

/// Tracker key for the electricity budget (the residual of the utility target)
pub const ELECTRICITY_BUDGET_KEY: &str = "Utilitas|Listrik";

/// How a firing event turns into an amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventDraw {
    /// Weighted shopping basket
    Basket {
        /// Catalog group weights, in draw order
        weights: Vec<GroupWeight>,

        /// Baseline item count range (inclusive), drawn uniformly per event
        items: (u32, u32),

        /// Total rounded to the nearest multiple of this
        rounding_unit: i64,
    },

    /// Single uniform price scaled by the factor (prepaid electricity token)
    Token {
        /// Base price range [min, max)
        price: (f64, f64),

        /// Amount rounded to the nearest multiple of this
        rounding_unit: i64,

        /// Fixed transaction description
        description: String,
    },
}

impl EventDraw {
    pub fn rounding_unit(&self) -> i64 {
        match self {
            EventDraw::Basket { rounding_unit, .. } | EventDraw::Token { rounding_unit, .. } => {
                *rounding_unit
            }
        }
    }
}

/// Spending policy for one flexible category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlexibleCategoryConfig {
    /// Budget key: the target this category tracks against
    pub name: String,

    /// Top-level category written on emitted transactions
    pub category: String,

    /// Sub-category written on emitted transactions
    pub sub_category: String,

    /// Daily event probability
    pub probability: f64,

    /// Event shape
    pub draw: EventDraw,
}

impl FlexibleCategoryConfig {
    /// Check the policy against the catalog
    pub fn validate(&self, catalog: &Catalog) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("flexible category name must not be empty".to_string());
        }
        if self.sub_category.trim().is_empty() {
            return Err(format!("flexible category '{}' has empty sub_category", self.name));
        }
        if !(0.0..=1.0).contains(&self.probability) {
            return Err(format!(
                "flexible category '{}' probability {} outside [0, 1]",
                self.name, self.probability
            ));
        }
        if self.draw.rounding_unit() <= 0 {
            return Err(format!(
                "flexible category '{}' rounding unit must be positive",
                self.name
            ));
        }
        match &self.draw {
            EventDraw::Basket { weights, items, .. } => {
                crate::basket::validate_weights(catalog, weights)
                    .map_err(|e| format!("flexible category '{}': {}", self.name, e))?;
                if items.0 == 0 || items.0 > items.1 {
                    return Err(format!(
                        "flexible category '{}' item range {:?} must satisfy 1 <= min <= max",
                        self.name, items
                    ));
                }
            }
            EventDraw::Token { price, .. } => {
                if !price.0.is_finite() || !price.1.is_finite() || price.0 < 0.0 || price.0 > price.1 {
                    return Err(format!(
                        "flexible category '{}' price range {:?} must satisfy 0 <= min <= max",
                        self.name, price
                    ));
                }
            }
        }
        Ok(())
    }
}

/// The four standard flexible categories, in draw order
pub fn default_flexible_categories() -> Vec<FlexibleCategoryConfig> {
    vec![
        FlexibleCategoryConfig {
            name: "Belanja Bahan Baku (COGS)".to_string(),
            category: "Bahan Baku".to_string(),
            sub_category: "Belanja Bahan Baku (COGS)".to_string(),
            probability: 0.95,
            draw: EventDraw::Basket {
                weights: vec![
                    GroupWeight::new(BAHAN_BAKU, 0.85),
                    GroupWeight::new(OPERASIONAL_PENDUKUNG, 0.15),
                ],
                items: (4, 8),
                rounding_unit: 100,
            },
        },
        FlexibleCategoryConfig {
            name: "Operasional|Maintenance & Perlengkapan".to_string(),
            category: "Operasional".to_string(),
            sub_category: "Operasional|Maintenance & Perlengkapan".to_string(),
            probability: 2.0 / 7.0,
            draw: EventDraw::Basket {
                weights: vec![
                    GroupWeight::new(MAINTENANCE_HABIS_PAKAI, 0.9),
                    GroupWeight::new(MAINTENANCE_ALAT, 0.1),
                ],
                items: (1, 2),
                rounding_unit: 100,
            },
        },
        FlexibleCategoryConfig {
            name: ELECTRICITY_BUDGET_KEY.to_string(),
            category: "Operasional".to_string(),
            sub_category: "Operasional|Utilitas".to_string(),
            probability: 2.0 / 7.0,
            draw: EventDraw::Token {
                price: (50_000.0, 150_000.0),
                rounding_unit: 1_000,
                description: "Pembelian Token Listrik".to_string(),
            },
        },
        FlexibleCategoryConfig {
            name: "Operasional|Lain-lain".to_string(),
            category: "Operasional".to_string(),
            sub_category: "Operasional|Lain-lain".to_string(),
            probability: 0.1,
            draw: EventDraw::Basket {
                weights: vec![GroupWeight::new(LAIN_LAIN, 1.0)],
                items: (1, 1),
                rounding_unit: 100,
            },
        },
    ]
}

/// What happened on one simulated day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,

    /// 1-based day index within the period
    pub day: usize,

    /// Factor per flexible category, in policy order
    pub factors: Vec<f64>,

    /// Number of transactions emitted this day
    pub emitted: usize,
}

/// Runs the coupled tracker/event loop over a period
pub struct DailyScheduler<'a> {
    catalog: &'a Catalog,
    categories: &'a [FlexibleCategoryConfig],
}

impl<'a> DailyScheduler<'a> {
    pub fn new(catalog: &'a Catalog, categories: &'a [FlexibleCategoryConfig]) -> Self {
        Self { catalog, categories }
    }

    /// Simulate every day of `period`
    ///
    /// `tracker` must hold one line per category, registered in policy order
    /// (see [`DailyScheduler::tracker_for`]).
    pub fn run<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        period: &Period,
        tracker: &mut BudgetTracker,
        ledger: &mut Ledger,
    ) -> Result<Vec<DaySummary>, GenerationError> {
        let indices = self.tracker_indices(tracker)?;
        let mut days = Vec::with_capacity(period.len());

        for (offset, date) in period.days().enumerate() {
            let day = offset + 1;
            let factors = tracker.factors_for_day(day);
            let mut emitted = 0;

            debug!(%date, day, ?factors, "simulating day");

            for (category, &line) in self.categories.iter().zip(&indices) {
                let factor = factors[line];

                if !rng.bernoulli(category.probability) {
                    continue;
                }

                let (description, amount) = self.draw_event(rng, category, factor)?;
                if amount <= 0 {
                    continue;
                }

                ledger.record(
                    date,
                    category.category.as_str(),
                    category.sub_category.as_str(),
                    description,
                    amount,
                )
                .map_err(|e| GenerationError::Internal(e.to_string()))?;
                tracker.record(line, amount);
                emitted += 1;
            }

            days.push(DaySummary {
                date,
                day,
                factors: indices.iter().map(|&i| factors[i]).collect(),
                emitted,
            });
        }

        Ok(days)
    }

    /// Build a tracker holding one line per category with its target
    pub fn tracker_for(
        &self,
        period: &Period,
        targets: &[(String, i64)],
        params: crate::budget::ControllerParams,
    ) -> BudgetTracker {
        let mut tracker = BudgetTracker::new(period.len(), params);
        for category in self.categories {
            let target = targets
                .iter()
                .find(|(name, _)| name == &category.name)
                .map(|(_, amount)| *amount)
                .unwrap_or(0);
            tracker.add_category(category.name.clone(), target);
        }
        tracker
    }

    fn tracker_indices(&self, tracker: &BudgetTracker) -> Result<Vec<usize>, GenerationError> {
        self.categories
            .iter()
            .map(|c| {
                tracker.index_of(&c.name).ok_or_else(|| {
                    GenerationError::Internal(format!(
                        "budget tracker has no line for '{}'",
                        c.name
                    ))
                })
            })
            .collect()
    }

    fn draw_event<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        category: &FlexibleCategoryConfig,
        factor: f64,
    ) -> Result<(String, i64), SamplingError> {
        match &category.draw {
            EventDraw::Basket {
                weights,
                items,
                rounding_unit,
            } => {
                let desired = rng.range_inclusive(items.0 as i64, items.1 as i64) as u32;
                let basket =
                    sample_basket(rng, self.catalog, weights, desired, factor, *rounding_unit)?;
                Ok((basket.description(), basket.amount))
            }
            EventDraw::Token {
                price,
                rounding_unit,
                description,
            } => {
                if *rounding_unit <= 0 {
                    return Err(SamplingError::InvalidRoundingUnit(*rounding_unit));
                }
                let base = rng.uniform(price.0, price.1);
                let amount = round_to_unit(base * factor, *rounding_unit).max(0);
                Ok((description.clone(), amount))
            }
        }
    }
}

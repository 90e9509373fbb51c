//! Basket sampling
//!
//! A basket is one simulated shopping trip: a handful of items drawn from
//! weighted catalog groups, each priced from its own normal distribution.
//!
//! # Draw order
//!
//! For every item slot, in order:
//! 1. group (one draw, weighted)
//! 2. item within the group (one draw, uniform)
//! 3. price (two draws, Box-Muller)
//!
//! Changing this order changes every seeded run downstream.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::rng::RandomSource;

/// Precondition violations detected while sampling
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SamplingError {
    #[error("Unknown catalog group: {0}")]
    UnknownGroup(String),

    #[error("Catalog group '{0}' has no items")]
    EmptyGroup(String),

    #[error("Invalid group weights: {0}")]
    InvalidWeights(String),

    #[error("Invalid rounding unit {0}, must be positive")]
    InvalidRoundingUnit(i64),
}

/// Weight of one catalog group in a basket policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupWeight {
    pub group: String,
    pub weight: f64,
}

impl GroupWeight {
    pub fn new(group: impl Into<String>, weight: f64) -> Self {
        Self {
            group: group.into(),
            weight,
        }
    }
}

/// Result of one spending event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Basket {
    /// Item names in draw order (duplicates allowed)
    pub items: Vec<String>,

    /// Rounded total price
    pub amount: i64,
}

impl Basket {
    /// Slash-joined item list, e.g. `susu/gula/susu`
    pub fn description(&self) -> String {
        self.items.join("/")
    }
}

/// Check a weight table against the catalog
///
/// Every weight must be finite and non-negative, at least one must be
/// positive, and every named group must exist and hold items.
pub fn validate_weights(catalog: &Catalog, weights: &[GroupWeight]) -> Result<(), SamplingError> {
    if weights.is_empty() {
        return Err(SamplingError::InvalidWeights("no groups given".to_string()));
    }
    for gw in weights {
        if !gw.weight.is_finite() || gw.weight < 0.0 {
            return Err(SamplingError::InvalidWeights(format!(
                "group '{}' has weight {}",
                gw.group, gw.weight
            )));
        }
        let group = catalog
            .group(&gw.group)
            .ok_or_else(|| SamplingError::UnknownGroup(gw.group.clone()))?;
        if group.items.is_empty() {
            return Err(SamplingError::EmptyGroup(gw.group.clone()));
        }
    }
    if !weights.iter().any(|gw| gw.weight > 0.0) {
        return Err(SamplingError::InvalidWeights(
            "all weights are zero".to_string(),
        ));
    }
    Ok(())
}

/// Number of items to draw for a basket
///
/// `desired × factor`, rounded half-to-even, never below one.
pub fn scaled_item_count(desired_item_count: u32, adjustment_factor: f64) -> usize {
    let scaled = (desired_item_count as f64 * adjustment_factor).round_ties_even();
    if scaled.is_finite() && scaled >= 1.0 {
        scaled as usize
    } else {
        1
    }
}

/// Round `value` to the nearest multiple of `unit` (ties to even)
pub fn round_to_unit(value: f64, unit: i64) -> i64 {
    let unit_f = unit as f64;
    ((value / unit_f).round_ties_even() as i64) * unit
}

/// Draw a weighted basket and its total price
///
/// # Arguments
/// * `rng` - Random source (advanced by 4 draws per item)
/// * `catalog` - Item catalog
/// * `weights` - Group weights (ordered; order is part of the draw)
/// * `desired_item_count` - Baseline item count before scaling
/// * `adjustment_factor` - Day's budget factor
/// * `rounding_unit` - Total is rounded to the nearest multiple of this
///
/// # Errors
/// Fails fast on unknown or empty groups and on weights with no positive
/// entry; never fails for well-formed inputs.
///
/// # Example
/// ```
/// use expense_simulator_core_rs::basket::{sample_basket, GroupWeight};
/// use expense_simulator_core_rs::{Catalog, RngManager};
///
/// let catalog = Catalog::standard();
/// let weights = vec![GroupWeight::new("BAHAN_BAKU", 0.85), GroupWeight::new("OPERASIONAL_PENDUKUNG", 0.15)];
/// let mut rng = RngManager::new(42);
///
/// let basket = sample_basket(&mut rng, &catalog, &weights, 6, 1.0, 100).unwrap();
/// assert_eq!(basket.items.len(), 6);
/// assert_eq!(basket.amount % 100, 0);
/// ```
pub fn sample_basket<R: RandomSource + ?Sized>(
    rng: &mut R,
    catalog: &Catalog,
    weights: &[GroupWeight],
    desired_item_count: u32,
    adjustment_factor: f64,
    rounding_unit: i64,
) -> Result<Basket, SamplingError> {
    validate_weights(catalog, weights)?;
    if rounding_unit <= 0 {
        return Err(SamplingError::InvalidRoundingUnit(rounding_unit));
    }

    let weight_values: Vec<f64> = weights.iter().map(|gw| gw.weight).collect();
    let num_items = scaled_item_count(desired_item_count, adjustment_factor);

    let mut items = Vec::with_capacity(num_items);
    let mut total = 0.0;

    for _ in 0..num_items {
        let group_idx = rng
            .weighted_index(&weight_values)
            .ok_or_else(|| SamplingError::InvalidWeights("all weights are zero".to_string()))?;
        let group_name = &weights[group_idx].group;
        let group = catalog
            .group(group_name)
            .ok_or_else(|| SamplingError::UnknownGroup(group_name.clone()))?;

        let item = &group.items[rng.choose_index(group.items.len())];
        let price = rng.normal(item.mean, item.std_dev).max(0.0);

        items.push(item.name.clone());
        total += price;
    }

    Ok(Basket {
        items,
        amount: round_to_unit(total, rounding_unit),
    })
}

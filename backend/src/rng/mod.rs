//! Deterministic random number generation
//!
//! CRITICAL: every draw the generator makes goes through a [`RandomSource`].
//! Production code uses [`RngManager`] (xorshift64*); tests can substitute a
//! scripted sequence by implementing the trait's single required method.

mod xorshift;

pub use xorshift::RngManager;

/// Source of uniform draws in [0.0, 1.0), plus the derived distributions the
/// simulator samples from.
///
/// Every provided method consumes a fixed number of uniforms, so the relative
/// draw order of a run is fully determined by the call sequence.
pub trait RandomSource {
    /// Next uniform value in [0.0, 1.0)
    fn next_f64(&mut self) -> f64;

    /// Uniform f64 in [lo, hi). Consumes one draw.
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Uniform integer in [lo, hi] (both inclusive). Consumes one draw.
    ///
    /// Returns `lo` when `hi <= lo`.
    fn range_inclusive(&mut self, lo: i64, hi: i64) -> i64 {
        if hi <= lo {
            // still consume the draw so the sequence does not depend on bounds
            self.next_f64();
            return lo;
        }
        let span = (hi - lo + 1) as f64;
        let offset = (self.next_f64() * span).floor() as i64;
        lo + offset.min(hi - lo)
    }

    /// Uniform index in [0, len). Consumes one draw.
    ///
    /// # Panics
    /// Panics if `len == 0`
    fn choose_index(&mut self, len: usize) -> usize {
        assert!(len > 0, "cannot choose from an empty slice");
        let idx = (self.next_f64() * len as f64).floor() as usize;
        idx.min(len - 1)
    }

    /// Bernoulli trial: true with probability `p`. Consumes one draw.
    fn bernoulli(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Standard normal via Box-Muller. Consumes two draws.
    fn standard_normal(&mut self) -> f64 {
        // u1 in (0, 1] so ln never sees zero
        let u1 = 1.0 - self.next_f64();
        let u2 = self.next_f64();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    /// Normal with the given mean and standard deviation. Consumes two draws.
    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        mean + std_dev * self.standard_normal()
    }

    /// Weighted index draw over non-negative weights. Consumes one draw.
    ///
    /// Returns `None` when no weight is positive.
    fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 || !total.is_finite() {
            return None;
        }

        let mut target = self.next_f64() * total;
        let mut last_positive = None;
        for (idx, weight) in weights.iter().enumerate() {
            if *weight <= 0.0 {
                continue;
            }
            last_positive = Some(idx);
            if target < *weight {
                return Some(idx);
            }
            target -= weight;
        }

        // floating-point remainder lands on the last positive weight
        last_positive
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

/// Scripted random source that replays a fixed cycle of uniforms.
///
/// Lets tests pin individual decisions (a Bernoulli miss, a specific item)
/// without depending on the xorshift sequence.
#[derive(Debug, Clone)]
pub struct SequenceRng {
    values: Vec<f64>,
    cursor: usize,
}

impl SequenceRng {
    /// Create a source cycling through `values`.
    ///
    /// # Panics
    /// Panics if `values` is empty or contains a value outside [0, 1)
    pub fn new(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "SequenceRng needs at least one value");
        assert!(
            values.iter().all(|v| (0.0..1.0).contains(v)),
            "SequenceRng values must lie in [0, 1)"
        );
        Self { values, cursor: 0 }
    }

    /// Number of draws consumed so far
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for SequenceRng {
    fn next_f64(&mut self) -> f64 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

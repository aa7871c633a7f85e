//! Deterministic simulation RNG.
//!
//! # Determinism strategy
//!
//! A single `SimRng` is seeded from the run configuration and injected into
//! the event kernel; every stochastic draw in the simulation (inter-arrival
//! times, destination choices, mobility flags, requeue decisions) goes
//! through it.  No component creates ad-hoc sources, so the draw sequence —
//! and therefore the whole event trace — is a pure function of the seed and
//! the input data.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// The run-level deterministic RNG.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Draw from the exponential distribution with the given rate (per
    /// second) by inverse transform.
    ///
    /// # Panics
    /// Panics in debug mode if `rate` is not strictly positive.
    #[inline]
    pub fn exp(&mut self, rate: f64) -> f64 {
        debug_assert!(rate > 0.0, "exponential rate must be > 0, got {rate}");
        // gen::<f64>() is uniform in [0, 1); flip to (0, 1] so ln() is finite.
        let u: f64 = 1.0 - self.0.gen::<f64>();
        -u.ln() / rate
    }

    /// Sample an index from a non-negative weight vector.
    ///
    /// Returns `None` if the weights sum to zero (nothing to choose from).
    pub fn weighted_choice(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().filter(|w| w.is_finite() && **w > 0.0).sum();
        if total <= 0.0 {
            return None;
        }
        let mut target = self.0.gen::<f64>() * total;
        for (i, &w) in weights.iter().enumerate() {
            if !(w.is_finite() && w > 0.0) {
                continue;
            }
            target -= w;
            if target <= 0.0 {
                return Some(i);
            }
        }
        // Float underflow in the running sum can leave a sliver of `target`;
        // fall back to the last positive-weight index.
        weights.iter().rposition(|w| w.is_finite() && *w > 0.0)
    }
}

//! Tabulated demand data: arrival rates and destination weights.
//!
//! Both tables are plain keyed maps with explicit miss semantics: an absent
//! arrival-rate cell means "no recorded demand" (λ = 0), an absent weight
//! cell means "no recorded preference" (the caller falls back to a uniform
//! draw over the remaining stops).  Missing data is never an error at lookup
//! time — only at setup, when a *monitored* stop has no data at all.

use std::collections::HashMap;

use hs_core::Direction;

// ── Keys ──────────────────────────────────────────────────────────────────────

/// Key of one arrival-rate cell.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct RateKey {
    pub direction: Direction,
    /// Stop code as it appears in the source data (e.g. "9769").
    pub stop: String,
    pub month: u8,
    pub weekday: u8,
    pub daypart: String,
}

/// Key of one destination-weight cell.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct WeightKey {
    pub direction: Direction,
    pub month: u8,
    pub weekday: u8,
    pub daypart: String,
}

// ── ArrivalRateTable ──────────────────────────────────────────────────────────

/// `(direction, stop, month, weekday, daypart) → λ` in passengers per second.
#[derive(Clone, Debug, Default)]
pub struct ArrivalRateTable {
    cells: HashMap<RateKey, f64>,
}

impl ArrivalRateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a cell.  `rate_per_s` is clamped below at 0 — negative demand
    /// is meaningless and would poison the headway formula.
    pub fn insert(&mut self, key: RateKey, rate_per_s: f64) {
        self.cells.insert(key, rate_per_s.max(0.0));
    }

    /// λ for the cell, or 0 when the data has no entry.
    pub fn rate(&self, key: &RateKey) -> f64 {
        self.cells.get(key).copied().unwrap_or(0.0)
    }

    /// Whether any cell exists for `(direction, stop)` — used by setup
    /// validation of monitored stops.
    pub fn covers_stop(&self, direction: Direction, stop: &str) -> bool {
        self.cells
            .keys()
            .any(|k| k.direction == direction && k.stop == stop)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

// ── WeightsTable ──────────────────────────────────────────────────────────────

/// `(direction, month, weekday, daypart) → [w₀ … w_{k-1}]` — a categorical
/// distribution over destination stop positions.
#[derive(Clone, Debug, Default)]
pub struct WeightsTable {
    cells: HashMap<WeightKey, Vec<f64>>,
}

impl WeightsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: WeightKey, weights: Vec<f64>) {
        self.cells.insert(key, weights);
    }

    /// The weight vector for the cell, or `None` when the data has no entry.
    pub fn weights(&self, key: &WeightKey) -> Option<&[f64]> {
        self.cells.get(key).map(Vec::as_slice)
    }

    /// Check that every vector stored for `direction` has exactly
    /// `route_len` entries.  Returns the first offending key, if any.
    pub fn first_length_mismatch(
        &self,
        direction: Direction,
        route_len: usize,
    ) -> Option<(&WeightKey, usize)> {
        let mut keys: Vec<&WeightKey> = self
            .cells
            .iter()
            .filter(|(k, v)| k.direction == direction && v.len() != route_len)
            .map(|(k, _)| k)
            .collect();
        // Deterministic diagnostic regardless of map iteration order.
        keys.sort_by(|a, b| {
            (a.month, a.weekday, &a.daypart).cmp(&(b.month, b.weekday, &b.daypart))
        });
        keys.first().map(|k| (*k, self.cells[*k].len()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

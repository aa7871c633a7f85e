//! The demand predictor: a pure function from `(direction, stop, time)` to a
//! passenger arrival rate.
//!
//! The predictor is read-only and shared by the passenger generators (for
//! inter-arrival draws) and the adaptive dispatcher (for the headway
//! formula).  Month and weekday are resolved once from the configured
//! service date; the timestamp only selects the daypart.
//!
//! Special events ("overrides") are a date-keyed multiplier applied after
//! the table lookup — a concert day can scale every rate on the route
//! without touching the historical data.

use std::collections::HashMap;

use hs_core::{DaypartTable, Direction, ServiceDate, SimTime};

use crate::tables::{ArrivalRateTable, RateKey, WeightKey, WeightsTable};
use crate::{DemandError, DemandResult};

/// Read-only arrival-rate and destination-weight oracle for one service date.
#[derive(Clone, Debug)]
pub struct DemandPredictor {
    date: ServiceDate,
    dayparts: DaypartTable,
    rates: ArrivalRateTable,
    weights: WeightsTable,
    /// `(month, day) → multiplier`, applied after rate lookup.
    overrides: HashMap<(u8, u8), f64>,
}

impl DemandPredictor {
    pub fn new(
        date: ServiceDate,
        dayparts: DaypartTable,
        rates: ArrivalRateTable,
        weights: WeightsTable,
    ) -> Self {
        Self {
            date,
            dayparts,
            rates,
            weights,
            overrides: HashMap::new(),
        }
    }

    /// Attach a special-event multiplier for a calendar date.
    pub fn with_override(mut self, month: u8, day: u8, multiplier: f64) -> Self {
        self.overrides.insert((month, day), multiplier.max(0.0));
        self
    }

    pub fn date(&self) -> ServiceDate {
        self.date
    }

    pub fn dayparts(&self) -> &DaypartTable {
        &self.dayparts
    }

    /// The daypart name active at `t`.
    pub fn daypart_at(&self, t: SimTime) -> &str {
        &self.dayparts.part_at(t.seconds_into_day()).name
    }

    // ── Rates ─────────────────────────────────────────────────────────────

    /// λ(direction, stop, t) in passengers per second; 0 on any missing cell.
    pub fn rate(&self, direction: Direction, stop: &str, t: SimTime) -> f64 {
        let key = RateKey {
            direction,
            stop: stop.to_owned(),
            month: self.date.month,
            weekday: self.date.weekday,
            daypart: self.daypart_at(t).to_owned(),
        };
        let base = self.rates.rate(&key);
        let multiplier = self
            .overrides
            .get(&(self.date.month, self.date.day))
            .copied()
            .unwrap_or(1.0);
        base * multiplier
    }

    /// Expected boardings across `stops` over the next `window_s` seconds
    /// (Poisson expectation λ·t summed over the stops).
    pub fn expected_boardings(
        &self,
        direction: Direction,
        stops: &[&str],
        t: SimTime,
        window_s: f64,
    ) -> f64 {
        stops
            .iter()
            .map(|stop| self.rate(direction, stop, t) * window_s)
            .sum()
    }

    /// Whether the table has any data for `(direction, stop)`.
    pub fn covers_stop(&self, direction: Direction, stop: &str) -> bool {
        self.rates.covers_stop(direction, stop)
    }

    /// Setup check: a monitored stop must be covered by the rate table.
    pub fn require_stop(&self, direction: Direction, stop: &str) -> DemandResult<()> {
        if self.covers_stop(direction, stop) {
            Ok(())
        } else {
            Err(DemandError::MissingStop {
                stop: stop.to_owned(),
                direction: direction.to_string(),
            })
        }
    }

    /// Setup check: every weight vector stored for `direction` must have one
    /// entry per route position.
    pub fn validate_weights(&self, direction: Direction, route_len: usize) -> DemandResult<()> {
        match self.weights.first_length_mismatch(direction, route_len) {
            None => Ok(()),
            Some((key, got)) => Err(DemandError::WeightLength {
                direction: key.direction.to_string(),
                month: key.month,
                weekday: key.weekday,
                daypart: key.daypart.clone(),
                got,
                expected: route_len,
            }),
        }
    }

    // ── Weights ───────────────────────────────────────────────────────────

    /// The destination-weight vector active at `t`, or `None` when the data
    /// has no cell for this `(direction, month, weekday, daypart)`.
    pub fn destination_weights(&self, direction: Direction, t: SimTime) -> Option<&[f64]> {
        let key = WeightKey {
            direction,
            month: self.date.month,
            weekday: self.date.weekday,
            daypart: self.daypart_at(t).to_owned(),
        };
        self.weights.weights(&key)
    }

    pub fn weights_table(&self) -> &WeightsTable {
        &self.weights
    }
}

//! Top-level simulation configuration.
//!
//! Typically deserialized from a JSON file by the host runner and passed to
//! [`SimulationBuilder`][crate::SimulationBuilder].  Every field has a
//! sensible default so tests and embedders can start from
//! `SimConfig::default()` and override what they care about.
//!
//! Validation is split in two: `SimConfig::validate()` checks the config in
//! isolation; the builder re-checks it against the routes and demand data
//! (monitored-stop coverage, weight-vector lengths).

use serde::{Deserialize, Serialize};

use hs_core::{ServiceDate, ServiceTimes, SimTime};

use crate::{SimError, SimResult};

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Configuration for one simulated service day.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Virtual start of the run, seconds since midnight of `date`.
    pub start_time_s: f64,
    /// Virtual end of the run (exclusive for dispatching).
    pub end_time_s: f64,
    /// Seed for the single injected random source.
    pub random_seed: u64,
    /// Number of repeated rounds.  Recognised for the host runner's benefit;
    /// the kernel itself always simulates exactly one round per `run()`.
    pub num_rounds: u32,
    /// The operating date (drives demand-table lookups and output records).
    pub date: ServiceDate,

    pub vehicle: VehicleConfig,
    pub passenger: PassengerConfig,
    pub dispatcher: DispatcherConfig,
    pub kpi: KpiConfig,
}

impl SimConfig {
    #[inline]
    pub fn start_time(&self) -> SimTime {
        SimTime(self.start_time_s)
    }

    #[inline]
    pub fn end_time(&self) -> SimTime {
        SimTime(self.end_time_s)
    }

    /// Self-contained validation.  Fails with a diagnostic naming the
    /// offending entity; never silently reinterprets a bad value.
    pub fn validate(&self) -> SimResult<()> {
        if !self.start_time_s.is_finite() || !self.end_time_s.is_finite() {
            return Err(SimError::Config("start/end times must be finite".into()));
        }
        if self.end_time_s <= self.start_time_s {
            return Err(SimError::Config(format!(
                "end_time_s ({}) must be after start_time_s ({})",
                self.end_time_s, self.start_time_s
            )));
        }
        if !self.date.is_valid() {
            return Err(SimError::Config(format!("invalid service date {}", self.date)));
        }
        self.vehicle.validate()?;
        self.passenger.validate()?;
        self.dispatcher.validate()?;
        if self.kpi.enabled && self.kpi.export_interval_s <= 0.0 {
            return Err(SimError::Config(format!(
                "kpi export_interval_s must be > 0, got {}",
                self.kpi.export_interval_s
            )));
        }
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            start_time_s: 0.0,
            end_time_s: 86_400.0,
            random_seed: 0,
            num_rounds: 1,
            date: ServiceDate::default(),
            vehicle: VehicleConfig::default(),
            passenger: PassengerConfig::default(),
            dispatcher: DispatcherConfig::default(),
            kpi: KpiConfig::default(),
        }
    }
}

// ── VehicleConfig ─────────────────────────────────────────────────────────────

/// Vehicle capacity and kinematics.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    /// Capacity in capacity units (a wheelchair costs 2).
    pub capacity: u32,
    /// Maximum wheelchair passengers on board at once.
    pub max_wheelchair: u32,
    pub accel_ms2: f64,
    pub decel_ms2: f64,
    pub max_speed_ms: f64,
}

impl VehicleConfig {
    fn validate(&self) -> SimResult<()> {
        if self.capacity == 0 {
            return Err(SimError::Config("vehicle capacity must be > 0".into()));
        }
        for (name, v) in [
            ("accel_ms2", self.accel_ms2),
            ("decel_ms2", self.decel_ms2),
            ("max_speed_ms", self.max_speed_ms),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(SimError::Config(format!("vehicle {name} must be > 0, got {v}")));
            }
        }
        Ok(())
    }
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            capacity: 75,
            max_wheelchair: 1,
            accel_ms2: 1.0,
            decel_ms2: 1.0,
            max_speed_ms: 15.0,
        }
    }
}

// ── PassengerConfig ───────────────────────────────────────────────────────────

/// Passenger population parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PassengerConfig {
    /// Probability that a generated passenger is a wheelchair user.
    pub wheelchair_probability: f64,
    /// Probability that a capacity-denied passenger rejoins the queue.
    pub requeue_propensity: f64,
    pub service_times: ServiceTimes,
}

impl PassengerConfig {
    fn validate(&self) -> SimResult<()> {
        for (name, p) in [
            ("wheelchair_probability", self.wheelchair_probability),
            ("requeue_propensity", self.requeue_propensity),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(SimError::Config(format!(
                    "passenger {name} must be within [0, 1], got {p}"
                )));
            }
        }
        let t = &self.service_times;
        for (name, v) in [
            ("regular_board_s", t.regular_board_s),
            ("regular_alight_s", t.regular_alight_s),
            ("wheelchair_board_s", t.wheelchair_board_s),
            ("wheelchair_alight_s", t.wheelchair_alight_s),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(SimError::Config(format!(
                    "service time {name} must be >= 0, got {v}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for PassengerConfig {
    fn default() -> Self {
        Self {
            wheelchair_probability: 0.01,
            requeue_propensity: 1.0,
            service_times: ServiceTimes::default(),
        }
    }
}

// ── DispatcherConfig ──────────────────────────────────────────────────────────

/// Dispatching policy selection and parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DispatcherConfig {
    /// Pre-supplied departure times (seconds since midnight).
    Timetable { departures_s: Vec<f64> },

    /// Fixed interval, piecewise constant by daypart peak flag.
    Interval {
        default_interval_s: f64,
        peak_interval_s: Option<f64>,
        off_peak_interval_s: Option<f64>,
        /// Reuse the holding controller with the configured interval as the
        /// assigned headway.
        hold_to_interval: bool,
    },

    /// Demand-adaptive headway with in-trip holding.
    AdaptiveHeadway {
        /// Target load factor β* ∈ [0.7, 1.0].
        beta_target: f64,
        h_min_s: f64,
        h_max_s: f64,
        max_hold_s: f64,
        /// Holds below this fraction of the assigned headway are suppressed.
        headway_tolerance: f64,
    },
}

impl DispatcherConfig {
    /// Stock parameters for the adaptive policy.
    pub fn adaptive_defaults() -> Self {
        DispatcherConfig::AdaptiveHeadway {
            beta_target: 1.0,
            h_min_s: 600.0,
            h_max_s: 1_800.0,
            max_hold_s: 30.0,
            headway_tolerance: 0.1,
        }
    }

    fn validate(&self) -> SimResult<()> {
        match self {
            DispatcherConfig::Timetable { departures_s } => {
                if let Some(bad) = departures_s.iter().find(|t| !t.is_finite()) {
                    return Err(SimError::Config(format!(
                        "timetable departure {bad} is not finite"
                    )));
                }
                Ok(())
            }
            DispatcherConfig::Interval {
                default_interval_s,
                peak_interval_s,
                off_peak_interval_s,
                ..
            } => {
                let mut intervals = vec![("default_interval_s", *default_interval_s)];
                if let Some(v) = peak_interval_s {
                    intervals.push(("peak_interval_s", *v));
                }
                if let Some(v) = off_peak_interval_s {
                    intervals.push(("off_peak_interval_s", *v));
                }
                for (name, v) in intervals {
                    if !(v.is_finite() && v > 0.0) {
                        return Err(SimError::Config(format!(
                            "interval {name} must be > 0, got {v}"
                        )));
                    }
                }
                Ok(())
            }
            DispatcherConfig::AdaptiveHeadway {
                beta_target,
                h_min_s,
                h_max_s,
                max_hold_s,
                headway_tolerance,
            } => {
                if !(0.7..=1.0).contains(beta_target) {
                    return Err(SimError::Config(format!(
                        "beta_target must be within [0.7, 1.0], got {beta_target}"
                    )));
                }
                if !(h_min_s.is_finite() && *h_min_s > 0.0) {
                    return Err(SimError::Config(format!("h_min_s must be > 0, got {h_min_s}")));
                }
                if h_min_s > h_max_s {
                    return Err(SimError::Config(format!(
                        "h_min_s ({h_min_s}) must not exceed h_max_s ({h_max_s})"
                    )));
                }
                if !(max_hold_s.is_finite() && *max_hold_s >= 0.0) {
                    return Err(SimError::Config(format!(
                        "max_hold_s must be >= 0, got {max_hold_s}"
                    )));
                }
                if !(0.0..1.0).contains(headway_tolerance) {
                    return Err(SimError::Config(format!(
                        "headway_tolerance must be within [0, 1), got {headway_tolerance}"
                    )));
                }
                Ok(())
            }
        }
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self::adaptive_defaults()
    }
}

// ── KpiConfig ─────────────────────────────────────────────────────────────────

/// KPI sampling and periodic export.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct KpiConfig {
    pub enabled: bool,
    /// Seconds between logged KPI summaries when enabled.
    pub export_interval_s: f64,
}

impl Default for KpiConfig {
    fn default() -> Self {
        Self { enabled: false, export_interval_s: 3_600.0 }
    }
}

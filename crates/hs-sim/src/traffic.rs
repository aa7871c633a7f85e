//! The traffic boundary.
//!
//! The simulator never moves vehicles itself — it asks a `TrafficModel` how
//! long each leg takes and schedules the arrival callback that far ahead.  A
//! microscopic road-traffic engine would implement this trait by proxying to
//! its own vehicle state; the default [`RampProfileTraffic`] is a pure timer
//! computing each leg from the closed-form accelerate–cruise–decelerate
//! profile over the route's inter-stop distances.
//!
//! Compliance contract: after `create_vehicle`, the simulation drives one
//! arrival per stop in route order until the terminus or end of run;
//! destroyed vehicles get no further callbacks.  A model returning a
//! negative or non-finite travel time is treated as a traffic fault — the
//! affected bus is dropped, the kernel keeps running.

use std::collections::HashSet;

use hs_core::{BusId, Route, SimTime, StopId};

use crate::config::VehicleConfig;

// ── TrafficModel ──────────────────────────────────────────────────────────────

/// Abstract vehicle-movement boundary.
pub trait TrafficModel {
    /// Register a vehicle about to start a trip at the route origin.
    fn create_vehicle(&mut self, bus: BusId, route: &Route, start: SimTime);

    /// Remove a vehicle (trip finished or dropped on fault).
    fn destroy_vehicle(&mut self, bus: BusId);

    /// Seconds to travel from stop `from` to stop `to`, departing at
    /// `depart`.
    fn travel_time(&mut self, route: &Route, from: StopId, to: StopId, depart: SimTime) -> f64;
}

// ── RampProfileTraffic ────────────────────────────────────────────────────────

/// Timer-only traffic model using the kinematic ramp profile.
pub struct RampProfileTraffic {
    accel_ms2: f64,
    decel_ms2: f64,
    max_speed_ms: f64,
    active: HashSet<BusId>,
}

impl RampProfileTraffic {
    pub fn new(accel_ms2: f64, decel_ms2: f64, max_speed_ms: f64) -> Self {
        Self {
            accel_ms2,
            decel_ms2,
            max_speed_ms,
            active: HashSet::new(),
        }
    }

    pub fn from_config(vehicle: &VehicleConfig) -> Self {
        Self::new(vehicle.accel_ms2, vehicle.decel_ms2, vehicle.max_speed_ms)
    }

    /// Vehicles currently registered.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}

impl TrafficModel for RampProfileTraffic {
    fn create_vehicle(&mut self, bus: BusId, _route: &Route, _start: SimTime) {
        self.active.insert(bus);
    }

    fn destroy_vehicle(&mut self, bus: BusId) {
        self.active.remove(&bus);
    }

    fn travel_time(&mut self, route: &Route, from: StopId, to: StopId, _depart: SimTime) -> f64 {
        (from.index()..to.index())
            .map(|i| {
                ramp_travel_time(
                    route.distance_to_next_m(StopId(i as u32)),
                    self.accel_ms2,
                    self.decel_ms2,
                    self.max_speed_ms,
                )
            })
            .sum()
    }
}

// ── Ramp profile ──────────────────────────────────────────────────────────────

/// Travel time over `distance_m` with constant acceleration to `max_speed_ms`,
/// an optional cruise phase, and constant deceleration to a halt.
///
/// Short hops never reach cruise speed: the vehicle accelerates and
/// immediately decelerates, with the switchover point chosen so both phases
/// cover exactly `distance_m`.
pub fn ramp_travel_time(distance_m: f64, accel_ms2: f64, decel_ms2: f64, max_speed_ms: f64) -> f64 {
    debug_assert!(accel_ms2 > 0.0 && decel_ms2 > 0.0 && max_speed_ms > 0.0);
    if distance_m <= 0.0 {
        return 0.0;
    }

    let t_accel = max_speed_ms / accel_ms2;
    let d_accel = 0.5 * accel_ms2 * t_accel * t_accel;
    let t_decel = max_speed_ms / decel_ms2;
    let d_decel = 0.5 * decel_ms2 * t_decel * t_decel;

    if d_accel + d_decel >= distance_m {
        // Triangular profile: v_peak² = 2·d / (1/a + 1/b).
        let t_up = (2.0 * distance_m / (accel_ms2 + accel_ms2 * accel_ms2 / decel_ms2)).sqrt();
        let t_down = (accel_ms2 / decel_ms2) * t_up;
        t_up + t_down
    } else {
        let cruise = (distance_m - d_accel - d_decel) / max_speed_ms;
        t_accel + cruise + t_decel
    }
}

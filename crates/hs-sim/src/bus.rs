//! The bus: a vehicle working one trip along one route.
//!
//! A `Bus` is pure state — the transitions live in `sim.rs` as kernel
//! callbacks (`dispatch → arrive → depart → … → finish`).  References are
//! value-level per the ownership model: a bus knows its route by index and
//! its position by stop id; stops never point back at buses.

use hs_core::{BusId, Direction, Passenger, SimTime, StopId, TripId};

// ── BusState ──────────────────────────────────────────────────────────────────

/// Lifecycle state after dispatch.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum BusState {
    /// Travelling toward `next_stop`.
    EnRoute,
    /// Serving `next_stop` (doors open, possibly holding).
    Dwelling,
    /// Trip complete or dropped on a traffic fault.  Terminal.
    Finished,
}

// ── PendingVisit ──────────────────────────────────────────────────────────────

/// Service counts staged between arrival and departure at one stop, consumed
/// when the departure event builds the full visit record.
#[derive(Copy, Clone, Debug, Default)]
pub struct PendingVisit {
    pub boarded: u32,
    pub alighted: u32,
    pub denied: u32,
    pub dwell_s: f64,
    pub hold_s: f64,
}

// ── Bus ───────────────────────────────────────────────────────────────────────

/// One dispatched vehicle.
#[derive(Debug)]
pub struct Bus {
    pub id: BusId,
    pub trip: TripId,
    /// Index of this bus's route in `World::routes`.
    pub route_idx: usize,
    pub direction: Direction,

    pub state: BusState,
    /// The stop being approached (`EnRoute`) or served (`Dwelling`).
    pub next_stop: StopId,

    pub capacity: u32,
    /// Headway frozen at dispatch; `None` means no headway target (no
    /// holding for this bus).
    pub assigned_headway_s: Option<f64>,

    pub onboard: Vec<Passenger>,
    /// Current load in capacity units (Σ capacity cost of `onboard`).
    pub load: u32,
    pub wheelchair_count: u32,

    pub dispatched_at: SimTime,
    /// Scheduled arrival per stop position, computed once at dispatch from
    /// nominal travel times.
    pub sched_arrivals: Vec<SimTime>,
    /// Actual arrival at the stop currently being served.
    pub current_arrival: Option<SimTime>,
    /// Service counts for the stop currently being served.
    pub pending_visit: Option<PendingVisit>,

    /// Trip totals, for conservation accounting.
    pub total_boarded: u32,
    pub total_alighted: u32,
}

impl Bus {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: BusId,
        trip: TripId,
        route_idx: usize,
        direction: Direction,
        capacity: u32,
        assigned_headway_s: Option<f64>,
        dispatched_at: SimTime,
        sched_arrivals: Vec<SimTime>,
    ) -> Self {
        Self {
            id,
            trip,
            route_idx,
            direction,
            state: BusState::EnRoute,
            next_stop: StopId(0),
            capacity,
            assigned_headway_s,
            onboard: Vec::new(),
            load: 0,
            wheelchair_count: 0,
            dispatched_at,
            sched_arrivals,
            current_arrival: None,
            pending_visit: None,
            total_boarded: 0,
            total_alighted: 0,
        }
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.state == BusState::Finished
    }

    /// Remaining capacity in capacity units.
    #[inline]
    pub fn remaining_capacity(&self) -> u32 {
        self.capacity.saturating_sub(self.load)
    }

    /// Scheduled arrival at a stop position (falls back to dispatch time for
    /// out-of-range queries, which cannot happen on a well-formed trip).
    pub fn sched_arrival(&self, stop: StopId) -> SimTime {
        self.sched_arrivals
            .get(stop.index())
            .copied()
            .unwrap_or(self.dispatched_at)
    }
}

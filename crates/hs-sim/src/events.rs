//! The typed domain-event stream.
//!
//! Components emit `SimEvent`s into an [`EventSink`] as they mutate the
//! world; the sink forwards them to whatever the host cares about — a
//! record writer, a test capture, or nothing.  Emission order within one
//! virtual timestamp is the kernel's insertion order, and sinks must not
//! block: buffering and batching are a sink concern, never the kernel's.

use hs_core::{BusId, Direction, Mobility, PassengerId, SimTime, StopId, TripId};

// ── StopVisit ─────────────────────────────────────────────────────────────────

/// Complete per-(bus, stop) visit metrics, attached to `BusDeparture`.
///
/// This is the payload the persisted-record contract is built from: one
/// visit row per departure.
#[derive(Clone, Debug, PartialEq)]
pub struct StopVisit {
    pub bus: BusId,
    pub trip: TripId,
    /// Line identifier of the route (e.g. "601").
    pub line: String,
    pub direction: Direction,
    pub stop: StopId,
    pub stop_code: String,
    /// Position of the stop within the trip (0-based).
    pub sequence: u32,

    pub sched_arrival: SimTime,
    pub actual_arrival: SimTime,
    pub sched_departure: SimTime,
    pub actual_departure: SimTime,
    /// Door service time (excludes holding).
    pub dwell_s: f64,
    /// Holding time added by the controller (0 when not held).
    pub hold_s: f64,

    pub boarded: u32,
    pub alighted: u32,
    pub denied: u32,
    /// Load in capacity units at departure.
    pub load: u32,
    pub wheelchair_count: u32,

    pub distance_to_next_m: f64,
    pub distance_remaining_m: f64,
}

// ── SimEvent ──────────────────────────────────────────────────────────────────

/// The domain event union.
///
/// `BusFailure` is reserved: the variant is part of the stream contract but
/// nothing emits it yet.
#[derive(Clone, Debug, PartialEq)]
pub enum SimEvent {
    BusDispatch {
        time: SimTime,
        bus: BusId,
        trip: TripId,
        direction: Direction,
        /// Frozen for the life of the bus; `None` for unset (no holding).
        assigned_headway_s: Option<f64>,
    },

    BusArrival {
        time: SimTime,
        bus: BusId,
        trip: TripId,
        direction: Direction,
        stop: StopId,
        sched_arrival: SimTime,
        /// Load in capacity units on arrival, before any service.
        load: u32,
        wheelchair_count: u32,
    },

    BusDeparture {
        time: SimTime,
        visit: StopVisit,
    },

    PassengerArrival {
        time: SimTime,
        passenger: PassengerId,
        direction: Direction,
        stop: StopId,
        destination: StopId,
        mobility: Mobility,
    },

    PassengerBoarded {
        time: SimTime,
        passenger: PassengerId,
        bus: BusId,
        stop: StopId,
    },

    PassengerAlighted {
        time: SimTime,
        passenger: PassengerId,
        bus: BusId,
        stop: StopId,
    },

    PassengerDenied {
        time: SimTime,
        passenger: PassengerId,
        bus: BusId,
        stop: StopId,
        /// Whether the passenger rejoined the queue (vs leaving).
        requeued: bool,
    },

    HeadwayAdjust {
        time: SimTime,
        bus: BusId,
        stop: StopId,
        hold_s: f64,
    },

    BusFailure {
        time: SimTime,
        bus: BusId,
    },
}

impl SimEvent {
    /// The virtual timestamp of the event.
    pub fn time(&self) -> SimTime {
        match self {
            SimEvent::BusDispatch { time, .. }
            | SimEvent::BusArrival { time, .. }
            | SimEvent::BusDeparture { time, .. }
            | SimEvent::PassengerArrival { time, .. }
            | SimEvent::PassengerBoarded { time, .. }
            | SimEvent::PassengerAlighted { time, .. }
            | SimEvent::PassengerDenied { time, .. }
            | SimEvent::HeadwayAdjust { time, .. }
            | SimEvent::BusFailure { time, .. } => *time,
        }
    }

    /// Stable snake_case tag, as written to persisted streams.
    pub fn kind(&self) -> &'static str {
        match self {
            SimEvent::BusDispatch { .. } => "bus_dispatch",
            SimEvent::BusArrival { .. } => "bus_arrival",
            SimEvent::BusDeparture { .. } => "bus_departure",
            SimEvent::PassengerArrival { .. } => "passenger_arrival",
            SimEvent::PassengerBoarded { .. } => "passenger_boarded",
            SimEvent::PassengerAlighted { .. } => "passenger_alighted",
            SimEvent::PassengerDenied { .. } => "passenger_denied",
            SimEvent::HeadwayAdjust { .. } => "headway_adjust",
            SimEvent::BusFailure { .. } => "bus_failure",
        }
    }
}

// ── EventSink ─────────────────────────────────────────────────────────────────

/// Receiver for the typed event stream.
///
/// Implementations must not block the kernel; failures stay inside the sink
/// (see `RecordSink` in `hs-output` for the stored-error pattern).
pub trait EventSink {
    fn emit(&mut self, event: &SimEvent);

    /// Called once after the run completes.  Default: no-op.
    fn close(&mut self) {}
}

/// An [`EventSink`] that discards everything.
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&mut self, _event: &SimEvent) {}
}

/// An [`EventSink`] that stores every event — the test-side capture.
#[derive(Default)]
pub struct VecSink {
    pub events: Vec<SimEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count events matching a predicate.
    pub fn count<F: Fn(&SimEvent) -> bool>(&self, pred: F) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for VecSink {
    fn emit(&mut self, event: &SimEvent) {
        self.events.push(event.clone());
    }
}

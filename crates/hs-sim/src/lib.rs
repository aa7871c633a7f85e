//! `hs-sim` — the simulation layer of `headway_sim`.
//!
//! Everything above the raw event kernel lives here: passenger generation,
//! stop service, the bus state machine, the three dispatchers with the
//! adaptive holding controller, the traffic boundary, the typed event
//! stream, and the builder/runner that wires them together.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`config`]     | `SimConfig` and its nested sections                       |
//! | [`events`]     | `SimEvent`, `StopVisit`, `EventSink`, `NoopSink`, `VecSink` |
//! | [`traffic`]    | `TrafficModel` trait, `RampProfileTraffic`                |
//! | [`stop`]       | `StopQueue` — waiting passengers, alight/board service    |
//! | [`bus`]        | `Bus`, `BusState`                                         |
//! | [`registry`]   | `DispatchRegistry` — dispatch order + per-stop departures |
//! | [`dispatcher`] | `Dispatcher` (timetable / interval / adaptive), holding   |
//! | [`generator`]  | Self-rescheduling Poisson passenger generators            |
//! | [`kpi`]        | `KpiTracker` / `KpiReport`                                |
//! | [`sim`]        | `World`, `SimulationBuilder`, `Simulation`                |
//! | [`error`]      | `SimError`, `SimResult<T>`                                |
//!
//! # Control flow (one virtual day)
//!
//! ```text
//! dispatcher tick ──▶ dispatch bus ──▶ arrive(s₀) ──▶ serve (alight ∥ board)
//!        ▲                                  │              + holding
//!        └── reschedule at now + h*         ▼
//!                                     depart ──travel──▶ arrive(s₁) … terminus
//! ```
//!
//! Passenger generators run as independent self-rescheduling callbacks that
//! feed the stop queues the buses drain.  The demand predictor closes the
//! loop: the rates that drive passenger generation also drive the adaptive
//! dispatcher's headway choice.

pub mod bus;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod generator;
pub mod kpi;
pub mod registry;
pub mod sim;
pub mod stop;
pub mod traffic;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use bus::{Bus, BusState, PendingVisit};
pub use config::{DispatcherConfig, KpiConfig, PassengerConfig, SimConfig, VehicleConfig};
pub use dispatcher::{
    holding_decision, AdaptiveDispatcher, AdaptiveParams, Dispatcher, HeadwaySample,
    HoldDecision, IntervalDispatcher, TimetableDispatcher, MIN_AVG_DEMAND,
};
pub use error::{SimError, SimResult};
pub use events::{EventSink, NoopSink, SimEvent, StopVisit, VecSink};
pub use kpi::{KpiReport, KpiTracker};
pub use registry::{DispatchEntry, DispatchRegistry};
pub use sim::{Simulation, SimulationBuilder, World};
pub use stop::StopQueue;
pub use traffic::{ramp_travel_time, RampProfileTraffic, TrafficModel};

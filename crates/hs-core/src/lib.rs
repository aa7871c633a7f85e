//! `hs-core` — foundational types for the `headway_sim` bus-dispatch simulator.
//!
//! This crate is a dependency of every other `hs-*` crate.  It intentionally
//! has no `hs-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module        | Contents                                                |
//! |---------------|---------------------------------------------------------|
//! | [`ids`]       | `StopId`, `BusId`, `TripId`, `PassengerId`              |
//! | [`time`]      | `SimTime`, `ServiceDate`                                |
//! | [`daypart`]   | `Daypart`, `DaypartTable` (closed partition of the day) |
//! | [`rng`]       | `SimRng` (single injected deterministic source)         |
//! | [`route`]     | `Direction`, `RouteStop`, `Route`                       |
//! | [`passenger`] | `Mobility`, `ServiceTimes`, `Passenger`                 |
//! | [`error`]     | `CoreError`, `CoreResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod daypart;
pub mod error;
pub mod ids;
pub mod passenger;
pub mod rng;
pub mod route;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use daypart::{Daypart, DaypartTable};
pub use error::{CoreError, CoreResult};
pub use ids::{BusId, PassengerId, StopId, TripId};
pub use passenger::{Mobility, Passenger, ServiceTimes};
pub use route::{Direction, Route, RouteStop};
pub use rng::SimRng;
pub use time::{ServiceDate, SimTime};

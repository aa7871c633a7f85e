//! Identifier types for the simulation's domain entities.
//!
//! These are value handles, not references.  A `StopId` is a *position*: the
//! stop's index along its route, so ordering comparisons are travel-order
//! comparisons and the id doubles as the index into every position-keyed
//! table.  Bus, trip, and passenger ids are dense counters assigned at
//! creation and unique for the lifetime of one run — there is no "unset"
//! state to represent, so none of these carry a sentinel.

use std::fmt;

// ── StopId ────────────────────────────────────────────────────────────────────

/// A stop's position along its route.
///
/// Position 0 is the origin; `Route::terminus()` is the last.  `a < b` means
/// `a` is upstream of `b`, which is what the boarding reachability check and
/// the destination mask rely on.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StopId(pub u32);

impl StopId {
    /// This position as a `Vec` index (route stops, per-stop queues, a
    /// registry entry's departure slots).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The following stop position along the route.  The caller is
    /// responsible for staying within the route (`Route::is_terminus`).
    #[inline]
    pub fn next(self) -> StopId {
        StopId(self.0 + 1)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── BusId ─────────────────────────────────────────────────────────────────────

/// A dispatched vehicle, numbered in dispatch order across the whole run.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BusId(pub u32);

impl fmt::Display for BusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bus {}", self.0)
    }
}

// ── TripId ────────────────────────────────────────────────────────────────────

/// One one-way trip.  Buses and trips are 1:1 in this simulator, but the
/// persisted records carry the trip id so multi-trip vehicle blocks could be
/// introduced without changing the output contract.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TripId(pub u32);

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trip {}", self.0)
    }
}

// ── PassengerId ───────────────────────────────────────────────────────────────

/// A generated passenger.  `u64`: a long multi-round run generates
/// passengers well past the `u32` range.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PassengerId(pub u64);

impl fmt::Display for PassengerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "passenger {}", self.0)
    }
}

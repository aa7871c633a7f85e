//! The passenger model.
//!
//! A passenger occupies capacity units rather than seats: a wheelchair user
//! costs 2 units and takes far longer to board/alight than a regular rider.
//! Service times are configuration (`ServiceTimes`), not per-passenger data,
//! so the same passenger population can be re-served under different door
//! assumptions.

use crate::{PassengerId, SimTime, StopId};

use self::Mobility::*;

// ── Mobility ──────────────────────────────────────────────────────────────────

/// Mobility class of a passenger.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mobility {
    Regular,
    Wheelchair,
}

impl Mobility {
    /// Capacity units consumed on board.
    #[inline]
    pub fn capacity_cost(self) -> u32 {
        match self {
            Regular => 1,
            Wheelchair => 2,
        }
    }

    #[inline]
    pub fn is_wheelchair(self) -> bool {
        self == Wheelchair
    }
}

// ── ServiceTimes ──────────────────────────────────────────────────────────────

/// Per-passenger door service times, in seconds.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceTimes {
    pub regular_board_s: f64,
    pub regular_alight_s: f64,
    pub wheelchair_board_s: f64,
    pub wheelchair_alight_s: f64,
}

impl ServiceTimes {
    pub fn boarding_s(&self, mobility: Mobility) -> f64 {
        match mobility {
            Regular => self.regular_board_s,
            Wheelchair => self.wheelchair_board_s,
        }
    }

    pub fn alighting_s(&self, mobility: Mobility) -> f64 {
        match mobility {
            Regular => self.regular_alight_s,
            Wheelchair => self.wheelchair_alight_s,
        }
    }
}

impl Default for ServiceTimes {
    fn default() -> Self {
        Self {
            regular_board_s: 2.0,
            regular_alight_s: 1.0,
            wheelchair_board_s: 45.0,
            wheelchair_alight_s: 45.0,
        }
    }
}

// ── Passenger ─────────────────────────────────────────────────────────────────

/// A waiting or onboard passenger.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Passenger {
    pub id: PassengerId,
    pub origin: StopId,
    pub destination: StopId,
    /// Virtual time at which the passenger joined the stop queue.
    pub arrived_at: SimTime,
    pub mobility: Mobility,
    /// Probability of rejoining the queue after a capacity denial (vs leaving).
    pub requeue_propensity: f64,
}

impl Passenger {
    #[inline]
    pub fn capacity_cost(&self) -> u32 {
        self.mobility.capacity_cost()
    }
}

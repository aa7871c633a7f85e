//! The route model: an immutable ordered sequence of stops.
//!
//! A `Route` owns its stops by position; everything else refers to stops by
//! `StopId` (which doubles as the position index) rather than holding back
//! pointers.  Distances are metres between consecutive stops; the terminal
//! stop's `distance_to_next_m` is 0.

use std::fmt;

use crate::{CoreError, CoreResult, StopId};

// ── Direction ─────────────────────────────────────────────────────────────────

/// Travel direction of a route.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Outbound,
    Inbound,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Outbound => "outbound",
            Direction::Inbound => "inbound",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── RouteStop ─────────────────────────────────────────────────────────────────

/// One stop along a route.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteStop {
    /// The stop's public abbreviation (e.g. "9769"), as used in the demand
    /// tables and the persisted records.
    pub code: String,
    /// Metres to the next stop along the route; 0 at the terminus.
    pub distance_to_next_m: f64,
}

impl RouteStop {
    pub fn new(code: impl Into<String>, distance_to_next_m: f64) -> Self {
        Self { code: code.into(), distance_to_next_m }
    }
}

// ── Route ─────────────────────────────────────────────────────────────────────

/// An immutable ordered stop sequence for one direction of a line.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    /// Line identifier (e.g. "601").
    pub line: String,
    pub direction: Direction,
    stops: Vec<RouteStop>,
    /// Stops whose arrival rate feeds the adaptive headway formula.
    monitored: Vec<StopId>,
}

impl Route {
    /// Build and validate a route.
    ///
    /// Setup errors are fatal and name the offending entity: an empty stop
    /// list, a duplicate stop code, a non-finite or negative distance, or a
    /// monitored stop outside the route.
    pub fn new(
        line: impl Into<String>,
        direction: Direction,
        stops: Vec<RouteStop>,
        monitored: Vec<StopId>,
    ) -> CoreResult<Self> {
        let line = line.into();
        if stops.len() < 2 {
            return Err(CoreError::Config(format!(
                "route {line} {direction}: needs at least 2 stops, got {}",
                stops.len()
            )));
        }
        for (i, stop) in stops.iter().enumerate() {
            if !stop.distance_to_next_m.is_finite() || stop.distance_to_next_m < 0.0 {
                return Err(CoreError::Config(format!(
                    "route {line} {direction}: stop {:?} has invalid distance {}",
                    stop.code, stop.distance_to_next_m
                )));
            }
            if stops[..i].iter().any(|s| s.code == stop.code) {
                return Err(CoreError::Config(format!(
                    "route {line} {direction}: duplicate stop code {:?}",
                    stop.code
                )));
            }
        }
        for &m in &monitored {
            if m.index() >= stops.len() {
                return Err(CoreError::UnknownStop {
                    stop: m,
                    route: format!("{line} {direction}"),
                });
            }
        }

        Ok(Self { line, direction, stops, monitored })
    }

    // ── Queries ───────────────────────────────────────────────────────────

    #[inline]
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn stops(&self) -> &[RouteStop] {
        &self.stops
    }

    pub fn stop(&self, id: StopId) -> Option<&RouteStop> {
        self.stops.get(id.index())
    }

    pub fn monitored(&self) -> &[StopId] {
        &self.monitored
    }

    /// The position of the stop with the given code.
    pub fn index_of(&self, code: &str) -> Option<StopId> {
        self.stops
            .iter()
            .position(|s| s.code == code)
            .map(|i| StopId(i as u32))
    }

    #[inline]
    pub fn terminus(&self) -> StopId {
        StopId(self.stops.len() as u32 - 1)
    }

    #[inline]
    pub fn is_terminus(&self, id: StopId) -> bool {
        id == self.terminus()
    }

    /// Metres from this stop to the next one (0 at the terminus).
    pub fn distance_to_next_m(&self, id: StopId) -> f64 {
        if self.is_terminus(id) {
            0.0
        } else {
            self.stops[id.index()].distance_to_next_m
        }
    }

    /// Metres from this stop to the terminus along the route.
    pub fn distance_remaining_m(&self, id: StopId) -> f64 {
        self.stops[id.index()..self.terminus().index()]
            .iter()
            .map(|s| s.distance_to_next_m)
            .sum()
    }
}

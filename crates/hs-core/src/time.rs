//! Virtual-time model.
//!
//! # Design
//!
//! Time is represented as `SimTime`, a newtype over `f64` seconds from an
//! arbitrary run epoch (normally midnight of the operating date).  Fractional
//! seconds matter here: dwell components are sub-minute floats (2.0 s per
//! regular boarding, exponential inter-arrival draws), so an integer tick
//! would force rounding into the headway feedback loop.
//!
//! The event queue needs a total order over times.  `SimTime` provides one
//! via `f64::total_cmp`; times are never NaN by construction (every value is
//! produced by adding finite non-negative durations to a finite start time).
//!
//! `ServiceDate` carries the configured operating date.  Demand lookups key
//! on `(month, weekday)`; output records carry the full `YYYY-MM-DD`.

use std::fmt;
use std::ops::{Add, Sub};

// ── SimTime ───────────────────────────────────────────────────────────────────

/// A point in virtual time, in seconds from the run epoch.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    /// Raw seconds since the run epoch.
    #[inline]
    pub fn secs(self) -> f64 {
        self.0
    }

    /// Seconds elapsed since midnight, folding multi-day runs onto the clock.
    #[inline]
    pub fn seconds_into_day(self) -> f64 {
        self.0.rem_euclid(86_400.0)
    }

    /// The time `delta` seconds after `self`.
    #[inline]
    pub fn offset(self, delta: f64) -> SimTime {
        SimTime(self.0 + delta)
    }

    /// Seconds elapsed from `earlier` to `self`.
    #[inline]
    pub fn since(self, earlier: SimTime) -> f64 {
        self.0 - earlier.0
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Add<f64> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: f64) -> SimTime {
        SimTime(self.0 + rhs)
    }
}

impl Sub for SimTime {
    type Output = f64;
    #[inline]
    fn sub(self, rhs: SimTime) -> f64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for SimTime {
    /// `HH:MM:SS` wall-clock rendering (hours may exceed 24 on multi-day runs).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.0.max(0.0) as u64;
        let h = total / 3_600;
        let m = (total % 3_600) / 60;
        let s = total % 60;
        write!(f, "{h:02}:{m:02}:{s:02}")
    }
}

// ── ServiceDate ───────────────────────────────────────────────────────────────

/// The operating date of a simulated day.
///
/// `weekday` uses ISO numbering (1 = Monday … 7 = Sunday), matching the
/// downstream record contract.  The date is configuration — the simulator
/// never does calendar arithmetic with it, so no datetime crate is needed.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub weekday: u8,
}

impl ServiceDate {
    pub fn new(year: u16, month: u8, day: u8, weekday: u8) -> Self {
        Self { year, month, day, weekday }
    }

    /// `true` when month, day and weekday fall in their valid ranges.
    pub fn is_valid(&self) -> bool {
        (1..=12).contains(&self.month)
            && (1..=31).contains(&self.day)
            && (1..=7).contains(&self.weekday)
    }
}

impl Default for ServiceDate {
    /// An arbitrary mid-week service day.
    fn default() -> Self {
        Self { year: 2024, month: 7, day: 3, weekday: 3 }
    }
}

impl fmt::Display for ServiceDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

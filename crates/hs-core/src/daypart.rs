//! Daypart partition of the 24-hour clock.
//!
//! Arrival-rate and destination-weight data are tabulated per *daypart* — a
//! named contiguous segment of the day such as "am_peak".  The partition is
//! data-driven (each deployment slices the day differently) but determinate:
//! a `DaypartTable` must cover [0, 86 400) exactly, with no gaps and no
//! overlaps, so every instant maps to exactly one part.
//!
//! The `peak` flag exists for the interval dispatcher, which picks its
//! dispatch interval by peak/off-peak rather than by individual part.

use crate::{CoreError, CoreResult};

const DAY_SECS: u32 = 86_400;

// ── Daypart ───────────────────────────────────────────────────────────────────

/// One named segment of the day: `[start_s, end_s)` seconds since midnight.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Daypart {
    pub name: String,
    pub start_s: u32,
    pub end_s: u32,
    /// Whether the interval dispatcher treats this part as peak service.
    pub peak: bool,
}

impl Daypart {
    pub fn new(name: impl Into<String>, start_s: u32, end_s: u32, peak: bool) -> Self {
        Self { name: name.into(), start_s, end_s, peak }
    }

    #[inline]
    pub fn contains(&self, seconds_into_day: f64) -> bool {
        let s = seconds_into_day;
        self.start_s as f64 <= s && s < self.end_s as f64
    }
}

// ── DaypartTable ──────────────────────────────────────────────────────────────

/// A validated closed partition of the day into dayparts.
///
/// Parts are stored sorted by `start_s`; lookup is a linear scan (the table
/// has a handful of entries).
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DaypartTable {
    parts: Vec<Daypart>,
}

impl DaypartTable {
    /// Build a table, validating that `parts` tile [0, 86 400) exactly.
    pub fn new(mut parts: Vec<Daypart>) -> CoreResult<Self> {
        if parts.is_empty() {
            return Err(CoreError::Config("daypart table is empty".into()));
        }
        parts.sort_by_key(|p| p.start_s);

        let mut cursor = 0u32;
        for part in &parts {
            if part.start_s != cursor {
                return Err(CoreError::Config(format!(
                    "daypart {:?} starts at {}s, expected {}s (partition must be gapless)",
                    part.name, part.start_s, cursor
                )));
            }
            if part.end_s <= part.start_s {
                return Err(CoreError::Config(format!(
                    "daypart {:?} has non-positive span [{}, {})",
                    part.name, part.start_s, part.end_s
                )));
            }
            cursor = part.end_s;
        }
        if cursor != DAY_SECS {
            return Err(CoreError::Config(format!(
                "daypart partition ends at {cursor}s, expected {DAY_SECS}s"
            )));
        }

        Ok(Self { parts })
    }

    /// The daypart containing `seconds_into_day`.
    ///
    /// Total by construction: the partition is closed and the first part
    /// starts at 0, so `partition_point` always lands on a valid index.
    pub fn part_at(&self, seconds_into_day: f64) -> &Daypart {
        let s = seconds_into_day.rem_euclid(86_400.0);
        let idx = self.parts.partition_point(|p| (p.start_s as f64) <= s);
        &self.parts[idx - 1]
    }

    pub fn parts(&self) -> &[Daypart] {
        &self.parts
    }

    /// Find a part by name.
    pub fn by_name(&self, name: &str) -> Option<&Daypart> {
        self.parts.iter().find(|p| p.name == name)
    }
}

impl Default for DaypartTable {
    /// Six-part weekday partition: overnight, am-peak, midday, pm-peak,
    /// evening, late.
    fn default() -> Self {
        Self::new(vec![
            Daypart::new("overnight", 0, 21_600, false),      // 00:00–06:00
            Daypart::new("am_peak", 21_600, 32_400, true),    // 06:00–09:00
            Daypart::new("midday", 32_400, 54_000, false),    // 09:00–15:00
            Daypart::new("pm_peak", 54_000, 68_400, true),    // 15:00–19:00
            Daypart::new("evening", 68_400, 79_200, false),   // 19:00–22:00
            Daypart::new("late", 79_200, 86_400, false),      // 22:00–24:00
        ])
        .expect("default partition is closed")
    }
}

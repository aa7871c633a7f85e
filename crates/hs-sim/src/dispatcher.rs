//! The dispatching layer: when does the next bus enter the route, and does
//! an in-trip bus need to be held.
//!
//! Three policies behind one sum type:
//!
//! - **Timetable** — replay a pre-supplied departure list.
//! - **Interval** — fixed interval, piecewise constant by daypart peak flag.
//! - **AdaptiveHeadway** — the demand feedback loop.  Each dispatch reads
//!   the forecast arrival rate over the route's monitored stops and sizes
//!   the next headway so a vehicle of capacity `C` fills to the target load
//!   factor β*:
//!
//!   ```text
//!   λ̂  = Σ_{s ∈ M} rate(s, now)
//!   h* = clamp(β*·C / (λ̂/|M|), h_min, h_max)      (h_max when λ̂/|M| < 1e-3)
//!   ```
//!
//!   The dispatched bus freezes `h*` as its assigned headway for the whole
//!   trip; later dispatches recompute from fresh demand.
//!
//! The holding controller is asymmetric: it only delays buses running ahead
//! of their assigned headway, never advances late ones.  That one-sided rule
//! is what keeps the loop stable under bounded demand fluctuation.

use hs_core::{DaypartTable, Direction, Route, SimTime, StopId};
use hs_demand::DemandPredictor;

use crate::bus::Bus;
use crate::config::DispatcherConfig;
use crate::registry::DispatchRegistry;

/// Demand below this (passengers/second, averaged over monitored stops) is
/// treated as zero and maps straight to `h_max`.
pub const MIN_AVG_DEMAND: f64 = 1e-3;

/// Holding bounds used when the interval dispatcher opts into the holding
/// controller (it has no tuning knobs of its own).
pub const DEFAULT_MAX_HOLD_S: f64 = 30.0;
pub const DEFAULT_HEADWAY_TOLERANCE: f64 = 0.1;

// ── AdaptiveParams ────────────────────────────────────────────────────────────

/// Parameters of the adaptive-headway policy.
#[derive(Copy, Clone, Debug)]
pub struct AdaptiveParams {
    pub beta_target: f64,
    pub capacity: u32,
    pub h_min_s: f64,
    pub h_max_s: f64,
    pub max_hold_s: f64,
    pub headway_tolerance: f64,
}

// ── HeadwaySample ─────────────────────────────────────────────────────────────

/// One adaptive headway computation, for the KPI stream.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HeadwaySample {
    pub lambda_total: f64,
    pub lambda_avg: f64,
    pub target_headway_s: f64,
    /// Demand was below [`MIN_AVG_DEMAND`] and the formula fell back to
    /// `h_max`.
    pub zero_demand: bool,
}

// ── HoldDecision ──────────────────────────────────────────────────────────────

/// Outcome of one holding-controller evaluation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum HoldDecision {
    /// The bus carries no assigned headway — holding is not in effect.
    NoHeadway,
    /// No bus was dispatched before this one.
    NoPredecessor,
    /// The preceding bus has not yet departed this stop.
    NotYetVisited,
    /// Spacing is at or above the assigned headway — the bus is not early.
    OnSchedule,
    /// The computed hold fell below the tolerance band and was suppressed.
    Suppressed { deficit_s: f64 },
    /// Hold the bus for `hold_s` (≤ max_hold).
    Hold { hold_s: f64 },
}

impl HoldDecision {
    /// Seconds of holding to apply.
    #[inline]
    pub fn hold_s(&self) -> f64 {
        match self {
            HoldDecision::Hold { hold_s } => *hold_s,
            _ => 0.0,
        }
    }
}

// ── Dispatcher ────────────────────────────────────────────────────────────────

/// A dispatching policy instance for one route.
#[derive(Clone, Debug)]
pub enum Dispatcher {
    Timetable(TimetableDispatcher),
    Interval(IntervalDispatcher),
    Adaptive(AdaptiveDispatcher),
}

impl Dispatcher {
    /// Instantiate the configured policy for a route.
    pub fn from_config(config: &DispatcherConfig, capacity: u32) -> Self {
        match config {
            DispatcherConfig::Timetable { departures_s } => {
                let mut departures = departures_s.clone();
                departures.sort_by(f64::total_cmp);
                Dispatcher::Timetable(TimetableDispatcher { departures_s: departures })
            }
            DispatcherConfig::Interval {
                default_interval_s,
                peak_interval_s,
                off_peak_interval_s,
                hold_to_interval,
            } => Dispatcher::Interval(IntervalDispatcher {
                default_interval_s: *default_interval_s,
                peak_interval_s: *peak_interval_s,
                off_peak_interval_s: *off_peak_interval_s,
                hold_to_interval: *hold_to_interval,
            }),
            DispatcherConfig::AdaptiveHeadway {
                beta_target,
                h_min_s,
                h_max_s,
                max_hold_s,
                headway_tolerance,
            } => Dispatcher::Adaptive(AdaptiveDispatcher {
                params: AdaptiveParams {
                    beta_target: *beta_target,
                    capacity,
                    h_min_s: *h_min_s,
                    h_max_s: *h_max_s,
                    max_hold_s: *max_hold_s,
                    headway_tolerance: *headway_tolerance,
                },
            }),
        }
    }

    /// The next time this policy would inject a bus, asked at `now`.
    ///
    /// For the timetable this is the next listed departure; for the interval
    /// and adaptive policies it is one (current) headway ahead, since their
    /// ticks are self-scheduling.
    pub fn next_departure_time(
        &self,
        predictor: &DemandPredictor,
        route: &Route,
        now: SimTime,
    ) -> Option<SimTime> {
        match self {
            Dispatcher::Timetable(t) => t.next_departure(now),
            Dispatcher::Interval(d) => Some(now + d.interval_at(predictor.dayparts(), now)),
            Dispatcher::Adaptive(a) => {
                let sample = a.target_headway(predictor, route, route.direction, now);
                Some(now + sample.target_headway_s)
            }
        }
    }

    /// In-trip holding request for a bus dwelling at `stop`.
    ///
    /// The controller runs only for policies that opted into holding; the
    /// timetable dispatcher always returns [`HoldDecision::NoHeadway`].
    pub fn request_hold(
        &self,
        registry: &DispatchRegistry,
        route_idx: usize,
        bus: &Bus,
        stop: StopId,
        now: SimTime,
    ) -> HoldDecision {
        match self {
            Dispatcher::Timetable(_) => HoldDecision::NoHeadway,
            Dispatcher::Interval(d) => {
                if d.hold_to_interval {
                    holding_decision(
                        registry,
                        route_idx,
                        bus,
                        stop,
                        now,
                        DEFAULT_MAX_HOLD_S,
                        DEFAULT_HEADWAY_TOLERANCE,
                    )
                } else {
                    HoldDecision::NoHeadway
                }
            }
            Dispatcher::Adaptive(d) => holding_decision(
                registry,
                route_idx,
                bus,
                stop,
                now,
                d.params.max_hold_s,
                d.params.headway_tolerance,
            ),
        }
    }
}

// ── TimetableDispatcher ───────────────────────────────────────────────────────

/// Replays a fixed departure list.
#[derive(Clone, Debug)]
pub struct TimetableDispatcher {
    /// Sorted departure times, seconds since midnight.
    pub departures_s: Vec<f64>,
}

impl TimetableDispatcher {
    /// The assigned headway of the `i`-th trip: the gap to the next listed
    /// departure, or `None` for the last trip.
    pub fn assigned_headway(&self, i: usize) -> Option<f64> {
        let this = *self.departures_s.get(i)?;
        let next = *self.departures_s.get(i + 1)?;
        Some(next - this)
    }

    /// The first listed departure at or after `now`.
    pub fn next_departure(&self, now: SimTime) -> Option<SimTime> {
        self.departures_s
            .iter()
            .copied()
            .find(|&t| t >= now.secs())
            .map(SimTime)
    }
}

// ── IntervalDispatcher ────────────────────────────────────────────────────────

/// Fixed interval, piecewise constant by daypart.
#[derive(Clone, Debug)]
pub struct IntervalDispatcher {
    pub default_interval_s: f64,
    pub peak_interval_s: Option<f64>,
    pub off_peak_interval_s: Option<f64>,
    pub hold_to_interval: bool,
}

impl IntervalDispatcher {
    /// The dispatch interval in effect at `now`.
    pub fn interval_at(&self, dayparts: &DaypartTable, now: SimTime) -> f64 {
        let part = dayparts.part_at(now.seconds_into_day());
        let specific = if part.peak { self.peak_interval_s } else { self.off_peak_interval_s };
        specific.unwrap_or(self.default_interval_s)
    }
}

// ── AdaptiveDispatcher ────────────────────────────────────────────────────────

/// The demand-adaptive policy.
#[derive(Clone, Debug)]
pub struct AdaptiveDispatcher {
    pub params: AdaptiveParams,
}

impl AdaptiveDispatcher {
    /// Compute the target headway from current forecast demand over the
    /// route's monitored stops.
    pub fn target_headway(
        &self,
        predictor: &DemandPredictor,
        route: &Route,
        direction: Direction,
        now: SimTime,
    ) -> HeadwaySample {
        let p = &self.params;
        let monitored = route.monitored();
        debug_assert!(!monitored.is_empty(), "adaptive route has no monitored stops");

        let lambda_total: f64 = monitored
            .iter()
            .map(|&s| predictor.rate(direction, &route.stops()[s.index()].code, now))
            .sum();
        let lambda_avg = if monitored.is_empty() {
            0.0
        } else {
            lambda_total / monitored.len() as f64
        };

        let (target, zero_demand) = if lambda_avg < MIN_AVG_DEMAND {
            (p.h_max_s, true)
        } else {
            let raw = (p.beta_target * p.capacity as f64) / lambda_avg;
            (raw.clamp(p.h_min_s, p.h_max_s), false)
        };

        HeadwaySample {
            lambda_total,
            lambda_avg,
            target_headway_s: target,
            zero_demand,
        }
    }
}

// ── Holding controller ────────────────────────────────────────────────────────

/// The in-trip holding rule shared by the adaptive and interval policies.
///
/// `Δ = now − (preceding bus's departure at this stop)`.  A bus with
/// `Δ < h_assigned` is running early and is decelerated by up to `max_hold`
/// seconds; micro-holds below `tolerance · h_assigned` are suppressed.
pub fn holding_decision(
    registry: &DispatchRegistry,
    route_idx: usize,
    bus: &Bus,
    stop: StopId,
    now: SimTime,
    max_hold_s: f64,
    tolerance: f64,
) -> HoldDecision {
    let Some(h_assigned) = bus.assigned_headway_s else {
        return HoldDecision::NoHeadway;
    };
    let Some(preceding) = registry.preceding(route_idx, bus.id) else {
        return HoldDecision::NoPredecessor;
    };
    let Some(prev_departure) = preceding.departure_at(stop) else {
        return HoldDecision::NotYetVisited;
    };

    let spacing = now - prev_departure;
    if spacing >= h_assigned {
        return HoldDecision::OnSchedule;
    }

    let hold = (h_assigned - spacing).min(max_hold_s);
    if hold < tolerance * h_assigned {
        HoldDecision::Suppressed { deficit_s: h_assigned - spacing }
    } else {
        HoldDecision::Hold { hold_s: hold }
    }
}

//! The stop: a FIFO of waiting passengers and the door-service procedure.
//!
//! `serve()` is the whole dwell micro-model: alighting and boarding are
//! processed against the arriving bus under capacity limits, and the dwell
//! time is `max(alighting, boarding)` — the two run in parallel (front and
//! rear doors), so the longer stream dominates.  The outcome carries
//! everything the caller needs to emit events; the stop itself knows nothing
//! about sinks or the kernel.

use std::collections::VecDeque;

use hs_core::{Passenger, PassengerId, Route, SimRng};

use crate::bus::Bus;
use crate::config::{PassengerConfig, VehicleConfig};

// ── ServeOutcome ──────────────────────────────────────────────────────────────

/// Result of one bus service at one stop.
#[derive(Debug, Default)]
pub struct ServeOutcome {
    pub alighted: Vec<PassengerId>,
    pub boarded: Vec<PassengerId>,
    /// Denied passengers and whether each rejoined the queue.
    pub denied: Vec<(PassengerId, bool)>,
    pub alight_s: f64,
    pub board_s: f64,
}

impl ServeOutcome {
    /// Dwell under the parallel door policy.
    #[inline]
    pub fn dwell_s(&self) -> f64 {
        self.alight_s.max(self.board_s)
    }
}

// ── StopQueue ─────────────────────────────────────────────────────────────────

/// Waiting passengers at one stop of one route, in arrival order.
#[derive(Debug, Default)]
pub struct StopQueue {
    queue: VecDeque<Passenger>,
}

impl StopQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, passenger: Passenger) {
        self.queue.push_back(passenger);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn waiting(&self) -> impl Iterator<Item = &Passenger> {
        self.queue.iter()
    }

    /// Serve an arriving bus: alight, then walk the waiting queue.
    ///
    /// At the terminus every onboard passenger alights and nobody boards.
    /// The boarding walk covers the queue as it stood on arrival; passengers
    /// denied on capacity rejoin at their original relative position (the
    /// queue stays ordered by arrival time).
    ///
    /// # Panics
    ///
    /// Panics if a waiting passenger's destination is not downstream of this
    /// stop — that indicates a generator/route mismatch and the run is not
    /// salvageable.
    pub fn serve(
        &mut self,
        bus: &mut Bus,
        route: &Route,
        passenger_cfg: &PassengerConfig,
        vehicle_cfg: &VehicleConfig,
        rng: &mut SimRng,
    ) -> ServeOutcome {
        let stop = bus.next_stop;
        let at_terminus = route.is_terminus(stop);
        let times = &passenger_cfg.service_times;
        let mut outcome = ServeOutcome::default();

        // ── Alight ────────────────────────────────────────────────────────
        let mut staying = Vec::with_capacity(bus.onboard.len());
        for passenger in bus.onboard.drain(..) {
            if at_terminus || passenger.destination == stop {
                bus.load -= passenger.capacity_cost();
                if passenger.mobility.is_wheelchair() {
                    bus.wheelchair_count -= 1;
                }
                outcome.alight_s += times.alighting_s(passenger.mobility);
                outcome.alighted.push(passenger.id);
            } else {
                staying.push(passenger);
            }
        }
        bus.onboard = staying;
        bus.total_alighted += outcome.alighted.len() as u32;

        // ── Board ─────────────────────────────────────────────────────────
        if !at_terminus {
            let snapshot = self.queue.len();
            let mut requeue: Vec<Passenger> = Vec::new();

            for _ in 0..snapshot {
                let Some(passenger) = self.queue.pop_front() else { break };

                assert!(
                    passenger.destination > stop && passenger.destination <= route.terminus(),
                    "{} waiting at stop {} has unreachable destination {}",
                    passenger.id,
                    stop,
                    passenger.destination,
                );

                let fits_load = bus.load + passenger.capacity_cost() <= bus.capacity;
                let fits_wheelchair = !passenger.mobility.is_wheelchair()
                    || bus.wheelchair_count < vehicle_cfg.max_wheelchair;

                if fits_load && fits_wheelchair {
                    outcome.board_s += times.boarding_s(passenger.mobility);
                    outcome.boarded.push(passenger.id);
                    bus.load += passenger.capacity_cost();
                    if passenger.mobility.is_wheelchair() {
                        bus.wheelchair_count += 1;
                    }
                    bus.onboard.push(passenger);
                } else {
                    let requeued = rng.gen_bool(passenger.requeue_propensity);
                    outcome.denied.push((passenger.id, requeued));
                    if requeued {
                        requeue.push(passenger);
                    }
                }
            }

            // Denied-but-requeued passengers keep their place ahead of
            // anyone who arrives during the dwell.
            if !requeue.is_empty() {
                for passenger in requeue.into_iter().rev() {
                    self.queue.push_front(passenger);
                }
            }
            bus.total_boarded += outcome.boarded.len() as u32;
        }

        debug_assert!(bus.load <= bus.capacity, "load exceeds capacity after service");
        debug_assert!(
            bus.wheelchair_count <= vehicle_cfg.max_wheelchair,
            "wheelchair count exceeds limit after service"
        );

        outcome
    }
}

//! The dispatch registry: who was dispatched when, and where they have been.
//!
//! The holding controller needs two facts about the bus ahead: that it
//! exists, and when it last departed the stop the trailing bus just reached.
//! The registry keeps one ordered entry per dispatched bus per route, with a
//! per-stop departure-time vector filled in as the trip progresses.
//!
//! Only the dispatch/departure path writes here; the holding controller
//! reads.  Both run as kernel callbacks, so there is no synchronisation.

use hs_core::{BusId, SimTime, StopId, TripId};

// ── DispatchEntry ─────────────────────────────────────────────────────────────

/// One dispatched bus, in dispatch order.
#[derive(Clone, Debug)]
pub struct DispatchEntry {
    pub bus: BusId,
    pub trip: TripId,
    /// Monotone per-route dispatch sequence number.  Two buses dispatched at
    /// the same instant are ordered by this.
    pub dispatch_seq: u32,
    pub dispatched_at: SimTime,
    pub finished: bool,
    /// Departure time per stop position; `None` until the bus departs it.
    departures: Vec<Option<SimTime>>,
}

impl DispatchEntry {
    /// When this bus departed the given stop, if it has.
    pub fn departure_at(&self, stop: StopId) -> Option<SimTime> {
        self.departures.get(stop.index()).copied().flatten()
    }
}

// ── DispatchRegistry ──────────────────────────────────────────────────────────

/// Per-route dispatch ledger.
#[derive(Debug, Default)]
pub struct DispatchRegistry {
    per_route: Vec<Vec<DispatchEntry>>,
}

impl DispatchRegistry {
    pub fn new(route_count: usize) -> Self {
        Self { per_route: vec![Vec::new(); route_count] }
    }

    /// Record a dispatch.  Entries are appended in dispatch order, which is
    /// also `(dispatched_at, dispatch_seq)` order.
    pub fn register(
        &mut self,
        route_idx: usize,
        bus: BusId,
        trip: TripId,
        dispatched_at: SimTime,
        route_len: usize,
    ) {
        let entries = &mut self.per_route[route_idx];
        let dispatch_seq = entries.len() as u32;
        entries.push(DispatchEntry {
            bus,
            trip,
            dispatch_seq,
            dispatched_at,
            finished: false,
            departures: vec![None; route_len],
        });
    }

    /// Record a bus's departure from a stop.
    pub fn record_departure(&mut self, route_idx: usize, bus: BusId, stop: StopId, time: SimTime) {
        if let Some(entry) = self.entry_mut(route_idx, bus) {
            if let Some(slot) = entry.departures.get_mut(stop.index()) {
                *slot = Some(time);
            }
        }
    }

    pub fn mark_finished(&mut self, route_idx: usize, bus: BusId) {
        if let Some(entry) = self.entry_mut(route_idx, bus) {
            entry.finished = true;
        }
    }

    pub fn entry(&self, route_idx: usize, bus: BusId) -> Option<&DispatchEntry> {
        self.per_route
            .get(route_idx)?
            .iter()
            .find(|e| e.bus == bus)
    }

    fn entry_mut(&mut self, route_idx: usize, bus: BusId) -> Option<&mut DispatchEntry> {
        self.per_route
            .get_mut(route_idx)?
            .iter_mut()
            .find(|e| e.bus == bus)
    }

    /// The bus dispatched immediately before `bus` on the same route.
    ///
    /// Entries are stored in `(dispatched_at, dispatch_seq)` order, so the
    /// predecessor is simply the previous entry; equal dispatch times
    /// resolve by sequence number.
    pub fn preceding(&self, route_idx: usize, bus: BusId) -> Option<&DispatchEntry> {
        let entries = self.per_route.get(route_idx)?;
        let pos = entries.iter().position(|e| e.bus == bus)?;
        pos.checked_sub(1).map(|p| &entries[p])
    }

    /// All dispatch entries for a route, in dispatch order.
    pub fn entries(&self, route_idx: usize) -> &[DispatchEntry] {
        self.per_route.get(route_idx).map_or(&[], Vec::as_slice)
    }

    /// Total dispatches across all routes.
    pub fn dispatch_count(&self) -> usize {
        self.per_route.iter().map(Vec::len).sum()
    }
}

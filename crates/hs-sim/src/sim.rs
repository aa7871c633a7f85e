//! Simulation assembly and dynamics: the `World` state, the
//! `SimulationBuilder`, the `Simulation` runner, and the bus lifecycle
//! callbacks.
//!
//! # Ownership
//!
//! The kernel exclusively owns scheduled callbacks; the `World` owns
//! everything else (stop queues, buses, registry, dispatchers, the traffic
//! model and the sink).  Callbacks receive `(&mut World, &mut EventKernel)`
//! and refer to entities by id, so there are no long-lived references
//! between components.

use std::collections::BTreeMap;

use hs_core::{BusId, Route, SimTime, StopId, TripId};
use hs_demand::DemandPredictor;
use hs_kernel::EventKernel;

use crate::bus::{Bus, BusState, PendingVisit};
use crate::config::{DispatcherConfig, SimConfig};
use crate::dispatcher::{Dispatcher, HoldDecision};
use crate::events::{EventSink, SimEvent, StopVisit};
use crate::generator;
use crate::kpi::{KpiReport, KpiTracker};
use crate::registry::DispatchRegistry;
use crate::stop::StopQueue;
use crate::traffic::TrafficModel;
use crate::{SimError, SimResult};

type Kernel<T, E> = EventKernel<World<T, E>>;

// ── World ─────────────────────────────────────────────────────────────────────

/// All mutable simulation state outside the kernel.
pub struct World<T: TrafficModel, E: EventSink> {
    pub config: SimConfig,
    /// One route per active direction.
    pub routes: Vec<Route>,
    /// Waiting-passenger queues, `[route][stop position]`.
    pub stops: Vec<Vec<StopQueue>>,
    /// Every bus ever dispatched this run, keyed by id (ordered for
    /// deterministic iteration).
    pub buses: BTreeMap<BusId, Bus>,
    pub registry: DispatchRegistry,
    /// One dispatcher instance per route.
    pub dispatchers: Vec<Dispatcher>,
    pub predictor: DemandPredictor,
    pub traffic: T,
    pub sink: E,
    pub kpi: KpiTracker,

    pub(crate) next_bus: u32,
    pub(crate) next_trip: u32,
    pub(crate) next_passenger: u64,
}

impl<T: TrafficModel, E: EventSink> World<T, E> {
    /// Total passengers currently waiting across all stops.
    pub fn waiting_count(&self) -> usize {
        self.stops
            .iter()
            .flat_map(|route_stops| route_stops.iter())
            .map(StopQueue::len)
            .sum()
    }

    /// Total passengers currently onboard across all buses.
    pub fn onboard_count(&self) -> usize {
        self.buses.values().map(|b| b.onboard.len()).sum()
    }
}

// ── SimulationBuilder ─────────────────────────────────────────────────────────

/// Fluent builder for [`Simulation`].
///
/// # Example
///
/// ```rust,ignore
/// let sim = SimulationBuilder::new(config, predictor, traffic, VecSink::new())
///     .route(outbound)
///     .route(inbound)
///     .build()?;
/// ```
pub struct SimulationBuilder<T: TrafficModel, E: EventSink> {
    config: SimConfig,
    predictor: DemandPredictor,
    routes: Vec<Route>,
    traffic: T,
    sink: E,
}

impl<T, E> SimulationBuilder<T, E>
where
    T: TrafficModel + 'static,
    E: EventSink + 'static,
{
    pub fn new(config: SimConfig, predictor: DemandPredictor, traffic: T, sink: E) -> Self {
        Self {
            config,
            predictor,
            routes: Vec::new(),
            traffic,
            sink,
        }
    }

    /// Add a route (one per active direction).
    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    /// Validate everything and assemble a ready-to-run [`Simulation`].
    pub fn build(self) -> SimResult<Simulation<T, E>> {
        let Self {
            config,
            predictor,
            routes,
            traffic,
            sink,
        } = self;

        config.validate()?;
        if routes.is_empty() {
            return Err(SimError::Config("no routes configured".into()));
        }

        for route in &routes {
            // Weight vectors must index route positions one-for-one.
            predictor.validate_weights(route.direction, route.len())?;

            // The adaptive policy is meaningless without monitored demand.
            if matches!(config.dispatcher, DispatcherConfig::AdaptiveHeadway { .. }) {
                if route.monitored().is_empty() {
                    return Err(SimError::Config(format!(
                        "adaptive dispatcher on route {} {} requires monitored stops",
                        route.line, route.direction
                    )));
                }
                for &m in route.monitored() {
                    predictor.require_stop(route.direction, &route.stops()[m.index()].code)?;
                }
            }
        }

        let stops = routes
            .iter()
            .map(|r| (0..r.len()).map(|_| StopQueue::new()).collect())
            .collect();
        let dispatchers = routes
            .iter()
            .map(|_| Dispatcher::from_config(&config.dispatcher, config.vehicle.capacity))
            .collect();
        let registry = DispatchRegistry::new(routes.len());
        let kernel = EventKernel::new(config.start_time(), config.random_seed);
        let kpi = KpiTracker::new(config.kpi.enabled);

        log::info!(
            "simulation built: {} route(s), window [{}, {}), seed {}",
            routes.len(),
            config.start_time(),
            config.end_time(),
            config.random_seed
        );

        Ok(Simulation {
            world: World {
                config,
                routes,
                stops,
                buses: BTreeMap::new(),
                registry,
                dispatchers,
                predictor,
                traffic,
                sink,
                kpi,
                next_bus: 0,
                next_trip: 0,
                next_passenger: 0,
            },
            kernel,
            primed: false,
        })
    }
}

// ── Simulation ────────────────────────────────────────────────────────────────

/// A fully wired simulation: world + kernel.
pub struct Simulation<T: TrafficModel + 'static, E: EventSink + 'static> {
    world: World<T, E>,
    kernel: Kernel<T, E>,
    primed: bool,
}

impl<T, E> Simulation<T, E>
where
    T: TrafficModel + 'static,
    E: EventSink + 'static,
{
    /// Run the whole configured window and close the sink.
    pub fn run(&mut self) -> SimResult<()> {
        self.prime();
        let end = self.world.config.end_time();
        let fired = self.kernel.run_until(&mut self.world, end);
        self.world.sink.close();
        log::info!(
            "run complete at {}: {} callbacks fired, {} buses dispatched, \
             {} passengers waiting, {} onboard",
            self.kernel.now(),
            fired,
            self.world.registry.dispatch_count(),
            self.world.waiting_count(),
            self.world.onboard_count(),
        );
        Ok(())
    }

    /// Advance virtual time to `t` (clamped to the configured end), firing
    /// everything due.  Useful for stepping in tests.
    pub fn run_until(&mut self, t: SimTime) {
        self.prime();
        let end = self.world.config.end_time().min(t);
        self.kernel.run_until(&mut self.world, end);
    }

    pub fn now(&self) -> SimTime {
        self.kernel.now()
    }

    pub fn world(&self) -> &World<T, E> {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World<T, E> {
        &mut self.world
    }

    pub fn kpi_report(&self) -> &KpiReport {
        self.world.kpi.report()
    }

    /// Entry point for an external traffic engine reporting that a vehicle
    /// has reached its next stop.
    ///
    /// The built-in timer model never needs this — it schedules arrivals
    /// directly.  A microscopic engine drives the bus state machine by
    /// calling it once per stop in route order; reports for destroyed
    /// vehicles or out-of-order stops are dropped with a warning.
    pub fn on_vehicle_reached_stop(&mut self, bus: BusId, stop: StopId, time: SimTime) {
        self.kernel.schedule_at(time, move |w: &mut World<T, E>, k| {
            let expected = w
                .buses
                .get(&bus)
                .filter(|b| !b.is_finished())
                .map(|b| b.next_stop);
            match expected {
                Some(next) if next == stop => bus_arrive(w, k, bus),
                Some(next) => {
                    log::warn!("traffic reported {bus} at stop {stop}, expected {next}; ignored")
                }
                None => {}
            }
        });
    }

    /// Schedule the initial event population: passenger generators, the
    /// dispatcher, and the KPI export tick.  Idempotent.
    fn prime(&mut self) {
        if self.primed {
            return;
        }
        self.primed = true;

        for route_idx in 0..self.world.routes.len() {
            generator::start_route_generators(&mut self.world, &mut self.kernel, route_idx);
            dispatcher_start(&mut self.world, &mut self.kernel, route_idx);
        }

        if self.world.config.kpi.enabled {
            let interval = self.world.config.kpi.export_interval_s;
            self.kernel
                .schedule(interval, move |w: &mut World<T, E>, k| kpi_export_tick(w, k));
        }
    }
}

// ── Dispatch callbacks ────────────────────────────────────────────────────────

/// Start dispatching on a route at the current (start) time.
fn dispatcher_start<T, E>(world: &mut World<T, E>, kernel: &mut Kernel<T, E>, route_idx: usize)
where
    T: TrafficModel + 'static,
    E: EventSink + 'static,
{
    let start = world.config.start_time_s;
    let end = world.config.end_time_s;

    if let Dispatcher::Timetable(timetable) = &world.dispatchers[route_idx] {
        // One callback per in-window listed departure; the assigned headway
        // is the gap to the next listed trip.
        for (i, &t) in timetable.departures_s.iter().enumerate() {
            if t < start || t >= end {
                continue;
            }
            let h_assigned = timetable.assigned_headway(i);
            kernel.schedule_at(SimTime(t), move |w: &mut World<T, E>, k| {
                dispatch_bus(w, k, route_idx, h_assigned);
            });
        }
        return;
    }

    dispatch_tick(world, kernel, route_idx);
}

/// One self-rescheduling dispatch tick (interval and adaptive policies).
fn dispatch_tick<T, E>(world: &mut World<T, E>, kernel: &mut Kernel<T, E>, route_idx: usize)
where
    T: TrafficModel + 'static,
    E: EventSink + 'static,
{
    let now = kernel.now();
    // Dispatch window is [start, end): a tick landing exactly on the end
    // boundary injects nothing.
    if now >= world.config.end_time() {
        return;
    }

    // All borrows in this block are shared; the KPI write happens after it.
    let (h_assigned, next_tick_s, sample) = match &world.dispatchers[route_idx] {
        Dispatcher::Interval(d) => {
            let interval = d.interval_at(world.predictor.dayparts(), now);
            (d.hold_to_interval.then_some(interval), interval, None)
        }
        Dispatcher::Adaptive(d) => {
            let route = &world.routes[route_idx];
            let sample = d.target_headway(&world.predictor, route, route.direction, now);
            log::debug!(
                "route {route_idx} adaptive headway {:.0}s (lambda_avg {:.4}/s)",
                sample.target_headway_s,
                sample.lambda_avg
            );
            (
                Some(sample.target_headway_s),
                sample.target_headway_s,
                Some(sample),
            )
        }
        Dispatcher::Timetable(_) => return,
    };
    if let Some(sample) = sample {
        world.kpi.record_headway(now, sample);
    }

    dispatch_bus(world, kernel, route_idx, h_assigned);
    kernel.schedule(next_tick_s, move |w: &mut World<T, E>, k| {
        dispatch_tick(w, k, route_idx)
    });
}

/// Inject one bus onto a route.  The assigned headway is frozen here for the
/// life of the trip.
pub(crate) fn dispatch_bus<T, E>(
    world: &mut World<T, E>,
    kernel: &mut Kernel<T, E>,
    route_idx: usize,
    h_assigned: Option<f64>,
) -> BusId
where
    T: TrafficModel + 'static,
    E: EventSink + 'static,
{
    let now = kernel.now();
    let World {
        routes,
        buses,
        registry,
        traffic,
        sink,
        config,
        next_bus,
        next_trip,
        ..
    } = world;
    let route = &routes[route_idx];

    let bus_id = BusId(*next_bus);
    *next_bus += 1;
    let trip = TripId(*next_trip);
    *next_trip += 1;

    // Nominal schedule: dispatch time plus cumulative nominal travel times,
    // no dwell allowance.
    let mut sched_arrivals = Vec::with_capacity(route.len());
    let mut t = now;
    sched_arrivals.push(t);
    for i in 0..route.len() - 1 {
        let from = StopId(i as u32);
        let leg = traffic.travel_time(route, from, from.next(), t).max(0.0);
        t = t + leg;
        sched_arrivals.push(t);
    }

    traffic.create_vehicle(bus_id, route, now);
    registry.register(route_idx, bus_id, trip, now, route.len());
    buses.insert(
        bus_id,
        Bus::new(
            bus_id,
            trip,
            route_idx,
            route.direction,
            config.vehicle.capacity,
            h_assigned,
            now,
            sched_arrivals,
        ),
    );

    sink.emit(&SimEvent::BusDispatch {
        time: now,
        bus: bus_id,
        trip,
        direction: route.direction,
        assigned_headway_s: h_assigned,
    });
    match h_assigned {
        Some(h) => log::info!(
            "dispatched {bus_id} on {} {} at {now} with fixed headway {h:.0}s",
            route.line,
            route.direction
        ),
        None => log::info!("dispatched {bus_id} on {} {} at {now}", route.line, route.direction),
    }

    // The origin is served like any other stop; the vehicle is created at it.
    kernel.schedule(0.0, move |w: &mut World<T, E>, k| bus_arrive(w, k, bus_id));
    bus_id
}

// ── Bus lifecycle callbacks ───────────────────────────────────────────────────

/// A bus reaches the stop it was travelling toward.
pub(crate) fn bus_arrive<T, E>(world: &mut World<T, E>, kernel: &mut Kernel<T, E>, bus_id: BusId)
where
    T: TrafficModel + 'static,
    E: EventSink + 'static,
{
    let now = kernel.now();
    let World {
        config,
        routes,
        stops,
        buses,
        registry,
        dispatchers,
        sink,
        kpi,
        ..
    } = world;

    let Some(bus) = buses.get_mut(&bus_id) else { return };
    if bus.is_finished() {
        return;
    }
    let route = &routes[bus.route_idx];
    let stop = bus.next_stop;

    bus.state = BusState::Dwelling;
    bus.current_arrival = Some(now);

    sink.emit(&SimEvent::BusArrival {
        time: now,
        bus: bus_id,
        trip: bus.trip,
        direction: bus.direction,
        stop,
        sched_arrival: bus.sched_arrival(stop),
        load: bus.load,
        wheelchair_count: bus.wheelchair_count,
    });
    kpi.record_utilization(now, bus_id, bus.load, bus.capacity);

    // ── Serve the stop (alight ∥ board) ───────────────────────────────────
    let outcome = stops[bus.route_idx][stop.index()].serve(
        bus,
        route,
        &config.passenger,
        &config.vehicle,
        kernel.rng(),
    );
    for &passenger in &outcome.alighted {
        sink.emit(&SimEvent::PassengerAlighted { time: now, passenger, bus: bus_id, stop });
    }
    for &passenger in &outcome.boarded {
        sink.emit(&SimEvent::PassengerBoarded { time: now, passenger, bus: bus_id, stop });
    }
    for &(passenger, requeued) in &outcome.denied {
        sink.emit(&SimEvent::PassengerDenied {
            time: now,
            passenger,
            bus: bus_id,
            stop,
            requeued,
        });
    }
    kpi.count_denied(outcome.denied.len());

    let dwell_s = outcome.dwell_s();

    // ── Holding ───────────────────────────────────────────────────────────
    //
    // Never at the origin (there is no upstream spacing to protect yet) and
    // never at the terminus.
    let mut hold_s = 0.0;
    if stop.0 > 0 && !route.is_terminus(stop) {
        let decision =
            dispatchers[bus.route_idx].request_hold(registry, bus.route_idx, bus, stop, now);
        match decision {
            HoldDecision::NotYetVisited => kpi.count_missing_predecessor(),
            HoldDecision::Hold { hold_s: h } => {
                hold_s = h;
                sink.emit(&SimEvent::HeadwayAdjust { time: now, bus: bus_id, stop, hold_s: h });
                kpi.record_adjustment(now, bus_id, stop, h);
                log::info!(
                    "{bus_id} holding {h:.0}s at stop {stop} to keep its {:.0}s headway",
                    bus.assigned_headway_s.unwrap_or(0.0)
                );
            }
            _ => {}
        }
    }

    bus.pending_visit = Some(PendingVisit {
        boarded: outcome.boarded.len() as u32,
        alighted: outcome.alighted.len() as u32,
        denied: outcome.denied.len() as u32,
        dwell_s,
        hold_s,
    });

    kernel.schedule(dwell_s + hold_s, move |w: &mut World<T, E>, k| {
        bus_depart(w, k, bus_id)
    });
}

/// A bus finishes its dwell (plus any hold) and departs the stop.
pub(crate) fn bus_depart<T, E>(world: &mut World<T, E>, kernel: &mut Kernel<T, E>, bus_id: BusId)
where
    T: TrafficModel + 'static,
    E: EventSink + 'static,
{
    let now = kernel.now();
    let World {
        routes,
        buses,
        registry,
        traffic,
        sink,
        kpi,
        ..
    } = world;

    let Some(bus) = buses.get_mut(&bus_id) else { return };
    if bus.is_finished() {
        return;
    }
    let route = &routes[bus.route_idx];
    let stop = bus.next_stop;

    registry.record_departure(bus.route_idx, bus_id, stop, now);

    let pending = bus.pending_visit.take().unwrap_or_default();
    let sched = bus.sched_arrival(stop);
    sink.emit(&SimEvent::BusDeparture {
        time: now,
        visit: StopVisit {
            bus: bus_id,
            trip: bus.trip,
            line: route.line.clone(),
            direction: bus.direction,
            stop,
            stop_code: route.stops()[stop.index()].code.clone(),
            sequence: stop.0,
            sched_arrival: sched,
            actual_arrival: bus.current_arrival.unwrap_or(now),
            sched_departure: sched,
            actual_departure: now,
            dwell_s: pending.dwell_s,
            hold_s: pending.hold_s,
            boarded: pending.boarded,
            alighted: pending.alighted,
            denied: pending.denied,
            load: bus.load,
            wheelchair_count: bus.wheelchair_count,
            distance_to_next_m: route.distance_to_next_m(stop),
            distance_remaining_m: route.distance_remaining_m(stop),
        },
    });

    if route.is_terminus(stop) {
        traffic.destroy_vehicle(bus_id);
        bus.state = BusState::Finished;
        bus.current_arrival = None;
        registry.mark_finished(bus.route_idx, bus_id);
        log::debug!("{bus_id} finished its trip at {now}");
        return;
    }

    let next = stop.next();
    let leg = traffic.travel_time(route, stop, next, now);
    if !leg.is_finite() || leg < 0.0 {
        // Traffic fault: drop the bus, keep the kernel alive.
        log::warn!(
            "traffic fault: travel time {leg} for {bus_id} from stop {stop} to {next}; \
             dropping bus"
        );
        kpi.count_traffic_fault();
        traffic.destroy_vehicle(bus_id);
        bus.state = BusState::Finished;
        registry.mark_finished(bus.route_idx, bus_id);
        return;
    }

    bus.next_stop = next;
    bus.state = BusState::EnRoute;
    bus.current_arrival = None;
    kernel.schedule(leg, move |w: &mut World<T, E>, k| bus_arrive(w, k, bus_id));
}

// ── KPI export ────────────────────────────────────────────────────────────────

/// Self-rescheduling KPI summary log.
fn kpi_export_tick<T, E>(world: &mut World<T, E>, kernel: &mut Kernel<T, E>)
where
    T: TrafficModel + 'static,
    E: EventSink + 'static,
{
    world.kpi.log_summary(kernel.now());
    if kernel.now() < world.config.end_time() {
        let interval = world.config.kpi.export_interval_s;
        kernel.schedule(interval, move |w: &mut World<T, E>, k| kpi_export_tick(w, k));
    }
}

//! Poisson passenger generation.
//!
//! One self-rescheduling kernel callback per (route, non-terminal stop):
//! each fire re-reads the predictor, backs off when the rate is effectively
//! zero, and otherwise creates exactly one passenger and re-arms itself one
//! exponential draw ahead.  The initial arm at simulation start draws from
//! the start-time rate without creating anybody — the first passenger
//! appears one inter-arrival time into the run.
//!
//! Destination choice masks the tabulated weight vector to stops strictly
//! after the origin and renormalises; a masked vector with zero mass means
//! nobody would ride from here right now, so no passenger is created (the
//! generator still re-arms).  A missing weight cell falls back to a uniform
//! draw over the remaining stops.

use hs_core::{Mobility, Passenger, PassengerId, SimTime, StopId};
use hs_kernel::EventKernel;

use crate::events::{EventSink, SimEvent};
use crate::sim::World;
use crate::traffic::TrafficModel;

/// Rates at or below this (passengers/second) count as "no demand".
pub const MIN_RATE_EPS: f64 = 1e-6;

/// Re-check delay while a stop has no demand.
pub const IDLE_BACKOFF_S: f64 = 60.0;

type Kernel<T, E> = EventKernel<World<T, E>>;

/// Arm the generator for every non-terminal stop of a route.  Called once
/// per route when the simulation is primed.
pub(crate) fn start_route_generators<T, E>(
    world: &mut World<T, E>,
    kernel: &mut Kernel<T, E>,
    route_idx: usize,
) where
    T: TrafficModel + 'static,
    E: EventSink + 'static,
{
    let stop_count = world.routes[route_idx].len();
    for pos in 0..stop_count - 1 {
        arm(world, kernel, route_idx, StopId(pos as u32));
    }
}

/// Schedule the next fire for one stop's generator, without creating a
/// passenger now.
fn arm<T, E>(world: &mut World<T, E>, kernel: &mut Kernel<T, E>, route_idx: usize, stop: StopId)
where
    T: TrafficModel + 'static,
    E: EventSink + 'static,
{
    let route = &world.routes[route_idx];
    let rate = world
        .predictor
        .rate(route.direction, &route.stops()[stop.index()].code, kernel.now());

    let delay = if rate <= MIN_RATE_EPS {
        IDLE_BACKOFF_S
    } else {
        kernel.rng().exp(rate)
    };
    kernel.schedule(delay, move |w: &mut World<T, E>, k| fire(w, k, route_idx, stop));
}

/// One generator firing: back off on no demand, otherwise create one
/// passenger and re-arm.
fn fire<T, E>(world: &mut World<T, E>, kernel: &mut Kernel<T, E>, route_idx: usize, stop: StopId)
where
    T: TrafficModel + 'static,
    E: EventSink + 'static,
{
    let now = kernel.now();
    let route = &world.routes[route_idx];
    let rate = world
        .predictor
        .rate(route.direction, &route.stops()[stop.index()].code, now);

    if rate <= MIN_RATE_EPS {
        kernel.schedule(IDLE_BACKOFF_S, move |w: &mut World<T, E>, k| {
            fire(w, k, route_idx, stop)
        });
        return;
    }

    spawn_passenger(world, kernel, route_idx, stop, now);

    let delay = kernel.rng().exp(rate);
    kernel.schedule(delay, move |w: &mut World<T, E>, k| fire(w, k, route_idx, stop));
}

/// Create one passenger at `stop` (or nobody, when no downstream destination
/// carries weight) and push them onto the stop queue.
fn spawn_passenger<T, E>(
    world: &mut World<T, E>,
    kernel: &mut Kernel<T, E>,
    route_idx: usize,
    stop: StopId,
    now: SimTime,
) where
    T: TrafficModel,
    E: EventSink,
{
    let World {
        routes,
        stops,
        predictor,
        sink,
        config,
        next_passenger,
        ..
    } = world;
    let route = &routes[route_idx];
    let direction = route.direction;

    let destination = match predictor.destination_weights(direction, now) {
        Some(weights) => {
            let mut masked = weights.to_vec();
            for w in &mut masked[..=stop.index()] {
                *w = 0.0;
            }
            match kernel.rng().weighted_choice(&masked) {
                Some(i) => StopId(i as u32),
                // Zero mass after masking: nothing downstream attracts
                // trips from here in this period.
                None => return,
            }
        }
        None => {
            let lo = stop.index() + 1;
            let hi = route.len();
            if lo >= hi {
                return;
            }
            log::debug!(
                "no destination weights for {direction} at {now}; uniform fallback"
            );
            StopId(kernel.rng().gen_range(lo..hi) as u32)
        }
    };

    let mobility = if kernel.rng().gen_bool(config.passenger.wheelchair_probability) {
        Mobility::Wheelchair
    } else {
        Mobility::Regular
    };

    let id = PassengerId(*next_passenger);
    *next_passenger += 1;

    sink.emit(&SimEvent::PassengerArrival {
        time: now,
        passenger: id,
        direction,
        stop,
        destination,
        mobility,
    });

    stops[route_idx][stop.index()].push(Passenger {
        id,
        origin: stop,
        destination,
        arrived_at: now,
        mobility,
        requeue_propensity: config.passenger.requeue_propensity,
    });
}

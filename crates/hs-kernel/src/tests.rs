//! Unit tests for the event kernel.

use hs_core::SimTime;

use crate::EventKernel;

/// Test state: an append-only trace of fired markers.
#[derive(Default)]
struct Trace(Vec<(f64, &'static str)>);

impl Trace {
    fn record(&mut self, t: SimTime, tag: &'static str) {
        self.0.push((t.secs(), tag));
    }
}

#[test]
fn fires_in_time_order() {
    let mut kernel: EventKernel<Trace> = EventKernel::new(SimTime::ZERO, 1);
    let mut trace = Trace::default();

    kernel.schedule(30.0, |s: &mut Trace, k| s.record(k.now(), "b"));
    kernel.schedule(10.0, |s: &mut Trace, k| s.record(k.now(), "a"));
    kernel.schedule(20.0, |s: &mut Trace, k| s.record(k.now(), "m"));

    kernel.run_until(&mut trace, SimTime(100.0));
    assert_eq!(trace.0, vec![(10.0, "a"), (20.0, "m"), (30.0, "b")]);
    assert_eq!(kernel.now(), SimTime(100.0));
}

#[test]
fn equal_times_fire_in_insertion_order() {
    let mut kernel: EventKernel<Trace> = EventKernel::new(SimTime::ZERO, 1);
    let mut trace = Trace::default();

    kernel.schedule(5.0, |s: &mut Trace, k| s.record(k.now(), "first"));
    kernel.schedule(5.0, |s: &mut Trace, k| s.record(k.now(), "second"));
    kernel.schedule(5.0, |s: &mut Trace, k| s.record(k.now(), "third"));

    kernel.run_until(&mut trace, SimTime(10.0));
    assert_eq!(
        trace.0,
        vec![(5.0, "first"), (5.0, "second"), (5.0, "third")]
    );
}

#[test]
fn callbacks_can_schedule_callbacks() {
    let mut kernel: EventKernel<Trace> = EventKernel::new(SimTime::ZERO, 1);
    let mut trace = Trace::default();

    kernel.schedule(10.0, |s: &mut Trace, k| {
        s.record(k.now(), "outer");
        k.schedule(5.0, |s: &mut Trace, k| s.record(k.now(), "inner"));
    });

    kernel.run_until(&mut trace, SimTime(20.0));
    assert_eq!(trace.0, vec![(10.0, "outer"), (15.0, "inner")]);
}

#[test]
fn events_past_deadline_stay_queued() {
    let mut kernel: EventKernel<Trace> = EventKernel::new(SimTime::ZERO, 1);
    let mut trace = Trace::default();

    kernel.schedule(10.0, |s: &mut Trace, k| s.record(k.now(), "early"));
    kernel.schedule(50.0, |s: &mut Trace, k| s.record(k.now(), "late"));

    kernel.run_until(&mut trace, SimTime(20.0));
    assert_eq!(trace.0, vec![(10.0, "early")]);
    assert_eq!(kernel.now(), SimTime(20.0));
    assert_eq!(kernel.pending(), 1);

    kernel.run_until(&mut trace, SimTime(60.0));
    assert_eq!(trace.0, vec![(10.0, "early"), (50.0, "late")]);
}

#[test]
fn boundary_event_fires_at_exact_deadline() {
    let mut kernel: EventKernel<Trace> = EventKernel::new(SimTime::ZERO, 1);
    let mut trace = Trace::default();

    kernel.schedule(20.0, |s: &mut Trace, k| s.record(k.now(), "edge"));
    kernel.run_until(&mut trace, SimTime(20.0));
    assert_eq!(trace.0, vec![(20.0, "edge")]);
}

#[test]
fn cancel_skips_event() {
    let mut kernel: EventKernel<Trace> = EventKernel::new(SimTime::ZERO, 1);
    let mut trace = Trace::default();

    let _keep = kernel.schedule(5.0, |s: &mut Trace, k| s.record(k.now(), "keep"));
    let doomed = kernel.schedule(6.0, |s: &mut Trace, k| s.record(k.now(), "drop"));

    kernel.cancel(doomed);
    kernel.cancel(doomed); // idempotent

    kernel.run_until(&mut trace, SimTime(10.0));
    assert_eq!(trace.0, vec![(5.0, "keep")]);
}

#[test]
fn cancel_after_fire_is_noop() {
    let mut kernel: EventKernel<Trace> = EventKernel::new(SimTime::ZERO, 1);
    let mut trace = Trace::default();

    let h = kernel.schedule(1.0, |s: &mut Trace, k| s.record(k.now(), "x"));
    kernel.run_until(&mut trace, SimTime(2.0));
    kernel.cancel(h);
    assert_eq!(trace.0.len(), 1);
}

#[test]
fn schedule_at_in_past_clamps_to_now() {
    let mut kernel: EventKernel<Trace> = EventKernel::new(SimTime(100.0), 1);
    let mut trace = Trace::default();

    kernel.schedule_at(SimTime(50.0), |s: &mut Trace, k| s.record(k.now(), "clamped"));
    kernel.run_until(&mut trace, SimTime(100.0));
    assert_eq!(trace.0, vec![(100.0, "clamped")]);
}

#[test]
fn run_until_reports_fired_count() {
    let mut kernel: EventKernel<Trace> = EventKernel::new(SimTime::ZERO, 1);
    let mut trace = Trace::default();

    for i in 0..5 {
        kernel.schedule(i as f64, |_s, _k| {});
    }
    let h = kernel.schedule(2.5, |_s, _k| {});
    kernel.cancel(h);

    assert_eq!(kernel.run_until(&mut trace, SimTime(10.0)), 5);
    assert!(kernel.is_idle());
}

#[test]
fn rng_draws_are_deterministic_across_kernels() {
    let mut a: EventKernel<Trace> = EventKernel::new(SimTime::ZERO, 42);
    let mut b: EventKernel<Trace> = EventKernel::new(SimTime::ZERO, 42);
    for _ in 0..20 {
        assert_eq!(a.rng().gen_range(0..100u32), b.rng().gen_range(0..100u32));
    }
}

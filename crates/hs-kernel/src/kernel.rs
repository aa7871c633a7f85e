//! `EventKernel<S>` — the time/seq-ordered callback queue.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};
use std::fmt;

use hs_core::{SimRng, SimTime};

/// A scheduled callback: receives the simulation state and the kernel itself,
/// so it can mutate the world and schedule follow-up events.
pub type Callback<S> = Box<dyn FnOnce(&mut S, &mut EventKernel<S>)>;

// ── EventHandle ───────────────────────────────────────────────────────────────

/// Opaque handle to a scheduled callback, usable with
/// [`EventKernel::cancel`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct EventHandle(u64);

impl fmt::Display for EventHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandle({})", self.0)
    }
}

// ── Scheduled ─────────────────────────────────────────────────────────────────

struct Scheduled<S> {
    time: SimTime,
    seq: u64,
    cb: Callback<S>,
}

// Ordering ignores the callback: `(time, seq)` is a strict total order
// because `seq` is unique per scheduled event.
impl<S> PartialEq for Scheduled<S> {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}
impl<S> Eq for Scheduled<S> {}

impl<S> PartialOrd for Scheduled<S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<S> Ord for Scheduled<S> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time.cmp(&other.time).then(self.seq.cmp(&other.seq))
    }
}

// ── EventKernel ───────────────────────────────────────────────────────────────

/// The discrete-event kernel: virtual clock, callback queue, and the run's
/// single deterministic random source.
///
/// `S` is the simulation state threaded through every callback.  The kernel
/// never inspects `S`; it only sequences access to it.
pub struct EventKernel<S> {
    now: SimTime,
    next_seq: u64,
    queue: BinaryHeap<Reverse<Scheduled<S>>>,
    /// Sequence numbers cancelled but not yet dequeued.  Entries are removed
    /// when the corresponding event is skipped at dequeue time.
    cancelled: HashSet<u64>,
    rng: SimRng,
}

impl<S> EventKernel<S> {
    /// Create a kernel with its clock at `start` and a source seeded with
    /// `seed`.
    pub fn new(start: SimTime, seed: u64) -> Self {
        Self::with_rng(start, SimRng::new(seed))
    }

    /// Create a kernel around an explicitly injected random source.
    pub fn with_rng(start: SimTime, rng: SimRng) -> Self {
        Self {
            now: start,
            next_seq: 0,
            queue: BinaryHeap::new(),
            cancelled: HashSet::new(),
            rng,
        }
    }

    /// The current virtual time.
    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// The run's deterministic random source.  All stochastic draws must go
    /// through this — components never create their own.
    #[inline]
    pub fn rng(&mut self) -> &mut SimRng {
        &mut self.rng
    }

    /// Number of pending (non-fired) callbacks, including cancelled ones not
    /// yet dequeued.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    // ── Scheduling ────────────────────────────────────────────────────────

    /// Schedule `cb` to fire `delay` seconds from now.
    ///
    /// `delay` must be ≥ 0; a negative delay is debug-asserted and clamped
    /// to 0 in release builds.
    pub fn schedule<F>(&mut self, delay: f64, cb: F) -> EventHandle
    where
        F: FnOnce(&mut S, &mut EventKernel<S>) + 'static,
    {
        debug_assert!(delay >= 0.0, "schedule delay must be >= 0, got {delay}");
        self.schedule_at(self.now + delay.max(0.0), cb)
    }

    /// Schedule `cb` to fire at absolute time `t`.
    ///
    /// `t` must be ≥ `now()`; an earlier deadline is clamped to `now` and the
    /// callback fires after events already queued at the current instant.
    pub fn schedule_at<F>(&mut self, t: SimTime, cb: F) -> EventHandle
    where
        F: FnOnce(&mut S, &mut EventKernel<S>) + 'static,
    {
        let time = t.max(self.now);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Scheduled { time, seq, cb: Box::new(cb) }));
        EventHandle(seq)
    }

    /// Cancel a scheduled callback.  Idempotent; cancelling an
    /// already-fired handle is a no-op.
    pub fn cancel(&mut self, handle: EventHandle) {
        if handle.0 < self.next_seq {
            self.cancelled.insert(handle.0);
        }
    }

    // ── Running ───────────────────────────────────────────────────────────

    /// Fire every callback with `time ≤ t_end` in `(time, seq)` order, then
    /// advance the clock to `t_end`.
    ///
    /// Returns the number of callbacks fired (cancelled events excluded).
    pub fn run_until(&mut self, state: &mut S, t_end: SimTime) -> usize {
        let mut fired = 0;
        loop {
            let due = matches!(self.queue.peek(), Some(Reverse(ev)) if ev.time <= t_end);
            if !due {
                break;
            }
            let Some(Reverse(ev)) = self.queue.pop() else { break };
            if self.cancelled.remove(&ev.seq) {
                continue;
            }
            self.now = ev.time;
            (ev.cb)(state, self);
            fired += 1;
        }
        if t_end > self.now {
            self.now = t_end;
        }
        fired
    }
}

//! `hs-kernel` — the discrete-event scheduling kernel.
//!
//! # Why this exists
//!
//! Every dynamic element of the simulation — passenger generators, bus
//! movements, dispatch ticks, KPI exports — is a timed callback.  The kernel
//! owns the one priority queue of pending callbacks, the virtual clock, and
//! the injected random source, and fires callbacks in strict
//! `(time, insertion order)` sequence.
//!
//! # Execution model
//!
//! Single-threaded and cooperative.  A callback runs to completion before the
//! next one fires; suspension happens exclusively at callback return, so all
//! state mutation is sequenced and no locking exists anywhere.  Callbacks may
//! schedule (and cancel) further callbacks freely.
//!
//! # Determinism
//!
//! Two runs with the same seed and the same inputs produce identical event
//! traces.  The monotone `seq` tiebreaker removes heap instability between
//! equal timestamps: if `a` was scheduled before `b` and both fire at the
//! same virtual time, `a` fires first.

pub mod kernel;

#[cfg(test)]
mod tests;

pub use kernel::{Callback, EventHandle, EventKernel};

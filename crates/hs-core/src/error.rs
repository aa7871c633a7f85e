//! Framework error type.
//!
//! Sub-crates define their own error enums and either convert into
//! `CoreError` via `From` impls or wrap it as one variant.  Setup-time
//! data-integrity failures always name the offending entity — they are
//! surfaced to the operator as a one-line diagnostic, never reinterpreted.

use thiserror::Error;

use crate::StopId;

/// The top-level error type for `hs-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("stop {stop} not found on route {route}")]
    UnknownStop { stop: StopId, route: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `hs-*` crates.
pub type CoreResult<T> = Result<T, CoreError>;

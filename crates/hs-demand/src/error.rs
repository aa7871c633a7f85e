//! Error types for hs-demand.

use thiserror::Error;

/// Errors raised while loading or validating demand data.
#[derive(Debug, Error)]
pub enum DemandError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("no arrival-rate data for stop {stop:?} ({direction})")]
    MissingStop { stop: String, direction: String },

    #[error(
        "weight vector for ({direction}, month {month}, weekday {weekday}, {daypart:?}) \
         has {got} entries, route has {expected} stops"
    )]
    WeightLength {
        direction: String,
        month: u8,
        weekday: u8,
        daypart: String,
        got: usize,
        expected: usize,
    },
}

/// Alias for `Result<T, DemandError>`.
pub type DemandResult<T> = Result<T, DemandError>;

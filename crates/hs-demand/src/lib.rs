//! `hs-demand` — historical demand tables and the demand predictor.
//!
//! # Crate layout
//!
//! | Module        | Contents                                             |
//! |---------------|------------------------------------------------------|
//! | [`tables`]    | `ArrivalRateTable`, `WeightsTable`                   |
//! | [`predictor`] | `DemandPredictor` (rate lookup + overrides)          |
//! | [`loader`]    | JSON/CSV table loading                               |
//! | [`error`]     | `DemandError`, `DemandResult<T>`                     |
//!
//! # Lookup model (summary)
//!
//! Historical data is tabulated per `(direction, stop, month, weekday,
//! daypart)`.  The predictor resolves `(month, weekday)` once from the
//! configured service date, maps a virtual timestamp to its daypart, and
//! returns λ in passengers **per second** — 0 for any cell the data does not
//! cover.  Destination weights are tabulated per `(direction, month,
//! weekday, daypart)` as one weight per route position.

pub mod error;
pub mod loader;
pub mod predictor;
pub mod tables;


pub use error::{DemandError, DemandResult};
pub use loader::{
    load_rates_csv, load_rates_json, load_rates_reader, load_weights_json, load_weights_reader,
};
pub use predictor::DemandPredictor;
pub use tables::{ArrivalRateTable, RateKey, WeightKey, WeightsTable};

//! Demand-table loaders.
//!
//! # JSON format
//!
//! Flat row lists, one object per cell.  Rates are given **per hour** (the
//! unit the source systems export) and converted to per-second on load.
//!
//! ```json
//! {
//!   "rates": [
//!     {"direction": "outbound", "stop": "9769", "month": 7,
//!      "weekday": 2, "daypart": "am_peak", "rate_per_hour": 144.0}
//!   ]
//! }
//! ```
//!
//! ```json
//! {
//!   "weights": [
//!     {"direction": "outbound", "month": 7, "weekday": 2,
//!      "daypart": "am_peak", "weights": [0.0, 0.1, 0.4, 0.5]}
//!   ]
//! }
//! ```
//!
//! # CSV format
//!
//! The rate table can also be loaded from CSV with the same columns
//! (`direction,stop,month,weekday,daypart,rate_per_hour`), one row per cell.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use hs_core::Direction;

use crate::tables::{ArrivalRateTable, RateKey, WeightKey, WeightsTable};
use crate::{DemandError, DemandResult};

// ── Row formats ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RateRow {
    direction: String,
    stop: String,
    month: u8,
    weekday: u8,
    daypart: String,
    rate_per_hour: f64,
}

#[derive(Deserialize)]
struct RateFile {
    rates: Vec<RateRow>,
}

#[derive(Deserialize)]
struct WeightRow {
    direction: String,
    month: u8,
    weekday: u8,
    daypart: String,
    weights: Vec<f64>,
}

#[derive(Deserialize)]
struct WeightFile {
    weights: Vec<WeightRow>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load an [`ArrivalRateTable`] from a JSON file.
pub fn load_rates_json(path: &Path) -> DemandResult<ArrivalRateTable> {
    let file = std::fs::File::open(path)?;
    load_rates_reader(file)
}

/// Like [`load_rates_json`] but accepts any `Read` source (e.g. a
/// `std::io::Cursor` in tests).
pub fn load_rates_reader<R: Read>(reader: R) -> DemandResult<ArrivalRateTable> {
    let file: RateFile =
        serde_json::from_reader(reader).map_err(|e| DemandError::Parse(e.to_string()))?;

    let mut table = ArrivalRateTable::new();
    for row in file.rates {
        table.insert(
            RateKey {
                direction: parse_direction(&row.direction)?,
                stop: row.stop,
                month: row.month,
                weekday: row.weekday,
                daypart: row.daypart,
            },
            row.rate_per_hour / 3_600.0,
        );
    }
    log::debug!("loaded {} arrival-rate cells", table.len());
    Ok(table)
}

/// Load an [`ArrivalRateTable`] from CSV rows with the same columns as the
/// JSON format.
pub fn load_rates_csv<R: Read>(reader: R) -> DemandResult<ArrivalRateTable> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut table = ArrivalRateTable::new();
    for result in csv_reader.deserialize::<RateRow>() {
        let row = result.map_err(|e| DemandError::Parse(e.to_string()))?;
        table.insert(
            RateKey {
                direction: parse_direction(&row.direction)?,
                stop: row.stop,
                month: row.month,
                weekday: row.weekday,
                daypart: row.daypart,
            },
            row.rate_per_hour / 3_600.0,
        );
    }
    Ok(table)
}

/// Load a [`WeightsTable`] from a JSON file.
pub fn load_weights_json(path: &Path) -> DemandResult<WeightsTable> {
    let file = std::fs::File::open(path)?;
    load_weights_reader(file)
}

/// Like [`load_weights_json`] but accepts any `Read` source.
pub fn load_weights_reader<R: Read>(reader: R) -> DemandResult<WeightsTable> {
    let file: WeightFile =
        serde_json::from_reader(reader).map_err(|e| DemandError::Parse(e.to_string()))?;

    let mut table = WeightsTable::new();
    for row in file.weights {
        table.insert(
            WeightKey {
                direction: parse_direction(&row.direction)?,
                month: row.month,
                weekday: row.weekday,
                daypart: row.daypart,
            },
            row.weights,
        );
    }
    log::debug!("loaded {} destination-weight cells", table.len());
    Ok(table)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_direction(s: &str) -> DemandResult<Direction> {
    match s.trim().to_ascii_lowercase().as_str() {
        "outbound" => Ok(Direction::Outbound),
        "inbound" => Ok(Direction::Inbound),
        other => Err(DemandError::Parse(format!(
            "invalid direction {other:?}: expected \"outbound\" or \"inbound\""
        ))),
    }
}

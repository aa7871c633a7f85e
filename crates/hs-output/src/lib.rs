//! `hs-output` — persisted simulation records for the headway_sim framework.
//!
//! One [`StopVisitRow`] is written per (bus, stop) visit — the contract the
//! downstream trip-metrics ETL consumes.  Three backends are provided behind
//! Cargo features:
//!
//! | Feature   | Backend  | Files created          |
//! |-----------|----------|------------------------|
//! | *(none)*  | CSV      | `stop_visits.csv`      |
//! | `sqlite`  | SQLite   | `output.db`            |
//! | `parquet` | Parquet  | `stop_visits.parquet`  |
//!
//! All backends implement [`OutputWriter`] and are driven by [`RecordSink`],
//! which implements `hs_sim::EventSink`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use hs_output::{CsvWriter, RecordSink};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let sink = RecordSink::new(writer, config.date, dayparts);
//! let mut sim = SimulationBuilder::new(config, predictor, traffic, sink)
//!     .route(route)
//!     .build()?;
//! sim.run()?;
//! if let Some(e) = sim.world_mut().sink.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod row;
pub mod sink;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "parquet")]
pub mod parquet;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use row::StopVisitRow;
pub use sink::RecordSink;
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;

#[cfg(feature = "parquet")]
pub use parquet::ParquetWriter;

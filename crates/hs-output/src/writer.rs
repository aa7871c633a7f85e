//! The `OutputWriter` trait implemented by all backend writers.

use crate::{OutputResult, StopVisitRow};

/// Trait implemented by CSV, SQLite, and Parquet writers.
///
/// Failures never reach the kernel — [`RecordSink`][crate::RecordSink]
/// stores the first error internally and the host retrieves it after the
/// run.
pub trait OutputWriter {
    /// Write a batch of stop-visit rows.
    fn write_visits(&mut self, rows: &[StopVisitRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}

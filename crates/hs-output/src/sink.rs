//! `RecordSink<W>` — bridges the typed event stream to an `OutputWriter`.

use hs_core::{DaypartTable, ServiceDate};
use hs_sim::{EventSink, SimEvent, StopVisit};

use crate::row::StopVisitRow;
use crate::writer::OutputWriter;
use crate::OutputError;

/// Rows buffered before each batched write.
const BATCH_SIZE: usize = 256;

/// An [`EventSink`] that turns `bus_departure` events into persisted
/// stop-visit rows on any [`OutputWriter`] backend (CSV, SQLite, Parquet, …).
///
/// Errors from the writer are stored internally because the kernel must keep
/// running through sink faults.  After the run, check for errors with
/// [`take_error`][Self::take_error].
pub struct RecordSink<W: OutputWriter> {
    writer: W,
    date: ServiceDate,
    dayparts: DaypartTable,
    buffer: Vec<StopVisitRow>,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> RecordSink<W> {
    /// Create a sink backed by `writer`, stamping rows with the operating
    /// date and resolving dayparts from `dayparts`.
    pub fn new(writer: W, date: ServiceDate, dayparts: DaypartTable) -> Self {
        Self {
            writer,
            date,
            dayparts,
            buffer: Vec::with_capacity(BATCH_SIZE),
            last_error: None,
        }
    }

    /// Take the stored write error (if any) after the run.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn row(&self, visit: &StopVisit) -> StopVisitRow {
        let daypart = self
            .dayparts
            .part_at(visit.actual_arrival.seconds_into_day())
            .name
            .clone();
        StopVisitRow {
            opd_date: self.date.to_string(),
            weekday: self.date.weekday,
            daypart,
            route: visit.line.clone(),
            direction: visit.direction.to_string(),
            trip_id: visit.trip.0,
            stop_code: visit.stop_code.clone(),
            sequence: visit.sequence,
            sched_arr_s: visit.sched_arrival.secs(),
            act_arr_s: visit.actual_arrival.secs(),
            sched_dep_s: visit.sched_departure.secs(),
            act_dep_s: visit.actual_departure.secs(),
            dwell_s: visit.dwell_s + visit.hold_s,
            boarding: visit.boarded,
            alighting: visit.alighted,
            load: visit.load,
            wheelchair_count: visit.wheelchair_count,
            distance_to_next_m: visit.distance_to_next_m,
            distance_to_trip_m: visit.distance_remaining_m,
        }
    }

    fn flush_buffer(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let result = self.writer.write_visits(&self.buffer);
        self.buffer.clear();
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                log::warn!("record sink write failed: {e}");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> EventSink for RecordSink<W> {
    fn emit(&mut self, event: &SimEvent) {
        if let SimEvent::BusDeparture { visit, .. } = event {
            let row = self.row(visit);
            self.buffer.push(row);
            if self.buffer.len() >= BATCH_SIZE {
                self.flush_buffer();
            }
        }
    }

    fn close(&mut self) {
        self.flush_buffer();
        if let Err(e) = self.writer.finish() {
            if self.last_error.is_none() {
                log::warn!("record sink finish failed: {e}");
                self.last_error = Some(e);
            }
        }
    }
}

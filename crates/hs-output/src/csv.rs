//! CSV output backend.
//!
//! Creates `stop_visits.csv` in the configured output directory.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{OutputResult, StopVisitRow};

const HEADER: [&str; 19] = [
    "opd_date",
    "weekday",
    "daypart",
    "route",
    "direction",
    "trip_id",
    "stop_code",
    "sequence",
    "sched_arr_s",
    "act_arr_s",
    "sched_dep_s",
    "act_dep_s",
    "dwell_s",
    "boarding",
    "alighting",
    "load",
    "wheelchair_count",
    "distance_to_next_m",
    "distance_to_trip_m",
];

/// Writes stop-visit records to one CSV file.
pub struct CsvWriter {
    visits: Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Open (or create) `stop_visits.csv` in `dir` and write the header row.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut visits = Writer::from_path(dir.join("stop_visits.csv"))?;
        visits.write_record(HEADER)?;
        Ok(Self { visits, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_visits(&mut self, rows: &[StopVisitRow]) -> OutputResult<()> {
        for row in rows {
            self.visits.write_record(&[
                row.opd_date.clone(),
                row.weekday.to_string(),
                row.daypart.clone(),
                row.route.clone(),
                row.direction.clone(),
                row.trip_id.to_string(),
                row.stop_code.clone(),
                row.sequence.to_string(),
                row.sched_arr_s.to_string(),
                row.act_arr_s.to_string(),
                row.sched_dep_s.to_string(),
                row.act_dep_s.to_string(),
                row.dwell_s.to_string(),
                row.boarding.to_string(),
                row.alighting.to_string(),
                row.load.to_string(),
                row.wheelchair_count.to_string(),
                row.distance_to_next_m.to_string(),
                row.distance_to_trip_m.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.visits.flush()?;
        Ok(())
    }
}

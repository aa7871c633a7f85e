//! Parquet output backend (feature `parquet`).
//!
//! Creates `stop_visits.parquet` in the configured output directory.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Float64Builder, StringBuilder, UInt32Builder, UInt8Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::writer::OutputWriter;
use crate::{OutputResult, StopVisitRow};

fn visit_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("opd_date", DataType::Utf8, false),
        Field::new("weekday", DataType::UInt8, false),
        Field::new("daypart", DataType::Utf8, false),
        Field::new("route", DataType::Utf8, false),
        Field::new("direction", DataType::Utf8, false),
        Field::new("trip_id", DataType::UInt32, false),
        Field::new("stop_code", DataType::Utf8, false),
        Field::new("sequence", DataType::UInt32, false),
        Field::new("sched_arr_s", DataType::Float64, false),
        Field::new("act_arr_s", DataType::Float64, false),
        Field::new("sched_dep_s", DataType::Float64, false),
        Field::new("act_dep_s", DataType::Float64, false),
        Field::new("dwell_s", DataType::Float64, false),
        Field::new("boarding", DataType::UInt32, false),
        Field::new("alighting", DataType::UInt32, false),
        Field::new("load", DataType::UInt32, false),
        Field::new("wheelchair_count", DataType::UInt32, false),
        Field::new("distance_to_next_m", DataType::Float64, false),
        Field::new("distance_to_trip_m", DataType::Float64, false),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

/// Writes stop-visit records to one Parquet file.
///
/// `finish()` **must** be called to write the Parquet footer; files written
/// without calling `finish()` cannot be opened by Parquet readers.
pub struct ParquetWriter {
    visits: Option<ArrowWriter<File>>,
    schema: Arc<Schema>,
}

impl ParquetWriter {
    /// Create `stop_visits.parquet` in `dir`.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let schema = visit_schema();
        let file = File::create(dir.join("stop_visits.parquet"))?;
        let visits = ArrowWriter::try_new(file, Arc::clone(&schema), Some(snappy_props()))?;
        Ok(Self { visits: Some(visits), schema })
    }
}

impl OutputWriter for ParquetWriter {
    fn write_visits(&mut self, rows: &[StopVisitRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.visits.as_mut() else {
            return Ok(());
        };

        let mut opd_dates = StringBuilder::new();
        let mut weekdays = UInt8Builder::new();
        let mut dayparts = StringBuilder::new();
        let mut routes = StringBuilder::new();
        let mut directions = StringBuilder::new();
        let mut trip_ids = UInt32Builder::new();
        let mut stop_codes = StringBuilder::new();
        let mut sequences = UInt32Builder::new();
        let mut sched_arrs = Float64Builder::new();
        let mut act_arrs = Float64Builder::new();
        let mut sched_deps = Float64Builder::new();
        let mut act_deps = Float64Builder::new();
        let mut dwells = Float64Builder::new();
        let mut boardings = UInt32Builder::new();
        let mut alightings = UInt32Builder::new();
        let mut loads = UInt32Builder::new();
        let mut wheelchairs = UInt32Builder::new();
        let mut dist_nexts = Float64Builder::new();
        let mut dist_trips = Float64Builder::new();

        for row in rows {
            opd_dates.append_value(&row.opd_date);
            weekdays.append_value(row.weekday);
            dayparts.append_value(&row.daypart);
            routes.append_value(&row.route);
            directions.append_value(&row.direction);
            trip_ids.append_value(row.trip_id);
            stop_codes.append_value(&row.stop_code);
            sequences.append_value(row.sequence);
            sched_arrs.append_value(row.sched_arr_s);
            act_arrs.append_value(row.act_arr_s);
            sched_deps.append_value(row.sched_dep_s);
            act_deps.append_value(row.act_dep_s);
            dwells.append_value(row.dwell_s);
            boardings.append_value(row.boarding);
            alightings.append_value(row.alighting);
            loads.append_value(row.load);
            wheelchairs.append_value(row.wheelchair_count);
            dist_nexts.append_value(row.distance_to_next_m);
            dist_trips.append_value(row.distance_to_trip_m);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.schema),
            vec![
                Arc::new(opd_dates.finish()),
                Arc::new(weekdays.finish()),
                Arc::new(dayparts.finish()),
                Arc::new(routes.finish()),
                Arc::new(directions.finish()),
                Arc::new(trip_ids.finish()),
                Arc::new(stop_codes.finish()),
                Arc::new(sequences.finish()),
                Arc::new(sched_arrs.finish()),
                Arc::new(act_arrs.finish()),
                Arc::new(sched_deps.finish()),
                Arc::new(act_deps.finish()),
                Arc::new(dwells.finish()),
                Arc::new(boardings.finish()),
                Arc::new(alightings.finish()),
                Arc::new(loads.finish()),
                Arc::new(wheelchairs.finish()),
                Arc::new(dist_nexts.finish()),
                Arc::new(dist_trips.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if let Some(w) = self.visits.take() {
            w.close()?;
        }
        Ok(())
    }
}

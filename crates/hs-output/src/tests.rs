//! Integration tests for hs-output.

use hs_core::{BusId, DaypartTable, Direction, ServiceDate, SimTime, StopId, TripId};
use hs_sim::{EventSink, SimEvent, StopVisit};

use crate::row::StopVisitRow;

fn sample_row(trip_id: u32, sequence: u32) -> StopVisitRow {
    StopVisitRow {
        opd_date: "2024-07-03".into(),
        weekday: 3,
        daypart: "am_peak".into(),
        route: "601".into(),
        direction: "outbound".into(),
        trip_id,
        stop_code: format!("s{sequence}"),
        sequence,
        sched_arr_s: 25_000.0,
        act_arr_s: 25_010.0,
        sched_dep_s: 25_000.0,
        act_dep_s: 25_040.0,
        dwell_s: 30.0,
        boarding: 5,
        alighting: 2,
        load: 12,
        wheelchair_count: 1,
        distance_to_next_m: 800.0,
        distance_to_trip_m: 2_400.0,
    }
}

fn sample_visit() -> StopVisit {
    StopVisit {
        bus: BusId(0),
        trip: TripId(7),
        line: "601".into(),
        direction: Direction::Outbound,
        stop: StopId(2),
        stop_code: "s2".into(),
        sequence: 2,
        sched_arrival: SimTime(25_000.0),
        actual_arrival: SimTime(25_010.0),
        sched_departure: SimTime(25_000.0),
        actual_departure: SimTime(25_040.0),
        dwell_s: 20.0,
        hold_s: 10.0,
        boarded: 5,
        alighted: 2,
        denied: 0,
        load: 12,
        wheelchair_count: 1,
        distance_to_next_m: 800.0,
        distance_remaining_m: 2_400.0,
    }
}

// ── CSV backend ───────────────────────────────────────────────────────────────

mod csv_tests {
    use tempfile::TempDir;

    use super::*;
    use crate::csv::CsvWriter;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn csv_file_created_with_header() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("stop_visits.csv")).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers[0], "opd_date");
        assert_eq!(headers[7], "sequence");
        assert_eq!(headers[18], "distance_to_trip_m");
        assert_eq!(headers.len(), 19);
    }

    #[test]
    fn csv_round_trip() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_visits(&[sample_row(7, 0), sample_row(7, 1)]).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("stop_visits.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "2024-07-03");
        assert_eq!(&rows[0][5], "7"); // trip_id
        assert_eq!(&rows[1][6], "s1"); // stop_code
        assert_eq!(&rows[1][12], "30"); // dwell_s
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn csv_empty_batch_ok() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_visits(&[]).unwrap();
    }
}

// ── RecordSink ────────────────────────────────────────────────────────────────

mod sink_tests {
    use tempfile::TempDir;

    use super::*;
    use crate::csv::CsvWriter;
    use crate::sink::RecordSink;
    use crate::writer::OutputWriter;
    use crate::{OutputResult, StopVisitRow};

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn date() -> ServiceDate {
        ServiceDate::new(2024, 7, 3, 3)
    }

    #[test]
    fn departure_becomes_row() {
        let dir = tmp();
        let writer = CsvWriter::new(dir.path()).unwrap();
        let mut sink = RecordSink::new(writer, date(), DaypartTable::default());

        sink.emit(&SimEvent::BusDeparture { time: SimTime(25_040.0), visit: sample_visit() });
        sink.close();
        assert!(sink.take_error().is_none());

        let mut rdr = csv::Reader::from_path(dir.path().join("stop_visits.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "2024-07-03");
        assert_eq!(&rows[0][1], "3"); // weekday
        // 25 010 s into the day is 06:56:50 → am_peak.
        assert_eq!(&rows[0][2], "am_peak");
        assert_eq!(&rows[0][4], "outbound");
        assert_eq!(&rows[0][12], "30"); // dwell 20 + hold 10
    }

    #[test]
    fn non_departure_events_ignored() {
        let dir = tmp();
        let writer = CsvWriter::new(dir.path()).unwrap();
        let mut sink = RecordSink::new(writer, date(), DaypartTable::default());

        sink.emit(&SimEvent::BusDispatch {
            time: SimTime::ZERO,
            bus: BusId(0),
            trip: TripId(0),
            direction: Direction::Outbound,
            assigned_headway_s: Some(600.0),
        });
        sink.close();

        let mut rdr = csv::Reader::from_path(dir.path().join("stop_visits.csv")).unwrap();
        assert_eq!(rdr.records().count(), 0);
    }

    #[test]
    fn writer_error_stored_not_propagated() {
        struct FailingWriter;
        impl OutputWriter for FailingWriter {
            fn write_visits(&mut self, _rows: &[StopVisitRow]) -> OutputResult<()> {
                Err(std::io::Error::other("disk gone").into())
            }
            fn finish(&mut self) -> OutputResult<()> {
                Ok(())
            }
        }

        let mut sink = RecordSink::new(FailingWriter, date(), DaypartTable::default());
        sink.emit(&SimEvent::BusDeparture { time: SimTime(100.0), visit: sample_visit() });
        // Nothing panics; the error surfaces only on demand.
        sink.close();
        assert!(sink.take_error().is_some());
        assert!(sink.take_error().is_none(), "error is taken exactly once");
    }

    #[test]
    fn end_to_end_simulation_writes_visits() {
        use hs_core::{Route, RouteStop};
        use hs_demand::{ArrivalRateTable, DemandPredictor, WeightsTable};
        use hs_sim::{DispatcherConfig, RampProfileTraffic, SimConfig, SimulationBuilder};

        let config = SimConfig {
            start_time_s: 0.0,
            end_time_s: 3_600.0,
            random_seed: 1,
            date: date(),
            dispatcher: DispatcherConfig::Interval {
                default_interval_s: 1_200.0,
                peak_interval_s: None,
                off_peak_interval_s: None,
                hold_to_interval: false,
            },
            ..SimConfig::default()
        };
        let route = Route::new(
            "601",
            Direction::Outbound,
            vec![
                RouteStop::new("a", 500.0),
                RouteStop::new("b", 500.0),
                RouteStop::new("c", 0.0),
            ],
            vec![],
        )
        .unwrap();
        let predictor = DemandPredictor::new(
            date(),
            DaypartTable::default(),
            ArrivalRateTable::new(),
            WeightsTable::new(),
        );

        let dir = tmp();
        let writer = CsvWriter::new(dir.path()).unwrap();
        let sink = RecordSink::new(writer, date(), DaypartTable::default());
        let traffic = RampProfileTraffic::new(1.0, 1.0, 15.0);

        let mut sim = SimulationBuilder::new(config, predictor, traffic, sink)
            .route(route)
            .build()
            .unwrap();
        sim.run().unwrap();
        assert!(sim.world_mut().sink.take_error().is_none());

        // 3 dispatches (0, 1200, 2400) × 3 stops = 9 visit rows.
        let mut rdr = csv::Reader::from_path(dir.path().join("stop_visits.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 9, "expected 3 trips × 3 stops");
        // Sequences cycle 0,1,2 per trip.
        assert_eq!(&rows[0][7], "0");
        assert_eq!(&rows[2][7], "2");
    }
}

// ── SQLite backend ────────────────────────────────────────────────────────────

#[cfg(feature = "sqlite")]
mod sqlite_tests {
    use tempfile::TempDir;

    use super::*;
    use crate::sqlite::SqliteWriter;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn sqlite_db_created() {
        let dir = tmp();
        let _w = SqliteWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("output.db").exists());
    }

    #[test]
    fn sqlite_visit_count_and_fields() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_visits(&[sample_row(1, 0), sample_row(1, 1), sample_row(2, 0)])
            .unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM stop_visits", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 3);

        let (route, load, dwell): (String, i64, f64) = conn
            .query_row(
                "SELECT route, load, dwell_s FROM stop_visits WHERE trip_id = 2",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!(route, "601");
        assert_eq!(load, 12);
        assert_eq!(dwell, 30.0);
    }

    #[test]
    fn sqlite_finish_idempotent() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }
}

// ── Parquet backend ───────────────────────────────────────────────────────────

#[cfg(feature = "parquet")]
mod parquet_tests {
    use tempfile::TempDir;

    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    use super::*;
    use crate::parquet::ParquetWriter;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn parquet_file_created() {
        let dir = tmp();
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        assert!(dir.path().join("stop_visits.parquet").exists());
    }

    #[test]
    fn parquet_round_trip() {
        let dir = tmp();
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        w.write_visits(&[sample_row(3, 0), sample_row(3, 1)]).unwrap();
        w.finish().unwrap();

        let file = std::fs::File::open(dir.path().join("stop_visits.parquet")).unwrap();
        let builder = ParquetRecordBatchReaderBuilder::try_new(file).unwrap();
        let schema = builder.schema().clone();
        let reader = builder.build().unwrap();

        let batches: Vec<_> = reader.map(|b| b.unwrap()).collect();
        let total_rows: usize = batches.iter().map(|b| b.num_rows()).sum();
        assert_eq!(total_rows, 2);

        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names[0], "opd_date");
        assert_eq!(names[18], "distance_to_trip_m");
    }

    #[test]
    fn parquet_unfinished_file_unreadable() {
        // A Parquet file whose writer was not closed has no footer.
        let dir = tmp();
        {
            let mut w = ParquetWriter::new(dir.path()).unwrap();
            w.write_visits(&[sample_row(0, 0)]).unwrap();
        }
        let file = std::fs::File::open(dir.path().join("stop_visits.parquet")).unwrap();
        assert!(ParquetRecordBatchReaderBuilder::try_new(file).is_err());
    }
}

//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` in the configured output directory with one
//! `stop_visits` table.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{OutputResult, StopVisitRow};

/// Writes stop-visit records to an SQLite database.
pub struct SqliteWriter {
    conn: Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS stop_visits (
                 opd_date            TEXT    NOT NULL,
                 weekday             INTEGER NOT NULL,
                 daypart             TEXT    NOT NULL,
                 route               TEXT    NOT NULL,
                 direction           TEXT    NOT NULL,
                 trip_id             INTEGER NOT NULL,
                 stop_code           TEXT    NOT NULL,
                 sequence            INTEGER NOT NULL,
                 sched_arr_s         REAL    NOT NULL,
                 act_arr_s           REAL    NOT NULL,
                 sched_dep_s         REAL    NOT NULL,
                 act_dep_s           REAL    NOT NULL,
                 dwell_s             REAL    NOT NULL,
                 boarding            INTEGER NOT NULL,
                 alighting           INTEGER NOT NULL,
                 load                INTEGER NOT NULL,
                 wheelchair_count    INTEGER NOT NULL,
                 distance_to_next_m  REAL    NOT NULL,
                 distance_to_trip_m  REAL    NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_visits(&mut self, rows: &[StopVisitRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO stop_visits \
                 (opd_date, weekday, daypart, route, direction, trip_id, stop_code, \
                  sequence, sched_arr_s, act_arr_s, sched_dep_s, act_dep_s, dwell_s, \
                  boarding, alighting, load, wheelchair_count, distance_to_next_m, \
                  distance_to_trip_m) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, \
                         ?15, ?16, ?17, ?18, ?19)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.opd_date,
                    row.weekday,
                    row.daypart,
                    row.route,
                    row.direction,
                    row.trip_id,
                    row.stop_code,
                    row.sequence,
                    row.sched_arr_s,
                    row.act_arr_s,
                    row.sched_dep_s,
                    row.act_dep_s,
                    row.dwell_s,
                    row.boarding,
                    row.alighting,
                    row.load,
                    row.wheelchair_count,
                    row.distance_to_next_m,
                    row.distance_to_trip_m,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}

//! The persisted record type.

/// One (bus, stop) visit as the downstream ETL consumes it.
///
/// Times are seconds since midnight of the operating date; distances are
/// metres.
#[derive(Debug, Clone, PartialEq)]
pub struct StopVisitRow {
    /// Operating date, `YYYY-MM-DD`.
    pub opd_date: String,
    /// ISO weekday, 1 = Monday … 7 = Sunday.
    pub weekday: u8,
    /// Daypart name at the actual arrival time.
    pub daypart: String,
    /// Line identifier (e.g. "601").
    pub route: String,
    pub direction: String,
    pub trip_id: u32,
    pub stop_code: String,
    /// 0-based position of the stop within the trip.
    pub sequence: u32,

    pub sched_arr_s: f64,
    pub act_arr_s: f64,
    pub sched_dep_s: f64,
    pub act_dep_s: f64,
    /// Total stationary time at the stop (door service plus holding).
    pub dwell_s: f64,

    pub boarding: u32,
    pub alighting: u32,
    pub load: u32,
    pub wheelchair_count: u32,

    pub distance_to_next_m: f64,
    /// Metres remaining to the terminus.
    pub distance_to_trip_m: f64,
}

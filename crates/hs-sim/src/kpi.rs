//! KPI tracking: adjustment history, demand samples, utilisation, and the
//! soft-anomaly counters.
//!
//! Counters run unconditionally — the §-level error policy routes soft
//! anomalies here instead of failing the run, so they must be visible even
//! without full KPI sampling.  The sample vectors only accumulate when KPI
//! tracking is enabled.

use hs_core::{BusId, SimTime, StopId};

use crate::dispatcher::HeadwaySample;

// ── Samples ───────────────────────────────────────────────────────────────────

/// One holding-controller intervention.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AdjustmentSample {
    pub time: SimTime,
    pub bus: BusId,
    pub stop: StopId,
    pub hold_s: f64,
}

/// One adaptive dispatch computation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DemandSample {
    pub time: SimTime,
    pub lambda_total: f64,
    pub lambda_avg: f64,
    pub target_headway_s: f64,
}

/// Load factor observed at one bus arrival.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct UtilizationSample {
    pub time: SimTime,
    pub bus: BusId,
    pub load_factor: f64,
}

// ── KpiReport ─────────────────────────────────────────────────────────────────

/// Accumulated KPI state, queryable after the run.
#[derive(Clone, Debug, Default)]
pub struct KpiReport {
    pub headway_adjustments: Vec<AdjustmentSample>,
    pub demand_samples: Vec<DemandSample>,
    pub utilization_samples: Vec<UtilizationSample>,

    // Soft-anomaly counters (always maintained).
    pub zero_demand_fallbacks: u64,
    pub missing_predecessor_skips: u64,
    pub traffic_faults: u64,
    pub denied_boardings: u64,
}

// ── KpiTracker ────────────────────────────────────────────────────────────────

/// Collects KPI data during a run.
#[derive(Debug, Default)]
pub struct KpiTracker {
    enabled: bool,
    report: KpiReport,
}

impl KpiTracker {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, report: KpiReport::default() }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn report(&self) -> &KpiReport {
        &self.report
    }

    pub fn into_report(self) -> KpiReport {
        self.report
    }

    // ── Recording ─────────────────────────────────────────────────────────

    pub fn record_headway(&mut self, time: SimTime, sample: HeadwaySample) {
        if sample.zero_demand {
            self.report.zero_demand_fallbacks += 1;
        }
        if self.enabled {
            self.report.demand_samples.push(DemandSample {
                time,
                lambda_total: sample.lambda_total,
                lambda_avg: sample.lambda_avg,
                target_headway_s: sample.target_headway_s,
            });
        }
    }

    pub fn record_adjustment(&mut self, time: SimTime, bus: BusId, stop: StopId, hold_s: f64) {
        if self.enabled {
            self.report
                .headway_adjustments
                .push(AdjustmentSample { time, bus, stop, hold_s });
        }
    }

    pub fn record_utilization(&mut self, time: SimTime, bus: BusId, load: u32, capacity: u32) {
        if self.enabled && capacity > 0 {
            self.report.utilization_samples.push(UtilizationSample {
                time,
                bus,
                load_factor: load as f64 / capacity as f64,
            });
        }
    }

    pub fn count_missing_predecessor(&mut self) {
        self.report.missing_predecessor_skips += 1;
    }

    pub fn count_traffic_fault(&mut self) {
        self.report.traffic_faults += 1;
    }

    pub fn count_denied(&mut self, n: usize) {
        self.report.denied_boardings += n as u64;
    }

    /// Log a one-line summary (the periodic export event calls this).
    pub fn log_summary(&self, now: SimTime) {
        let r = &self.report;
        log::info!(
            "kpi @ {now}: {} adjustments, {} demand samples, {} denied, \
             {} zero-demand fallbacks, {} predecessor skips, {} traffic faults",
            r.headway_adjustments.len(),
            r.demand_samples.len(),
            r.denied_boardings,
            r.zero_demand_fallbacks,
            r.missing_predecessor_skips,
            r.traffic_faults,
        );
    }
}

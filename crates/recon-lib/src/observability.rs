//! Observability for the coverage reconciler
//!
//! Provides:
//! - Prometheus metrics (run latency, run/truncation counters, coverage gauges)
//! - Structured run-event logging with tracing

use prometheus::{
    register_gauge, register_histogram, register_int_counter, register_int_gauge, Gauge,
    Histogram, IntCounter, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::models::{InstanceResult, RecordSource};
use crate::stats::CoverageReport;

/// Histogram buckets for run latency (in seconds)
const RUN_LATENCY_BUCKETS: &[f64] = &[0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ReconMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct ReconMetricsInner {
    run_latency_seconds: Histogram,
    runs_total: IntCounter,
    run_failures_total: IntCounter,
    truncated_results_total: IntCounter,
    coverage_percent: Gauge,
    total_hosts: IntGauge,
    matched_hosts: IntGauge,
    unmatched_agents: IntGauge,
}

impl ReconMetricsInner {
    fn new() -> Self {
        Self {
            run_latency_seconds: register_histogram!(
                "coverage_reconciler_run_latency_seconds",
                "Time spent on one full reconciliation run",
                RUN_LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register run_latency_seconds"),

            runs_total: register_int_counter!(
                "coverage_reconciler_runs_total",
                "Total number of completed reconciliation runs"
            )
            .expect("Failed to register runs_total"),

            run_failures_total: register_int_counter!(
                "coverage_reconciler_run_failures_total",
                "Total number of failed reconciliation runs"
            )
            .expect("Failed to register run_failures_total"),

            truncated_results_total: register_int_counter!(
                "coverage_reconciler_truncated_results_total",
                "Result sets that hit the provider-side maximum"
            )
            .expect("Failed to register truncated_results_total"),

            coverage_percent: register_gauge!(
                "coverage_reconciler_coverage_percent",
                "Percentage of inventory hosts with a matched agent"
            )
            .expect("Failed to register coverage_percent"),

            total_hosts: register_int_gauge!(
                "coverage_reconciler_total_hosts",
                "Distinct inventory hosts seen in the last run"
            )
            .expect("Failed to register total_hosts"),

            matched_hosts: register_int_gauge!(
                "coverage_reconciler_matched_hosts",
                "Inventory hosts matched to an agent in the last run"
            )
            .expect("Failed to register matched_hosts"),

            unmatched_agents: register_int_gauge!(
                "coverage_reconciler_unmatched_agents",
                "Agents with no inventory record in the last run"
            )
            .expect("Failed to register unmatched_agents"),
        }
    }
}

/// Reconciler metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct ReconMetrics {
    _private: (),
}

impl Default for ReconMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ReconMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ReconMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn observe_run_latency(&self, duration_secs: f64) {
        self.inner().run_latency_seconds.observe(duration_secs);
    }

    pub fn inc_runs(&self) {
        self.inner().runs_total.inc();
    }

    pub fn inc_run_failures(&self) {
        self.inner().run_failures_total.inc();
    }

    pub fn inc_truncated_results(&self) {
        self.inner().truncated_results_total.inc();
    }

    /// Publish the coverage gauges for the latest run
    pub fn set_coverage(&self, report: &CoverageReport, unmatched_agents: usize) {
        self.inner().coverage_percent.set(report.coverage_percent);
        self.inner().total_hosts.set(report.total_hosts as i64);
        self.inner().matched_hosts.set(report.matched_hosts as i64);
        self.inner().unmatched_agents.set(unmatched_agents as i64);
    }
}

/// Structured logger for reconciliation run events
#[derive(Clone)]
pub struct RunLogger {
    account: String,
}

impl RunLogger {
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
        }
    }

    pub fn log_startup(&self, version: &str) {
        info!(
            event = "reconciler_started",
            account = %self.account,
            version = %version,
            "Coverage reconciler started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "reconciler_shutdown",
            account = %self.account,
            reason = %reason,
            "Coverage reconciler shutting down"
        );
    }

    pub fn log_run_started(&self, window_start: &str, window_end: &str) {
        info!(
            event = "run_started",
            account = %self.account,
            window_start = %window_start,
            window_end = %window_end,
            "Starting reconciliation run"
        );
    }

    pub fn log_run_complete(
        &self,
        result: &InstanceResult,
        coverage: &CoverageReport,
        elapsed_ms: u128,
    ) {
        info!(
            event = "run_complete",
            account = %self.account,
            without_agent = result.instances_without_agents.len(),
            with_agent = result.instances_with_agents.len(),
            agents_without_inventory = result.agents_without_inventory.len(),
            coverage_percent = coverage.coverage_percent,
            elapsed_ms = elapsed_ms,
            "Reconciliation run complete"
        );
    }

    pub fn log_run_failed(&self, error: &str) {
        warn!(
            event = "run_failed",
            account = %self.account,
            error = %error,
            "Reconciliation run failed"
        );
    }

    /// A result list reached the provider-side maximum; the reconciliation
    /// view may be incomplete.
    pub fn log_truncation(&self, source: RecordSource, len: usize) {
        warn!(
            event = "results_truncated",
            account = %self.account,
            source = %source,
            records = len,
            "Result set reached the provider-side maximum; view may be incomplete"
        );
    }
}

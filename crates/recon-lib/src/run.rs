//! Single reconciliation run orchestration
//!
//! Drains the agent, inventory, and container-task searches sequentially,
//! normalizes each result set, reconciles, and derives coverage. Every
//! query is fully materialized before normalization begins; nothing here
//! retries (that belongs to the transport behind [`InventorySource`]).

use serde::Serialize;
use std::time::Instant;

use crate::cache::RunCaches;
use crate::error::Result;
use crate::fargate::{self, FargatePartition};
use crate::models::{InstanceResult, Provider, RecordSource};
use crate::normalize::normalize_pages;
use crate::observability::{ReconMetrics, RunLogger};
use crate::reconcile::{reconcile, NormalizedInventory, ReconcileOptions};
use crate::search::{is_truncated, InventorySource, TimeWindow, DEFAULT_LOOKBACK_HOURS};
use crate::stats::{coverage, CoverageReport};

/// Configuration for one reconciliation run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Collection window lookback (1 hour to 7 days)
    pub lookback_hours: u64,
    /// Providers whose inventory participates
    pub providers: Vec<Provider>,
    /// Restrict the inventory side to kubernetes-flagged instances
    pub kubernetes_only: bool,
    /// Subaccount label for reporting context
    pub subaccount: Option<String>,
    /// Also partition Fargate tasks by agent container presence
    pub include_fargate: bool,
    /// Image fragment identifying the agent container
    pub agent_image: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            lookback_hours: DEFAULT_LOOKBACK_HOURS,
            providers: Provider::ALL.to_vec(),
            kubernetes_only: false,
            subaccount: None,
            include_fargate: false,
            agent_image: fargate::DEFAULT_AGENT_IMAGE.to_string(),
        }
    }
}

/// Everything one run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    pub window_start: String,
    pub window_end: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subaccount: Option<String>,
    pub result: InstanceResult,
    pub coverage: CoverageReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fargate: Option<FargatePartition>,
}

/// Run one full reconciliation against `source`.
pub async fn run_once(source: &dyn InventorySource, options: &RunOptions) -> Result<RunOutput> {
    let metrics = ReconMetrics::new();
    let logger = RunLogger::new(options.subaccount.as_deref().unwrap_or("default"));
    let window = TimeWindow::from_lookback_hours(options.lookback_hours)?;
    logger.log_run_started(&window.start_str(), &window.end_str());
    let started = Instant::now();

    let mut caches = RunCaches::new();

    let agent_pages = source.search_agents(window).await?;
    let agent_ids = normalize_pages(RecordSource::Agent, &agent_pages, &mut caches)?;
    check_truncation(&metrics, &logger, RecordSource::Agent, agent_ids.len());

    let mut inventory = NormalizedInventory::default();
    for provider in &options.providers {
        let pages = source.search_inventory(*provider, window).await?;
        let ids = normalize_pages(RecordSource::Inventory(*provider), &pages, &mut caches)?;
        check_truncation(&metrics, &logger, RecordSource::Inventory(*provider), ids.len());
        inventory.set(*provider, ids);
    }

    let fargate = if options.include_fargate {
        let pages = source.search_container_tasks(window).await?;
        Some(fargate::partition_tasks(
            &pages,
            options.subaccount.as_deref().unwrap_or("default"),
            &options.agent_image,
        ))
    } else {
        None
    };

    let reconcile_options = ReconcileOptions {
        kubernetes_only: options.kubernetes_only,
        subaccount: options.subaccount.clone(),
    };
    let result = reconcile(&agent_ids, &inventory, &caches, &reconcile_options)?;
    let report = coverage(&result);

    metrics.observe_run_latency(started.elapsed().as_secs_f64());
    metrics.inc_runs();
    metrics.set_coverage(&report, result.agents_without_inventory.len());
    logger.log_run_complete(&result, &report, started.elapsed().as_millis());

    Ok(RunOutput {
        window_start: window.start_str(),
        window_end: window.end_str(),
        subaccount: options.subaccount.clone(),
        result,
        coverage: report,
        fargate,
    })
}

fn check_truncation(metrics: &ReconMetrics, logger: &RunLogger, source: RecordSource, len: usize) {
    if is_truncated(len) {
        metrics.inc_truncated_results();
        logger.log_truncation(source, len);
    }
}

//! Coverage reconciler service
//!
//! Periodically reconciles monitoring-agent presence against cloud
//! provider inventory and serves the latest result, coverage summary,
//! and Prometheus metrics over HTTP.

use anyhow::Result;
use recon_lib::{
    client::HttpInventorySource,
    health::{components, HealthRegistry},
    observability::{ReconMetrics, RunLogger},
    run::run_once,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting coverage-reconciler");

    let config = config::ServiceConfig::load()?;
    let run_options = config.run_options()?;
    info!(
        api_url = %config.api_url,
        interval_secs = config.interval_secs,
        lookback_hours = config.lookback_hours,
        "Reconciler configured"
    );

    let health_registry = HealthRegistry::new();
    health_registry.register(components::INVENTORY_CLIENT).await;
    health_registry.register(components::RECONCILER).await;

    let metrics = ReconMetrics::new();
    let logger = RunLogger::new(config.subaccount.clone().unwrap_or_else(|| "default".into()));
    logger.log_startup(SERVICE_VERSION);

    let source = HttpInventorySource::new(&config.api_url, &config.api_token)?;

    let state = Arc::new(api::AppState::new(health_registry.clone(), metrics.clone()));
    let api_handle = tokio::spawn(api::serve(config.port, state.clone()));

    let mut ticker = tokio::time::interval(Duration::from_secs(config.interval_secs));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match run_once(&source, &run_options).await {
                    Ok(output) => {
                        *state.last_run.write().await = Some(output);
                        health_registry.set_healthy(components::INVENTORY_CLIENT).await;
                        health_registry.set_healthy(components::RECONCILER).await;
                        health_registry.set_ready(true).await;
                    }
                    Err(err) => {
                        metrics.inc_run_failures();
                        logger.log_run_failed(&err.to_string());
                        // A previous result keeps the service degraded, not dead.
                        if state.last_run.read().await.is_some() {
                            health_registry
                                .set_degraded(components::RECONCILER, err.to_string())
                                .await;
                        } else {
                            health_registry
                                .set_unhealthy(components::RECONCILER, err.to_string())
                                .await;
                        }
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                logger.log_shutdown("SIGINT received");
                info!("Shutting down");
                break;
            }
        }
    }

    api_handle.abort();
    Ok(())
}

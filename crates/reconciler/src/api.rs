//! HTTP API for health checks, Prometheus metrics, and the latest result

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use recon_lib::{
    health::{ComponentStatus, HealthRegistry},
    observability::ReconMetrics,
    run::RunOutput,
};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Shared application state
pub struct AppState {
    pub health_registry: HealthRegistry,
    pub metrics: ReconMetrics,
    /// Output of the most recent successful run
    pub last_run: RwLock<Option<RunOutput>>,
}

impl AppState {
    pub fn new(health_registry: HealthRegistry, metrics: ReconMetrics) -> Self {
        Self {
            health_registry,
            metrics,
            last_run: RwLock::new(None),
        }
    }
}

/// Health check response - returns 200 if healthy/degraded, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK, // Still serving a result
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - ready once the first run has completed
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder.encode(&metric_families, &mut buffer).unwrap();

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Latest reconciliation result, 404 until the first run completes
async fn result(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.last_run.read().await.as_ref() {
        Some(run) => (
            StatusCode::OK,
            Json(serde_json::to_value(&run.result).unwrap_or_default()),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "no reconciliation run has completed yet"})),
        ),
    }
}

/// Latest coverage summary, 404 until the first run completes
async fn coverage(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.last_run.read().await.as_ref() {
        Some(run) => (
            StatusCode::OK,
            Json(serde_json::to_value(&run.coverage).unwrap_or_default()),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "no reconciliation run has completed yet"})),
        ),
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/result", get(result))
        .route("/coverage", get(coverage))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

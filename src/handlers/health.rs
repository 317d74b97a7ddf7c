//! Health, readiness, and statistics endpoints.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check with ingest pipeline status
//! - `GET /ready` - Kubernetes-compatible readiness probe
//! - `GET /stats` - Service counters snapshot
//!
//! # Health vs Readiness
//!
//! - **Health** (`/health`): Returns 200 even if degraded, includes details
//! - **Readiness** (`/ready`): Returns 503 if not ready to serve traffic
//!
//! These routes sit outside the guarded sub-router: probes carry no bearer
//! token, and padding them with the noise delay would break liveness checks.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;
use tracing::instrument;

use crate::models::{HealthResponse, StatsResponse};
use crate::state::AppState;

/// Health check endpoint.
///
/// Returns service health status including ingest pipeline state.
/// Always returns 200 OK with status details in the body.
///
/// # Response Body
///
/// ```json
/// {
///   "status": "healthy",
///   "ingest_open": true,
///   "version": "0.1.0",
///   "timestamp": "2026-08-30T10:30:00Z"
/// }
/// ```
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let ingest_open = state.ingest.is_open();

    Json(HealthResponse {
        status: if ingest_open { "healthy" } else { "degraded" }.to_string(),
        ingest_open,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}

/// Readiness check endpoint for Kubernetes probes.
///
/// Returns 200 OK if the service can accept uploads,
/// 503 Service Unavailable once the drain task has shut down.
#[instrument(skip(state))]
pub async fn readiness_check(State(state): State<AppState>) -> Result<StatusCode, StatusCode> {
    if state.ingest.is_open() {
        Ok(StatusCode::OK)
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

/// Statistics endpoint.
///
/// Returns a snapshot of the service counters. Values come from relaxed
/// atomics and are eventually consistent, not exact point-in-time reads.
///
/// # Response Body
///
/// ```json
/// {
///   "uptime_seconds": 3600,
///   "uploads_accepted": 120,
///   "reports_enqueued": 480,
///   "decoys_discarded": 960
/// }
/// ```
#[instrument(skip(state))]
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        uptime_seconds: state.uptime_seconds(),
        uploads_accepted: state.ingest.uploads_accepted(),
        reports_enqueued: state.ingest.reports_enqueued(),
        decoys_discarded: state.ingest.decoys_discarded(),
    })
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Report;

/// Request body for `POST /v1/uploads`.
#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    /// Reports to ingest
    pub reports: Vec<Report>,
    /// Client-supplied padding used to normalize request sizes.
    ///
    /// Accepted and ignored: it exists so that decoy uploads can match the
    /// byte length of real ones on the wire. The server never inspects it.
    #[serde(default)]
    pub padding: Option<String>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service health status
    pub status: String,
    /// Whether the ingest pipeline is accepting uploads
    pub ingest_open: bool,
    /// Service version
    pub version: String,
    /// Current timestamp
    pub timestamp: DateTime<Utc>,
}

/// Statistics response.
///
/// Counters are eventually consistent snapshots of relaxed atomics, not
/// exact point-in-time values.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Real uploads accepted into the ingest queue
    pub uploads_accepted: u64,
    /// Total reports enqueued across all accepted uploads
    pub reports_enqueued: u64,
    /// Decoy uploads received and discarded
    pub decoys_discarded: u64,
}

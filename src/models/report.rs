use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single report submitted through the intake API.
///
/// The payload is opaque to this service: it is carried to the downstream
/// pipeline unchanged. Only the envelope (kind, size, batch shape) is
/// validated here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Unique report identifier (assigned server-side when omitted)
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Report kind discriminator (e.g., `exposure.summary`)
    pub kind: String,
    /// ISO 8601 timestamp of when the client recorded the report
    #[serde(default = "Utc::now")]
    pub recorded_at: DateTime<Utc>,
    /// Opaque report payload, forwarded as-is
    pub payload: serde_json::Value,
}

impl Report {
    /// Create a new report with the given kind and payload.
    pub fn new(kind: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: kind.into(),
            recorded_at: Utc::now(),
            payload,
        }
    }
}

//! Report upload handler.
//!
//! # Endpoint
//!
//! - `POST /v1/uploads` - Submit a batch of reports (guarded route)
//!
//! # Decoy Traffic
//!
//! Clients send decoy uploads marked with the `X-Dummy-Data` header to hide
//! which of their requests carry real data. Decoys travel the same route as
//! real uploads — same token screening, same padding delay, same body
//! validation — and are discarded just before the ingest queue. Both
//! outcomes answer `204 No Content` with an empty body, so neither response
//! content nor latency separates them.
//!
//! # Configurable Limits
//!
//! - `UPLOAD_MAX_REPORTS` - Maximum reports per upload (default: 100)
//! - `MAX_REQUEST_BODY_SIZE` - Request body cap (default: 1 MiB)

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use tracing::{debug, instrument};

use crate::error::AppResult;
use crate::metrics;
use crate::models::UploadRequest;
use crate::state::AppState;
use crate::validation::validate_upload;

/// Header marking an upload as decoy traffic.
///
/// Recognized values are `1` and `true` (case-insensitive). Anything else,
/// including absence, means a real upload.
pub const DUMMY_DATA_HEADER: &str = "x-dummy-data";

/// Submit a batch of reports.
///
/// # Request Body
///
/// ```json
/// {
///   "reports": [
///     { "kind": "exposure.summary", "recorded_at": "2026-08-30T10:30:00Z", "payload": {} }
///   ],
///   "padding": "optional filler, ignored"
/// }
/// ```
///
/// # Responses
///
/// - `204 No Content` - accepted (real) or discarded (decoy); bodies are
///   identical in both cases
/// - `400 Bad Request` - body failed shape validation
/// - `503 Service Unavailable` - ingest queue full or shut down
#[instrument(skip(state, headers, payload), fields(reports = payload.reports.len()))]
pub async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<UploadRequest>,
) -> AppResult<StatusCode> {
    // Decoys are validated like real uploads: a malformed decoy gets the
    // same 400 a malformed real upload would.
    validate_upload(&payload.reports, state.config.upload_max_reports)?;

    if is_dummy_request(&headers) {
        state.ingest.record_decoy();
        metrics::record_upload("decoy");
        debug!("Decoy upload discarded");
        return Ok(StatusCode::NO_CONTENT);
    }

    let count = payload.reports.len() as u64;
    state.ingest.enqueue(payload.reports)?;
    metrics::record_upload("real");
    metrics::record_reports_enqueued(count);

    Ok(StatusCode::NO_CONTENT)
}

/// Check whether the request is marked as decoy traffic.
fn is_dummy_request(headers: &HeaderMap) -> bool {
    headers
        .get(DUMMY_DATA_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| {
            let v = v.trim();
            v == "1" || v.eq_ignore_ascii_case("true")
        })
}

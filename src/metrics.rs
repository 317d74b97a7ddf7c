//! Prometheus metrics for application observability.
//!
//! Metrics are exposed via a dedicated HTTP listener on `METRICS_PORT`
//! (default: 9090, 0 = disabled).
//!
//! # Available Metrics
//!
//! ## Counters
//! - `intake_uploads_total` - Uploads processed (label: outcome = real | decoy)
//! - `intake_reports_enqueued_total` - Reports handed to the drain task
//! - `intake_token_rejections_total` - Requests rejected by the token format guard
//!
//! ## Histograms
//! - `intake_noise_delay_seconds` - Padding delay applied per guarded request
//!
//! The noise-delay histogram observes the *sampled* delay, not end-to-end
//! request duration; comparing it against the configured distribution is how
//! operators verify the padding is actually being applied.
//!
//! # Usage
//!
//! ```rust,ignore
//! use intake::metrics::{try_init_metrics, record_upload};
//!
//! // Initialize metrics (call once at startup)
//! try_init_metrics(addr);
//!
//! // Record metrics in handlers
//! record_upload("real");
//! ```

use std::net::SocketAddr;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{error, info};

/// Metric names as constants for consistency.
pub mod names {
    pub const UPLOADS_TOTAL: &str = "intake_uploads_total";
    pub const REPORTS_ENQUEUED_TOTAL: &str = "intake_reports_enqueued_total";
    pub const TOKEN_REJECTIONS_TOTAL: &str = "intake_token_rejections_total";
    pub const NOISE_DELAY_SECONDS: &str = "intake_noise_delay_seconds";
}

/// Initialize the Prometheus metrics exporter.
///
/// This sets up metric descriptions and starts the Prometheus HTTP listener
/// on the specified address.
///
/// # Arguments
///
/// * `metrics_addr` - Address for the Prometheus metrics endpoint
///
/// # Errors
///
/// Returns an error message if the exporter cannot be installed.
pub fn init_metrics(metrics_addr: SocketAddr) -> Result<(), String> {
    // Set up Prometheus exporter
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    // Describe all metrics
    describe_counter!(
        names::UPLOADS_TOTAL,
        "Total uploads processed, labeled by outcome (real or decoy)"
    );
    describe_counter!(
        names::REPORTS_ENQUEUED_TOTAL,
        "Total reports handed to the background drain task"
    );
    describe_counter!(
        names::TOKEN_REJECTIONS_TOTAL,
        "Total requests rejected by the bearer-token format guard"
    );

    describe_histogram!(
        names::NOISE_DELAY_SECONDS,
        "Padding delay applied to guarded requests, in seconds"
    );

    info!(addr = %metrics_addr, "Prometheus metrics endpoint started");
    Ok(())
}

/// Try to initialize metrics, logging any errors but not failing.
///
/// This is useful for cases where metrics are optional.
pub fn try_init_metrics(metrics_addr: SocketAddr) {
    if let Err(e) = init_metrics(metrics_addr) {
        error!(error = %e, "Failed to initialize metrics, continuing without metrics");
    }
}

// =============================================================================
// Recording Functions
// =============================================================================

/// Record a processed upload with its outcome (`"real"` or `"decoy"`).
pub fn record_upload(outcome: &str) {
    counter!(names::UPLOADS_TOTAL, "outcome" => outcome.to_string()).increment(1);
}

/// Record reports handed to the drain task.
pub fn record_reports_enqueued(count: u64) {
    counter!(names::REPORTS_ENQUEUED_TOTAL).increment(count);
}

/// Record a token format rejection.
pub fn record_token_rejection() {
    counter!(names::TOKEN_REJECTIONS_TOTAL).increment(1);
}

/// Record the padding delay applied to one request.
pub fn record_noise_delay(delay_secs: f64) {
    histogram!(names::NOISE_DELAY_SECONDS).record(delay_secs);
}

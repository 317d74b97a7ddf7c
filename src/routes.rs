//! Application routing configuration with middleware stack.
//!
//! # Guarded Route Stack (applied in order)
//!
//! ```text
//! Request
//!    │
//!    ▼
//! ┌──────────────────┐
//! │    Slow Down     │ ← padding delay drawn from Normal(mean, sigma)
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │   Token Format   │ ← 400 if the bearer token is not 64 hex chars
//! └────────┬─────────┘
//!          │
//!          ▼
//!    Upload Handler
//! ```
//!
//! The slow-down layer is deliberately outermost: token rejections, body
//! validation failures, accepted uploads, and decoys must all sit behind the
//! same delay draw, or response timing betrays which path a request took.
//!
//! # Route Groups
//!
//! - `/health`, `/ready`, `/stats` - probes, outside the guarded stack
//!   (no token, no padding — delaying probes would break liveness checks)
//! - `/v1/uploads` - guarded report intake
//!
//! The whole router additionally carries body-size limiting, CORS, tracing,
//! and request-id propagation.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers;
use crate::middleware::{SlowDownLayer, TokenFormatLayer};
use crate::state::AppState;

/// Build the application router with all routes and middleware configured.
///
/// # Arguments
///
/// * `state` - Application state containing config, ingest service, and the
///   noise source
///
/// # Returns
///
/// Fully configured Axum router ready to be served.
pub fn build_router(state: AppState) -> Router {
    let config = &state.config;

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    let cors = build_cors_layer(&config.cors_allowed_origins);

    // =========================================================================
    // Guarded Routes
    // =========================================================================
    // Layer order matters: with axum, the layer added last wraps the ones
    // added before it, so SlowDown ends up outermost and TokenFormat sits
    // inside the delay.
    info!(
        mean_ms = config.noise_delay_mean_ms,
        sigma_ms = config.noise_delay_sigma_ms,
        "Response-time noise configured for upload routes"
    );
    let guarded = Router::new()
        .route("/v1/uploads", post(handlers::upload))
        .layer(TokenFormatLayer::new())
        .layer(SlowDownLayer::new(state.noise));

    // =========================================================================
    // Probe Routes (unguarded)
    // =========================================================================
    let probes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/stats", get(handlers::stats));

    let mut router = probes.merge(guarded);

    // =========================================================================
    // Apply Shared Middleware Stack (applied bottom to top)
    // =========================================================================

    // 1. Request body size limit (prevents DoS via large payloads)
    info!(
        max_size_mb = config.max_request_body_size / (1024 * 1024),
        "Request body size limit configured"
    );
    router = router.layer(DefaultBodyLimit::max(config.max_request_body_size));

    // 2. CORS
    router = router.layer(cors);

    // 3. Tracing
    router = router.layer(TraceLayer::new_for_http());

    // 4. Request ID generation + propagation (SetRequestId outermost so the
    //    id exists for every stage below, including the trace spans)
    router = router.layer(PropagateRequestIdLayer::x_request_id());
    router = router.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    router.with_state(state)
}

/// Build CORS layer from configuration.
///
/// # Arguments
///
/// * `allowed_origins` - List of allowed origins, or `["*"]` for any origin
///
/// # Security Note
///
/// Using `*` (any origin) is convenient for development but should be
/// avoided in production. Specify explicit origins instead.
fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    // Check if we should allow any origin
    let allow_any = allowed_origins.iter().any(|o| o == "*");

    if allow_any {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Parse specific origins
        let origins: Vec<_> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

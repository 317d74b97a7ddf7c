//! # Intake
//!
//! A hardened report-intake API: bearer-token shape screening plus
//! response-time noise, built on Axum. Featuring:
//!
//! - **Timing-channel resistance**: every guarded request — accepted,
//!   rejected, or decoy — pays a padding delay drawn from a configured
//!   normal distribution before its outcome is produced
//! - **Strict token screening**: bearer tokens must be exactly 64 hex
//!   characters before any handler logic runs (authenticity checks live in
//!   the upstream authorization service)
//! - **Decoy traffic support**: dummy uploads travel the full pipeline and
//!   answer identically to real ones
//! - **Observability**: request IDs, structured logging, Prometheus metrics,
//!   health endpoints
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Axum HTTP Server                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Shared middleware (Request ID → Trace → CORS → Body limit) │
//! ├──────────────────────────────┬──────────────────────────────┤
//! │  Guarded: /v1/uploads        │  Probes: /health /ready      │
//! │   Slow Down → Token Format   │          /stats              │
//! ├──────────────────────────────┴──────────────────────────────┤
//! │  Handlers (upload, health, stats)                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  IngestService (bounded queue) → background drain task      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use intake::{AppState, Config, build_router};
//!
//! # async fn run() -> intake::AppResult<()> {
//! let config = Config::from_env()?;
//! let state = AppState::new(config)?;
//! let app = build_router(state);
//!
//! // Start the server...
//! # Ok(())
//! # }
//! ```
//!
//! ## Noise Configuration
//!
//! Tune the padding distribution (milliseconds):
//! ```bash
//! NOISE_DELAY_MEAN_MS=150 NOISE_DELAY_SIGMA_MS=20 cargo run
//! ```

pub mod config;
pub mod delay;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod validation;

// Re-exports for convenience
pub use config::Config;
pub use delay::NoiseDelay;
pub use error::{AppError, AppResult};
pub use routes::build_router;
pub use state::AppState;

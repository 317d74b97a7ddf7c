//! Application configuration loaded from environment variables.
//!
//! # Configuration Hierarchy
//!
//! All configuration is loaded from environment variables with sensible defaults
//! for development. In production, configure via environment variables or a `.env` file.
//!
//! # Response-Time Noise Configuration
//!
//! - `NOISE_DELAY_MEAN_MS`: mean of the normal distribution the per-request
//!   padding delay is drawn from
//! - `NOISE_DELAY_SIGMA_MS`: standard deviation of that distribution
//!
//! Both are read once at startup and never mutated afterwards; request
//! handling only ever reads them. Negative or non-finite values are rejected
//! by [`Config::validate`].
//!
//! # Upload Limits
//!
//! - `UPLOAD_MAX_REPORTS`: maximum reports per upload (default: 100)
//! - `MAX_REQUEST_BODY_SIZE`: request body cap in bytes (default: 1 MiB)
//! - `INGEST_QUEUE_DEPTH`: bounded handoff queue capacity (default: 1024)

use std::env;

use crate::error::{AppError, AppResult};

/// Application configuration loaded from environment variables.
///
/// # Example
///
/// ```rust,ignore
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.server_addr());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Server host address (default: "0.0.0.0")
    pub host: String,

    /// Server port (default: 3000)
    pub port: u16,

    // =========================================================================
    // Response-Time Noise Configuration
    // =========================================================================
    /// Mean of the per-request padding delay distribution, in milliseconds.
    ///
    /// Every request on the guarded routes pays a delay drawn from
    /// Normal(mean, sigma) before its handler runs, so that rejected,
    /// accepted, and decoy requests are indistinguishable by latency.
    pub noise_delay_mean_ms: f64,

    /// Standard deviation of the padding delay distribution, in milliseconds.
    ///
    /// Zero is allowed and yields a constant delay of exactly the mean.
    pub noise_delay_sigma_ms: f64,

    // =========================================================================
    // Upload Limits Configuration
    // =========================================================================
    /// Maximum number of reports in a single upload (default: 100)
    pub upload_max_reports: usize,

    /// Maximum request body size in bytes (default: 1MB)
    /// Prevents denial-of-service via large payloads
    pub max_request_body_size: usize,

    /// Capacity of the bounded queue between the HTTP layer and the
    /// background drain task (default: 1024 batches)
    pub ingest_queue_depth: usize,

    // =========================================================================
    // Security Configuration
    // =========================================================================
    /// Comma-separated list of allowed CORS origins
    /// Use "*" to allow all origins (not recommended for production)
    /// Example: `<https://app.example.com>,<https://admin.example.com>`
    pub cors_allowed_origins: Vec<String>,

    // =========================================================================
    // Observability Configuration
    // =========================================================================
    /// Log level (e.g., "info", "debug", "trace")
    pub log_level: String,

    /// Port for Prometheus metrics endpoint (default: 9090, 0 = disabled)
    pub metrics_port: u16,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if any required configuration is invalid
    /// (e.g., non-numeric PORT value, negative noise parameters).
    pub fn from_env() -> AppResult<Self> {
        // Load an .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let config = Self {
            // Server
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: Self::parse_env("PORT", 3000)?,

            // Response-time noise
            noise_delay_mean_ms: Self::parse_env("NOISE_DELAY_MEAN_MS", 150.0)?,
            noise_delay_sigma_ms: Self::parse_env("NOISE_DELAY_SIGMA_MS", 20.0)?,

            // Upload limits
            upload_max_reports: Self::parse_env("UPLOAD_MAX_REPORTS", 100)?,
            max_request_body_size: Self::parse_env("MAX_REQUEST_BODY_SIZE", 1024 * 1024)?, // 1MB
            ingest_queue_depth: Self::parse_env("INGEST_QUEUE_DEPTH", 1024)?,

            // Security
            cors_allowed_origins: Self::parse_cors_origins(),

            // Observability
            log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            metrics_port: Self::parse_env("METRICS_PORT", 9090)?,
        };

        // Validate configuration before returning
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values for consistency and correctness.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if validation fails.
    fn validate(&self) -> AppResult<()> {
        // The noise distribution parameters must describe a real distribution.
        // Samples from the tails can still be negative at runtime; that case
        // is floored by the delay primitive, not rejected here.
        if !self.noise_delay_mean_ms.is_finite() || self.noise_delay_mean_ms < 0.0 {
            return Err(AppError::Config(format!(
                "NOISE_DELAY_MEAN_MS must be a finite value >= 0 (got {})",
                self.noise_delay_mean_ms
            )));
        }

        if !self.noise_delay_sigma_ms.is_finite() || self.noise_delay_sigma_ms < 0.0 {
            return Err(AppError::Config(format!(
                "NOISE_DELAY_SIGMA_MS must be a finite value >= 0 (got {})",
                self.noise_delay_sigma_ms
            )));
        }

        // Validate upload limits are positive
        if self.upload_max_reports == 0 {
            return Err(AppError::Config(
                "UPLOAD_MAX_REPORTS must be greater than 0".to_string(),
            ));
        }

        if self.max_request_body_size == 0 {
            return Err(AppError::Config(
                "MAX_REQUEST_BODY_SIZE must be greater than 0".to_string(),
            ));
        }

        if self.ingest_queue_depth == 0 {
            return Err(AppError::Config(
                "INGEST_QUEUE_DEPTH must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the full server address for binding.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if Prometheus metrics export is enabled.
    pub fn metrics_enabled(&self) -> bool {
        self.metrics_port > 0
    }

    /// Get the metrics endpoint address.
    ///
    /// Returns `None` if metrics are disabled (port = 0).
    pub fn metrics_addr(&self) -> Option<std::net::SocketAddr> {
        if self.metrics_enabled() {
            Some(std::net::SocketAddr::from((
                [0, 0, 0, 0],
                self.metrics_port,
            )))
        } else {
            None
        }
    }

    /// Parse an environment variable into the specified type with a default value.
    fn parse_env<T>(name: &str, default: T) -> AppResult<T>
    where
        T: std::str::FromStr + ToString,
        T::Err: std::fmt::Display,
    {
        match env::var(name) {
            Ok(val) => val
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid {name}: {e}"))),
            Err(_) => Ok(default),
        }
    }

    /// Parse CORS allowed origins from environment variable.
    fn parse_cors_origins() -> Vec<String> {
        env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Default configuration for testing and development.
///
/// Production deployments should use `Config::from_env()` instead.
impl Default for Config {
    fn default() -> Self {
        Self {
            // Server
            host: "0.0.0.0".to_string(),
            port: 3000,
            // Response-time noise
            noise_delay_mean_ms: 150.0,
            noise_delay_sigma_ms: 20.0,
            // Upload limits
            upload_max_reports: 100,
            max_request_body_size: 1024 * 1024, // 1MB
            ingest_queue_depth: 1024,
            // Security
            cors_allowed_origins: vec!["*".to_string()],
            // Observability
            log_level: "info".to_string(),
            metrics_port: 9090,
        }
    }
}

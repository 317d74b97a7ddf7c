//! Response-time noise primitive.
//!
//! Upload endpoints must not leak, through their latency, whether a request
//! was accepted, rejected early, or failed deep inside the handler. Every
//! request on the guarded routes therefore pays a padding delay drawn from a
//! normal distribution before its handler (or its rejection) is produced.
//!
//! The distribution is parameterized in milliseconds and converted to seconds
//! at sample time. Tail samples below zero are floored to a zero-length
//! delay; the suspension point is kept even then, so a floored request still
//! yields to the scheduler exactly once like every other request.

use std::time::Duration;

use rand_distr::{Distribution, Normal};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Samples per-request padding delays from `Normal(mean_ms, sigma_ms)`.
///
/// Construction validates the parameters once; sampling afterwards is
/// infallible and lock-free (each call draws from the thread-local RNG).
#[derive(Debug, Clone, Copy)]
pub struct NoiseDelay {
    dist: Normal<f64>,
}

impl NoiseDelay {
    /// Create a noise source from distribution parameters in milliseconds.
    ///
    /// A sigma of zero is allowed and yields a constant delay. A negative
    /// mean is allowed here (every sample floors to zero); operational
    /// configuration rejects it earlier in `Config::validate`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if either parameter is non-finite or the
    /// sigma is negative.
    pub fn new(mean_ms: f64, sigma_ms: f64) -> AppResult<Self> {
        if !mean_ms.is_finite() || !sigma_ms.is_finite() {
            return Err(AppError::Config(format!(
                "noise delay parameters must be finite (mean: {mean_ms}, sigma: {sigma_ms})"
            )));
        }

        // Normal::new only rejects non-finite std_dev; a negative sigma has
        // to be caught here.
        if sigma_ms < 0.0 {
            return Err(AppError::Config(format!(
                "noise delay sigma must not be negative (got {sigma_ms})"
            )));
        }

        let dist = Normal::new(mean_ms, sigma_ms).map_err(|e| {
            AppError::Config(format!("invalid noise delay distribution: {e}"))
        })?;

        Ok(Self { dist })
    }

    /// Create a noise source from the application configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the configured parameters are invalid.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(config.noise_delay_mean_ms, config.noise_delay_sigma_ms)
    }

    /// Draw one padding delay.
    ///
    /// The millisecond sample is divided by 1000 and interpreted as seconds.
    /// Samples at or below zero are floored to `Duration::ZERO` rather than
    /// redrawn, so the draw stays O(1) and the floor stays explicit.
    pub fn sample(&self) -> Duration {
        let delay_ms = self.dist.sample(&mut rand::rng());
        let delay_secs = (delay_ms / 1000.0).max(0.0);
        Duration::try_from_secs_f64(delay_secs).unwrap_or(Duration::ZERO)
    }

    /// Suspend the current task for one freshly drawn padding delay.
    ///
    /// A floored (zero) sample still yields to the scheduler once, so the
    /// await point is unconditional regardless of the drawn value.
    pub async fn wait(&self) {
        suspend(self.sample()).await;
    }
}

/// Suspend the current task for `delay` without blocking the thread.
///
/// A zero delay degrades to a bare scheduler yield rather than skipping the
/// await entirely, so callers get exactly one suspension point either way.
pub async fn suspend(delay: Duration) {
    if delay.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(delay).await;
    }
}

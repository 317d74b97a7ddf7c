//! Response-time normalization middleware.
//!
//! Every request passing through this layer pays a padding delay drawn from
//! [`NoiseDelay`] before the inner service runs. Because the delay happens
//! up front and unconditionally, the total latency of a shape-rejected
//! request, an accepted upload, a failed upload, and a decoy all come from
//! the same distribution — an observer timing responses learns nothing
//! about which path a request took.
//!
//! # Ordering
//!
//! This layer must be the *outermost* stage on the guarded routes, wrapping
//! [`TokenFormatLayer`](super::TokenFormatLayer) and the handler uniformly.
//! If the token guard ran outside the delay, early rejections would return
//! measurably faster than handler failures and the mitigation would be
//! defeated.
//!
//! # Passthrough
//!
//! The inner service's response — success or error — is returned unchanged.
//! The delay is applied once, before invocation; handler-side failures are
//! not delayed a second time.

use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Request, Response};
use tower::{Layer, Service};

use crate::config::Config;
use crate::delay::{self, NoiseDelay};
use crate::error::AppResult;
use crate::metrics;

/// Response-time normalization layer.
///
/// Copyable: the noise source holds only the distribution parameters, so
/// cloning per-route or per-request costs nothing.
#[derive(Clone, Copy, Debug)]
pub struct SlowDownLayer {
    noise: NoiseDelay,
}

impl SlowDownLayer {
    /// Create a layer around an existing noise source.
    pub fn new(noise: NoiseDelay) -> Self {
        Self { noise }
    }

    /// Create a layer from the application configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the configured distribution parameters
    /// are invalid.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        Ok(Self::new(NoiseDelay::from_config(config)?))
    }
}

impl<S> Layer<S> for SlowDownLayer {
    type Service = SlowDownService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SlowDownService {
            inner,
            noise: self.noise,
        }
    }
}

/// Response-time normalization service wrapper.
#[derive(Clone)]
pub struct SlowDownService<S> {
    inner: S,
    noise: NoiseDelay,
}

impl<S> Service<Request<Body>> for SlowDownService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let noise = self.noise;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let padding = noise.sample();
            metrics::record_noise_delay(padding.as_secs_f64());
            delay::suspend(padding).await;

            inner.call(req).await
        })
    }
}

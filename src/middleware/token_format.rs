//! Bearer-token shape screening middleware.
//!
//! # What Is (and Is Not) Checked
//!
//! Upload clients authenticate with a bearer token that is the hex encoding
//! of a 256-bit digest: exactly 64 characters from `[A-Fa-f0-9]`. This layer
//! rejects anything else before the handler runs — a missing Authorization
//! header, a non-`Bearer` scheme, or a token of the wrong shape all fail the
//! same way, with a `SchemaValidation` error translated to 400.
//!
//! Token *authenticity* is deliberately not verified here; that belongs to
//! the upstream authorization service. No token value is ever compared
//! against a secret, logged, or retained past the request.
//!
//! # Ordering
//!
//! This layer must sit *inside* [`SlowDownLayer`](super::SlowDownLayer).
//! A shape rejection that escaped the padding delay would be distinguishable
//! by latency from a deeper handler failure, which is exactly the signal the
//! padding exists to remove. See [`crate::routes`] for the composed stack.

use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Request, Response, header};
use axum::response::IntoResponse;
use tower::{Layer, Service};
use tracing::warn;

use crate::error::AppError;
use crate::metrics;

/// Required bearer token length: a sha256 digest in hex.
pub const TOKEN_LENGTH: usize = 64;

/// Authorization scheme prefix, per RFC 6750.
const BEARER_PREFIX: &str = "Bearer ";

/// Bearer-token shape screening layer.
///
/// Stateless: the same layer value can guard any number of routes and serve
/// concurrent requests without synchronization.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokenFormatLayer;

impl TokenFormatLayer {
    /// Create a new token format layer.
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for TokenFormatLayer {
    type Service = TokenFormatService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TokenFormatService { inner }
    }
}

/// Token format screening service wrapper.
#[derive(Clone)]
pub struct TokenFormatService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for TokenFormatService<S>
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
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let shape_ok = extract_bearer_token(&req).is_some_and(is_valid_token_format);

            if shape_ok {
                return inner.call(req).await;
            }

            metrics::record_token_rejection();
            warn!(
                path = %req.uri().path(),
                "Bearer token missing or failed the shape check"
            );

            Ok(AppError::SchemaValidation(format!(
                "Bearer token must be exactly {TOKEN_LENGTH} hexadecimal characters"
            ))
            .into_response())
        })
    }
}

/// Extract the bearer token from the Authorization header.
///
/// Only the exact `Bearer ` scheme is honored; any other scheme (or a
/// header value that is not valid ASCII) counts as an absent token.
fn extract_bearer_token<B>(req: &Request<B>) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?;
    let value = value.to_str().ok()?;
    value.strip_prefix(BEARER_PREFIX)
}

/// Check whether a token has the required shape: exactly 64 hex characters.
///
/// The length check is in bytes, which equals the character count for the
/// all-ASCII strings that can pass the hex-digit check; any multi-byte
/// character fails `is_ascii_hexdigit` outright.
pub fn is_valid_token_format(token: &str) -> bool {
    token.len() == TOKEN_LENGTH && token.bytes().all(|b| b.is_ascii_hexdigit())
}

//! Latency-distribution properties of the guarded routes.
//!
//! These tests run under tokio's paused clock (`start_paused = true`), so
//! the padding delays elapse in virtual time: a 200ms mean costs nothing in
//! wall-clock terms, and measured durations are exact rather than subject
//! to scheduler jitter.
//!
//! The property under test is the ordering invariant of the middleware
//! stack: a request rejected by the token format guard and a request that
//! passes the guard but fails (or succeeds) in the handler must all pay the
//! padding delay, so their total latencies come from the same distribution.
//!
//! Run with: `cargo test --test timing_tests`
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::json;
use tower::ServiceExt;

use intake::{AppState, Config, NoiseDelay, build_router};

const MEAN_MS: f64 = 200.0;

fn padded_config() -> Config {
    Config {
        // Degenerate distribution: every request pays exactly the mean, so
        // virtual-time assertions are exact.
        noise_delay_mean_ms: MEAN_MS,
        noise_delay_sigma_ms: 0.0,
        metrics_port: 0,
        ..Config::default()
    }
}

fn padded_app() -> Router {
    let state = AppState::new(padded_config()).expect("state");
    build_router(state)
}

fn upload_request(token: Option<&str>, body: String) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/v1/uploads")
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    builder.body(Body::from(body)).expect("request")
}

fn valid_body() -> String {
    json!({ "reports": [{ "kind": "exposure.summary", "payload": {} }] }).to_string()
}

async fn timed_status(app: Router, req: Request<Body>) -> (StatusCode, Duration) {
    let start = tokio::time::Instant::now();
    let resp = app.oneshot(req).await.expect("response");
    (resp.status(), start.elapsed())
}

#[tokio::test(start_paused = true)]
async fn accepted_upload_pays_the_padding_delay() {
    let (status, elapsed) = timed_status(
        padded_app(),
        upload_request(Some(&"a".repeat(64)), valid_body()),
    )
    .await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(elapsed >= Duration::from_millis(200), "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn token_rejection_pays_the_same_delay() {
    // The guard short-circuits before the handler, but it sits inside the
    // slow-down layer, so the rejection is delayed like everything else.
    let (status, elapsed) = timed_status(
        padded_app(),
        upload_request(Some(&format!("zz{}", "0".repeat(62))), valid_body()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(elapsed >= Duration::from_millis(200), "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn missing_token_pays_the_same_delay() {
    let (status, elapsed) = timed_status(padded_app(), upload_request(None, valid_body())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(elapsed >= Duration::from_millis(200), "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn body_validation_failure_pays_the_same_delay() {
    // Valid token, invalid body: fails past the guard, inside the handler.
    let (status, elapsed) = timed_status(
        padded_app(),
        upload_request(Some(&"a".repeat(64)), json!({ "reports": [] }).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(elapsed >= Duration::from_millis(200), "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn decoy_upload_pays_the_same_delay() {
    let mut req = upload_request(Some(&"a".repeat(64)), valid_body());
    req.headers_mut()
        .insert("x-dummy-data", "1".parse().unwrap());

    let (status, elapsed) = timed_status(padded_app(), req).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(elapsed >= Duration::from_millis(200), "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn early_rejection_is_not_systematically_faster() {
    // With sigma = 0 every path pays exactly the mean, so rejected and
    // accepted requests are indistinguishable by latency.
    let (_, rejected) = timed_status(
        padded_app(),
        upload_request(Some(&"a".repeat(63)), valid_body()),
    )
    .await;
    let (_, accepted) = timed_status(
        padded_app(),
        upload_request(Some(&"a".repeat(64)), valid_body()),
    )
    .await;

    assert!(rejected >= Duration::from_millis(200));
    assert!(accepted >= Duration::from_millis(200));
    // Neither path should add more than a few ms of processing on top of
    // the virtual-time delay.
    assert!(rejected < Duration::from_millis(210));
    assert!(accepted < Duration::from_millis(210));
}

#[tokio::test(start_paused = true)]
async fn probes_are_not_padded() {
    let app = padded_app();
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("request");

    let start = tokio::time::Instant::now();
    let resp = app.oneshot(req).await.expect("response");

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(start.elapsed() < Duration::from_millis(1));
}

// =============================================================================
// Distribution Shape
// =============================================================================

#[test]
fn sampled_delays_follow_the_configured_distribution() {
    // Normal(100, 10): with n = 4000 the standard error of the mean is
    // sigma / sqrt(n) ~ 0.16ms, so a 2ms tolerance is over ten standard
    // errors; false failures are negligible.
    let noise = NoiseDelay::new(100.0, 10.0).expect("noise");
    let n = 4_000usize;

    let samples: Vec<f64> = (0..n)
        .map(|_| noise.sample().as_secs_f64() * 1000.0)
        .collect();

    let mean = samples.iter().sum::<f64>() / n as f64;
    let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let stddev = variance.sqrt();

    assert!((mean - 100.0).abs() < 2.0, "empirical mean {mean}ms");
    assert!((stddev - 10.0).abs() < 1.5, "empirical stddev {stddev}ms");
}

#[test]
fn sampled_delays_are_never_negative() {
    // Normal(1, 50) draws below zero most of the time; the floor must hold.
    let noise = NoiseDelay::new(1.0, 50.0).expect("noise");

    for _ in 0..2_000 {
        assert!(noise.sample() >= Duration::ZERO);
    }
}

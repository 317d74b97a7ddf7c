//! End-to-end tests driving the built router in-process.
//!
//! Every test builds the real router (all middleware attached) and sends
//! requests through `tower::ServiceExt::oneshot`, so the token format guard
//! and the slow-down layer are exercised exactly as in production. The noise
//! distribution is configured to Normal(0, 0) here so requests complete
//! immediately; latency properties are covered in `timing_tests.rs`.
//!
//! Run with: `cargo test --test router_tests`
#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::json;
use tower::ServiceExt;

use intake::{AppState, Config, build_router};

/// A token with the required shape: 64 lowercase hex characters.
fn valid_token() -> String {
    "a".repeat(64)
}

fn test_config() -> Config {
    Config {
        noise_delay_mean_ms: 0.0,
        noise_delay_sigma_ms: 0.0,
        metrics_port: 0,
        upload_max_reports: 10,
        ..Config::default()
    }
}

fn test_app() -> (Router, AppState) {
    let state = AppState::new(test_config()).expect("state");
    (build_router(state.clone()), state)
}

fn upload_body() -> String {
    json!({
        "reports": [
            { "kind": "exposure.summary", "payload": { "risk": 3 } }
        ]
    })
    .to_string()
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

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), 64 * 1024)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

// =============================================================================
// Probe Routes
// =============================================================================

#[tokio::test]
async fn health_returns_ok_without_token() {
    let (app, _state) = test_app();

    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("request");
    let resp = app.oneshot(req).await.expect("response");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["ingest_open"], true);
}

#[tokio::test]
async fn ready_returns_ok_while_drain_task_runs() {
    let (app, _state) = test_app();

    let req = Request::builder()
        .uri("/ready")
        .body(Body::empty())
        .expect("request");
    let resp = app.oneshot(req).await.expect("response");

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn stats_reflects_counters() {
    let (app, state) = test_app();

    let resp = app
        .clone()
        .oneshot(upload_request(Some(&valid_token()), upload_body()))
        .await
        .expect("response");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = Request::builder()
        .uri("/stats")
        .body(Body::empty())
        .expect("request");
    let resp = app.oneshot(req).await.expect("response");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["uploads_accepted"], 1);
    assert_eq!(body["reports_enqueued"], 1);
    assert_eq!(body["decoys_discarded"], 0);

    state.shutdown().await;
}

// =============================================================================
// Token Format Screening
// =============================================================================

#[tokio::test]
async fn upload_without_token_is_schema_rejected() {
    let (app, _state) = test_app();

    let resp = app
        .oneshot(upload_request(None, upload_body()))
        .await
        .expect("response");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "schema_validation");
}

#[tokio::test]
async fn upload_with_valid_token_is_accepted() {
    let (app, _state) = test_app();

    let resp = app
        .oneshot(upload_request(Some(&valid_token()), upload_body()))
        .await
        .expect("response");

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn upload_with_mixed_case_token_is_accepted() {
    let (app, _state) = test_app();
    let token = format!("A1b2{}", "0".repeat(60));

    let resp = app
        .oneshot(upload_request(Some(&token), upload_body()))
        .await
        .expect("response");

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn upload_with_malformed_tokens_is_rejected() {
    // Wrong length (63 and 65), out-of-set characters, empty.
    let bad_tokens = [
        String::new(),
        "a".repeat(63),
        "a".repeat(65),
        format!("g{}", "0".repeat(63)),
        format!("zz{}", "0".repeat(62)),
    ];

    for token in &bad_tokens {
        let (app, _state) = test_app();
        let resp = app
            .oneshot(upload_request(Some(token), upload_body()))
            .await
            .expect("response");

        assert_eq!(
            resp.status(),
            StatusCode::BAD_REQUEST,
            "token {token:?} should be rejected"
        );
        let body = body_json(resp).await;
        assert_eq!(body["error"], "schema_validation");
    }
}

#[tokio::test]
async fn rejected_upload_never_reaches_ingest() {
    let (app, state) = test_app();

    let resp = app
        .oneshot(upload_request(Some(&"a".repeat(63)), upload_body()))
        .await
        .expect("response");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert_eq!(state.ingest.uploads_accepted(), 0);
    assert_eq!(state.ingest.reports_enqueued(), 0);
}

// =============================================================================
// Upload Body Validation
// =============================================================================

#[tokio::test]
async fn empty_report_list_is_rejected() {
    let (app, _state) = test_app();
    let body = json!({ "reports": [] }).to_string();

    let resp = app
        .oneshot(upload_request(Some(&valid_token()), body))
        .await
        .expect("response");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "schema_validation");
}

#[tokio::test]
async fn oversized_batch_is_rejected() {
    let (app, _state) = test_app();
    let reports: Vec<_> = (0..11)
        .map(|_| json!({ "kind": "exposure.summary", "payload": {} }))
        .collect();
    let body = json!({ "reports": reports }).to_string();

    let resp = app
        .oneshot(upload_request(Some(&valid_token()), body))
        .await
        .expect("response");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn padding_field_is_accepted_and_ignored() {
    let (app, state) = test_app();
    let body = json!({
        "reports": [{ "kind": "exposure.summary", "payload": {} }],
        "padding": "x".repeat(512),
    })
    .to_string();

    let resp = app
        .oneshot(upload_request(Some(&valid_token()), body))
        .await
        .expect("response");

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(state.ingest.uploads_accepted(), 1);
}

// =============================================================================
// Decoy Traffic
// =============================================================================

#[tokio::test]
async fn decoy_upload_is_discarded_but_answered_identically() {
    let (app, state) = test_app();

    let mut real = upload_request(Some(&valid_token()), upload_body());
    real.headers_mut()
        .insert("x-dummy-data", "0".parse().unwrap());
    let real_resp = app.clone().oneshot(real).await.expect("response");

    let mut decoy = upload_request(Some(&valid_token()), upload_body());
    decoy
        .headers_mut()
        .insert("x-dummy-data", "1".parse().unwrap());
    let decoy_resp = app.oneshot(decoy).await.expect("response");

    // Identical status and identical (empty) bodies for both outcomes.
    assert_eq!(real_resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(decoy_resp.status(), StatusCode::NO_CONTENT);

    let real_body = axum::body::to_bytes(real_resp.into_body(), 1024)
        .await
        .expect("body");
    let decoy_body = axum::body::to_bytes(decoy_resp.into_body(), 1024)
        .await
        .expect("body");
    assert!(real_body.is_empty());
    assert_eq!(real_body, decoy_body);

    // Only the real upload reached the queue.
    assert_eq!(state.ingest.uploads_accepted(), 1);
    assert_eq!(state.ingest.decoys_discarded(), 1);
}

#[tokio::test]
async fn decoy_upload_still_needs_a_well_formed_token() {
    let (app, state) = test_app();

    let mut decoy = upload_request(Some("not-hex"), upload_body());
    decoy
        .headers_mut()
        .insert("x-dummy-data", "true".parse().unwrap());
    let resp = app.oneshot(decoy).await.expect("response");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(state.ingest.decoys_discarded(), 0);
}

// =============================================================================
// Ingest Backpressure
// =============================================================================

#[tokio::test]
async fn closed_ingest_queue_yields_service_unavailable() {
    let (app, state) = test_app();

    // Stop the drain task; the sender side stays alive in the state.
    state.shutdown().await;

    let resp = app
        .oneshot(upload_request(Some(&valid_token()), upload_body()))
        .await
        .expect("response");

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "unavailable");
}

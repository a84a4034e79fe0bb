//! Tests for the health/metrics endpoints.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use registry_gate::HealthState;
use registry_gate::health::create_router;

async fn get(state: Arc<HealthState>, path: &str) -> (StatusCode, String) {
    let app = create_router(state);
    let response = app
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_healthz_always_ok() {
    let state = Arc::new(HealthState::new());
    let (status, body) = get(state, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_readyz_follows_ready_flag() {
    let state = Arc::new(HealthState::new());
    let (status, _) = get(state.clone(), "/readyz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    state.set_ready(true).await;
    let (status, body) = get(state, "/readyz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ready");
}

#[tokio::test]
async fn test_metrics_exposes_decision_counters() {
    let state = Arc::new(HealthState::new());
    state.metrics.record_decision(false);

    let (status, body) = get(state, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("registry_gate_reviews"));
    assert!(body.contains("decision=\"denied\""));
}

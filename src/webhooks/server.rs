//! Admission webhook server.
//!
//! Serves the single `POST /` endpoint the ValidatingWebhookConfiguration
//! points at. The admission webhook protocol mandates HTTPS, so the server
//! only runs with TLS; certificate and key paths come from [`Settings`].
//!
//! The JSON extractor owns transport-level failures: a body that is not
//! valid JSON is rejected with a 400 before the policy ever runs. Anything
//! that deserializes, however sparse, gets a decision.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use thiserror::Error;
use tracing::{debug, info};

use crate::admission::{AdmissionReview, AdmissionReviewReply};
use crate::config::Settings;
use crate::health::HealthState;
use crate::webhooks::policy;

/// Shared state for the webhook handler
pub struct WebhookState {
    pub settings: Settings,
    pub health: Arc<HealthState>,
}

impl WebhookState {
    pub fn new(settings: Settings, health: Arc<HealthState>) -> Self {
        Self { settings, health }
    }
}

/// Errors that can occur when running the webhook server
#[derive(Error, Debug)]
pub enum WebhookError {
    /// TLS certificate or key could not be loaded
    #[error("failed to load TLS material: {0}")]
    Tls(#[source] std::io::Error),

    /// Server bind or serve error
    #[error("webhook server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Create the webhook router
pub fn create_webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new().route("/", post(review_pod)).with_state(state)
}

/// Admission review handler
async fn review_pod(
    State(state): State<Arc<WebhookState>>,
    Json(review): Json<AdmissionReview>,
) -> Json<AdmissionReviewReply> {
    let uid = review
        .request
        .as_ref()
        .and_then(|request| request.uid.clone());
    debug!(uid = ?uid, "received admission review");

    let response = policy::evaluate(&review, &state.settings.image_prefix);
    state.health.metrics.record_decision(response.is_allowed());

    Json(AdmissionReviewReply::from(response))
}

/// Run the webhook server with TLS.
///
/// Binds 0.0.0.0 on the configured webhook port and serves until the process
/// shuts down. Certificate and key are read once at startup; a reload
/// requires a restart.
pub async fn run_webhook_server(state: Arc<WebhookState>) -> Result<(), WebhookError> {
    use axum_server::tls_rustls::RustlsConfig;

    let port = state.settings.webhook_port;
    let config = RustlsConfig::from_pem_file(
        PathBuf::from(&state.settings.cert_path),
        PathBuf::from(&state.settings.key_path),
    )
    .await
    .map_err(WebhookError::Tls)?;

    let app = create_webhook_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(port, "webhook server listening with TLS");

    axum_server::bind_rustls(addr, config)
        .serve(app.into_make_service())
        .await
        .map_err(WebhookError::Serve)?;

    Ok(())
}

//! registry-gate - A validating admission webhook for private registry images.
//!
//! This is the main entry point that:
//! - Initializes structured logging
//! - Loads process configuration from the environment (fatal if incomplete)
//! - Starts the health server and the TLS webhook server
//! - Shuts down gracefully on SIGTERM/SIGINT

use std::sync::Arc;

use tokio::signal;
use tracing::{error, info};

use registry_gate::health::run_health_server;
use registry_gate::{HealthState, Settings, WebhookState, run_webhook_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("registry_gate=info".parse()?),
        )
        .json()
        .init();

    info!("Starting registry-gate");

    // Configuration errors are fatal at startup, never per-request
    let settings = Settings::from_env()?;
    info!(
        prefix = %settings.image_prefix,
        webhook_port = settings.webhook_port,
        health_port = settings.health_port,
        "Loaded configuration"
    );

    let health_state = Arc::new(HealthState::new());

    // Start health server immediately (liveness must work before readiness)
    let health_handle = {
        let health_state = health_state.clone();
        let port = settings.health_port;
        tokio::spawn(async move { run_health_server(health_state, port).await })
    };

    let webhook_state = Arc::new(WebhookState::new(settings, health_state.clone()));
    let webhook_handle = tokio::spawn(run_webhook_server(webhook_state));

    // The webhook is stateless; once the listener task is up we are ready
    health_state.set_ready(true).await;

    tokio::select! {
        result = webhook_handle => {
            match result {
                Ok(Ok(())) => error!("Webhook server exited unexpectedly"),
                Ok(Err(e)) => {
                    error!("Webhook server error: {e}");
                    return Err(e.into());
                }
                Err(e) => error!("Webhook server task panicked: {e}"),
            }
        }
        result = health_handle => {
            match result {
                Ok(Ok(())) => error!("Health server exited unexpectedly"),
                Ok(Err(e)) => error!("Health server error: {e}"),
                Err(e) => error!("Health server task panicked: {e}"),
            }
        }
        // Handle graceful shutdown on SIGTERM or SIGINT
        _ = shutdown_signal() => {
            info!("Received shutdown signal, initiating graceful shutdown...");
            health_state.set_ready(false).await;
        }
    }

    info!("Webhook stopped");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
///
/// Note: Signal handler setup failures are fatal - the webhook cannot shut
/// down gracefully without them. Using expect() here is intentional.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

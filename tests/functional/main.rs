// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

//! Functional tests for registry-gate.
//!
//! Drives the axum routers directly with in-memory requests; no sockets and
//! no TLS involved.

mod health_tests;

use registry_gate::Settings;

/// Settings fixture with the given required prefix.
pub fn test_settings(prefix: &str) -> Settings {
    Settings {
        image_prefix: prefix.to_string(),
        cert_path: "./certs/tls.crt".to_string(),
        key_path: "./certs/tls.key".to_string(),
        webhook_port: 8443,
        health_port: 8080,
    }
}

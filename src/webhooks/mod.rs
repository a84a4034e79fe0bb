//! Webhook module for validating admission requests.
//!
//! `policy` holds the pure admission decision; `server` wraps it in the TLS
//! HTTP endpoint the API server calls.

pub mod policy;
mod server;

pub use server::{WebhookError, WebhookState, create_webhook_router, run_webhook_server};

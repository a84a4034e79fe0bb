//! registry-gate library crate
//!
//! A validating admission webhook that denies pod creation when any
//! container image lacks the configured private registry prefix.
//!
//! The admission decision itself lives in [`webhooks::policy`] and is a pure
//! function over the wire types in [`admission`]; everything else is
//! transport and process plumbing.

pub mod admission;
pub mod config;
pub mod health;
pub mod webhooks;

pub use config::{ConfigError, Settings};
pub use health::HealthState;
pub use webhooks::{WebhookError, WebhookState, create_webhook_router, run_webhook_server};

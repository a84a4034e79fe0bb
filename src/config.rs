//! Process configuration.
//!
//! All configuration is read from the environment exactly once at startup and
//! carried as an explicit [`Settings`] value. The policy evaluator and the
//! servers receive what they need as parameters; nothing reads the
//! environment after boot.

use std::env;

use thiserror::Error;

/// Environment variable holding the required image prefix.
pub const PREFIX_ENV: &str = "PREFIX";

/// Default path to the webhook TLS certificate
pub const DEFAULT_CERT_PATH: &str = "./certs/tls.crt";
/// Default path to the webhook TLS private key
pub const DEFAULT_KEY_PATH: &str = "./certs/tls.key";
/// Default webhook server port
pub const DEFAULT_WEBHOOK_PORT: u16 = 443;
/// Default health/metrics server port
pub const DEFAULT_HEALTH_PORT: u16 = 8080;

/// Errors raised while building [`Settings`]. All of them are fatal at
/// startup; none can occur per-request.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The required image prefix is not set
    #[error("{PREFIX_ENV} must be set to the required image prefix")]
    MissingPrefix,

    /// A port variable holds something that is not a port number
    #[error("{var} is not a valid port number: {value:?}")]
    InvalidPort { var: &'static str, value: String },
}

/// Immutable process settings, built once in `main`.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Prefix every container image must carry, byte-for-byte.
    pub image_prefix: String,
    /// Path to the TLS certificate file (PEM)
    pub cert_path: String,
    /// Path to the TLS private key file (PEM)
    pub key_path: String,
    /// Port the TLS webhook server binds
    pub webhook_port: u16,
    /// Port the plain-HTTP health server binds
    pub health_port: u16,
}

impl Settings {
    /// Read settings from the process environment.
    ///
    /// A missing or empty `PREFIX` is a fatal configuration error: without a
    /// prefix the policy would deny every image, which is never what a
    /// deployment intends.
    pub fn from_env() -> Result<Self, ConfigError> {
        let image_prefix = match env::var(PREFIX_ENV) {
            Ok(value) if !value.is_empty() => value,
            _ => return Err(ConfigError::MissingPrefix),
        };

        Ok(Self {
            image_prefix,
            cert_path: env::var("WEBHOOK_CERT_PATH")
                .unwrap_or_else(|_| DEFAULT_CERT_PATH.to_string()),
            key_path: env::var("WEBHOOK_KEY_PATH").unwrap_or_else(|_| DEFAULT_KEY_PATH.to_string()),
            webhook_port: port_from_env("WEBHOOK_PORT", DEFAULT_WEBHOOK_PORT)?,
            health_port: port_from_env("HEALTH_PORT", DEFAULT_HEALTH_PORT)?,
        })
    }
}

fn port_from_env(var: &'static str, default: u16) -> Result<u16, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidPort { var, value }),
        Err(_) => Ok(default),
    }
}

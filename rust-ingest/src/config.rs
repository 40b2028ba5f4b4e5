//! Configuration module for environment variable parsing.
//!
//! All configuration is read once at startup. The signing secret is the
//! only required variable: the webhook route cannot operate without it.

use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Signing secret shared with the identity provider (`whsec_` + base64)
    pub webhook_secret: String,

    /// Port for the web server to listen on
    pub port: u16,

    /// Maximum accepted age/skew of webhook timestamps, in seconds
    pub webhook_tolerance_secs: u64,

    /// Convex deployment URL for the user store; in-memory store when unset
    pub convex_url: Option<String>,

    /// HTTP request timeout in milliseconds for the persistence client
    pub request_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Fails when `CLERK_WEBHOOK_SECRET` is absent so that a misdeployed
    /// instance refuses to serve rather than rejecting every delivery.
    pub fn from_env() -> Result<Self> {
        let webhook_secret = env::var("CLERK_WEBHOOK_SECRET")
            .context("CLERK_WEBHOOK_SECRET must be set")?;

        Ok(Config {
            webhook_secret,

            port: parse_env("PORT", 8080),

            webhook_tolerance_secs: parse_env("WEBHOOK_TOLERANCE_SECS", 300),

            convex_url: env::var("CONVEX_URL").ok(),

            request_timeout_ms: parse_env("REQUEST_TIMEOUT_MS", 8000),
        })
    }
}

/// Parse an environment variable, falling back to a default on absence or
/// parse failure.
fn parse_env<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

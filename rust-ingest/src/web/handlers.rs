//! Webhook endpoint handlers.
//!
//! The webhook handler is a linear pipeline: extract the svix headers,
//! verify the signature against the raw body bytes, parse the event,
//! upsert the user for `user.created`. Every step either proceeds or
//! terminates the request with an HTTP response.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::WebhookError;
use crate::event::IdentityEvent;
use crate::store::UserStore;
use crate::web::signature::SigningSecret;
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub secret: SigningSecret,
    pub store: Arc<dyn UserStore>,
}

impl AppState {
    pub fn new(config: Config, secret: SigningSecret, store: Arc<dyn UserStore>) -> Self {
        Self {
            config: Arc::new(config),
            secret,
            store,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Identity Webhook
// =============================================================================

/// Identity-provider webhook endpoint.
///
/// Responds 400 for missing headers or failed verification, 500 when the
/// upsert fails after a verified `user.created`, and 200 otherwise,
/// including for event types this service does not act on. Anything
/// non-2xx is redelivered by the provider.
pub async fn clerk_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str), WebhookError> {
    let svix_id = header_str(&headers, "svix-id");
    let svix_timestamp = header_str(&headers, "svix-timestamp");
    let svix_signature = header_str(&headers, "svix-signature");

    let (svix_id, svix_timestamp, svix_signature) =
        match (svix_id, svix_timestamp, svix_signature) {
            (Some(id), Some(ts), Some(sig)) => (id, ts, sig),
            _ => {
                warn!(
                    has_id = svix_id.is_some(),
                    has_timestamp = svix_timestamp.is_some(),
                    has_signature = svix_signature.is_some(),
                    "webhook_missing_headers"
                );
                return Err(WebhookError::MissingHeaders);
            }
        };

    info!(
        svix_id = %svix_id,
        body_length = body.len(),
        "webhook_received"
    );

    // Verification runs on the raw body bytes exactly as received
    if !state.secret.verify(
        svix_id,
        svix_timestamp,
        svix_signature,
        &body,
        state.config.webhook_tolerance_secs,
    ) {
        warn!(svix_id = %svix_id, "webhook_signature_invalid");
        return Err(WebhookError::InvalidSignature);
    }

    match IdentityEvent::from_bytes(&body)? {
        IdentityEvent::UserCreated(data) => {
            let user = data.into_new_user()?;

            info!(
                external_id = %user.external_id,
                username = %user.username,
                "webhook_user_created"
            );

            match state.store.upsert_user(user).await {
                Ok(user_id) => {
                    info!(user_id = %user_id, "user_upserted");
                }
                Err(e) => {
                    error!(error = %e, "user_upsert_failed");
                    return Err(WebhookError::Store(e));
                }
            }
        }
        IdentityEvent::Unknown { event_type } => {
            info!(event_type = %event_type, "webhook_event_ignored");
        }
    }

    Ok((StatusCode::OK, "webhook processed"))
}

/// Read a header as a non-empty string; an empty value counts as absent.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

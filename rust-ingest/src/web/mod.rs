//! Web server module for webhook ingestion.
//!
//! Receives signed event notifications from the identity provider,
//! verifies them, and hands `user.created` events to the user store.

pub mod handlers;
pub mod signature;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{clerk_webhook, health, AppState, HealthResponse};
pub use signature::{SecretError, SigningSecret};

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/clerk-webhook", post(clerk_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

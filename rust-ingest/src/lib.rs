//! Spotlight identity-webhook ingestion service.
//!
//! Receives signed lifecycle events from the identity provider, verifies
//! each delivery cryptographically, and creates domain users in the
//! document store for `user.created` events.
//!
//! ## Architecture
//!
//! ```text
//! Identity provider → /clerk-webhook → verify → parse → upsert user
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod store;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use error::WebhookError;
pub use event::IdentityEvent;
pub use store::{ConvexStore, MemoryStore, NewUser, UserStore};
pub use web::{AppState, SigningSecret};

//! Persistence collaborator for domain users.
//!
//! The webhook handler only ever needs one write operation: an upsert
//! keyed by the identity provider's user id. Two implementations exist,
//! one backed by the Convex deployment and one in-memory for development
//! and tests.

pub mod convex;
pub mod memory;

pub use convex::ConvexStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

/// Identifier of a persisted domain user.
pub type UserId = String;

/// Domain user fields derived from a `user.created` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Identity provider's user id; unique key for the upsert
    pub external_id: String,
    /// Primary email address
    pub email: String,
    /// Trimmed space-join of first and last name; may be empty
    pub fullname: String,
    /// Avatar URL; may be empty
    pub image: String,
    /// Local part of the primary email address
    pub username: String,
}

/// Upsert-by-external-id persistence operation.
///
/// Implementations must be atomic and idempotent keyed on `external_id`:
/// calling [`upsert_user`](UserStore::upsert_user) any number of times,
/// including concurrently, with the same external id yields exactly one
/// persisted user.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn upsert_user(&self, user: NewUser) -> anyhow::Result<UserId>;
}

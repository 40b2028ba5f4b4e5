//! In-memory user store.
//!
//! Backs local development and tests. The whole upsert runs under a
//! single write lock, so concurrent deliveries for the same external id
//! collapse into one record.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use super::{NewUser, UserId, UserStore};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, (UserId, NewUser)>>,
}

impl MemoryStore {
    /// Number of persisted users.
    pub async fn count(&self) -> usize {
        self.users.read().await.len()
    }

    /// Look up a persisted user by the identity provider's id.
    pub async fn by_external_id(&self, external_id: &str) -> Option<NewUser> {
        self.users
            .read()
            .await
            .get(external_id)
            .map(|(_, user)| user.clone())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    /// Insert-or-ignore keyed on external id. A duplicate delivery
    /// returns the already-assigned id without touching the record.
    async fn upsert_user(&self, user: NewUser) -> anyhow::Result<UserId> {
        let mut users = self.users.write().await;

        if let Some((id, _)) = users.get(&user.external_id) {
            info!(external_id = %user.external_id, "user_upsert_duplicate_ignored");
            return Ok(id.clone());
        }

        let id = format!("users|{}", users.len() + 1);
        users.insert(user.external_id.clone(), (id.clone(), user));

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(external_id: &str) -> NewUser {
        NewUser {
            external_id: external_id.to_string(),
            email: "jane@example.com".to_string(),
            fullname: "Jane Doe".to_string(),
            image: String::new(),
            username: "jane".to_string(),
        }
    }

    #[tokio::test]
    async fn test_upsert_persists_user() {
        let store = MemoryStore::default();
        let id = store.upsert_user(sample_user("user_1")).await.unwrap();

        assert!(!id.is_empty());
        assert_eq!(store.count().await, 1);
        assert_eq!(
            store.by_external_id("user_1").await.unwrap().username,
            "jane"
        );
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let store = MemoryStore::default();
        let first = store.upsert_user(sample_user("user_1")).await.unwrap();
        let second = store.upsert_user(sample_user("user_1")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_distinct_external_ids_create_distinct_users() {
        let store = MemoryStore::default();
        let a = store.upsert_user(sample_user("user_1")).await.unwrap();
        let b = store.upsert_user(sample_user("user_2")).await.unwrap();

        assert_ne!(a, b);
        assert_eq!(store.count().await, 2);
    }

    #[tokio::test]
    async fn test_concurrent_upserts_create_one_user() {
        let store = std::sync::Arc::new(MemoryStore::default());

        let a = {
            let store = store.clone();
            tokio::spawn(async move { store.upsert_user(sample_user("user_1")).await })
        };
        let b = {
            let store = store.clone();
            tokio::spawn(async move { store.upsert_user(sample_user("user_1")).await })
        };

        let (a, b) = (a.await.unwrap().unwrap(), b.await.unwrap().unwrap());

        assert_eq!(a, b);
        assert_eq!(store.count().await, 1);
    }
}

//! Convex-backed user store.
//!
//! Calls the deployment's public mutation endpoint. The mutation itself
//! (`users:upsertUser`) looks up the external id inside its transaction,
//! which is where the insert-or-ignore decision becomes atomic.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::{NewUser, UserId, UserStore};

/// Mutation invoked for each verified `user.created` event.
const UPSERT_MUTATION: &str = "users:upsertUser";

pub struct ConvexStore {
    client: reqwest::Client,
    mutation_url: String,
}

/// Convex function-call response envelope.
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum MutationResponse {
    Success {
        value: serde_json::Value,
    },
    Error {
        #[serde(rename = "errorMessage")]
        error_message: String,
    },
}

impl ConvexStore {
    pub fn new(deployment_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            mutation_url: mutation_url(deployment_url),
        })
    }
}

fn mutation_url(deployment_url: &str) -> String {
    format!("{}/api/mutation", deployment_url.trim_end_matches('/'))
}

#[async_trait]
impl UserStore for ConvexStore {
    async fn upsert_user(&self, user: NewUser) -> Result<UserId> {
        let body = json!({
            "path": UPSERT_MUTATION,
            "format": "json",
            "args": {
                "clerkId": user.external_id,
                "email": user.email,
                "fullname": user.fullname,
                "image": user.image,
                "username": user.username,
            },
        });

        let response = self
            .client
            .post(&self.mutation_url)
            .json(&body)
            .send()
            .await
            .context("Failed to reach Convex deployment")?
            .error_for_status()
            .context("Convex mutation request rejected")?;

        let outcome: MutationResponse = response
            .json()
            .await
            .context("Failed to decode Convex response")?;

        match outcome {
            MutationResponse::Success { value } => {
                let id = value.as_str().unwrap_or_default().to_string();
                info!(user_id = %id, "convex_user_upserted");
                Ok(id)
            }
            MutationResponse::Error { error_message } => {
                Err(anyhow!("Convex mutation failed: {}", error_message))
            }
        }
    }
}

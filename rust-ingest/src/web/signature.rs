//! svix webhook signature verification.
//!
//! Clerk delivers webhooks through svix, which signs each request with
//! HMAC-SHA256 over `"{id}.{timestamp}.{body}"`.
//! Reference: https://docs.svix.com/receiving/verifying-payloads/how-manual

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Errors produced while decoding the shared signing secret.
#[derive(Error, Debug)]
pub enum SecretError {
    #[error("signing secret is empty")]
    Empty,

    #[error("signing secret is not valid base64")]
    InvalidEncoding(#[from] base64::DecodeError),
}

/// Decoded svix signing secret.
///
/// Secrets are distributed as `whsec_` followed by the base64-encoded key
/// bytes. Decoding happens once at startup, so a malformed secret is a
/// boot failure rather than a per-request one.
#[derive(Clone)]
pub struct SigningSecret {
    key: Vec<u8>,
}

impl SigningSecret {
    /// Decode a secret of the form `whsec_<base64>` (prefix optional).
    pub fn new(secret: &str) -> Result<Self, SecretError> {
        let trimmed = secret.trim();
        if trimmed.is_empty() {
            return Err(SecretError::Empty);
        }

        let encoded = trimmed.strip_prefix("whsec_").unwrap_or(trimmed);
        let key = BASE64.decode(encoded)?;

        Ok(Self { key })
    }

    /// Verify a webhook signature.
    ///
    /// `msg_id`, `timestamp` and `signature_header` carry the values of
    /// the `svix-id`, `svix-timestamp` and `svix-signature` headers.
    /// `payload` must be the raw request body bytes exactly as received;
    /// a re-serialized body breaks the signature.
    ///
    /// The signature header holds one or more space-separated entries of
    /// the form `v1,<base64>` (several appear after a secret rotation).
    /// Verification passes if any `v1` entry matches.
    ///
    /// # Returns
    ///
    /// `true` if a signature matches and the timestamp is within
    /// `tolerance_secs` of the current time, `false` otherwise.
    pub fn verify(
        &self,
        msg_id: &str,
        timestamp: &str,
        signature_header: &str,
        payload: &[u8],
        tolerance_secs: u64,
    ) -> bool {
        // Check for empty inputs
        if msg_id.is_empty() || timestamp.is_empty() || signature_header.is_empty() {
            warn!(
                has_id = !msg_id.is_empty(),
                has_timestamp = !timestamp.is_empty(),
                has_signature = !signature_header.is_empty(),
                "signature_missing_fields"
            );
            return false;
        }

        // Verify timestamp is within tolerance (prevents replay attacks)
        let webhook_time: u64 = match timestamp.parse() {
            Ok(t) => t,
            Err(_) => {
                warn!(timestamp = %timestamp, "signature_invalid_timestamp");
                return false;
            }
        };

        let current_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let age = current_time.abs_diff(webhook_time);
        if age > tolerance_secs {
            warn!(
                webhook_time = webhook_time,
                current_time = current_time,
                age_seconds = age,
                tolerance_secs = tolerance_secs,
                "signature_timestamp_out_of_tolerance"
            );
            return false;
        }

        // Compute expected signature:
        // base64(HMAC-SHA256(key, "{id}.{timestamp}.{body}"))
        let mut mac = match HmacSha256::new_from_slice(&self.key) {
            Ok(m) => m,
            Err(_) => {
                warn!("signature_invalid_key");
                return false;
            }
        };

        mac.update(msg_id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);

        let expected = BASE64.encode(mac.finalize().into_bytes());

        // Only v1 (HMAC-SHA256) entries count; other versions are skipped.
        let valid = signature_header
            .split(' ')
            .filter_map(|entry| entry.split_once(','))
            .filter(|(version, _)| *version == "v1")
            .any(|(_, candidate)| constant_time_compare(&expected, candidate));

        if !valid {
            warn!(
                header_length = signature_header.len(),
                "signature_mismatch"
            );
        }

        valid
    }
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

//! Shared-secret authentication for the update and reset operations.
//!
//! Reads the configured edit token at startup. If set, protected requests
//! must carry a matching secret in the `x-edit-token` header or as an
//! `Authorization: Bearer` value. The token is stored as a SHA-256 hash;
//! comparison uses constant-time equality to prevent timing attacks.
//!
//! If no token is configured, authentication is disabled (all requests pass).

use axum::http::HeaderMap;
use sha2::{Digest, Sha256};

pub const EDIT_TOKEN_HEADER: &str = "x-edit-token";

#[derive(Clone)]
pub struct EditTokenGuard {
    expected_hash: Option<String>,
}

impl EditTokenGuard {
    /// Pass `Some(token)` to enable auth, `None` to disable.
    pub fn new(token: Option<String>) -> Self {
        let expected_hash = token.map(|t| sha256_hex(t.as_bytes()));
        if expected_hash.is_some() {
            tracing::info!("edit token authentication enabled");
        } else {
            tracing::warn!("edit token authentication disabled (RABBITHOLE_EDIT_TOKEN not set)");
        }
        Self { expected_hash }
    }

    /// True if the request may perform a protected operation.
    pub fn allows(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = &self.expected_hash else {
            return true;
        };
        let Some(presented) = extract_token(headers) else {
            return false;
        };
        let presented_hash = sha256_hex(presented.as_bytes());
        constant_time_eq(presented_hash.as_bytes(), expected.as_bytes())
    }
}

/// The secret from `x-edit-token`, falling back to `Authorization: Bearer`.
fn extract_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers.get(EDIT_TOKEN_HEADER) {
        return value.to_str().ok();
    }
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Constant-time byte comparison (prevents timing attacks).
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

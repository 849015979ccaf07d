//! API credential checks
//!
//! Read and preview endpoints are gated by a developer secret, destructive
//! endpoints by a separate delete secret. Both are static strings supplied
//! through configuration.
//!
//! # Pure Functions
//!
//! This module contains ONLY pure functions. HTTP extraction and response
//! mapping live in the web crate.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Why a presented credential was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    /// No credential in the request (HTTP 401)
    #[error("Authentication required")]
    Missing,

    /// The server has no secret for this check (HTTP 500)
    #[error("Authentication is not configured on the server")]
    NotConfigured,

    /// Credential present but wrong (HTTP 403)
    #[error("Invalid credentials")]
    Mismatch,
}

/// Compare two secrets without leaking where they differ.
///
/// Both sides are hashed to fixed-length digests first so the comparison
/// time is also independent of the input lengths.
pub fn secrets_match(provided: &str, expected: &str) -> bool {
    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    provided.ct_eq(&expected).into()
}

/// Token portion of an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Check a presented credential against the configured secret.
///
/// Evaluated in order: missing credential, missing server secret, mismatch.
/// Empty strings count as absent on both sides.
pub fn check_credential(provided: Option<&str>, configured: Option<&str>) -> Result<(), AuthFailure> {
    let provided = provided
        .filter(|p| !p.is_empty())
        .ok_or(AuthFailure::Missing)?;
    let configured = configured
        .filter(|c| !c.is_empty())
        .ok_or(AuthFailure::NotConfigured)?;

    if secrets_match(provided, configured) {
        Ok(())
    } else {
        Err(AuthFailure::Mismatch)
    }
}

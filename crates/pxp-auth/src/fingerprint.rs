//! Fingerprint hashing.
//!
//! The fingerprint is a client-bound secret that only travels inside an
//! HTTP-only cookie. Access tokens carry its SHA-256 digest as the
//! `fingerprintHash` claim, and the refresh endpoint recomputes the digest
//! from the cookie to prove the caller holds the original secret.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 digest of a fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FingerprintHash(String);

impl FingerprintHash {
    /// Wraps an already computed digest (for example one read from a token claim).
    #[must_use]
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Returns the hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this is the digest of the empty string.
    #[must_use]
    pub fn is_empty_input(&self) -> bool {
        constant_time_eq(self.0.as_bytes(), empty_hash().0.as_bytes())
    }

    /// Short prefix for log output; never log the full digest.
    #[must_use]
    pub fn log_prefix(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }

    /// Compares with a claim value without short-circuiting on the first
    /// differing byte.
    #[must_use]
    pub fn matches(&self, claim: &str) -> bool {
        constant_time_eq(self.0.as_bytes(), claim.as_bytes())
    }
}

impl fmt::Display for FingerprintHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<FingerprintHash> for String {
    fn from(hash: FingerprintHash) -> Self {
        hash.0
    }
}

/// Hashes a fingerprint: SHA-256 over the UTF-8 bytes, lowercase hex.
#[must_use]
pub fn hash(fingerprint: &str) -> FingerprintHash {
    let mut hasher = Sha256::new();
    hasher.update(fingerprint.as_bytes());
    FingerprintHash(hex::encode(hasher.finalize()))
}

/// Digest of the empty string.
#[must_use]
pub fn empty_hash() -> FingerprintHash {
    hash("")
}

/// Decides whether a cookie digest proves possession of the fingerprint the
/// token was issued for.
///
/// Both sides must be equal, and the shared value must not be the digest of
/// the empty string: a request with no cookie against a token with an empty
/// fingerprint would otherwise match.
#[must_use]
pub fn is_valid_fingerprint(cookie_hash: &FingerprintHash, token_hash: Option<&str>) -> bool {
    match token_hash {
        Some(claim) => cookie_hash.matches(claim) && !cookie_hash.is_empty_input(),
        None => false,
    }
}

/// Constant-time byte comparison.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

//! Fingerprint sources.
//!
//! Both the cookie-issuing endpoint and the claim injector ask a
//! [`FingerprintProvider`] for the session's fingerprint; they must receive
//! the same value or refresh will never succeed.

use async_trait::async_trait;

use crate::AuthResult;
use crate::error::AuthError;
use crate::types::SessionRef;

/// Supplies the fingerprint bound to a session.
#[async_trait]
pub trait FingerprintProvider: Send + Sync {
    /// Returns the raw fingerprint of the session.
    ///
    /// # Errors
    ///
    /// Returns an error if no fingerprint can be produced. An empty
    /// fingerprint is never returned.
    async fn current_fingerprint(&self, session: &SessionRef) -> AuthResult<String>;
}

/// Hands out one configured fingerprint for every session.
pub struct StaticFingerprintProvider {
    fingerprint: String,
}

impl StaticFingerprintProvider {
    /// Creates a provider for a fixed fingerprint.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the fingerprint is empty.
    pub fn new(fingerprint: impl Into<String>) -> AuthResult<Self> {
        let fingerprint = fingerprint.into();
        if fingerprint.is_empty() {
            return Err(AuthError::configuration("fingerprint must not be empty"));
        }
        Ok(Self { fingerprint })
    }
}

impl std::fmt::Debug for StaticFingerprintProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticFingerprintProvider").finish_non_exhaustive()
    }
}

#[async_trait]
impl FingerprintProvider for StaticFingerprintProvider {
    async fn current_fingerprint(&self, _session: &SessionRef) -> AuthResult<String> {
        Ok(self.fingerprint.clone())
    }
}

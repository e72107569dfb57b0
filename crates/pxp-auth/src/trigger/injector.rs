//! Claim injection at token issuance.
//!
//! The injector binds each issued access token to the session fingerprint:
//! it stores `HASH(fingerprint)` as the `fingerprintHash` claim next to the
//! user's active tenant. Issuance fails closed when either lookup fails.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::AuthResult;
use crate::config::TenantFallback;
use crate::error::AuthError;
use crate::fingerprint;
use crate::storage::{FingerprintProvider, TenantResolver};
use crate::token::InjectedClaims;
use crate::types::{SessionRef, TenantContext};

use super::event::PreTokenGenerationEvent;

/// Adds fingerprint and tenant claims to pre-token-generation events.
#[derive(Clone)]
pub struct ClaimInjector {
    fingerprints: Arc<dyn FingerprintProvider>,
    tenants: Arc<dyn TenantResolver>,
    fallback: TenantFallback,
}

impl ClaimInjector {
    /// Creates an injector that rejects users without an active tenant.
    pub fn new(fingerprints: Arc<dyn FingerprintProvider>, tenants: Arc<dyn TenantResolver>) -> Self {
        Self {
            fingerprints,
            tenants,
            fallback: TenantFallback::Reject,
        }
    }

    /// Sets the policy for users without an active tenant.
    #[must_use]
    pub fn with_fallback(mut self, fallback: TenantFallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// Returns the event with `claimsToAddOrOverride` set.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::ClaimLookup`] if the fingerprint or tenant
    /// cannot be resolved.
    pub async fn inject(&self, mut event: PreTokenGenerationEvent) -> AuthResult<PreTokenGenerationEvent> {
        let session = event.session();

        let fingerprint = self
            .fingerprints
            .current_fingerprint(&session)
            .await
            .map_err(|e| AuthError::claim_lookup(format!("fingerprint lookup failed: {e}")))?;
        if fingerprint.is_empty() {
            return Err(AuthError::claim_lookup("fingerprint provider returned an empty value"));
        }
        let fingerprint_hash = fingerprint::hash(&fingerprint);

        let tenant = self.resolve_tenant(&session).await?;

        info!(
            user = session.lookup_key().unwrap_or("<anonymous>"),
            company_id = %tenant.company_id,
            fingerprint = fingerprint_hash.log_prefix(),
            "Injecting session claims"
        );

        event
            .set_injected_claims(&InjectedClaims::new(tenant, fingerprint_hash))
            .map_err(|e| AuthError::internal(format!("failed to encode claims: {e}")))?;
        Ok(event)
    }

    async fn resolve_tenant(&self, session: &SessionRef) -> AuthResult<TenantContext> {
        let active = match session.lookup_key() {
            Some(user) => self
                .tenants
                .active_tenant(user)
                .await
                .map_err(|e| AuthError::claim_lookup(format!("tenant lookup failed: {e}")))?,
            None => {
                warn!("Pre-token event carries no user identity");
                None
            }
        };

        if let Some(tenant) = active {
            return Ok(tenant);
        }

        match self.fallback.tenant() {
            Some(tenant) => {
                debug!(company_id = %tenant.company_id, "No active tenant, using fallback");
                Ok(tenant)
            }
            None => Err(AuthError::claim_lookup("user has no active tenant")),
        }
    }
}

impl std::fmt::Debug for ClaimInjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimInjector")
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

//! Access token claim types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fingerprint::FingerprintHash;
use crate::types::TenantContext;

/// Custom claims added to every issued access token.
///
/// A fixed set of fields rather than an open map so the issuance side and
/// the refresh side agree on names and types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectedClaims {
    pub company_id: String,
    pub company_role: String,
    pub fingerprint_hash: FingerprintHash,
}

impl InjectedClaims {
    /// Builds the claims for a tenant and fingerprint hash.
    #[must_use]
    pub fn new(tenant: TenantContext, fingerprint_hash: FingerprintHash) -> Self {
        Self {
            company_id: tenant.company_id,
            company_role: tenant.company_role,
            fingerprint_hash,
        }
    }
}

/// Claims read from the bearer token at refresh time.
///
/// Kept as the raw payload: the token may come from any issuer, and only
/// `fingerprintHash` takes part in the refresh decision. A claim of an
/// unexpected JSON type reads as absent instead of failing the decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionTokenClaims(Value);

impl SessionTokenClaims {
    /// Hash of the fingerprint the token was issued for.
    #[must_use]
    pub fn fingerprint_hash(&self) -> Option<&str> {
        self.str_claim("fingerprintHash")
    }

    /// Subject of the token.
    #[must_use]
    pub fn sub(&self) -> Option<&str> {
        self.str_claim("sub")
    }

    /// Raw value of a claim.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    fn str_claim(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }
}

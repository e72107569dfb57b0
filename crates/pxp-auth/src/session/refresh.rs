//! Fingerprint-checked refresh-token exchange.
//!
//! A refresh is only forwarded to the identity provider when the caller
//! proves possession of the fingerprint the access token was issued for:
//! `HASH(cookie)` must equal the token's `fingerprintHash` claim and must not
//! be the digest of the empty string.
//!
//! The validator keeps no state between calls. Every error is returned to
//! the handler, which collapses it into `400 Invalid Request` or
//! `401 Unauthorized`.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::AuthResult;
use crate::error::AuthError;
use crate::fingerprint;
use crate::idp::IdentityProvider;
use crate::token::{ClaimDecoder, SessionTokenClaims};
use crate::types::{CredentialBundle, RefreshExchange, RefreshSessionRequest};

/// Raw inputs of one refresh call.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefreshInput<'a> {
    /// Value of the fingerprint cookie, if the cookie was sent.
    pub fingerprint: Option<&'a str>,
    /// `Authorization` header value (`Bearer <jwt>` or a bare JWT).
    pub authorization: Option<&'a str>,
    /// Request body.
    pub body: &'a [u8],
}

/// Validates refresh requests and performs the exchange.
#[derive(Clone)]
pub struct RefreshValidator {
    decoder: ClaimDecoder,
    identity_provider: Arc<dyn IdentityProvider>,
}

impl RefreshValidator {
    /// Creates a validator that reads claims with `decoder` and exchanges
    /// tokens through `identity_provider`.
    pub fn new(decoder: ClaimDecoder, identity_provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            decoder,
            identity_provider,
        }
    }

    /// Runs the full refresh: body parsing, fingerprint check, exchange.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidRequest`] if the body lacks `refreshToken`
    /// - [`AuthError::FingerprintMismatch`] if the fingerprint check fails
    /// - [`AuthError::Unauthorized`] if the body is not a JSON object
    /// - [`AuthError::InvalidToken`] if the bearer token is missing or
    ///   cannot be decoded
    /// - [`AuthError::IdentityProvider`] if the exchange fails
    pub async fn refresh(&self, input: RefreshInput<'_>) -> AuthResult<CredentialBundle> {
        let request = parse_body(input.body)?;

        self.check_fingerprint(input.fingerprint.unwrap_or_default(), input.authorization)?;

        let exchange = RefreshExchange::from(request);
        let provider = self.identity_provider.name();
        let bundle = self
            .identity_provider
            .refresh(&exchange)
            .await
            .map_err(|e| e.into_auth_error(provider))?;

        info!(
            provider,
            company_id = %exchange.company_id,
            "Session refreshed"
        );
        Ok(bundle)
    }

    /// Checks the fingerprint cookie against the token's `fingerprintHash`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] if the token cannot be decoded and
    /// [`AuthError::FingerprintMismatch`] if the hashes do not match.
    pub fn check_fingerprint(&self, fingerprint: &str, authorization: Option<&str>) -> AuthResult<()> {
        let cookie_hash = fingerprint::hash(fingerprint);

        let authorization =
            authorization.ok_or_else(|| AuthError::invalid_token("missing Authorization header"))?;
        let claims: SessionTokenClaims = self.decoder.decode(authorization)?;

        if !fingerprint::is_valid_fingerprint(&cookie_hash, claims.fingerprint_hash()) {
            debug!(
                cookie = cookie_hash.log_prefix(),
                claim_present = claims.fingerprint_hash().is_some(),
                empty_cookie = cookie_hash.is_empty_input(),
                "Fingerprint rejected"
            );
            return Err(AuthError::FingerprintMismatch);
        }

        Ok(())
    }
}

impl std::fmt::Debug for RefreshValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshValidator")
            .field("decoder", &self.decoder)
            .field("identity_provider", &self.identity_provider.name())
            .finish()
    }
}

/// Parses the refresh body. An empty body reads as `{}`.
///
/// Bytes that are not a JSON object are a malformed request (401); an
/// object without a string `refreshToken` fails validation (400).
///
/// # Errors
///
/// See above.
pub fn parse_body(body: &[u8]) -> AuthResult<RefreshSessionRequest> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        body
    };

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| AuthError::unauthorized(format!("malformed request body: {e}")))?;
    if !value.is_object() {
        return Err(AuthError::unauthorized("request body is not a JSON object"));
    }

    serde_json::from_value(value).map_err(|e| AuthError::invalid_request(e.to_string()))
}

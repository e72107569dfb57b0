//! Bearer token claim decoding.
//!
//! The refresh endpoint receives an access token that has usually expired,
//! so expiry is never enforced here. By default the claims are read without
//! checking the signature, which assumes an upstream authorizer has already
//! verified the token. [`ClaimDecoder::Verified`] checks the signature with
//! `jsonwebtoken` before the claims are trusted.
//!
//! ## Example
//!
//! ```ignore
//! use pxp_auth::token::{ClaimDecoder, SessionTokenClaims};
//!
//! let decoder = ClaimDecoder::from_config(&session_config.verification)?;
//! let claims: SessionTokenClaims = decoder.decode(authorization_header)?;
//! ```

use std::fmt;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::de::DeserializeOwned;

use crate::config::ClaimVerificationConfig;
use crate::error::AuthError;

/// base64url that accepts segments with or without padding.
const URL_SAFE_INDIFFERENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while decoding a bearer token.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// The token is not structurally a JWT.
    #[error("Failed to decode token: {message}")]
    DecodingError {
        /// Description of the decoding error.
        message: String,
    },

    /// The token signature is invalid.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The payload is not a JSON object of the expected shape.
    #[error("Invalid claims: {message}")]
    InvalidClaims {
        /// Description of why claims are invalid.
        message: String,
    },

    /// Invalid key format or data.
    #[error("Invalid key: {message}")]
    InvalidKey {
        /// Description of why the key is invalid.
        message: String,
    },
}

impl JwtError {
    /// Creates a new `DecodingError`.
    #[must_use]
    pub fn decoding_error(message: impl Into<String>) -> Self {
        Self::DecodingError {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidClaims` error.
    #[must_use]
    pub fn invalid_claims(message: impl Into<String>) -> Self {
        Self::InvalidClaims {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidKey` error.
    #[must_use]
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a key-related error.
    #[must_use]
    pub fn is_key_error(&self) -> bool {
        matches!(self, Self::InvalidKey { .. })
    }
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidEcdsaKey | ErrorKind::InvalidKeyFormat => {
                Self::invalid_key(err.to_string())
            }
            ErrorKind::Json(_) => Self::invalid_claims(err.to_string()),
            _ => Self::decoding_error(err.to_string()),
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::InvalidKey { message } => AuthError::configuration(message),
            other => AuthError::invalid_token(other.to_string()),
        }
    }
}

// ============================================================================
// Unverified decoding
// ============================================================================

/// Strips an optional `Bearer ` scheme (any case) from an `Authorization`
/// header value.
#[must_use]
pub fn strip_bearer(value: &str) -> &str {
    let value = value.trim();
    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => token.trim(),
        _ => value,
    }
}

/// Reads the payload segment of a JWT without checking signature or expiry.
///
/// # Errors
/// Fails when the value has fewer than two segments, the payload is not
/// base64url, or the JSON does not deserialize into `T`.
pub fn decode_unverified<T: DeserializeOwned>(token: &str) -> Result<T, JwtError> {
    let token = strip_bearer(token);
    if token.is_empty() {
        return Err(JwtError::decoding_error("empty token"));
    }

    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next()) {
        (Some(_), Some(payload)) if !payload.is_empty() => payload,
        _ => return Err(JwtError::decoding_error("missing payload segment")),
    };

    let bytes = URL_SAFE_INDIFFERENT
        .decode(payload)
        .map_err(|e| JwtError::decoding_error(format!("payload is not base64url: {e}")))?;

    serde_json::from_slice(&bytes).map_err(|e| JwtError::invalid_claims(e.to_string()))
}

// ============================================================================
// Claim decoder
// ============================================================================

/// Decodes bearer token claims according to the configured trust mode.
#[derive(Clone)]
pub enum ClaimDecoder {
    /// Claims are read without any signature check.
    Unverified,
    /// Signature is verified; expiry, audience and issuer are not.
    Verified {
        key: DecodingKey,
        validation: Validation,
    },
}

impl ClaimDecoder {
    /// Builds a decoder from configuration.
    ///
    /// # Errors
    /// Returns an error if the configured key cannot be parsed.
    pub fn from_config(config: &ClaimVerificationConfig) -> Result<Self, JwtError> {
        match config {
            ClaimVerificationConfig::Unverified => Ok(Self::Unverified),
            ClaimVerificationConfig::Hmac { secret } => Ok(Self::verified(
                DecodingKey::from_secret(secret.as_bytes()),
                Algorithm::HS256,
            )),
            ClaimVerificationConfig::RsaPem { public_key_pem } => {
                let key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
                    .map_err(|e| JwtError::invalid_key(e.to_string()))?;
                Ok(Self::verified(key, Algorithm::RS256))
            }
        }
    }

    /// Signature-checking decoder that tolerates expired tokens.
    #[must_use]
    pub fn verified(key: DecodingKey, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self::Verified { key, validation }
    }

    /// Returns `true` if signatures are checked.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified { .. })
    }

    /// Decodes the claims of an `Authorization` header value or bare token.
    ///
    /// # Errors
    /// Returns an error if the token cannot be decoded or fails verification.
    pub fn decode<T: DeserializeOwned>(&self, authorization: &str) -> Result<T, JwtError> {
        match self {
            Self::Unverified => decode_unverified(authorization),
            Self::Verified { key, validation } => {
                let token = strip_bearer(authorization);
                if token.is_empty() {
                    return Err(JwtError::decoding_error("empty token"));
                }
                decode::<T>(token, key, validation)
                    .map(|data| data.claims)
                    .map_err(JwtError::from)
            }
        }
    }
}

impl fmt::Debug for ClaimDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unverified => f.write_str("ClaimDecoder::Unverified"),
            Self::Verified { validation, .. } => f
                .debug_struct("ClaimDecoder::Verified")
                .field("algorithms", &validation.algorithms)
                .finish_non_exhaustive(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint;
    use crate::token::claims::SessionTokenClaims;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    fn signed_token(secret: &str, claims: &serde_json::Value) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn unsigned_token(claims: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap());
        format!("{header}.{payload}.")
    }

    #[test]
    fn test_strip_bearer() {
        assert_eq!(strip_bearer("Bearer abc.def.ghi"), "abc.def.ghi");
        assert_eq!(strip_bearer("bearer   abc.def"), "abc.def");
        assert_eq!(strip_bearer("abc.def.ghi"), "abc.def.ghi");
        assert_eq!(strip_bearer("  "), "");
    }

    #[test]
    fn test_decode_unverified_reads_expired_token() {
        let hash = fingerprint::hash("abc123");
        let token = signed_token(
            "irrelevant",
            &json!({"sub": "u-1", "exp": 1, "fingerprintHash": hash.as_str()}),
        );

        let claims: SessionTokenClaims = decode_unverified(&token).unwrap();
        assert_eq!(claims.fingerprint_hash(), Some(hash.as_str()));
        assert_eq!(claims.get("exp"), Some(&json!(1)));

        let with_scheme: SessionTokenClaims =
            decode_unverified(&format!("Bearer {token}")).unwrap();
        assert_eq!(with_scheme, claims);
    }

    #[test]
    fn test_decode_unverified_accepts_padded_payload() {
        let payload = base64::engine::general_purpose::URL_SAFE.encode(br#"{"sub":"u-12"}"#);
        let token = format!("e30.{payload}.sig");
        let claims: SessionTokenClaims = decode_unverified(&token).unwrap();
        assert_eq!(claims.sub(), Some("u-12"));
    }

    #[test]
    fn test_decode_unverified_rejects_garbage() {
        assert!(matches!(
            decode_unverified::<SessionTokenClaims>(""),
            Err(JwtError::DecodingError { .. })
        ));
        assert!(matches!(
            decode_unverified::<SessionTokenClaims>("no-dots-here"),
            Err(JwtError::DecodingError { .. })
        ));
        assert!(matches!(
            decode_unverified::<SessionTokenClaims>("abc.!!!.def"),
            Err(JwtError::DecodingError { .. })
        ));

        let not_json = format!("e30.{}.sig", URL_SAFE_NO_PAD.encode(b"not json"));
        assert!(matches!(
            decode_unverified::<SessionTokenClaims>(&not_json),
            Err(JwtError::InvalidClaims { .. })
        ));
    }

    #[test]
    fn test_unverified_decoder_trusts_unsigned_token() {
        let token = unsigned_token(&json!({"fingerprintHash": "forged"}));
        let claims: SessionTokenClaims = ClaimDecoder::Unverified.decode(&token).unwrap();
        assert_eq!(claims.fingerprint_hash(), Some("forged"));
    }

    #[test]
    fn test_verified_decoder_accepts_expired_signed_token() {
        let decoder = ClaimDecoder::from_config(&ClaimVerificationConfig::Hmac {
            secret: "s3cret".to_string(),
        })
        .unwrap();
        assert!(decoder.is_verified());

        let token = signed_token("s3cret", &json!({"sub": "u-1", "exp": 1, "fingerprintHash": "h"}));
        let claims: SessionTokenClaims = decoder.decode(&format!("Bearer {token}")).unwrap();
        assert_eq!(claims.fingerprint_hash(), Some("h"));
    }

    #[test]
    fn test_verified_decoder_rejects_forgeries() {
        let decoder = ClaimDecoder::from_config(&ClaimVerificationConfig::Hmac {
            secret: "s3cret".to_string(),
        })
        .unwrap();

        let wrong_key = signed_token("other", &json!({"fingerprintHash": "h"}));
        assert!(matches!(
            decoder.decode::<SessionTokenClaims>(&wrong_key),
            Err(JwtError::InvalidSignature)
        ));

        let unsigned = unsigned_token(&json!({"fingerprintHash": "h"}));
        assert!(decoder.decode::<SessionTokenClaims>(&unsigned).is_err());
        assert!(decoder.decode::<SessionTokenClaims>("").is_err());
    }

    #[test]
    fn test_invalid_rsa_pem_is_key_error() {
        let result = ClaimDecoder::from_config(&ClaimVerificationConfig::RsaPem {
            public_key_pem: "not a pem".to_string(),
        });
        let err = result.unwrap_err();
        assert!(err.is_key_error());
        assert!(matches!(AuthError::from(err), AuthError::Configuration { .. }));
    }

    #[test]
    fn test_jwt_error_into_auth_error() {
        let err: AuthError = JwtError::decoding_error("bad").into();
        assert!(matches!(err, AuthError::InvalidToken { .. }));
        assert!(!err.is_rejected_request());
    }
}

//! Session and claim-injection error types.
//!
//! Every failure on the refresh path is mapped to one of two generic HTTP
//! responses at the handler boundary; the variants here exist so the cause
//! can still be logged.

use std::fmt;

/// Errors that can occur while injecting claims or refreshing a session.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The request body is well-formed JSON but misses required fields.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of why the request is invalid.
        message: String,
    },

    /// The fingerprint cookie does not match the hash carried by the token.
    #[error("Fingerprint mismatch")]
    FingerprintMismatch,

    /// The bearer token is missing or cannot be decoded.
    #[error("Invalid token: {message}")]
    InvalidToken {
        /// Description of why the token is invalid.
        message: String,
    },

    /// The request lacks usable credentials (for example an unparsable body).
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Description of why the request is unauthorized.
        message: String,
    },

    /// The identity provider rejected the exchange or could not be reached.
    #[error("Identity provider error: {provider} - {message}")]
    IdentityProvider {
        /// The identity provider name.
        provider: String,
        /// Description of the error.
        message: String,
    },

    /// Tenant context or fingerprint could not be resolved at issuance time.
    #[error("Claim lookup failed: {message}")]
    ClaimLookup {
        /// Description of the lookup failure.
        message: String,
    },

    /// The configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidToken` error.
    #[must_use]
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    /// Creates a new `Unauthorized` error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates a new `IdentityProvider` error.
    #[must_use]
    pub fn identity_provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::IdentityProvider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ClaimLookup` error.
    #[must_use]
    pub fn claim_lookup(message: impl Into<String>) -> Self {
        Self::ClaimLookup {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if the error is caused by the caller's input.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest { .. }
                | Self::FingerprintMismatch
                | Self::InvalidToken { .. }
                | Self::Unauthorized { .. }
        )
    }

    /// Returns `true` if the error originates on the server or upstream.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::IdentityProvider { .. }
                | Self::ClaimLookup { .. }
                | Self::Configuration { .. }
                | Self::Internal { .. }
        )
    }

    /// Returns `true` if the refresh endpoint answers this error with
    /// `400 Invalid Request` rather than `401 Unauthorized`.
    #[must_use]
    pub fn is_rejected_request(&self) -> bool {
        matches!(self, Self::InvalidRequest { .. } | Self::FingerprintMismatch)
    }

    /// Returns the error category used in structured logs.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidRequest { .. } => ErrorCategory::Validation,
            Self::FingerprintMismatch => ErrorCategory::Fingerprint,
            Self::InvalidToken { .. } | Self::Unauthorized { .. } => ErrorCategory::Credentials,
            Self::IdentityProvider { .. } => ErrorCategory::Upstream,
            Self::ClaimLookup { .. } => ErrorCategory::ClaimLookup,
            Self::Configuration { .. } | Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Coarse classification of [`AuthError`] for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed or incomplete request fields.
    Validation,
    /// Fingerprint cookie and token claim disagree.
    Fingerprint,
    /// Bearer token or body unusable.
    Credentials,
    /// Identity provider or network failure.
    Upstream,
    /// Tenant or fingerprint lookup failure during issuance.
    ClaimLookup,
    /// Configuration or internal failure.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Validation => "validation",
            Self::Fingerprint => "fingerprint",
            Self::Credentials => "credentials",
            Self::Upstream => "upstream",
            Self::ClaimLookup => "claim_lookup",
            Self::Internal => "internal",
        };
        write!(f, "{s}")
    }
}

//! Identity provider errors.

use aws_sdk_cognitoidentityprovider::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_cognitoidentityprovider::operation::admin_initiate_auth::AdminInitiateAuthError;

use crate::error::AuthError;

/// Errors returned by an [`IdentityProvider`](super::IdentityProvider).
#[derive(Debug, thiserror::Error)]
pub enum IdpError {
    /// The provider answered with a typed error, e.g. `NotAuthorizedException`.
    #[error("{kind}: {message}")]
    Rejected {
        /// Error type reported by the provider.
        kind: String,
        /// Provider message.
        message: String,
    },

    /// Non-success status without a recognizable error body.
    #[error("HTTP {status} - {body}")]
    Http {
        /// Response status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The exchange did not finish within the request timeout.
    #[error("Request timed out")]
    Timeout,

    /// Connection or transport failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The success response could not be read.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The client could not be built from its configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl IdpError {
    /// Creates a new `Rejected` error.
    #[must_use]
    pub fn rejected(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if the request never got an answer in time.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Converts into an [`AuthError`] attributed to `provider`.
    #[must_use]
    pub fn into_auth_error(self, provider: &str) -> AuthError {
        match self {
            Self::Configuration(message) => AuthError::configuration(message),
            other => AuthError::identity_provider(provider, other.to_string()),
        }
    }
}

impl From<SdkError<AdminInitiateAuthError>> for IdpError {
    fn from(err: SdkError<AdminInitiateAuthError>) -> Self {
        match &err {
            SdkError::TimeoutError(_) => Self::Timeout,
            SdkError::DispatchFailure(failure) if failure.is_timeout() => Self::Timeout,
            SdkError::ServiceError(context) => match context.err().code() {
                Some(kind) => Self::rejected(kind, context.err().message().unwrap_or_default()),
                None => Self::Http {
                    status: context.raw().status().as_u16(),
                    body: context
                        .raw()
                        .body()
                        .bytes()
                        .map(|b| String::from_utf8_lossy(b).into_owned())
                        .unwrap_or_default(),
                },
            },
            SdkError::ResponseError(_) => {
                Self::InvalidResponse(DisplayErrorContext(&err).to_string())
            }
            _ => Self::Network(DisplayErrorContext(&err).to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = IdpError::rejected("NotAuthorizedException", "Invalid Refresh Token");
        assert_eq!(err.to_string(), "NotAuthorizedException: Invalid Refresh Token");
        assert_eq!(IdpError::Timeout.to_string(), "Request timed out");
    }

    #[test]
    fn test_into_auth_error() {
        let err = IdpError::Timeout.into_auth_error("cognito");
        assert!(matches!(
            err,
            AuthError::IdentityProvider { ref provider, .. } if provider == "cognito"
        ));
        assert!(!err.is_rejected_request());

        let err = IdpError::Configuration("bad endpoint".into()).into_auth_error("cognito");
        assert!(matches!(err, AuthError::Configuration { .. }));
    }
}

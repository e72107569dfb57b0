//! Session, identity provider and tenant configuration.
//!
//! These structs are embedded in the server's `AppConfig` and deserialized
//! from TOML / environment overrides.
//!
//! # Example (TOML)
//!
//! ```toml
//! [session]
//! sample_fingerprint = "3b8f1c..."
//!
//! [session.cookie]
//! domain = ".predictablexp.com"
//! max_age = "8h"
//!
//! [identity_provider]
//! user_pool_id = "eu-central-1_jWfAMOer3"
//! client_id = "69p3rafri5blpg437h22he9jhl"
//! request_timeout = "10s"
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::types::TenantContext;

/// Name of the cookie carrying the raw fingerprint.
pub const FINGERPRINT_COOKIE_NAME: &str = "fingerprint";

/// Errors raised while validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required field is empty.
    #[error("{field} must not be empty")]
    Missing {
        /// Dotted path of the field.
        field: &'static str,
    },

    /// A field has an invalid value.
    #[error("{field}: {message}")]
    Invalid {
        /// Dotted path of the field.
        field: &'static str,
        /// Description of the problem.
        message: String,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

/// Deployment environment. Controls the cookie `Secure` attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

// =============================================================================
// Session
// =============================================================================

/// Settings for fingerprint cookies and access-token claim decoding.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Fingerprint cookie attributes.
    pub cookie: CookieConfig,

    /// Fingerprint handed out by the static fingerprint provider.
    /// Must be set; its hash is embedded in every issued access token.
    pub sample_fingerprint: String,

    /// How the refresh endpoint trusts access-token claims.
    pub verification: ClaimVerificationConfig,
}

impl SessionConfig {
    /// Validates the session configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_fingerprint.is_empty() {
            return Err(ConfigError::Missing {
                field: "session.sample_fingerprint",
            });
        }
        self.cookie.validate()?;
        self.verification.validate()
    }
}

/// Fingerprint cookie attributes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CookieConfig {
    /// Cookie name.
    pub name: String,

    /// Parent domain the cookie is scoped to (e.g. `.example.com`).
    /// `None` produces a host-only cookie.
    pub domain: Option<String>,

    /// Cookie path.
    pub path: String,

    /// Cookie lifetime.
    #[serde(with = "humantime_serde")]
    pub max_age: Duration,

    /// Forces the `Secure` attribute on or off. When unset, `Secure` is
    /// applied in production only.
    pub secure: Option<bool>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: FINGERPRINT_COOKIE_NAME.to_string(),
            domain: None,
            path: "/".to_string(),
            max_age: Duration::from_secs(60 * 60 * 8),
            secure: None,
        }
    }
}

impl CookieConfig {
    /// Resolves the `Secure` attribute for the given environment.
    #[must_use]
    pub fn is_secure(&self, environment: Environment) -> bool {
        self.secure.unwrap_or(environment.is_production())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::Missing {
                field: "session.cookie.name",
            });
        }
        if self.name.contains([';', '=', ' ']) {
            return Err(ConfigError::invalid(
                "session.cookie.name",
                "must not contain ';', '=' or spaces",
            ));
        }
        if self.max_age.is_zero() {
            return Err(ConfigError::invalid("session.cookie.max_age", "must be > 0"));
        }
        Ok(())
    }
}

/// Whether access-token claims are trusted as-is or signature-checked.
///
/// `Unverified` reads the claims without any check, which relies on an
/// upstream authorizer having verified the token. The other modes verify the
/// signature (expiry is still tolerated since refresh is called with expired
/// tokens).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ClaimVerificationConfig {
    #[default]
    Unverified,
    /// HS256 with a shared secret.
    Hmac { secret: String },
    /// RS256 with a PEM-encoded public key.
    RsaPem { public_key_pem: String },
}

impl ClaimVerificationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Unverified => Ok(()),
            Self::Hmac { secret } if secret.is_empty() => Err(ConfigError::Missing {
                field: "session.verification.secret",
            }),
            Self::RsaPem { public_key_pem } if public_key_pem.trim().is_empty() => {
                Err(ConfigError::Missing {
                    field: "session.verification.public_key_pem",
                })
            }
            _ => Ok(()),
        }
    }
}

// =============================================================================
// Identity provider
// =============================================================================

/// Identity provider used for refresh-token exchanges.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityProviderConfig {
    /// Provider name used in logs and errors.
    pub name: String,

    /// User pool identifier, `<region>_<id>`.
    pub user_pool_id: String,

    /// App client identifier.
    pub client_id: String,

    /// Overrides the endpoint derived from the pool's region.
    pub endpoint: Option<Url>,

    /// Timeout for a single exchange.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for IdentityProviderConfig {
    fn default() -> Self {
        Self {
            name: "cognito".to_string(),
            user_pool_id: String::new(),
            client_id: String::new(),
            endpoint: None,
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl IdentityProviderConfig {
    /// Region prefix of the user pool id.
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.user_pool_id
            .split_once('_')
            .map(|(region, _)| region)
            .filter(|region| !region.is_empty())
    }

    /// Returns the endpoint override or the regional endpoint.
    pub fn resolve_endpoint(&self) -> Result<Url, ConfigError> {
        if let Some(endpoint) = &self.endpoint {
            return Ok(endpoint.clone());
        }
        let region = self.region().ok_or_else(|| {
            ConfigError::invalid(
                "identity_provider.user_pool_id",
                "expected <region>_<id>",
            )
        })?;
        Url::parse(&format!("https://cognito-idp.{region}.amazonaws.com/"))
            .map_err(|e| ConfigError::invalid("identity_provider.user_pool_id", e.to_string()))
    }

    /// Validates the identity provider configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client_id.is_empty() {
            return Err(ConfigError::Missing {
                field: "identity_provider.client_id",
            });
        }
        if self.user_pool_id.is_empty() {
            return Err(ConfigError::Missing {
                field: "identity_provider.user_pool_id",
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::invalid(
                "identity_provider.request_timeout",
                "must be > 0",
            ));
        }
        if self.region().is_none() {
            return Err(ConfigError::invalid(
                "identity_provider.user_pool_id",
                "expected <region>_<id>",
            ));
        }
        self.resolve_endpoint().map(|_| ())
    }
}

// =============================================================================
// Tenants
// =============================================================================

/// Tenant resolution used by the claim injector.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TenantConfig {
    /// What to do when a user has no active tenant.
    pub fallback: TenantFallback,

    /// Static active-tenant memberships loaded at startup.
    pub memberships: Vec<TenantMembership>,
}

/// Policy applied when a user has no active tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum TenantFallback {
    /// Fail the token issuance.
    #[default]
    Reject,
    /// Issue the token for a fixed tenant.
    Default {
        company_id: String,
        company_role: String,
    },
}

impl TenantFallback {
    /// Tenant to use when none is active, if the policy allows one.
    #[must_use]
    pub fn tenant(&self) -> Option<TenantContext> {
        match self {
            Self::Reject => None,
            Self::Default {
                company_id,
                company_role,
            } => Some(TenantContext::new(company_id.clone(), company_role.clone())),
        }
    }
}

/// One user's active tenant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TenantMembership {
    /// User identifier (`sub` or user name).
    pub user: String,
    pub company_id: String,
    pub company_role: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_defaults() {
        let cookie = CookieConfig::default();
        assert_eq!(cookie.name, FINGERPRINT_COOKIE_NAME);
        assert_eq!(cookie.path, "/");
        assert_eq!(cookie.max_age, Duration::from_secs(8 * 3600));
        assert!(cookie.domain.is_none());
    }

    #[test]
    fn test_cookie_secure_only_in_production() {
        let cookie = CookieConfig::default();
        assert!(!cookie.is_secure(Environment::Development));
        assert!(cookie.is_secure(Environment::Production));

        let forced = CookieConfig {
            secure: Some(true),
            ..CookieConfig::default()
        };
        assert!(forced.is_secure(Environment::Development));
    }

    #[test]
    fn test_session_requires_fingerprint() {
        let cfg = SessionConfig::default();
        assert!(matches!(cfg.validate(), Err(ConfigError::Missing { .. })));

        let cfg = SessionConfig {
            sample_fingerprint: "abc123".to_string(),
            ..SessionConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_verification_mode_deserialization() {
        let cfg: ClaimVerificationConfig =
            serde_json::from_str(r#"{"mode":"hmac","secret":"s3cret"}"#).unwrap();
        assert!(matches!(cfg, ClaimVerificationConfig::Hmac { ref secret } if secret == "s3cret"));

        let cfg: ClaimVerificationConfig = serde_json::from_str(r#"{"mode":"unverified"}"#).unwrap();
        assert!(matches!(cfg, ClaimVerificationConfig::Unverified));

        let empty = ClaimVerificationConfig::Hmac {
            secret: String::new(),
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_identity_provider_region_and_endpoint() {
        let cfg = IdentityProviderConfig {
            user_pool_id: "eu-central-1_jWfAMOer3".to_string(),
            client_id: "client".to_string(),
            ..IdentityProviderConfig::default()
        };
        assert_eq!(cfg.region(), Some("eu-central-1"));
        assert_eq!(
            cfg.resolve_endpoint().unwrap().as_str(),
            "https://cognito-idp.eu-central-1.amazonaws.com/"
        );
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_identity_provider_endpoint_override() {
        let cfg = IdentityProviderConfig {
            user_pool_id: "bogus".to_string(),
            client_id: "client".to_string(),
            endpoint: Some(Url::parse("http://127.0.0.1:9000/").unwrap()),
            ..IdentityProviderConfig::default()
        };
        assert_eq!(cfg.region(), None);
        assert_eq!(cfg.resolve_endpoint().unwrap().as_str(), "http://127.0.0.1:9000/");
        // The pool id still has to name its region.
        assert!(cfg.validate().is_err());

        let cfg = IdentityProviderConfig {
            user_pool_id: "eu-central-1_jWfAMOer3".to_string(),
            ..cfg
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_identity_provider_validation() {
        let cfg = IdentityProviderConfig::default();
        assert!(cfg.validate().is_err());

        let cfg = IdentityProviderConfig {
            user_pool_id: "nounderscore".to_string(),
            client_id: "client".to_string(),
            ..IdentityProviderConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_tenant_fallback() {
        assert_eq!(TenantFallback::Reject.tenant(), None);

        let fallback: TenantFallback = serde_json::from_str(
            r#"{"policy":"default","company_id":"c-1","company_role":"member"}"#,
        )
        .unwrap();
        let tenant = fallback.tenant().unwrap();
        assert_eq!(tenant.company_id, "c-1");
        assert_eq!(tenant.company_role, "member");
    }
}

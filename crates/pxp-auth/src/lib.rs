//! # pxp-auth
//!
//! Fingerprint-bound session refresh for the PXP API.
//!
//! This crate provides:
//! - SHA-256 fingerprint hashing shared by issuance and refresh
//! - The pre-token-generation claim injector
//! - The refresh validator and its identity provider client
//! - Axum handlers for the profile and trigger routes
//!
//! ## Overview
//!
//! A fingerprint is a secret that only travels inside an HTTP-only cookie.
//! When tokens are issued, the [`trigger::ClaimInjector`] embeds
//! `HASH(fingerprint)` in the access token as `fingerprintHash`. When the
//! client later refreshes its session, the [`session::RefreshValidator`]
//! hashes the cookie again and only forwards the refresh token to the
//! identity provider if both digests agree.
//!
//! ## Modules
//!
//! - [`config`] - Cookie, claim verification, identity provider and tenant settings
//! - [`fingerprint`] - Fingerprint hashing and comparison
//! - [`token`] - Claim types and bearer token decoding
//! - [`trigger`] - Pre-token-generation event and claim injector
//! - [`session`] - Refresh validation
//! - [`idp`] - Identity provider client
//! - [`storage`] - Tenant and fingerprint lookups
//! - [`http`] - Axum HTTP handlers

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod http;
pub mod idp;
pub mod session;
pub mod storage;
pub mod token;
pub mod trigger;
pub mod types;

pub use config::{
    ClaimVerificationConfig, ConfigError, CookieConfig, Environment, FINGERPRINT_COOKIE_NAME,
    IdentityProviderConfig, SessionConfig, TenantConfig, TenantFallback, TenantMembership,
};
pub use error::{AuthError, ErrorCategory};
pub use fingerprint::FingerprintHash;
pub use http::{
    ProfileState, RefreshState, TriggerState, pre_token_generation_handler, preflight_handler,
    profile_handler, refresh_session_handler,
};
pub use idp::{CognitoClient, IdentityProvider, IdpError};
pub use session::{RefreshInput, RefreshValidator};
pub use storage::{
    FingerprintProvider, InMemoryTenantResolver, StaticFingerprintProvider, TenantResolver,
};
pub use token::{ClaimDecoder, InjectedClaims, JwtError, SessionTokenClaims};
pub use trigger::{ClaimInjector, PreTokenGenerationEvent};
pub use types::{CredentialBundle, RefreshExchange, RefreshSessionRequest, SessionRef, TenantContext};

/// Type alias for session and claim-injection results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use pxp_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::config::{
        ClaimVerificationConfig, ConfigError, CookieConfig, Environment, IdentityProviderConfig,
        SessionConfig, TenantConfig, TenantFallback,
    };
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::http::{ProfileState, RefreshState, TriggerState};
    pub use crate::idp::{CognitoClient, IdentityProvider, IdpError};
    pub use crate::session::RefreshValidator;
    pub use crate::storage::{
        FingerprintProvider, InMemoryTenantResolver, StaticFingerprintProvider, TenantResolver,
    };
    pub use crate::token::ClaimDecoder;
    pub use crate::trigger::ClaimInjector;
}

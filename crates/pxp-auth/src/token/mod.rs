//! Access token claims and bearer token decoding.
//!
//! - [`InjectedClaims`] - custom claims added at token issuance
//! - [`SessionTokenClaims`] - claims read back at refresh time
//! - [`ClaimDecoder`] - unverified or signature-checked claim decoding

pub mod claims;
pub mod jwt;

pub use claims::{InjectedClaims, SessionTokenClaims};
pub use jwt::{ClaimDecoder, JwtError, decode_unverified, strip_bearer};

//! Collaborator interfaces consumed by the claim injector and the
//! cookie-issuing endpoint.
//!
//! - [`TenantResolver`] - active tenant lookup
//! - [`FingerprintProvider`] - fingerprint of the current session
//!
//! In-memory implementations are provided for the reference deployment and
//! for tests.

pub mod fingerprint;
pub mod tenant;

pub use fingerprint::{FingerprintProvider, StaticFingerprintProvider};
pub use tenant::{InMemoryTenantResolver, TenantResolver};

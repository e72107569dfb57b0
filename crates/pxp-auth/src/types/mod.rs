//! Common types shared by the claim injector and the refresh validator.
//!
//! ## Domain Types
//!
//! - [`TenantContext`] - Active company and role of a user
//! - [`SessionRef`] - Identifies the session a fingerprint belongs to
//! - [`RefreshSessionRequest`] - Body of the refresh endpoint
//! - [`RefreshExchange`] / [`CredentialBundle`] - Identity provider exchange

pub mod refresh;
pub mod tenant;

pub use refresh::{CredentialBundle, RefreshExchange, RefreshSessionRequest};
pub use tenant::{SessionRef, TenantContext};

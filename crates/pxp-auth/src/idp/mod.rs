//! Identity provider integration.
//!
//! The refresh validator only depends on the [`IdentityProvider`] trait;
//! [`CognitoClient`] is the AWS SDK implementation wired in by the server.

pub mod client;
pub mod error;

pub use client::{CognitoClient, IdentityProvider};
pub use error::IdpError;

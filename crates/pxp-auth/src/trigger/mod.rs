//! Token-issuance trigger.
//!
//! - [`PreTokenGenerationEvent`] - event exchanged with the identity provider
//! - [`ClaimInjector`] - adds `companyId`, `companyRole` and `fingerprintHash`

pub mod event;
pub mod injector;

pub use event::{ClaimsOverrideDetails, PreTokenGenerationEvent, PreTokenRequest, PreTokenResponse};
pub use injector::ClaimInjector;

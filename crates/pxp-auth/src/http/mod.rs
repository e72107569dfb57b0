//! HTTP handlers.
//!
//! # Available Handlers
//!
//! - [`refresh_session_handler`] - `POST /profile/refresh-session`
//! - [`profile_handler`] - `GET /profile`, issues the fingerprint cookie
//! - [`pre_token_generation_handler`] - `POST /triggers/pre-token-generation`
//! - [`preflight_handler`] - `OPTIONS` on the profile routes

pub mod cookie;
pub mod cors;
pub mod profile;
pub mod refresh;
pub mod trigger;

pub use cookie::{fingerprint_cookie, fingerprint_from_headers};
pub use cors::{apply_cors_headers, preflight_handler};
pub use profile::{ProfileState, profile_handler};
pub use refresh::{RefreshState, refresh_session_handler};
pub use trigger::{TriggerState, pre_token_generation_handler};

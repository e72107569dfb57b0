//! Session refresh.

pub mod refresh;

pub use refresh::{RefreshInput, RefreshValidator, parse_body};

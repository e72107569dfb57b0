pub mod config;
pub mod handlers;
pub mod observability;
pub mod server;

pub use config::AppConfig;
pub use server::{PxpServer, ServerBuilder, ServerError, build_app, build_app_with};

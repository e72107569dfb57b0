//! `POST /profile/refresh-session` handler.
//!
//! Responses are deliberately coarse: `200` with the provider's credential
//! bundle, `400 {"message":"Invalid Request"}` when request validation or
//! the fingerprint check fails, and `401 {"message":"Unauthorized"}` for
//! every other failure. The cause is only logged.
//!
//! # Usage
//!
//! ```ignore
//! use axum::{Router, routing::post};
//! use pxp_auth::http::{RefreshState, refresh_session_handler};
//!
//! let app = Router::new()
//!     .route("/profile/refresh-session", post(refresh_session_handler))
//!     .with_state(RefreshState::new(validator, cookie_config));
//! ```

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{debug, warn};

use crate::config::CookieConfig;
use crate::error::AuthError;
use crate::session::{RefreshInput, RefreshValidator};
use crate::types::CredentialBundle;

use super::cookie::fingerprint_from_headers;
use super::cors::apply_cors_headers;

/// State required for the refresh endpoint.
#[derive(Clone)]
pub struct RefreshState {
    validator: Arc<RefreshValidator>,
    cookie: Arc<CookieConfig>,
}

impl RefreshState {
    /// Creates the refresh state from a validator and the fingerprint
    /// cookie settings.
    pub fn new(validator: RefreshValidator, cookie: CookieConfig) -> Self {
        Self {
            validator: Arc::new(validator),
            cookie: Arc::new(cookie),
        }
    }
}

/// Validates the fingerprint and exchanges the refresh token.
pub async fn refresh_session_handler(
    State(state): State<RefreshState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let fingerprint = fingerprint_from_headers(&headers, &state.cookie);
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    debug!(
        cookie_present = fingerprint.is_some(),
        authorization_present = authorization.is_some(),
        "Processing refresh request"
    );

    let result = state
        .validator
        .refresh(RefreshInput {
            fingerprint: fingerprint.as_deref(),
            authorization,
            body: &body,
        })
        .await;

    let mut response = match result {
        Ok(bundle) => refresh_success_response(bundle),
        Err(e) => {
            warn!(category = %e.category(), error = %e, "Refresh request failed");
            refresh_error_response(&e)
        }
    };
    apply_cors_headers(&headers, response.headers_mut());
    response
}

fn refresh_success_response(bundle: CredentialBundle) -> Response {
    let mut response = (StatusCode::OK, Json(bundle)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

/// Collapses an error into one of the two public failure responses.
fn refresh_error_response(error: &AuthError) -> Response {
    if error.is_rejected_request() {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Invalid Request"})),
        )
            .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Unauthorized"})),
        )
            .into_response()
    }
}

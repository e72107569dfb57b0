//! `GET /profile` handler: issues the fingerprint cookie.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use tracing::{error, info};

use crate::config::{CookieConfig, Environment};
use crate::fingerprint;
use crate::storage::FingerprintProvider;
use crate::types::SessionRef;

use super::cookie::fingerprint_cookie;
use super::cors::apply_cors_headers;

/// State required for the cookie-issuing endpoint.
#[derive(Clone)]
pub struct ProfileState {
    fingerprints: Arc<dyn FingerprintProvider>,
    cookie: Arc<CookieConfig>,
    environment: Environment,
}

impl ProfileState {
    pub fn new(
        fingerprints: Arc<dyn FingerprintProvider>,
        cookie: CookieConfig,
        environment: Environment,
    ) -> Self {
        Self {
            fingerprints,
            cookie: Arc::new(cookie),
            environment,
        }
    }
}

/// Sets the HTTP-only fingerprint cookie for the current session.
pub async fn profile_handler(
    State(state): State<ProfileState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Response {
    let mut response = match state
        .fingerprints
        .current_fingerprint(&SessionRef::anonymous())
        .await
    {
        Ok(value) => {
            info!(
                fingerprint = fingerprint::hash(&value).log_prefix(),
                "Issuing fingerprint cookie"
            );
            let cookie = fingerprint_cookie(&state.cookie, state.environment, value);
            (
                StatusCode::OK,
                jar.add(cookie),
                Json(json!({"message": "Fingerprint issued"})),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Fingerprint lookup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"message": "Internal Server Error"})),
            )
                .into_response()
        }
    };
    apply_cors_headers(&headers, response.headers_mut());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AuthResult;
    use crate::error::AuthError;
    use crate::storage::StaticFingerprintProvider;
    use async_trait::async_trait;
    use axum::{Router, body::Body, http::Request, http::header, routing::get};
    use tower::ServiceExt;

    struct Unavailable;

    #[async_trait]
    impl FingerprintProvider for Unavailable {
        async fn current_fingerprint(&self, _session: &SessionRef) -> AuthResult<String> {
            Err(AuthError::internal("unavailable"))
        }
    }

    fn app(fingerprints: Arc<dyn FingerprintProvider>, environment: Environment) -> Router {
        let cookie = CookieConfig {
            domain: Some(".predictablexp.com".to_string()),
            ..CookieConfig::default()
        };
        Router::new()
            .route("/profile", get(profile_handler))
            .with_state(ProfileState::new(fingerprints, cookie, environment))
    }

    fn get_profile() -> Request<Body> {
        Request::builder().uri("/profile").body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_sets_fingerprint_cookie() {
        let provider = Arc::new(StaticFingerprintProvider::new("abc123").unwrap());
        let response = app(provider, Environment::Production)
            .oneshot(get_profile())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(set_cookie.starts_with("fingerprint=abc123"));
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("Secure"));
        assert!(set_cookie.contains("Path=/"));
        assert!(set_cookie.contains("Domain=predictablexp.com"));
        assert!(set_cookie.contains("Max-Age=28800"));
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_development_cookie_is_not_secure() {
        let provider = Arc::new(StaticFingerprintProvider::new("abc123").unwrap());
        let response = app(provider, Environment::Development)
            .oneshot(get_profile())
            .await
            .unwrap();

        let set_cookie = response.headers().get(header::SET_COOKIE).unwrap();
        assert!(!set_cookie.to_str().unwrap().contains("Secure"));
    }

    #[tokio::test]
    async fn test_lookup_failure_sets_no_cookie() {
        let response = app(Arc::new(Unavailable), Environment::Production)
            .oneshot(get_profile())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }
}

//! `POST /triggers/pre-token-generation` handler.
//!
//! Receives the identity provider's pre-token-generation event and returns
//! it with the session claims added. A failed lookup or an unreadable event
//! answers 500 so the provider aborts the issuance.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::trigger::{ClaimInjector, PreTokenGenerationEvent};

/// State required for the trigger endpoint.
#[derive(Clone)]
pub struct TriggerState {
    injector: Arc<ClaimInjector>,
}

impl TriggerState {
    /// Creates a new trigger state around `injector`.
    pub fn new(injector: ClaimInjector) -> Self {
        Self {
            injector: Arc::new(injector),
        }
    }
}

/// Adds the session claims to a pre-token-generation event.
pub async fn pre_token_generation_handler(
    State(state): State<TriggerState>,
    payload: Result<Json<PreTokenGenerationEvent>, JsonRejection>,
) -> Response {
    let event = match payload {
        Ok(Json(event)) => event,
        Err(rejection) => {
            error!(error = %rejection.body_text(), "Unreadable trigger event");
            return injection_failed_response();
        }
    };

    match state.injector.inject(event).await {
        Ok(event) => (StatusCode::OK, Json(event)).into_response(),
        Err(e) => {
            error!(category = %e.category(), error = %e, "Claim injection failed");
            injection_failed_response()
        }
    }
}

fn injection_failed_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"message": "Claim injection failed"})),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TenantFallback;
    use crate::fingerprint;
    use crate::storage::{InMemoryTenantResolver, StaticFingerprintProvider};
    use axum::{Router, body::Body, http::Request, http::header, routing::post};
    use serde_json::Value;
    use tower::ServiceExt;

    fn app(fallback: TenantFallback) -> Router {
        let injector = ClaimInjector::new(
            Arc::new(StaticFingerprintProvider::new("abc123").unwrap()),
            Arc::new(InMemoryTenantResolver::new()),
        )
        .with_fallback(fallback);
        Router::new()
            .route("/triggers/pre-token-generation", post(pre_token_generation_handler))
            .with_state(TriggerState::new(injector))
    }

    fn event_request() -> Request<Body> {
        raw_request(
            json!({
                "version": "1",
                "triggerSource": "TokenGeneration_HostedAuth",
                "userName": "alice",
                "request": {"userAttributes": {"sub": "u-1"}},
                "response": {}
            })
            .to_string(),
        )
    }

    fn raw_request(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/triggers/pre-token-generation")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    fn default_fallback() -> TenantFallback {
        TenantFallback::Default {
            company_id: "c-1".to_string(),
            company_role: "member".to_string(),
        }
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_returns_augmented_event() {
        let response = app(default_fallback())
            .oneshot(event_request())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let event = json_body(response).await;
        let claims = &event["response"]["claimsOverrideDetails"]["claimsToAddOrOverride"];
        assert_eq!(claims["companyId"], "c-1");
        assert_eq!(claims["companyRole"], "member");
        assert_eq!(claims["fingerprintHash"], fingerprint::hash("abc123").as_str());
        assert_eq!(event["triggerSource"], "TokenGeneration_HostedAuth");
    }

    #[tokio::test]
    async fn test_lookup_failure_is_server_error() {
        let response = app(TenantFallback::Reject)
            .oneshot(event_request())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_null_request_and_foreign_claims_are_handled() {
        let body = json!({
            "userName": "alice",
            "request": null,
            "response": {
                "claimsOverrideDetails": {"claimsToAddOrOverride": {"tier": 1}}
            }
        });
        let response = app(default_fallback())
            .oneshot(raw_request(body.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let event = json_body(response).await;
        let claims = &event["response"]["claimsOverrideDetails"]["claimsToAddOrOverride"];
        assert_eq!(claims["companyId"], "c-1");
        assert!(claims.get("tier").is_none());
    }

    #[tokio::test]
    async fn test_unreadable_event_fails_closed() {
        for body in ["not json", "[1, 2]", r#"{"userName": 5}"#] {
            let response = app(default_fallback())
                .oneshot(raw_request(body.to_string()))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{body}");
            assert_eq!(
                json_body(response).await,
                json!({"message": "Claim injection failed"})
            );
        }
    }
}

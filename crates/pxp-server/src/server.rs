use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use pxp_auth::prelude::*;
use pxp_auth::{
    pre_token_generation_handler, preflight_handler, profile_handler, refresh_session_handler,
};
use tower_http::trace::TraceLayer;

use crate::{config::AppConfig, handlers};

/// Errors raised while wiring the application.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("identity provider: {0}")]
    IdentityProvider(#[from] IdpError),

    #[error("claim verification: {0}")]
    ClaimVerification(#[from] pxp_auth::JwtError),

    #[error("{0}")]
    Auth(#[from] AuthError),
}

pub struct PxpServer {
    addr: SocketAddr,
    app: Router,
}

/// Builds the router with a Cognito client created from configuration.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, ServerError> {
    let identity_provider = CognitoClient::from_config(&cfg.identity_provider).await?;
    tracing::info!(
        region = identity_provider.region(),
        user_pool_id = identity_provider.user_pool_id(),
        endpoint = ?identity_provider.endpoint().map(|u| u.as_str()),
        "Identity provider configured"
    );
    build_app_with(cfg, Arc::new(identity_provider))
}

/// Builds the router around an existing identity provider.
pub fn build_app_with(
    cfg: &AppConfig,
    identity_provider: Arc<dyn IdentityProvider>,
) -> Result<Router, ServerError> {
    let decoder = ClaimDecoder::from_config(&cfg.session.verification)?;
    if !decoder.is_verified() {
        tracing::warn!("Access-token claims are read without signature verification");
    }

    let fingerprints: Arc<dyn FingerprintProvider> = Arc::new(StaticFingerprintProvider::new(
        cfg.session.sample_fingerprint.clone(),
    )?);
    let tenants = Arc::new(InMemoryTenantResolver::from_memberships(
        &cfg.tenants.memberships,
    ));
    let injector = ClaimInjector::new(fingerprints.clone(), tenants)
        .with_fallback(cfg.tenants.fallback.clone());

    let refresh = Router::new()
        .route(
            "/profile/refresh-session",
            post(refresh_session_handler).options(preflight_handler),
        )
        .with_state(RefreshState::new(
            RefreshValidator::new(decoder, identity_provider),
            cfg.session.cookie.clone(),
        ));

    let profile = Router::new()
        .route("/profile", get(profile_handler).options(preflight_handler))
        .with_state(ProfileState::new(
            fingerprints,
            cfg.session.cookie.clone(),
            cfg.server.environment,
        ));

    let triggers = Router::new()
        .route(
            "/triggers/pre-token-generation",
            post(pre_token_generation_handler),
        )
        .with_state(TriggerState::new(injector));

    Ok(Router::new()
        .route("/healthz", get(handlers::healthz))
        .merge(refresh)
        .merge(profile)
        .merge(triggers)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri().path(),
                        http.status_code = tracing::field::Empty,
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        ))
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub async fn build(self) -> Result<PxpServer, ServerError> {
        let app = build_app(&self.config).await?;

        Ok(PxpServer {
            addr: self.addr,
            app,
        })
    }
}

impl PxpServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

//! Refresh-token exchange with a Cognito user pool.
//!
//! Sends `AdminInitiateAuth` with the `REFRESH_TOKEN_AUTH` flow through the
//! AWS SDK, scoped to the configured app client and user pool. The caller's
//! `companyId` travels as client metadata so the pre-token-generation trigger
//! sees it. The SDK output is mapped back to the provider's JSON shape and
//! handed to the caller unchanged.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider as cognito;
use cognito::config::timeout::TimeoutConfig;
use cognito::config::{BehaviorVersion, Region};
use cognito::operation::admin_initiate_auth::AdminInitiateAuthOutput;
use cognito::types::{AuthFlowType, AuthenticationResultType};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

use crate::config::IdentityProviderConfig;
use crate::types::{CredentialBundle, RefreshExchange};

use super::error::IdpError;

/// Auth parameter carrying the refresh token.
pub const REFRESH_TOKEN_PARAMETER: &str = "REFRESH_TOKEN";

/// Client metadata key carrying the requested company.
pub const COMPANY_ID_METADATA: &str = "companyId";

/// Exchanges refresh tokens for new credentials.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider name used in logs and errors.
    fn name(&self) -> &str;

    /// Performs the refresh-token exchange.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider rejects the token, cannot be reached
    /// within the request timeout, or answers with an unreadable body.
    async fn refresh(&self, exchange: &RefreshExchange) -> Result<CredentialBundle, IdpError>;
}

/// Cognito user pool client built on the AWS SDK.
#[derive(Debug, Clone)]
pub struct CognitoClient {
    name: String,
    client_id: String,
    user_pool_id: String,
    region: String,
    endpoint: Option<Url>,
    client: cognito::Client,
}

impl CognitoClient {
    /// Builds a client from configuration, loading credentials from the
    /// default AWS provider chain.
    ///
    /// # Errors
    ///
    /// Returns [`IdpError::Configuration`] if the configuration is invalid.
    pub async fn from_config(config: &IdentityProviderConfig) -> Result<Self, IdpError> {
        let region = pool_region(config)?;
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region))
            .load()
            .await;
        Self::from_sdk_config(cognito::config::Builder::from(&shared), config)
    }

    /// Builds a client on top of an existing SDK configuration.
    ///
    /// The pool's region, the request timeout and the endpoint override are
    /// applied on top of `builder`.
    ///
    /// # Errors
    ///
    /// Returns [`IdpError::Configuration`] if the configuration is invalid.
    pub fn from_sdk_config(
        builder: cognito::config::Builder,
        config: &IdentityProviderConfig,
    ) -> Result<Self, IdpError> {
        config
            .validate()
            .map_err(|e| IdpError::Configuration(e.to_string()))?;
        let region = pool_region(config)?;

        let mut builder = builder.region(Region::new(region.clone())).timeout_config(
            TimeoutConfig::builder()
                .operation_timeout(config.request_timeout)
                .build(),
        );
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint.as_str());
        }

        Ok(Self {
            name: config.name.clone(),
            client_id: config.client_id.clone(),
            user_pool_id: config.user_pool_id.clone(),
            region,
            endpoint: config.endpoint.clone(),
            client: cognito::Client::from_conf(builder.build()),
        })
    }

    /// Endpoint override, if any.
    #[must_use]
    pub fn endpoint(&self) -> Option<&Url> {
        self.endpoint.as_ref()
    }

    /// Region the user pool lives in.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// User pool the app client belongs to.
    #[must_use]
    pub fn user_pool_id(&self) -> &str {
        &self.user_pool_id
    }
}

fn pool_region(config: &IdentityProviderConfig) -> Result<String, IdpError> {
    config.region().map(str::to_string).ok_or_else(|| {
        IdpError::Configuration(format!(
            "cannot derive region from user pool id '{}'",
            config.user_pool_id
        ))
    })
}

#[async_trait]
impl IdentityProvider for CognitoClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn refresh(&self, exchange: &RefreshExchange) -> Result<CredentialBundle, IdpError> {
        debug!(
            user_pool_id = %self.user_pool_id,
            company_id = %exchange.company_id,
            "Sending refresh-token exchange"
        );

        let output = self
            .client
            .admin_initiate_auth()
            .user_pool_id(&self.user_pool_id)
            .client_id(&self.client_id)
            .auth_flow(AuthFlowType::RefreshTokenAuth)
            .auth_parameters(REFRESH_TOKEN_PARAMETER, &exchange.refresh_token)
            .client_metadata(COMPANY_ID_METADATA, &exchange.company_id)
            .send()
            .await
            .map_err(|e| {
                let err = IdpError::from(e);
                warn!(error = %err, "Exchange failed");
                err
            })?;

        Ok(credential_bundle(&output))
    }
}

/// Maps the SDK output back to the provider's JSON response.
fn credential_bundle(output: &AdminInitiateAuthOutput) -> CredentialBundle {
    let mut body = Map::new();
    if let Some(name) = output.challenge_name() {
        body.insert("ChallengeName".into(), Value::from(name.as_str()));
    }
    if let Some(session) = output.session() {
        body.insert("Session".into(), Value::from(session));
    }
    if let Some(parameters) = output.challenge_parameters() {
        body.insert("ChallengeParameters".into(), string_map(parameters));
    }
    if let Some(result) = output.authentication_result() {
        body.insert("AuthenticationResult".into(), authentication_result(result));
    }
    CredentialBundle(Value::Object(body))
}

fn authentication_result(result: &AuthenticationResultType) -> Value {
    let mut body = Map::new();
    let mut put = |key: &str, value: Option<&str>| {
        if let Some(value) = value {
            body.insert(key.into(), Value::from(value));
        }
    };
    put("AccessToken", result.access_token());
    put("IdToken", result.id_token());
    put("RefreshToken", result.refresh_token());
    put("TokenType", result.token_type());
    body.insert("ExpiresIn".into(), Value::from(result.expires_in()));
    Value::Object(body)
}

fn string_map(map: &HashMap<String, String>) -> Value {
    Value::Object(
        map.iter()
            .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
            .collect(),
    )
}

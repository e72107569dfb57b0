//! Refresh endpoint request and identity provider exchange types.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// JSON body of `POST /profile/refresh-session`.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSessionRequest {
    /// Refresh token issued by the identity provider.
    pub refresh_token: String,

    /// Company the client wants the new tokens for. Forwarded as metadata.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub company_id: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl fmt::Debug for RefreshSessionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshSessionRequest")
            .field("refresh_token", &"<redacted>")
            .field("company_id", &self.company_id)
            .finish()
    }
}

/// A refresh-token exchange forwarded to the identity provider.
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshExchange {
    pub refresh_token: String,
    /// Sent as `ClientMetadata.companyId`; never used for authorization.
    pub company_id: String,
}

impl From<RefreshSessionRequest> for RefreshExchange {
    fn from(request: RefreshSessionRequest) -> Self {
        Self {
            refresh_token: request.refresh_token,
            company_id: request.company_id,
        }
    }
}

impl fmt::Debug for RefreshExchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshExchange")
            .field("refresh_token", &"<redacted>")
            .field("company_id", &self.company_id)
            .finish()
    }
}

/// Credentials returned by the identity provider, passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialBundle(pub Value);

impl CredentialBundle {
    /// Returns the raw provider response.
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// New access token, if the provider returned one.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.0
            .pointer("/AuthenticationResult/AccessToken")
            .and_then(Value::as_str)
    }
}

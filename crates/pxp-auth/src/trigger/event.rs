//! Pre-token-generation trigger event.
//!
//! Only the fields the injector reads or writes are typed; everything else
//! is captured in `extra` maps so the event goes back to the identity
//! provider exactly as it arrived. `null` reads as an empty section.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::token::InjectedClaims;
use crate::types::SessionRef;

/// Event delivered by the identity provider before it issues tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreTokenGenerationEvent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub request: PreTokenRequest,

    #[serde(default, deserialize_with = "null_as_default")]
    pub response: PreTokenResponse,

    /// `version`, `triggerSource`, `userPoolId`, `callerContext`, ...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreTokenRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_attributes: Map<String, Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreTokenResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claims_override_details: Option<ClaimsOverrideDetails>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimsOverrideDetails {
    /// Whatever the provider sent; replaced wholesale on injection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claims_to_add_or_override: Option<Value>,

    /// `claimsToSuppress`, `groupOverrideDetails`, ...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl PreTokenGenerationEvent {
    /// Session the tokens are being issued for.
    #[must_use]
    pub fn session(&self) -> SessionRef {
        let user_id = self
            .request
            .user_attributes
            .get("sub")
            .and_then(Value::as_str)
            .filter(|sub| !sub.is_empty())
            .map(str::to_string);
        SessionRef::for_user(user_id, self.user_name.clone())
    }

    /// Session claims set on the response, if they have that shape.
    #[must_use]
    pub fn injected_claims(&self) -> Option<InjectedClaims> {
        self.response
            .claims_override_details
            .as_ref()
            .and_then(|details| details.claims_to_add_or_override.clone())
            .and_then(|claims| serde_json::from_value(claims).ok())
    }

    /// Replaces the claims to add, leaving the other override details intact.
    ///
    /// # Errors
    ///
    /// Returns an error if the claims cannot be serialized.
    pub fn set_injected_claims(&mut self, claims: &InjectedClaims) -> serde_json::Result<()> {
        let claims = serde_json::to_value(claims)?;
        self.response
            .claims_override_details
            .get_or_insert_with(ClaimsOverrideDetails::default)
            .claims_to_add_or_override = Some(claims);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint;
    use crate::types::TenantContext;
    use serde_json::json;

    fn cognito_event() -> Value {
        json!({
            "version": "1",
            "triggerSource": "TokenGeneration_RefreshTokens",
            "region": "eu-central-1",
            "userPoolId": "eu-central-1_jWfAMOer3",
            "userName": "alice",
            "callerContext": {
                "awsSdkVersion": "aws-sdk-unknown-unknown",
                "clientId": "69p3rafri5blpg437h22he9jhl"
            },
            "request": {
                "userAttributes": {
                    "sub": "5f1c7f0e-0000-4000-8000-000000000001",
                    "email": "alice@example.com"
                },
                "groupConfiguration": {
                    "groupsToOverride": [],
                    "iamRolesToOverride": [],
                    "preferredRole": null
                }
            },
            "response": {
                "claimsOverrideDetails": null
            }
        })
    }

    #[test]
    fn test_session_from_event() {
        let event: PreTokenGenerationEvent = serde_json::from_value(cognito_event()).unwrap();
        let session = event.session();
        assert_eq!(
            session.user_id.as_deref(),
            Some("5f1c7f0e-0000-4000-8000-000000000001")
        );
        assert_eq!(session.user_name.as_deref(), Some("alice"));
        assert!(event.injected_claims().is_none());
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let mut event: PreTokenGenerationEvent = serde_json::from_value(cognito_event()).unwrap();
        event
            .set_injected_claims(&InjectedClaims::new(
                TenantContext::new("c-1", "member"),
                fingerprint::hash("abc123"),
            ))
            .unwrap();

        let out = serde_json::to_value(&event).unwrap();
        assert_eq!(out["triggerSource"], "TokenGeneration_RefreshTokens");
        assert_eq!(out["callerContext"]["clientId"], "69p3rafri5blpg437h22he9jhl");
        assert_eq!(out["request"]["userAttributes"]["email"], "alice@example.com");
        assert!(out["request"]["groupConfiguration"].is_object());
        assert_eq!(
            out["response"]["claimsOverrideDetails"]["claimsToAddOrOverride"]["companyId"],
            "c-1"
        );
    }

    #[test]
    fn test_set_claims_keeps_other_override_details() {
        let mut event: PreTokenGenerationEvent = serde_json::from_value(json!({
            "userName": "bob",
            "response": {
                "claimsOverrideDetails": {
                    "claimsToSuppress": ["email"]
                }
            }
        }))
        .unwrap();
        event
            .set_injected_claims(&InjectedClaims::new(
                TenantContext::new("c-2", "owner"),
                fingerprint::hash("x"),
            ))
            .unwrap();

        let out = serde_json::to_value(&event).unwrap();
        let details = &out["response"]["claimsOverrideDetails"];
        assert_eq!(details["claimsToSuppress"], json!(["email"]));
        assert_eq!(details["claimsToAddOrOverride"]["companyRole"], "owner");
    }

    #[test]
    fn test_null_sections_read_as_empty() {
        let event: PreTokenGenerationEvent = serde_json::from_value(json!({
            "userName": null,
            "request": null,
            "response": null,
            "triggerSource": "TokenGeneration_Authentication"
        }))
        .unwrap();
        assert_eq!(event.user_name, "");
        assert!(event.request.user_attributes.is_empty());
        assert!(event.session().lookup_key().is_none());

        let event: PreTokenGenerationEvent = serde_json::from_value(json!({
            "userName": "carol",
            "request": {"userAttributes": null}
        }))
        .unwrap();
        assert_eq!(event.session().lookup_key(), Some("carol"));
    }

    #[test]
    fn test_foreign_claims_are_replaced() {
        let mut event: PreTokenGenerationEvent = serde_json::from_value(json!({
            "userName": "dave",
            "response": {
                "claimsOverrideDetails": {
                    "claimsToAddOrOverride": {"tier": "gold", "companyId": 7}
                }
            }
        }))
        .unwrap();
        assert!(event.injected_claims().is_none());

        let claims = InjectedClaims::new(TenantContext::new("c-3", "member"), fingerprint::hash("y"));
        event.set_injected_claims(&claims).unwrap();

        assert_eq!(event.injected_claims(), Some(claims));
        let out = serde_json::to_value(&event).unwrap();
        let added = &out["response"]["claimsOverrideDetails"]["claimsToAddOrOverride"];
        assert_eq!(added.as_object().unwrap().len(), 3);
        assert!(added.get("tier").is_none());
    }
}

//! Tenant and session identity types.

use serde::{Deserialize, Serialize};

/// Active company of a user together with the user's role in it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantContext {
    pub company_id: String,
    pub company_role: String,
}

impl TenantContext {
    /// Creates a new tenant context.
    pub fn new(company_id: impl Into<String>, company_role: impl Into<String>) -> Self {
        Self {
            company_id: company_id.into(),
            company_role: company_role.into(),
        }
    }
}

/// Identifies the session a fingerprint is bound to.
///
/// Populated from the token-issuance event; the cookie-issuing endpoint has
/// no user yet and uses [`SessionRef::anonymous`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionRef {
    /// Stable user identifier (`sub` attribute).
    pub user_id: Option<String>,
    /// User name as known to the identity provider.
    pub user_name: Option<String>,
}

impl SessionRef {
    /// A session without a known user.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Creates a session reference for a user.
    pub fn for_user(user_id: Option<String>, user_name: impl Into<String>) -> Self {
        let user_name = user_name.into();
        Self {
            user_id,
            user_name: (!user_name.is_empty()).then_some(user_name),
        }
    }

    /// Key used for tenant lookups: the `sub` when known, else the user name.
    #[must_use]
    pub fn lookup_key(&self) -> Option<&str> {
        self.user_id.as_deref().or(self.user_name.as_deref())
    }
}

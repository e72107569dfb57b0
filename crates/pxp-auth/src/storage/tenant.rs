//! Tenant resolution.
//!
//! The claim injector asks a [`TenantResolver`] for the user's currently
//! active company. Real deployments back this with the active-company table;
//! [`InMemoryTenantResolver`] serves static memberships from configuration
//! and tests.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::AuthResult;
use crate::config::TenantMembership;
use crate::types::TenantContext;

// =============================================================================
// Tenant Resolver Trait
// =============================================================================

/// Looks up the active tenant of a user.
///
/// # Example
///
/// ```ignore
/// use pxp_auth::storage::TenantResolver;
///
/// async fn example(resolver: &impl TenantResolver) -> AuthResult<()> {
///     if let Some(tenant) = resolver.active_tenant("user-sub").await? {
///         println!("active company: {}", tenant.company_id);
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait TenantResolver: Send + Sync {
    /// Returns the active tenant of the user, or `None` when the user has no
    /// active company.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be queried. Callers must
    /// treat this as a failed lookup, never as "no tenant".
    async fn active_tenant(&self, user: &str) -> AuthResult<Option<TenantContext>>;
}

// =============================================================================
// In-memory implementation
// =============================================================================

/// Tenant resolver backed by a concurrent map.
#[derive(Debug, Default)]
pub struct InMemoryTenantResolver {
    tenants: DashMap<String, TenantContext>,
}

impl InMemoryTenantResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver from configured memberships. Later entries for
    /// the same user win.
    #[must_use]
    pub fn from_memberships(memberships: &[TenantMembership]) -> Self {
        let resolver = Self::new();
        for m in memberships {
            resolver.set_active(
                m.user.clone(),
                TenantContext::new(m.company_id.clone(), m.company_role.clone()),
            );
        }
        resolver
    }

    /// Sets the active tenant of a user, returning the previous one.
    pub fn set_active(&self, user: impl Into<String>, tenant: TenantContext) -> Option<TenantContext> {
        self.tenants.insert(user.into(), tenant)
    }

    /// Clears the active tenant of a user.
    pub fn clear(&self, user: &str) -> Option<TenantContext> {
        self.tenants.remove(user).map(|(_, tenant)| tenant)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }
}

#[async_trait]
impl TenantResolver for InMemoryTenantResolver {
    async fn active_tenant(&self, user: &str) -> AuthResult<Option<TenantContext>> {
        Ok(self.tenants.get(user).map(|entry| entry.value().clone()))
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use warden_core::AppResult;
use warden_domain::{PermissionCatalog, PermissionGrant, RoleId, RoleRecord, UserId};

use crate::PermissionCache;

mod decisions;
mod resolution;

/// Repository port for permission lookups.
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Finds a role by id.
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<RoleRecord>>;

    /// Lists explicit grant rows of a role.
    async fn list_role_grants(&self, role_id: RoleId) -> AppResult<Vec<PermissionGrant>>;

    /// Lists explicit user-level grant rows.
    async fn list_user_grants(&self, user_id: UserId) -> AppResult<Vec<PermissionGrant>>;

    /// Lists role ids assigned to a user.
    async fn list_user_role_ids(&self, user_id: UserId) -> AppResult<Vec<RoleId>>;
}

/// Application service resolving effective permissions.
///
/// Every resolution is a full recomputation from the repository that also
/// refreshes the derived cache items, so concurrent calls for the same
/// subject are independent and converge on the same value.
#[derive(Clone)]
pub struct AuthorizationService {
    repository: Arc<dyn AuthorizationRepository>,
    cache: PermissionCache,
    catalog: Arc<PermissionCatalog>,
}

impl AuthorizationService {
    /// Creates a new authorization service from a repository implementation.
    #[must_use]
    pub fn new(
        repository: Arc<dyn AuthorizationRepository>,
        cache: PermissionCache,
        catalog: Arc<PermissionCatalog>,
    ) -> Self {
        Self {
            repository,
            cache,
            catalog,
        }
    }

    /// Returns the permission catalog used for resolution.
    #[must_use]
    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    pub(crate) fn cache(&self) -> &PermissionCache {
        &self.cache
    }
}

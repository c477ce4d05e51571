use std::collections::BTreeSet;

use tracing::debug;
use warden_core::AppError;
use warden_domain::{
    RolePermissionCacheItem, UserGrantPartition, UserPermissionCacheItem, UserRoleCacheItem,
    role_effective_permissions, user_effective_permissions,
};

use super::*;

impl AuthorizationService {
    /// Resolves the effective permission set of one role.
    pub async fn resolve_role_permissions(&self, role_id: RoleId) -> AppResult<BTreeSet<String>> {
        self.load_role_permissions(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))
    }

    /// Resolves the effective permission set of one user.
    ///
    /// Starts from the user's direct grants, then unions every role set
    /// except names the user is explicitly prohibited from.
    pub async fn resolve_user_permissions(&self, user_id: UserId) -> AppResult<BTreeSet<String>> {
        let role_ids = self.repository.list_user_role_ids(user_id).await?;
        self.cache
            .set_user_roles(&UserRoleCacheItem {
                user_id,
                role_ids: role_ids.clone(),
            })
            .await;

        let grants = self.repository.list_user_grants(user_id).await?;
        let partition = UserGrantPartition::from_grants(&grants);
        self.cache
            .set_user_permissions(&UserPermissionCacheItem {
                user_id,
                granted_user_permissions: partition.granted.clone(),
                prohibited_user_permissions: partition.prohibited.clone(),
            })
            .await;

        let mut role_sets = Vec::with_capacity(role_ids.len());
        for role_id in role_ids {
            match self.load_role_permissions(role_id).await? {
                Some(permissions) => role_sets.push(permissions),
                None => debug!(%user_id, %role_id, "skipping assignment to missing role"),
            }
        }

        let mut effective = user_effective_permissions(&partition, &role_sets);
        effective.retain(|name| self.catalog.contains(name));
        Ok(effective)
    }

    pub(crate) async fn load_role_permissions(
        &self,
        role_id: RoleId,
    ) -> AppResult<Option<BTreeSet<String>>> {
        let Some(role) = self.repository.find_role(role_id).await? else {
            self.cache.remove_role_permissions(role_id).await;
            return Ok(None);
        };

        let grants = self.repository.list_role_grants(role_id).await?;
        let granted_permissions = role_effective_permissions(&role, &grants, &self.catalog);
        self.cache
            .set_role_permissions(&RolePermissionCacheItem {
                role_id,
                granted_permissions: granted_permissions.clone(),
            })
            .await;

        Ok(Some(granted_permissions))
    }
}

use tracing::debug;
use warden_core::AppError;
use warden_domain::{PermissionDefinition, UserGrantPartition};

use super::*;

impl AuthorizationService {
    /// Returns whether the user currently holds the permission.
    ///
    /// Answers from cached items when all of them are present, otherwise
    /// performs a full resolution, which also repopulates the cache. Unknown
    /// permission names are never granted.
    pub async fn is_granted(&self, user_id: UserId, permission_name: &str) -> AppResult<bool> {
        if !self.catalog.contains(permission_name) {
            return Ok(false);
        }

        if let Some(decision) = self.cached_decision(user_id, permission_name).await {
            debug!(%user_id, permission_name, decision, "permission decided from cache");
            return Ok(decision);
        }

        Ok(self
            .resolve_user_permissions(user_id)
            .await?
            .contains(permission_name))
    }

    /// Returns whether the user holds a catalog permission.
    ///
    /// Unlike [`Self::is_granted`], unknown names are a validation error.
    pub async fn has_permission(&self, user_id: UserId, permission_name: &str) -> AppResult<bool> {
        self.catalog.ensure_known([permission_name])?;
        self.is_granted(user_id, permission_name).await
    }

    /// Ensures the user holds the permission.
    pub async fn require_permission(&self, user_id: UserId, permission_name: &str) -> AppResult<()> {
        if self.has_permission(user_id, permission_name).await? {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{user_id}' is missing permission '{permission_name}'"
        )))
    }

    /// Lists catalog definitions of every permission the user holds.
    pub async fn list_granted_permissions(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<PermissionDefinition>> {
        let granted = self.resolve_user_permissions(user_id).await?;

        Ok(self
            .catalog
            .definitions()
            .iter()
            .filter(|definition| granted.contains(definition.name()))
            .cloned()
            .collect())
    }

    async fn cached_decision(&self, user_id: UserId, permission_name: &str) -> Option<bool> {
        let roles = self.cache.user_roles(user_id).await?;
        let overrides = self.cache.user_permissions(user_id).await?;
        let partition = UserGrantPartition::from_sets(
            overrides.granted_user_permissions,
            overrides.prohibited_user_permissions,
        );

        let mut role_sets = Vec::with_capacity(roles.role_ids.len());
        for role_id in roles.role_ids {
            let item = self.cache.role_permissions(role_id).await?;
            role_sets.push(item.granted_permissions);
        }

        Some(partition.decides(permission_name, &role_sets))
    }
}

use super::*;

use warden_domain::normalize_grant_changes;

impl SecurityAdminService {
    /// Replaces every user-level grant row of a user.
    pub async fn set_user_permissions(
        &self,
        actor: UserId,
        user_id: UserId,
        overrides: Vec<PermissionGrant>,
    ) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor, permission_names::USERS_CHANGE_PERMISSIONS)
            .await?;

        let overrides = normalize_grant_changes(overrides);
        self.authorization_service
            .catalog()
            .ensure_known(overrides.iter().map(|grant| grant.permission_name.as_str()))?;

        self.store_user_overrides(actor, user_id, &overrides).await
    }

    /// Stores the overrides that make the user hold exactly `granted_permissions`.
    ///
    /// Names the user's roles already provide need no row, names they provide
    /// but the user should not hold become prohibitions.
    pub async fn set_user_granted_permissions(
        &self,
        actor: UserId,
        user_id: UserId,
        granted_permissions: Vec<String>,
    ) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor, permission_names::USERS_CHANGE_PERMISSIONS)
            .await?;

        let desired: BTreeSet<String> = granted_permissions.into_iter().collect();
        self.ensure_catalog_names(&desired)?;

        let from_roles = self.role_derived_permissions(user_id).await?;
        let overrides: Vec<PermissionGrant> = self
            .authorization_service
            .catalog()
            .definitions()
            .iter()
            .map(|definition| definition.name())
            .filter_map(|name| {
                match (desired.contains(name), from_roles.contains(name)) {
                    (true, false) => Some(PermissionGrant::granted(name)),
                    (false, true) => Some(PermissionGrant::prohibited(name)),
                    _ => None,
                }
            })
            .collect();

        self.store_user_overrides(actor, user_id, &overrides).await
    }

    /// Removes every user-level override so only roles apply.
    pub async fn reset_user_permissions(&self, actor: UserId, user_id: UserId) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor, permission_names::USERS_CHANGE_PERMISSIONS)
            .await?;

        self.store_user_overrides(actor, user_id, &[]).await
    }

    /// Replaces the role assignments of a user.
    pub async fn set_user_roles(
        &self,
        actor: UserId,
        user_id: UserId,
        role_ids: Vec<RoleId>,
    ) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor, permission_names::USERS_EDIT)
            .await?;

        let role_ids: Vec<RoleId> = role_ids
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        self.repository.replace_user_roles(user_id, &role_ids).await?;

        self.authorization_service
            .cache()
            .remove_user_roles(user_id)
            .await;

        info!(%actor, %user_id, role_count = role_ids.len(), "user roles replaced");
        Ok(())
    }

    async fn store_user_overrides(
        &self,
        actor: UserId,
        user_id: UserId,
        overrides: &[PermissionGrant],
    ) -> AppResult<()> {
        self.repository.replace_user_grants(user_id, overrides).await?;

        self.authorization_service
            .cache()
            .remove_user_permissions(user_id)
            .await;

        info!(%actor, %user_id, override_count = overrides.len(), "user permissions replaced");
        Ok(())
    }

    async fn role_derived_permissions(&self, user_id: UserId) -> AppResult<BTreeSet<String>> {
        let mut permissions = BTreeSet::new();
        for role_id in self.authorization_repository.list_user_role_ids(user_id).await? {
            if let Some(role_permissions) = self
                .authorization_service
                .load_role_permissions(role_id)
                .await?
            {
                permissions.extend(role_permissions);
            }
        }

        Ok(permissions)
    }
}

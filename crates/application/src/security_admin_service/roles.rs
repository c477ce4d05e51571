use super::*;

use crate::{CreateRoleInput, NewRole, RoleUpdate};

impl SecurityAdminService {
    /// Creates a role holding exactly the requested permissions.
    pub async fn create_role(
        &self,
        actor: UserId,
        input: CreateRoleInput,
    ) -> AppResult<RoleRecord> {
        self.authorization_service
            .require_permission(actor, permission_names::ROLES_CREATE)
            .await?;

        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("role name must not be empty".to_owned()));
        }

        let desired: BTreeSet<String> = input.granted_permissions.into_iter().collect();
        self.ensure_catalog_names(&desired)?;

        let is_privileged = RoleRecord::privileged_for_name(name);
        let display_name = match input.display_name.trim() {
            "" => name.to_owned(),
            display_name => display_name.to_owned(),
        };

        let role = self
            .repository
            .create_role(NewRole {
                name: name.to_owned(),
                display_name,
                is_privileged,
                grants: self.role_grant_rows(is_privileged, &desired),
            })
            .await?;

        self.authorization_service
            .cache()
            .remove_role_permissions(role.role_id)
            .await;

        info!(%actor, role_id = %role.role_id, role_name = %role.name, "role created");
        Ok(role)
    }

    /// Renames a role.
    ///
    /// A rename that flips the privilege flag re-derives the grant rows so
    /// the role keeps its current effective set.
    pub async fn rename_role(
        &self,
        actor: UserId,
        role_id: RoleId,
        name: &str,
        display_name: &str,
    ) -> AppResult<RoleRecord> {
        self.authorization_service
            .require_permission(actor, permission_names::ROLES_EDIT)
            .await?;

        let current = self.find_role(role_id).await?;
        let renamed = RoleRecord::new(role_id, name, display_name)?;

        let grants = if renamed.is_privileged != current.is_privileged {
            let effective = self
                .authorization_service
                .resolve_role_permissions(role_id)
                .await?;
            Some(self.role_grant_rows(renamed.is_privileged, &effective))
        } else {
            None
        };

        let result = self
            .repository
            .update_role(
                role_id,
                RoleUpdate {
                    name: renamed.name.clone(),
                    display_name: renamed.display_name.clone(),
                    is_privileged: renamed.is_privileged,
                    grants,
                },
            )
            .await;

        // Invalidate on the error path as well.
        self.authorization_service
            .cache()
            .remove_role_permissions(role_id)
            .await;
        result?;

        info!(%actor, %role_id, role_name = %renamed.name, "role renamed");
        Ok(renamed)
    }

    /// Replaces a role's grants so that it effectively holds `granted_permissions`.
    pub async fn set_role_permissions(
        &self,
        actor: UserId,
        role_id: RoleId,
        granted_permissions: Vec<String>,
    ) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor, permission_names::ROLES_EDIT)
            .await?;

        let desired: BTreeSet<String> = granted_permissions.into_iter().collect();
        self.ensure_catalog_names(&desired)?;

        let role = self.find_role(role_id).await?;
        self.repository
            .replace_role_grants(role_id, &self.role_grant_rows(role.is_privileged, &desired))
            .await?;

        self.authorization_service
            .cache()
            .remove_role_permissions(role_id)
            .await;

        info!(%actor, %role_id, permission_count = desired.len(), "role permissions replaced");
        Ok(())
    }

    /// Deletes a role together with its grants and assignments.
    pub async fn delete_role(&self, actor: UserId, role_id: RoleId) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor, permission_names::ROLES_DELETE)
            .await?;

        let affected_users = self.repository.delete_role(role_id).await?;

        let cache = self.authorization_service.cache();
        cache.remove_role_permissions(role_id).await;
        for user_id in &affected_users {
            cache.remove_user_roles(*user_id).await;
        }

        info!(%actor, %role_id, affected_users = affected_users.len(), "role deleted");
        Ok(())
    }

    /// Lists the stored grant rows of a role.
    pub async fn list_role_grants(
        &self,
        actor: UserId,
        role_id: RoleId,
    ) -> AppResult<Vec<PermissionGrant>> {
        self.authorization_service
            .require_permission(actor, permission_names::ROLES)
            .await?;

        self.find_role(role_id).await?;
        self.authorization_repository.list_role_grants(role_id).await
    }
}

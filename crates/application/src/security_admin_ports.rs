use async_trait::async_trait;

use warden_core::AppResult;
use warden_domain::{PermissionGrant, RoleId, RoleRecord, UserId};

/// Input payload for creating roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Unique role name.
    pub name: String,
    /// Human-readable label.
    pub display_name: String,
    /// Permissions the role should effectively hold after creation.
    pub granted_permissions: Vec<String>,
}

/// Role row to persist, with grant rows already derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRole {
    /// Unique role name.
    pub name: String,
    /// Human-readable label.
    pub display_name: String,
    /// Stored privilege flag.
    pub is_privileged: bool,
    /// Grant rows to insert with the role.
    pub grants: Vec<PermissionGrant>,
}

/// Role row update, optionally replacing the role's grant rows in the same write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleUpdate {
    /// Unique role name.
    pub name: String,
    /// Human-readable label.
    pub display_name: String,
    /// Stored privilege flag.
    pub is_privileged: bool,
    /// Replacement grant rows; `None` leaves the stored rows untouched.
    pub grants: Option<Vec<PermissionGrant>>,
}

/// Repository port for grant and role-assignment writes.
///
/// Every method that replaces rows does so in one transaction: old rows are
/// deleted and new rows inserted, never updated in place.
#[async_trait]
pub trait SecurityAdminRepository: Send + Sync {
    /// Creates a role with its grant rows.
    async fn create_role(&self, role: NewRole) -> AppResult<RoleRecord>;

    /// Updates a role row and, when `update.grants` is set, replaces its
    /// grant rows. Both writes land together or not at all.
    async fn update_role(&self, role_id: RoleId, update: RoleUpdate) -> AppResult<()>;

    /// Replaces every grant row of a role.
    async fn replace_role_grants(
        &self,
        role_id: RoleId,
        grants: &[PermissionGrant],
    ) -> AppResult<()>;

    /// Deletes a role, its grants and assignments; returns previously assigned users.
    async fn delete_role(&self, role_id: RoleId) -> AppResult<Vec<UserId>>;

    /// Replaces every user-level grant row of a user.
    async fn replace_user_grants(
        &self,
        user_id: UserId,
        grants: &[PermissionGrant],
    ) -> AppResult<()>;

    /// Replaces the role assignments of a user.
    async fn replace_user_roles(&self, user_id: UserId, role_ids: &[RoleId]) -> AppResult<()>;
}

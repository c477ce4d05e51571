use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use warden_application::{NewRole, RoleUpdate, SecurityAdminRepository};
use warden_core::{AppError, AppResult};
use warden_domain::{PermissionGrant, RoleId, RoleRecord, UserId};

use crate::postgres_authorization_repository::RoleRow;

mod roles;
mod users;


/// PostgreSQL-backed repository for grant and assignment writes.
///
/// Replacements run in one transaction: superseded rows are deleted and the
/// new rows inserted.
#[derive(Clone)]
pub struct PostgresSecurityAdminRepository {
    pool: PgPool,
}

impl PostgresSecurityAdminRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))
    }
}

#[async_trait]
impl SecurityAdminRepository for PostgresSecurityAdminRepository {
    async fn create_role(&self, role: NewRole) -> AppResult<RoleRecord> {
        self.create_role_impl(role).await
    }

    async fn update_role(&self, role_id: RoleId, update: RoleUpdate) -> AppResult<()> {
        self.update_role_impl(role_id, update).await
    }

    async fn replace_role_grants(
        &self,
        role_id: RoleId,
        grants: &[PermissionGrant],
    ) -> AppResult<()> {
        self.replace_role_grants_impl(role_id, grants).await
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<Vec<UserId>> {
        self.delete_role_impl(role_id).await
    }

    async fn replace_user_grants(
        &self,
        user_id: UserId,
        grants: &[PermissionGrant],
    ) -> AppResult<()> {
        self.replace_user_grants_impl(user_id, grants).await
    }

    async fn replace_user_roles(&self, user_id: UserId, role_ids: &[RoleId]) -> AppResult<()> {
        self.replace_user_roles_impl(user_id, role_ids).await
    }
}

async fn commit(transaction: Transaction<'_, Postgres>) -> AppResult<()> {
    transaction
        .commit()
        .await
        .map_err(|error| AppError::Internal(format!("failed to commit transaction: {error}")))
}

fn map_role_conflict(error: sqlx::Error, role_name: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(format!("role '{role_name}' already exists"));
    }

    AppError::Internal(format!("failed to write role '{role_name}': {error}"))
}

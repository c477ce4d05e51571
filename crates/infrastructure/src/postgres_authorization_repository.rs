use async_trait::async_trait;

use warden_application::AuthorizationRepository;
use warden_core::{AppError, AppResult};
use warden_domain::{PermissionGrant, RoleId, RoleRecord, UserId};

use sqlx::{FromRow, PgPool};

/// PostgreSQL-backed repository for permission lookups.
#[derive(Clone)]
pub struct PostgresAuthorizationRepository {
    pool: PgPool,
}

impl PostgresAuthorizationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct RoleRow {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) display_name: String,
    pub(crate) is_privileged: bool,
}

impl From<RoleRow> for RoleRecord {
    fn from(row: RoleRow) -> Self {
        Self {
            role_id: RoleId::new(row.id),
            name: row.name,
            display_name: row.display_name,
            is_privileged: row.is_privileged,
        }
    }
}

#[derive(Debug, FromRow)]
struct GrantRow {
    name: String,
    is_granted: bool,
}

impl From<GrantRow> for PermissionGrant {
    fn from(row: GrantRow) -> Self {
        Self {
            permission_name: row.name,
            is_granted: row.is_granted,
        }
    }
}

#[async_trait]
impl AuthorizationRepository for PostgresAuthorizationRepository {
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<RoleRecord>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, display_name, is_privileged
            FROM roles
            WHERE id = $1
            "#,
        )
        .bind(role_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role '{role_id}': {error}")))?;

        Ok(row.map(RoleRecord::from))
    }

    async fn list_role_grants(&self, role_id: RoleId) -> AppResult<Vec<PermissionGrant>> {
        let rows = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT name, is_granted
            FROM role_permissions
            WHERE role_id = $1
            ORDER BY name, id
            "#,
        )
        .bind(role_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load role grants: {error}")))?;

        Ok(rows.into_iter().map(PermissionGrant::from).collect())
    }

    async fn list_user_grants(&self, user_id: UserId) -> AppResult<Vec<PermissionGrant>> {
        let rows = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT name, is_granted
            FROM user_permissions
            WHERE user_id = $1
            ORDER BY name, id
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load user grants: {error}")))?;

        Ok(rows.into_iter().map(PermissionGrant::from).collect())
    }

    async fn list_user_role_ids(&self, user_id: UserId) -> AppResult<Vec<RoleId>> {
        let role_ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT role_id
            FROM user_roles
            WHERE user_id = $1
            ORDER BY role_id
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load user roles: {error}")))?;

        Ok(role_ids.into_iter().map(RoleId::new).collect())
    }
}

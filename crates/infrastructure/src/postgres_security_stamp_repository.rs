use async_trait::async_trait;
use sqlx::PgPool;

use warden_application::SecurityStampRepository;
use warden_core::{AppError, AppResult};
use warden_domain::{SecurityStamp, UserId};

/// PostgreSQL-backed access to the users' security stamps.
#[derive(Clone)]
pub struct PostgresSecurityStampRepository {
    pool: PgPool,
}

impl PostgresSecurityStampRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SecurityStampRepository for PostgresSecurityStampRepository {
    async fn find_security_stamp(&self, user_id: UserId) -> AppResult<Option<SecurityStamp>> {
        let stamp = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            SELECT security_stamp
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load security stamp: {error}")))?;

        Ok(stamp.map(SecurityStamp::from_uuid))
    }

    async fn update_security_stamp(&self, user_id: UserId, stamp: SecurityStamp) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET security_stamp = $2
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_i64())
        .bind(stamp.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to update security stamp: {error}"))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("user '{user_id}' was not found")));
        }

        Ok(())
    }
}

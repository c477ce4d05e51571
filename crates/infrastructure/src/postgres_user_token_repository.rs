use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use warden_application::{UserTokenRecord, UserTokenRepository};
use warden_core::{AppError, AppResult};
use warden_domain::{TokenKey, UserId};

/// PostgreSQL-backed repository for issued token records.
#[derive(Clone)]
pub struct PostgresUserTokenRepository {
    pool: PgPool,
}

impl PostgresUserTokenRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserTokenRepository for PostgresUserTokenRepository {
    async fn create_token(&self, record: &UserTokenRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_tokens (user_id, token_key, expire_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(record.user_id.as_i64())
        .bind(record.token_key.as_uuid())
        .bind(record.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to persist token record: {error}")))?;

        Ok(())
    }

    async fn is_token_live(
        &self,
        user_id: UserId,
        token_key: TokenKey,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM user_tokens
                WHERE user_id = $1
                    AND token_key = $2
                    AND expire_at > $3
            )
            "#,
        )
        .bind(user_id.as_i64())
        .bind(token_key.as_uuid())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to check token record: {error}")))
    }

    async fn delete_token(&self, user_id: UserId, token_key: TokenKey) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_tokens
            WHERE user_id = $1 AND token_key = $2
            "#,
        )
        .bind(user_id.as_i64())
        .bind(token_key.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete token record: {error}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_tokens_for_user(&self, user_id: UserId) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_tokens
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to delete token records for user: {error}"))
        })?;

        Ok(result.rows_affected())
    }
}

use super::*;

impl PostgresSecurityAdminRepository {
    pub(super) async fn replace_user_grants_impl(
        &self,
        user_id: UserId,
        grants: &[PermissionGrant],
    ) -> AppResult<()> {
        let mut transaction = self.begin().await?;

        let exists = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM users WHERE id = $1 FOR UPDATE
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to lock user: {error}")))?;
        if exists.is_none() {
            return Err(AppError::NotFound(format!("user '{user_id}' was not found")));
        }

        sqlx::query(
            r#"
            DELETE FROM user_permissions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_i64())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to clear user grants: {error}")))?;

        for grant in grants {
            sqlx::query(
                r#"
                INSERT INTO user_permissions (user_id, name, is_granted)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(user_id.as_i64())
            .bind(grant.permission_name.as_str())
            .bind(grant.is_granted)
            .execute(&mut *transaction)
            .await
            .map_err(|error| map_user_error(error, user_id, "persist user grants"))?;
        }

        commit(transaction).await
    }

    pub(super) async fn replace_user_roles_impl(
        &self,
        user_id: UserId,
        role_ids: &[RoleId],
    ) -> AppResult<()> {
        let mut transaction = self.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM user_roles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_i64())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to clear user roles: {error}")))?;

        for role_id in role_ids {
            sqlx::query(
                r#"
                INSERT INTO user_roles (user_id, role_id)
                VALUES ($1, $2)
                ON CONFLICT (user_id, role_id) DO NOTHING
                "#,
            )
            .bind(user_id.as_i64())
            .bind(role_id.as_i64())
            .execute(&mut *transaction)
            .await
            .map_err(|error| map_user_error(error, user_id, "assign roles"))?;
        }

        commit(transaction).await
    }
}

fn map_user_error(error: sqlx::Error, user_id: UserId, action: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23503")
    {
        return AppError::NotFound(format!(
            "failed to {action} for user '{user_id}': referenced user or role was not found"
        ));
    }

    AppError::Internal(format!("failed to {action} for user '{user_id}': {error}"))
}

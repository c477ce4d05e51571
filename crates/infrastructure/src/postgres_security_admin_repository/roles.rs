use super::*;

impl PostgresSecurityAdminRepository {
    pub(super) async fn create_role_impl(&self, role: NewRole) -> AppResult<RoleRecord> {
        let mut transaction = self.begin().await?;

        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            INSERT INTO roles (name, display_name, is_privileged)
            VALUES ($1, $2, $3)
            RETURNING id, name, display_name, is_privileged
            "#,
        )
        .bind(role.name.as_str())
        .bind(role.display_name.as_str())
        .bind(role.is_privileged)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| map_role_conflict(error, role.name.as_str()))?;

        let role_id = RoleId::new(row.id);
        insert_role_grants(&mut transaction, role_id, &role.grants).await?;
        commit(transaction).await?;

        Ok(RoleRecord::from(row))
    }

    pub(super) async fn update_role_impl(
        &self,
        role_id: RoleId,
        update: RoleUpdate,
    ) -> AppResult<()> {
        let mut transaction = self.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE roles
            SET name = $2, display_name = $3, is_privileged = $4
            WHERE id = $1
            "#,
        )
        .bind(role_id.as_i64())
        .bind(update.name.as_str())
        .bind(update.display_name.as_str())
        .bind(update.is_privileged)
        .execute(&mut *transaction)
        .await
        .map_err(|error| map_role_conflict(error, update.name.as_str()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("role '{role_id}' was not found")));
        }

        if let Some(grants) = update.grants.as_deref() {
            clear_role_grants(&mut transaction, role_id).await?;
            insert_role_grants(&mut transaction, role_id, grants).await?;
        }

        commit(transaction).await
    }

    pub(super) async fn replace_role_grants_impl(
        &self,
        role_id: RoleId,
        grants: &[PermissionGrant],
    ) -> AppResult<()> {
        let mut transaction = self.begin().await?;

        let exists = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM roles WHERE id = $1 FOR UPDATE
            "#,
        )
        .bind(role_id.as_i64())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to lock role: {error}")))?;
        if exists.is_none() {
            return Err(AppError::NotFound(format!("role '{role_id}' was not found")));
        }

        clear_role_grants(&mut transaction, role_id).await?;
        insert_role_grants(&mut transaction, role_id, grants).await?;
        commit(transaction).await
    }

    pub(super) async fn delete_role_impl(&self, role_id: RoleId) -> AppResult<Vec<UserId>> {
        let mut transaction = self.begin().await?;

        let user_ids = sqlx::query_scalar::<_, i64>(
            r#"
            DELETE FROM user_roles
            WHERE role_id = $1
            RETURNING user_id
            "#,
        )
        .bind(role_id.as_i64())
        .fetch_all(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to remove role assignments: {error}"))
        })?;

        let result = sqlx::query(
            r#"
            DELETE FROM roles
            WHERE id = $1
            "#,
        )
        .bind(role_id.as_i64())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete role: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("role '{role_id}' was not found")));
        }

        commit(transaction).await?;

        let mut user_ids: Vec<UserId> = user_ids.into_iter().map(UserId::new).collect();
        user_ids.sort();
        Ok(user_ids)
    }
}

async fn clear_role_grants(
    transaction: &mut Transaction<'_, Postgres>,
    role_id: RoleId,
) -> AppResult<()> {
    sqlx::query(
        r#"
        DELETE FROM role_permissions
        WHERE role_id = $1
        "#,
    )
    .bind(role_id.as_i64())
    .execute(&mut **transaction)
    .await
    .map_err(|error| AppError::Internal(format!("failed to clear role grants: {error}")))?;

    Ok(())
}

async fn insert_role_grants(
    transaction: &mut Transaction<'_, Postgres>,
    role_id: RoleId,
    grants: &[PermissionGrant],
) -> AppResult<()> {
    for grant in grants {
        sqlx::query(
            r#"
            INSERT INTO role_permissions (role_id, name, is_granted)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(role_id.as_i64())
        .bind(grant.permission_name.as_str())
        .bind(grant.is_granted)
        .execute(&mut **transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to persist role grants: {error}")))?;
    }

    Ok(())
}

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use warden_application::{
    AuthorizationRepository, NewRole, RoleUpdate, SecurityAdminRepository,
    SecurityStampRepository, UserTokenRecord, UserTokenRepository,
};
use warden_core::{AppError, AppResult};
use warden_domain::{
    PermissionGrant, RoleId, RoleRecord, SecurityStamp, TokenKey, UserId,
};

#[derive(Debug, Clone)]
struct StoredUser {
    user_name: String,
    security_stamp: SecurityStamp,
    role_ids: Vec<RoleId>,
    grants: Vec<PermissionGrant>,
}

#[derive(Debug, Default)]
struct SecurityState {
    roles: BTreeMap<RoleId, RoleRecord>,
    role_grants: HashMap<RoleId, Vec<PermissionGrant>>,
    users: BTreeMap<UserId, StoredUser>,
    tokens: HashMap<(UserId, TokenKey), DateTime<Utc>>,
    next_role_id: i64,
    next_user_id: i64,
}

/// In-memory implementation of every security store port.
///
/// Intended for tests and local development without PostgreSQL.
#[derive(Debug, Default)]
pub struct InMemorySecurityStore {
    state: RwLock<SecurityState>,
}

impl InMemorySecurityStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a user with a fresh security stamp.
    pub async fn create_user(&self, user_name: &str) -> AppResult<(UserId, SecurityStamp)> {
        let user_name = user_name.trim();
        if user_name.is_empty() {
            return Err(AppError::Validation("user name must not be empty".to_owned()));
        }

        let mut state = self.state.write().await;
        if state.users.values().any(|user| user.user_name == user_name) {
            return Err(AppError::Conflict(format!("user '{user_name}' already exists")));
        }

        state.next_user_id += 1;
        let user_id = UserId::new(state.next_user_id);
        let security_stamp = SecurityStamp::generate();
        state.users.insert(
            user_id,
            StoredUser {
                user_name: user_name.to_owned(),
                security_stamp,
                role_ids: Vec::new(),
                grants: Vec::new(),
            },
        );

        Ok((user_id, security_stamp))
    }

    /// Returns the number of live or expired token records of a user.
    pub async fn token_count(&self, user_id: UserId) -> usize {
        self.state
            .read()
            .await
            .tokens
            .keys()
            .filter(|(owner, _)| *owner == user_id)
            .count()
    }
}

fn missing_user(user_id: UserId) -> AppError {
    AppError::NotFound(format!("user '{user_id}' was not found"))
}

fn missing_role(role_id: RoleId) -> AppError {
    AppError::NotFound(format!("role '{role_id}' was not found"))
}

#[async_trait]
impl AuthorizationRepository for InMemorySecurityStore {
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<RoleRecord>> {
        Ok(self.state.read().await.roles.get(&role_id).cloned())
    }

    async fn list_role_grants(&self, role_id: RoleId) -> AppResult<Vec<PermissionGrant>> {
        Ok(self
            .state
            .read()
            .await
            .role_grants
            .get(&role_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_user_grants(&self, user_id: UserId) -> AppResult<Vec<PermissionGrant>> {
        Ok(self
            .state
            .read()
            .await
            .users
            .get(&user_id)
            .map(|user| user.grants.clone())
            .unwrap_or_default())
    }

    async fn list_user_role_ids(&self, user_id: UserId) -> AppResult<Vec<RoleId>> {
        Ok(self
            .state
            .read()
            .await
            .users
            .get(&user_id)
            .map(|user| user.role_ids.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl SecurityAdminRepository for InMemorySecurityStore {
    async fn create_role(&self, role: NewRole) -> AppResult<RoleRecord> {
        let mut state = self.state.write().await;
        if state.roles.values().any(|existing| existing.name == role.name) {
            return Err(AppError::Conflict(format!("role '{}' already exists", role.name)));
        }

        state.next_role_id += 1;
        let record = RoleRecord {
            role_id: RoleId::new(state.next_role_id),
            name: role.name,
            display_name: role.display_name,
            is_privileged: role.is_privileged,
        };
        state.role_grants.insert(record.role_id, role.grants);
        state.roles.insert(record.role_id, record.clone());

        Ok(record)
    }

    async fn update_role(&self, role_id: RoleId, update: RoleUpdate) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state
            .roles
            .values()
            .any(|existing| existing.role_id != role_id && existing.name == update.name)
        {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                update.name
            )));
        }

        let role = state
            .roles
            .get_mut(&role_id)
            .ok_or_else(|| missing_role(role_id))?;
        role.name = update.name;
        role.display_name = update.display_name;
        role.is_privileged = update.is_privileged;
        if let Some(grants) = update.grants {
            state.role_grants.insert(role_id, grants);
        }

        Ok(())
    }

    async fn replace_role_grants(
        &self,
        role_id: RoleId,
        grants: &[PermissionGrant],
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.roles.contains_key(&role_id) {
            return Err(missing_role(role_id));
        }

        state.role_grants.insert(role_id, grants.to_vec());
        Ok(())
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<Vec<UserId>> {
        let mut state = self.state.write().await;
        if state.roles.remove(&role_id).is_none() {
            return Err(missing_role(role_id));
        }
        state.role_grants.remove(&role_id);

        let mut affected = Vec::new();
        for (user_id, user) in &mut state.users {
            let before = user.role_ids.len();
            user.role_ids.retain(|assigned| *assigned != role_id);
            if user.role_ids.len() != before {
                affected.push(*user_id);
            }
        }

        Ok(affected)
    }

    async fn replace_user_grants(
        &self,
        user_id: UserId,
        grants: &[PermissionGrant],
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| missing_user(user_id))?;
        user.grants = grants.to_vec();

        Ok(())
    }

    async fn replace_user_roles(&self, user_id: UserId, role_ids: &[RoleId]) -> AppResult<()> {
        let mut state = self.state.write().await;
        if let Some(role_id) = role_ids
            .iter()
            .find(|role_id| !state.roles.contains_key(*role_id))
        {
            return Err(missing_role(*role_id));
        }

        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| missing_user(user_id))?;
        user.role_ids = role_ids.to_vec();

        Ok(())
    }
}

#[async_trait]
impl UserTokenRepository for InMemorySecurityStore {
    async fn create_token(&self, record: &UserTokenRecord) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&record.user_id) {
            return Err(missing_user(record.user_id));
        }

        state
            .tokens
            .insert((record.user_id, record.token_key), record.expires_at);
        Ok(())
    }

    async fn is_token_live(
        &self,
        user_id: UserId,
        token_key: TokenKey,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        Ok(self
            .state
            .read()
            .await
            .tokens
            .get(&(user_id, token_key))
            .is_some_and(|expires_at| *expires_at > now))
    }

    async fn delete_token(&self, user_id: UserId, token_key: TokenKey) -> AppResult<bool> {
        Ok(self
            .state
            .write()
            .await
            .tokens
            .remove(&(user_id, token_key))
            .is_some())
    }

    async fn delete_tokens_for_user(&self, user_id: UserId) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let before = state.tokens.len();
        state.tokens.retain(|(owner, _), _| *owner != user_id);

        Ok(u64::try_from(before - state.tokens.len()).unwrap_or(u64::MAX))
    }
}

#[async_trait]
impl SecurityStampRepository for InMemorySecurityStore {
    async fn find_security_stamp(&self, user_id: UserId) -> AppResult<Option<SecurityStamp>> {
        Ok(self
            .state
            .read()
            .await
            .users
            .get(&user_id)
            .map(|user| user.security_stamp))
    }

    async fn update_security_stamp(&self, user_id: UserId, stamp: SecurityStamp) -> AppResult<()> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| missing_user(user_id))?;
        user.security_stamp = stamp;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use warden_application::{
        AuthorizationRepository, NewRole, RoleUpdate, SecurityAdminRepository, UserTokenRecord,
        UserTokenRepository,
    };
    use warden_core::AppError;
    use warden_domain::{PermissionGrant, TokenKey, UserId, permission_names};

    use super::InMemorySecurityStore;

    fn role(name: &str) -> NewRole {
        NewRole {
            name: name.to_owned(),
            display_name: name.to_owned(),
            is_privileged: false,
            grants: vec![PermissionGrant::granted(permission_names::USERS)],
        }
    }

    #[tokio::test]
    async fn deleting_role_reports_assigned_users() {
        let store = InMemorySecurityStore::new();
        let (first, _) = store
            .create_user("first")
            .await
            .unwrap_or_else(|error| panic!("user should be created: {error}"));
        let (second, _) = store
            .create_user("second")
            .await
            .unwrap_or_else(|error| panic!("user should be created: {error}"));
        let support = store
            .create_role(role("Support"))
            .await
            .unwrap_or_else(|error| panic!("role should be created: {error}"));
        let _ = store.replace_user_roles(first, &[support.role_id]).await;

        let affected = store
            .delete_role(support.role_id)
            .await
            .unwrap_or_default();

        assert_eq!(affected, vec![first]);
        assert!(store.list_user_role_ids(first).await.unwrap_or_default().is_empty());
        assert!(store.list_user_role_ids(second).await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn duplicate_names_conflict() {
        let store = InMemorySecurityStore::new();
        let _ = store.create_role(role("Support")).await;

        let result = store.create_role(role("Support")).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn role_update_swaps_flag_and_rows_together() {
        let store = InMemorySecurityStore::new();
        let support = store
            .create_role(role("Support"))
            .await
            .unwrap_or_else(|error| panic!("role should be created: {error}"));
        let prohibited = vec![PermissionGrant::prohibited(permission_names::HOST_SETTINGS)];

        store
            .update_role(
                support.role_id,
                RoleUpdate {
                    name: "admin".to_owned(),
                    display_name: "Administrators".to_owned(),
                    is_privileged: true,
                    grants: Some(prohibited.clone()),
                },
            )
            .await
            .unwrap_or_else(|error| panic!("role should be updated: {error}"));

        let stored = store
            .find_role(support.role_id)
            .await
            .unwrap_or_default()
            .unwrap_or_else(|| panic!("role should exist"));
        assert!(stored.is_privileged);
        assert_eq!(
            store.list_role_grants(support.role_id).await.unwrap_or_default(),
            prohibited
        );
    }

    #[tokio::test]
    async fn conflicting_role_update_writes_nothing() {
        let store = InMemorySecurityStore::new();
        let _ = store.create_role(role("admin")).await;
        let support = store
            .create_role(role("Support"))
            .await
            .unwrap_or_else(|error| panic!("role should be created: {error}"));

        let result = store
            .update_role(
                support.role_id,
                RoleUpdate {
                    name: "admin".to_owned(),
                    display_name: "Administrators".to_owned(),
                    is_privileged: true,
                    grants: Some(Vec::new()),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert_eq!(
            store.list_role_grants(support.role_id).await.unwrap_or_default(),
            vec![PermissionGrant::granted(permission_names::USERS)]
        );
    }

    #[tokio::test]
    async fn clearing_grants_of_unknown_user_is_not_found() {
        let store = InMemorySecurityStore::new();

        let result = store.replace_user_grants(UserId::new(404), &[]).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn expired_tokens_are_not_live() {
        let store = InMemorySecurityStore::new();
        let (user_id, _) = store
            .create_user("first")
            .await
            .unwrap_or_else(|error| panic!("user should be created: {error}"));
        let token_key = TokenKey::generate();
        let now = Utc::now();
        let _ = store
            .create_token(&UserTokenRecord {
                user_id,
                token_key,
                expires_at: now + Duration::minutes(5),
            })
            .await;

        assert!(store.is_token_live(user_id, token_key, now).await.unwrap_or_default());
        assert!(
            !store
                .is_token_live(user_id, token_key, now + Duration::minutes(10))
                .await
                .unwrap_or(true)
        );
    }
}

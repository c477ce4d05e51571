//! In-process fakes shared by the service tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use warden_core::{AppError, AppResult, TokenRejection};
use warden_domain::{
    PermissionCatalog, PermissionGrant, RoleId, RoleRecord, SecurityStamp, TokenClaims, TokenKey,
    UserId,
};

use crate::{
    AuthorizationRepository, CacheStore, NewRole, PermissionCache, RoleUpdate,
    SecurityAdminRepository, SecurityStampRepository, TokenSigner, UserTokenRecord,
    UserTokenRepository,
};

#[derive(Default)]
pub(crate) struct FakeCacheStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl FakeCacheStore {
    pub(crate) async fn contains(&self, key: &str) -> bool {
        self.entries.lock().await.contains_key(key)
    }

    pub(crate) async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[async_trait]
impl CacheStore for FakeCacheStore {
    async fn get(&self, key: &str) -> AppResult<Option<Vec<u8>>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u32) -> AppResult<()> {
        if ttl_seconds > 0 {
            self.entries.lock().await.insert(key.to_owned(), value);
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

pub(crate) struct FailingCacheStore;

#[async_trait]
impl CacheStore for FailingCacheStore {
    async fn get(&self, _key: &str) -> AppResult<Option<Vec<u8>>> {
        Err(AppError::Internal("cache offline".to_owned()))
    }

    async fn set(&self, _key: &str, _value: Vec<u8>, _ttl_seconds: u32) -> AppResult<()> {
        Err(AppError::Internal("cache offline".to_owned()))
    }

    async fn delete(&self, _key: &str) -> AppResult<()> {
        Err(AppError::Internal("cache offline".to_owned()))
    }
}

#[derive(Default)]
struct StoreState {
    roles: BTreeMap<RoleId, RoleRecord>,
    role_grants: HashMap<RoleId, Vec<PermissionGrant>>,
    user_grants: HashMap<UserId, Vec<PermissionGrant>>,
    user_roles: HashMap<UserId, Vec<RoleId>>,
    stamps: HashMap<UserId, SecurityStamp>,
    tokens: Vec<UserTokenRecord>,
    next_role_id: i64,
}

/// Fake implementing every store port over one mutex-guarded state.
#[derive(Default)]
pub(crate) struct FakeSecurityStore {
    state: Mutex<StoreState>,
    pub(crate) repository_reads: AtomicUsize,
    pub(crate) fail_token_deletes: AtomicBool,
    pub(crate) fail_role_grant_writes: AtomicBool,
}

impl FakeSecurityStore {
    pub(crate) async fn add_role(&self, role_id: i64, name: &str, grants: Vec<PermissionGrant>) {
        let role = RoleRecord::new(RoleId::new(role_id), name, name)
            .unwrap_or_else(|_| panic!("test role '{name}' should be valid"));
        let mut state = self.state.lock().await;
        state.next_role_id = state.next_role_id.max(role_id);
        state.role_grants.insert(role.role_id, grants);
        state.roles.insert(role.role_id, role);
    }

    pub(crate) async fn add_user(&self, user_id: i64, role_ids: &[i64]) -> SecurityStamp {
        let user_id = UserId::new(user_id);
        let stamp = SecurityStamp::generate();
        let mut state = self.state.lock().await;
        state.stamps.insert(user_id, stamp);
        state
            .user_roles
            .insert(user_id, role_ids.iter().copied().map(RoleId::new).collect());
        stamp
    }

    pub(crate) async fn put_user_grants(&self, user_id: i64, grants: Vec<PermissionGrant>) {
        self.state
            .lock()
            .await
            .user_grants
            .insert(UserId::new(user_id), grants);
    }

    pub(crate) async fn put_role_grants(&self, role_id: i64, grants: Vec<PermissionGrant>) {
        self.state
            .lock()
            .await
            .role_grants
            .insert(RoleId::new(role_id), grants);
    }

    pub(crate) async fn role_grants(&self, role_id: i64) -> Vec<PermissionGrant> {
        self.state
            .lock()
            .await
            .role_grants
            .get(&RoleId::new(role_id))
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) async fn user_grants(&self, user_id: i64) -> Vec<PermissionGrant> {
        self.state
            .lock()
            .await
            .user_grants
            .get(&UserId::new(user_id))
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) async fn token_count(&self, user_id: i64) -> usize {
        self.state
            .lock()
            .await
            .tokens
            .iter()
            .filter(|record| record.user_id == UserId::new(user_id))
            .count()
    }

    pub(crate) async fn expire_tokens(&self, user_id: i64) {
        let past = Utc::now() - chrono::Duration::seconds(1);
        for record in self.state.lock().await.tokens.iter_mut() {
            if record.user_id == UserId::new(user_id) {
                record.expires_at = past;
            }
        }
    }

    pub(crate) fn reads(&self) -> usize {
        self.repository_reads.load(Ordering::SeqCst)
    }

    pub(crate) async fn role(&self, role_id: i64) -> Option<RoleRecord> {
        self.state.lock().await.roles.get(&RoleId::new(role_id)).cloned()
    }

    fn role_grant_write_error(&self) -> AppResult<()> {
        if self.fail_role_grant_writes.load(Ordering::SeqCst) {
            return Err(AppError::Internal("role grant write failed".to_owned()));
        }
        Ok(())
    }

    fn count_read(&self) {
        self.repository_reads.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl AuthorizationRepository for FakeSecurityStore {
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<RoleRecord>> {
        self.count_read();
        Ok(self.state.lock().await.roles.get(&role_id).cloned())
    }

    async fn list_role_grants(&self, role_id: RoleId) -> AppResult<Vec<PermissionGrant>> {
        self.count_read();
        Ok(self
            .state
            .lock()
            .await
            .role_grants
            .get(&role_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_user_grants(&self, user_id: UserId) -> AppResult<Vec<PermissionGrant>> {
        self.count_read();
        Ok(self
            .state
            .lock()
            .await
            .user_grants
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_user_role_ids(&self, user_id: UserId) -> AppResult<Vec<RoleId>> {
        self.count_read();
        Ok(self
            .state
            .lock()
            .await
            .user_roles
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl SecurityAdminRepository for FakeSecurityStore {
    async fn create_role(&self, role: NewRole) -> AppResult<RoleRecord> {
        let mut state = self.state.lock().await;
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
        let mut state = self.state.lock().await;
        if !state.roles.contains_key(&role_id) {
            return Err(AppError::NotFound(format!("role '{role_id}' was not found")));
        }
        if update.grants.is_some() {
            self.role_grant_write_error()?;
        }

        if let Some(role) = state.roles.get_mut(&role_id) {
            role.name = update.name;
            role.display_name = update.display_name;
            role.is_privileged = update.is_privileged;
        }
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
        self.role_grant_write_error()?;
        let mut state = self.state.lock().await;
        if !state.roles.contains_key(&role_id) {
            return Err(AppError::NotFound(format!("role '{role_id}' was not found")));
        }
        state.role_grants.insert(role_id, grants.to_vec());
        Ok(())
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<Vec<UserId>> {
        let mut state = self.state.lock().await;
        if state.roles.remove(&role_id).is_none() {
            return Err(AppError::NotFound(format!("role '{role_id}' was not found")));
        }
        state.role_grants.remove(&role_id);

        let mut affected = Vec::new();
        for (user_id, role_ids) in state.user_roles.iter_mut() {
            if role_ids.contains(&role_id) {
                role_ids.retain(|candidate| *candidate != role_id);
                affected.push(*user_id);
            }
        }
        affected.sort();
        Ok(affected)
    }

    async fn replace_user_grants(
        &self,
        user_id: UserId,
        grants: &[PermissionGrant],
    ) -> AppResult<()> {
        self.state
            .lock()
            .await
            .user_grants
            .insert(user_id, grants.to_vec());
        Ok(())
    }

    async fn replace_user_roles(&self, user_id: UserId, role_ids: &[RoleId]) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if let Some(missing) = role_ids
            .iter()
            .find(|role_id| !state.roles.contains_key(*role_id))
        {
            return Err(AppError::NotFound(format!("role '{missing}' was not found")));
        }
        state.user_roles.insert(user_id, role_ids.to_vec());
        Ok(())
    }
}

#[async_trait]
impl UserTokenRepository for FakeSecurityStore {
    async fn create_token(&self, record: &UserTokenRecord) -> AppResult<()> {
        self.state.lock().await.tokens.push(record.clone());
        Ok(())
    }

    async fn is_token_live(
        &self,
        user_id: UserId,
        token_key: TokenKey,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        self.count_read();
        Ok(self.state.lock().await.tokens.iter().any(|record| {
            record.user_id == user_id && record.token_key == token_key && record.expires_at > now
        }))
    }

    async fn delete_token(&self, user_id: UserId, token_key: TokenKey) -> AppResult<bool> {
        if self.fail_token_deletes.load(Ordering::SeqCst) {
            return Err(AppError::Internal("token store offline".to_owned()));
        }

        let mut state = self.state.lock().await;
        let before = state.tokens.len();
        state
            .tokens
            .retain(|record| !(record.user_id == user_id && record.token_key == token_key));
        Ok(state.tokens.len() != before)
    }

    async fn delete_tokens_for_user(&self, user_id: UserId) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.tokens.len();
        state.tokens.retain(|record| record.user_id != user_id);
        Ok(u64::try_from(before - state.tokens.len()).unwrap_or(u64::MAX))
    }
}

#[async_trait]
impl SecurityStampRepository for FakeSecurityStore {
    async fn find_security_stamp(&self, user_id: UserId) -> AppResult<Option<SecurityStamp>> {
        self.count_read();
        Ok(self.state.lock().await.stamps.get(&user_id).copied())
    }

    async fn update_security_stamp(&self, user_id: UserId, stamp: SecurityStamp) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let current = state
            .stamps
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' was not found")))?;
        *current = stamp;
        Ok(())
    }
}

/// Signer producing `signed.<json>` tokens.
pub(crate) struct FakeTokenSigner;

const FAKE_SIGNATURE_PREFIX: &str = "signed.";

impl TokenSigner for FakeTokenSigner {
    fn sign(&self, claims: &TokenClaims) -> AppResult<String> {
        let payload = serde_json::to_string(claims)
            .map_err(|error| AppError::Internal(format!("failed to encode claims: {error}")))?;
        Ok(format!("{FAKE_SIGNATURE_PREFIX}{payload}"))
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, TokenRejection> {
        let payload = token
            .strip_prefix(FAKE_SIGNATURE_PREFIX)
            .ok_or(TokenRejection::InvalidSignature)?;
        let claims: TokenClaims = serde_json::from_str(payload)
            .map_err(|error| TokenRejection::Malformed(error.to_string()))?;
        if claims.exp <= Utc::now().timestamp() {
            return Err(TokenRejection::Expired);
        }
        Ok(claims)
    }
}

pub(crate) fn test_catalog() -> Arc<PermissionCatalog> {
    Arc::new(PermissionCatalog::standard().unwrap_or_else(|_| panic!("standard catalog")))
}

pub(crate) fn test_cache(store: Arc<FakeCacheStore>) -> PermissionCache {
    PermissionCache::new(store, crate::DEFAULT_CACHE_TTL_SECONDS)
}

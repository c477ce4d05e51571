//! Typed access to derived authorization cache items.
//!
//! Cache failures never reach callers: reads degrade to a miss and writes
//! are dropped, both with a warning. The stores stay the source of truth.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use warden_domain::{
    RoleId, RolePermissionCacheItem, SecurityStampCacheItem, TokenKey, TokenValidityCacheItem,
    UserId, UserPermissionCacheItem, UserRoleCacheItem, cache_keys,
};

use crate::CacheStore;

/// Default lifetime of every derived cache item.
pub const DEFAULT_CACHE_TTL_SECONDS: u32 = 60 * 60;

/// Cache facade shared by the permission resolver and the token service.
#[derive(Clone)]
pub struct PermissionCache {
    store: Arc<dyn CacheStore>,
    ttl_seconds: u32,
}

impl PermissionCache {
    /// Creates a cache facade over a backend.
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>, ttl_seconds: u32) -> Self {
        Self { store, ttl_seconds }
    }

    /// Returns the configured item lifetime.
    #[must_use]
    pub fn ttl_seconds(&self) -> u32 {
        self.ttl_seconds
    }

    /// Returns cached role ids of a user.
    pub async fn user_roles(&self, user_id: UserId) -> Option<UserRoleCacheItem> {
        self.read(&cache_keys::user_roles(user_id)).await
    }

    /// Stores role ids of a user.
    pub async fn set_user_roles(&self, item: &UserRoleCacheItem) {
        self.write(&cache_keys::user_roles(item.user_id), item)
            .await;
    }

    /// Drops cached role ids of a user.
    pub async fn remove_user_roles(&self, user_id: UserId) {
        self.remove(&cache_keys::user_roles(user_id)).await;
    }

    /// Returns cached user-level overrides.
    pub async fn user_permissions(&self, user_id: UserId) -> Option<UserPermissionCacheItem> {
        self.read(&cache_keys::user_permissions(user_id)).await
    }

    /// Stores user-level overrides.
    pub async fn set_user_permissions(&self, item: &UserPermissionCacheItem) {
        self.write(&cache_keys::user_permissions(item.user_id), item)
            .await;
    }

    /// Drops cached user-level overrides.
    pub async fn remove_user_permissions(&self, user_id: UserId) {
        self.remove(&cache_keys::user_permissions(user_id)).await;
    }

    /// Returns a cached role permission set.
    pub async fn role_permissions(&self, role_id: RoleId) -> Option<RolePermissionCacheItem> {
        self.read(&cache_keys::role_permissions(role_id)).await
    }

    /// Stores a role permission set.
    pub async fn set_role_permissions(&self, item: &RolePermissionCacheItem) {
        self.write(&cache_keys::role_permissions(item.role_id), item)
            .await;
    }

    /// Drops a cached role permission set.
    pub async fn remove_role_permissions(&self, role_id: RoleId) {
        self.remove(&cache_keys::role_permissions(role_id)).await;
    }

    /// Returns the last confirmed security stamp of a user.
    pub async fn security_stamp(&self, user_id: UserId) -> Option<SecurityStampCacheItem> {
        self.read(&cache_keys::security_stamp(user_id)).await
    }

    /// Stores a confirmed security stamp.
    pub async fn set_security_stamp(&self, item: &SecurityStampCacheItem) {
        self.write(&cache_keys::security_stamp(item.user_id), item)
            .await;
    }

    /// Drops a cached security stamp.
    pub async fn remove_security_stamp(&self, user_id: UserId) {
        self.remove(&cache_keys::security_stamp(user_id)).await;
    }

    /// Returns whether a live-token marker is cached.
    pub async fn has_token_validity(&self, user_id: UserId, token_key: TokenKey) -> bool {
        self.read::<TokenValidityCacheItem>(&cache_keys::token_validity(user_id, token_key))
            .await
            .is_some()
    }

    /// Stores a live-token marker.
    pub async fn set_token_validity(&self, item: &TokenValidityCacheItem) {
        self.write(
            &cache_keys::token_validity(item.user_id, item.token_key),
            item,
        )
        .await;
    }

    /// Drops a live-token marker.
    pub async fn remove_token_validity(&self, user_id: UserId, token_key: TokenKey) {
        self.remove(&cache_keys::token_validity(user_id, token_key))
            .await;
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = match self.store.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(cache_key = key, "cache miss");
                return None;
            }
            Err(error) => {
                warn!(cache_key = key, %error, "cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(item) => Some(item),
            Err(error) => {
                warn!(cache_key = key, %error, "discarding undecodable cache entry");
                self.remove(key).await;
                None
            }
        }
    }

    async fn write<T: Serialize>(&self, key: &str, item: &T) {
        let bytes = match serde_json::to_vec(item) {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!(cache_key = key, %error, "failed to encode cache entry");
                return;
            }
        };

        if let Err(error) = self.store.set(key, bytes, self.ttl_seconds).await {
            warn!(cache_key = key, %error, "cache write failed");
        }
    }

    async fn remove(&self, key: &str) {
        if let Err(error) = self.store.delete(key).await {
            warn!(cache_key = key, %error, "cache delete failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use warden_domain::{RoleId, UserId, UserRoleCacheItem, cache_keys};

    use super::PermissionCache;
    use crate::CacheStore;
    use crate::test_support::{FakeCacheStore, FailingCacheStore};

    #[tokio::test]
    async fn stored_item_is_read_back_under_shared_key() {
        let store = Arc::new(FakeCacheStore::default());
        let cache = PermissionCache::new(store.clone(), 60);
        let item = UserRoleCacheItem {
            user_id: UserId::new(5),
            role_ids: vec![RoleId::new(2), RoleId::new(3)],
        };

        cache.set_user_roles(&item).await;

        assert!(store.contains(&cache_keys::user_roles(UserId::new(5))).await);
        assert_eq!(cache.user_roles(UserId::new(5)).await, Some(item));
    }

    #[tokio::test]
    async fn undecodable_entry_is_a_miss_and_gets_dropped() {
        let store = Arc::new(FakeCacheStore::default());
        let key = cache_keys::role_permissions(RoleId::new(1));
        let _ = store.set(&key, b"not json".to_vec(), 60).await;
        let cache = PermissionCache::new(store.clone(), 60);

        assert_eq!(cache.role_permissions(RoleId::new(1)).await, None);
        assert!(!store.contains(&key).await);
    }

    #[tokio::test]
    async fn backend_failures_are_swallowed() {
        let cache = PermissionCache::new(Arc::new(FailingCacheStore), 60);

        cache
            .set_role_permissions(&warden_domain::RolePermissionCacheItem {
                role_id: RoleId::new(1),
                granted_permissions: BTreeSet::new(),
            })
            .await;
        cache.remove_user_roles(UserId::new(1)).await;

        assert_eq!(cache.role_permissions(RoleId::new(1)).await, None);
    }
}

//! Derived cache items and their keys.
//!
//! Items are never authoritative: each one can be rebuilt from the stores.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{RoleId, SecurityStamp, TokenKey, UserId};

/// Deterministic cache keys shared by every process touching the cache.
pub mod cache_keys {
    use crate::{RoleId, TokenKey, UserId};

    /// Key of the user → role ids mapping.
    #[must_use]
    pub fn user_roles(user_id: UserId) -> String {
        format!("UserRoles:u{user_id}")
    }

    /// Key of the user-level grant overrides.
    #[must_use]
    pub fn user_permissions(user_id: UserId) -> String {
        format!("UserPermissions:u{user_id}")
    }

    /// Key of a role's effective permission set.
    #[must_use]
    pub fn role_permissions(role_id: RoleId) -> String {
        format!("RolePermissions:r{role_id}")
    }

    /// Key of a live token marker.
    #[must_use]
    pub fn token_validity(user_id: UserId, token_key: TokenKey) -> String {
        format!("TokenValidity:{user_id}.{token_key}")
    }

    /// Key of the last known security stamp of a user.
    #[must_use]
    pub fn security_stamp(user_id: UserId) -> String {
        format!("SecurityStamp:{user_id}")
    }
}

/// Role ids assigned to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRoleCacheItem {
    /// Owning user.
    pub user_id: UserId,
    /// Assigned roles.
    pub role_ids: Vec<RoleId>,
}

/// User-level grant overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPermissionCacheItem {
    /// Owning user.
    pub user_id: UserId,
    /// Names granted directly to the user.
    pub granted_user_permissions: BTreeSet<String>,
    /// Names prohibited for the user.
    pub prohibited_user_permissions: BTreeSet<String>,
}

/// Effective permission set of one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermissionCacheItem {
    /// Owning role.
    pub role_id: RoleId,
    /// Effective granted names.
    pub granted_permissions: BTreeSet<String>,
}

/// Last stamp confirmed against the user store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityStampCacheItem {
    /// Owning user.
    pub user_id: UserId,
    /// Stamp value.
    pub security_stamp: SecurityStamp,
}

/// Presence marker for a token with a live record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenValidityCacheItem {
    /// Token owner.
    pub user_id: UserId,
    /// Token validity key.
    pub token_key: TokenKey,
}

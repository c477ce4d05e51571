//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod cache;
mod effective;
mod grant;
mod permission;
mod role;
mod token;
mod user;

pub use cache::{
    RolePermissionCacheItem, SecurityStampCacheItem, TokenValidityCacheItem,
    UserPermissionCacheItem, UserRoleCacheItem, cache_keys,
};
pub use effective::{UserGrantPartition, role_effective_permissions, user_effective_permissions};
pub use grant::{GrantRecord, GrantSubject, PermissionGrant, normalize_grant_changes};
pub use permission::{PermissionCatalog, PermissionDefinition, permission_names};
pub use role::{ADMIN_ROLE_NAME, RoleId, RoleRecord};
pub use token::{TokenClaims, TokenKey, TokenKind};
pub use user::{SecurityStamp, StampRotationReason, UserId};

//! Application services and ports.

#![forbid(unsafe_code)]

mod authorization_service;
mod cache_ports;
mod permission_cache;
mod security_admin_ports;
mod security_admin_service;
mod token_ports;
mod token_service;

#[cfg(test)]
mod test_support;

pub use authorization_service::{AuthorizationRepository, AuthorizationService};
pub use cache_ports::CacheStore;
pub use permission_cache::{DEFAULT_CACHE_TTL_SECONDS, PermissionCache};
pub use security_admin_ports::{CreateRoleInput, NewRole, RoleUpdate, SecurityAdminRepository};
pub use security_admin_service::SecurityAdminService;
pub use token_ports::{SecurityStampRepository, TokenSigner, UserTokenRecord, UserTokenRepository};
pub use token_service::{
    IssuedToken, TokenPair, TokenService, TokenSettings, TokenSubject, ValidatedToken,
};

//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_cache_store;
mod in_memory_security_store;
mod jwt_token_signer;
mod postgres_authorization_repository;
mod postgres_security_admin_repository;
mod postgres_security_stamp_repository;
mod postgres_user_token_repository;
mod redis_cache_store;

pub use in_memory_cache_store::InMemoryCacheStore;
pub use in_memory_security_store::InMemorySecurityStore;
pub use jwt_token_signer::{JwtTokenSigner, MIN_JWT_SECRET_LENGTH};
pub use postgres_authorization_repository::PostgresAuthorizationRepository;
pub use postgres_security_admin_repository::PostgresSecurityAdminRepository;
pub use postgres_security_stamp_repository::PostgresSecurityStampRepository;
pub use postgres_user_token_repository::PostgresUserTokenRepository;
pub use redis_cache_store::RedisCacheStore;

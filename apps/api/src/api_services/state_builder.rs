use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;
use warden_application::{
    AuthorizationService, CacheStore, PermissionCache, SecurityAdminService, TokenService,
};
use warden_core::AppError;
use warden_domain::PermissionCatalog;
use warden_infrastructure::{
    InMemoryCacheStore, JwtTokenSigner, PostgresAuthorizationRepository,
    PostgresSecurityAdminRepository, PostgresSecurityStampRepository,
    PostgresUserTokenRepository, RedisCacheStore,
};

use crate::api_config::{ApiConfig, CacheBackend};
use crate::state::AppState;

use super::redis::build_redis_client;

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let cache = PermissionCache::new(build_cache_store(config)?, config.cache_ttl_seconds);
    let catalog = Arc::new(PermissionCatalog::standard()?);

    let authorization_repository = Arc::new(PostgresAuthorizationRepository::new(pool.clone()));
    let authorization_service =
        AuthorizationService::new(authorization_repository.clone(), cache.clone(), catalog);
    let security_admin_service = SecurityAdminService::new(
        authorization_service.clone(),
        authorization_repository,
        Arc::new(PostgresSecurityAdminRepository::new(pool.clone())),
    );

    let settings = config.token_settings.clone();
    let signer = JwtTokenSigner::new(&config.jwt_secret, &settings.issuer, &settings.audience)?;
    let token_service = TokenService::new(
        Arc::new(signer),
        Arc::new(PostgresUserTokenRepository::new(pool.clone())),
        Arc::new(PostgresSecurityStampRepository::new(pool)),
        cache,
        settings,
    );

    Ok(AppState {
        authorization_service,
        security_admin_service,
        token_service,
        auth_deadline: config.auth_deadline,
    })
}

fn build_cache_store(config: &ApiConfig) -> Result<Arc<dyn CacheStore>, AppError> {
    match (config.cache_backend, config.redis_url.as_deref()) {
        (CacheBackend::Redis, Some(redis_url)) => {
            info!("using redis permission cache");
            Ok(Arc::new(RedisCacheStore::new(
                build_redis_client(redis_url)?,
                config.cache_key_prefix.clone(),
            )))
        }
        (CacheBackend::Redis, None) => Err(AppError::Validation(
            "REDIS_URL is required when CACHE_BACKEND is 'redis'".to_owned(),
        )),
        (CacheBackend::InMemory, _) => {
            info!("using in-memory permission cache");
            Ok(Arc::new(InMemoryCacheStore::new()))
        }
    }
}

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;
use tracing_subscriber::EnvFilter;
use warden_application::{DEFAULT_CACHE_TTL_SECONDS, TokenSettings};
use warden_core::AppError;
use warden_infrastructure::MIN_JWT_SECRET_LENGTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    InMemory,
    Redis,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub redis_url: Option<String>,
    pub cache_backend: CacheBackend,
    pub cache_key_prefix: String,
    pub cache_ttl_seconds: u32,
    pub jwt_secret: String,
    pub token_settings: TokenSettings,
    pub auth_deadline: Duration,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_env("DATABASE_URL")?;
        let redis_url = env::var("REDIS_URL")
            .ok()
            .filter(|value| !value.trim().is_empty());

        let cache_backend = match env::var("CACHE_BACKEND").ok().as_deref() {
            Some("redis") => CacheBackend::Redis,
            Some("in_memory") => CacheBackend::InMemory,
            Some(other) => {
                return Err(AppError::Validation(format!(
                    "CACHE_BACKEND must be either 'redis' or 'in_memory', got '{other}'"
                )));
            }
            None if redis_url.is_some() => CacheBackend::Redis,
            None => CacheBackend::InMemory,
        };
        if cache_backend == CacheBackend::Redis && redis_url.is_none() {
            return Err(AppError::Validation(
                "REDIS_URL is required when CACHE_BACKEND is 'redis'".to_owned(),
            ));
        }

        let cache_key_prefix =
            env::var("CACHE_KEY_PREFIX").unwrap_or_else(|_| "warden".to_owned());
        let cache_ttl_seconds = parsed_env("CACHE_TTL_SECONDS", DEFAULT_CACHE_TTL_SECONDS)?;

        let jwt_secret = required_env("JWT_SECRET")?;
        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::Validation(format!(
                "JWT_SECRET must be at least {MIN_JWT_SECRET_LENGTH} characters"
            )));
        }

        let defaults = TokenSettings::default();
        let token_settings = TokenSettings {
            issuer: env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            audience: env::var("JWT_AUDIENCE").unwrap_or(defaults.audience),
            access_token_ttl: seconds_env("ACCESS_TOKEN_TTL_SECONDS", defaults.access_token_ttl)?,
            refresh_token_ttl: seconds_env(
                "REFRESH_TOKEN_TTL_SECONDS",
                defaults.refresh_token_ttl,
            )?,
        };

        let auth_deadline = Duration::from_millis(parsed_env("AUTH_DEADLINE_MS", 5_000_u64)?);

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        Ok(Self {
            migrate_only,
            database_url,
            redis_url,
            cache_backend,
            cache_key_prefix,
            cache_ttl_seconds,
            jwt_secret,
            token_settings,
            auth_deadline,
            frontend_url,
            api_host,
            api_port,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn parsed_env<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        Err(_) => Ok(default),
    }
}

fn seconds_env(name: &str, default: TimeDelta) -> Result<TimeDelta, AppError> {
    let seconds = parsed_env(name, default.num_seconds())?;
    if seconds <= 0 {
        return Err(AppError::Validation(format!("{name} must be positive")));
    }

    TimeDelta::try_seconds(seconds)
        .ok_or_else(|| AppError::Validation(format!("{name} is out of range")))
}

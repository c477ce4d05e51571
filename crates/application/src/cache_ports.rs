use async_trait::async_trait;
use warden_core::AppResult;

/// Key-value cache backend with per-key expiry.
///
/// Values are opaque bytes. Implementations must be safe for concurrent use;
/// callers never rely on ordering between writes to different keys.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the stored value, or `None` when absent or expired.
    async fn get(&self, key: &str) -> AppResult<Option<Vec<u8>>>;

    /// Stores a value with ttl; a zero ttl stores nothing.
    async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u32) -> AppResult<()>;

    /// Removes a value; removing an absent key succeeds.
    async fn delete(&self, key: &str) -> AppResult<()>;
}

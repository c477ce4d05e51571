use async_trait::async_trait;
use chrono::{DateTime, Utc};

use warden_core::{AppResult, TokenRejection};
use warden_domain::{SecurityStamp, TokenClaims, TokenKey, UserId};

/// Persisted record of one issued token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserTokenRecord {
    /// Token owner.
    pub user_id: UserId,
    /// Token validity key.
    pub token_key: TokenKey,
    /// Moment the token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// Repository port for token records.
#[async_trait]
pub trait UserTokenRepository: Send + Sync {
    /// Stores a record for a freshly issued token.
    async fn create_token(&self, record: &UserTokenRecord) -> AppResult<()>;

    /// Returns whether a record exists for the key and has not expired at `now`.
    async fn is_token_live(
        &self,
        user_id: UserId,
        token_key: TokenKey,
        now: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Deletes one record; returns whether a row was removed.
    async fn delete_token(&self, user_id: UserId, token_key: TokenKey) -> AppResult<bool>;

    /// Deletes every record of a user; returns the number of rows removed.
    async fn delete_tokens_for_user(&self, user_id: UserId) -> AppResult<u64>;
}

/// Repository port for the security stamp column of users.
#[async_trait]
pub trait SecurityStampRepository: Send + Sync {
    /// Returns the user's current stamp, or `None` for unknown users.
    async fn find_security_stamp(&self, user_id: UserId) -> AppResult<Option<SecurityStamp>>;

    /// Overwrites the user's stamp.
    async fn update_security_stamp(&self, user_id: UserId, stamp: SecurityStamp) -> AppResult<()>;
}

/// Port for token signing. Keeps the application free of direct JWT
/// library coupling.
pub trait TokenSigner: Send + Sync {
    /// Signs a claim set into a compact token.
    fn sign(&self, claims: &TokenClaims) -> AppResult<String>;

    /// Verifies signature and time claims, returning the decoded claims.
    fn verify(&self, token: &str) -> Result<TokenClaims, TokenRejection>;
}

//! Issuing, validating and revoking access and refresh tokens.
//!
//! A token is accepted only while its embedded security stamp matches the
//! user's current stamp and its validity key still has a live record. The
//! cache answers both checks first; the stores stay authoritative.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;
use warden_core::{AppError, AppResult, TokenRejection};
use warden_domain::{
    SecurityStamp, SecurityStampCacheItem, StampRotationReason, TokenClaims, TokenKey, TokenKind,
    TokenValidityCacheItem, UserId,
};

use crate::{
    PermissionCache, SecurityStampRepository, TokenSigner, UserTokenRecord, UserTokenRepository,
};

mod issue;
mod revoke;
mod validate;


/// Issuer settings shared by every token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSettings {
    /// Value of the `iss` claim.
    pub issuer: String,
    /// Value of the `aud` claim.
    pub audience: String,
    /// Lifetime of access tokens.
    pub access_token_ttl: Duration,
    /// Lifetime of refresh tokens.
    pub refresh_token_ttl: Duration,
}

impl TokenSettings {
    /// Returns the lifetime of tokens of `kind`.
    #[must_use]
    pub fn lifetime(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_token_ttl,
            TokenKind::Refresh => self.refresh_token_ttl,
        }
    }
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            issuer: "warden".to_owned(),
            audience: "warden".to_owned(),
            access_token_ttl: Duration::hours(24),
            refresh_token_ttl: Duration::days(30),
        }
    }
}

/// User a token is issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSubject {
    /// Token owner.
    pub user_id: UserId,
    /// Owner's current security stamp.
    pub security_stamp: SecurityStamp,
}

/// Freshly signed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Compact signed token.
    pub token: String,
    /// Validity key embedded in the token.
    pub token_key: TokenKey,
    /// Seconds until the token expires.
    pub expires_in_seconds: i64,
}

/// Access token linked to the refresh token issued with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access: IssuedToken,
    /// Long-lived refresh token.
    pub refresh: IssuedToken,
}

/// Token that passed every validation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedToken {
    /// Authenticated user.
    pub user_id: UserId,
    /// Verified claims.
    pub claims: TokenClaims,
}

/// Application service for the token lifecycle.
#[derive(Clone)]
pub struct TokenService {
    signer: Arc<dyn TokenSigner>,
    token_repository: Arc<dyn UserTokenRepository>,
    stamp_repository: Arc<dyn SecurityStampRepository>,
    cache: PermissionCache,
    settings: TokenSettings,
}

impl TokenService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        signer: Arc<dyn TokenSigner>,
        token_repository: Arc<dyn UserTokenRepository>,
        stamp_repository: Arc<dyn SecurityStampRepository>,
        cache: PermissionCache,
        settings: TokenSettings,
    ) -> Self {
        Self {
            signer,
            token_repository,
            stamp_repository,
            cache,
            settings,
        }
    }

    /// Returns issuer settings.
    #[must_use]
    pub fn settings(&self) -> &TokenSettings {
        &self.settings
    }

    /// Replaces the user's security stamp, invalidating every issued token.
    ///
    /// The cached stamp is dropped before the store write and again after
    /// the token rows are gone. A validator that read the old stamp from the
    /// store before the write can still refill the cache after the last
    /// drop; that entry lives at most one cache TTL.
    pub async fn rotate_security_stamp(
        &self,
        user_id: UserId,
        reason: StampRotationReason,
    ) -> AppResult<SecurityStamp> {
        let stamp = SecurityStamp::generate();
        self.cache.remove_security_stamp(user_id).await;
        let updated = self
            .stamp_repository
            .update_security_stamp(user_id, stamp)
            .await;
        self.cache.remove_security_stamp(user_id).await;
        updated?;

        let revoked = self.token_repository.delete_tokens_for_user(user_id).await;
        self.cache.remove_security_stamp(user_id).await;
        let revoked = revoked?;

        info!(
            %user_id,
            reason = reason.as_str(),
            revoked_tokens = revoked,
            "security stamp rotated"
        );
        Ok(stamp)
    }
}

//! Bearer token claims.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warden_core::{AppError, TokenRejection};

use crate::{SecurityStamp, UserId};

/// Token purpose carried in the `token_type` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived token presented on every request.
    Access,
    /// Long-lived token exchanged for new access tokens.
    Refresh,
}

impl TokenKind {
    /// Returns the claim value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl FromStr for TokenKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "access" => Ok(Self::Access),
            "refresh" => Ok(Self::Refresh),
            _ => Err(AppError::Validation(format!(
                "unknown token type '{value}'"
            ))),
        }
    }
}

/// Per-token validity key, persisted independently of the signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenKey(Uuid);

impl TokenKey {
    /// Creates a fresh random key.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a key from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for TokenKey {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Claim set embedded in every issued token.
///
/// Custom claims are optional at the type level so that tokens missing them
/// decode and can be rejected with a precise reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User id as a decimal string.
    pub sub: String,
    /// Issuer.
    pub iss: String,
    /// Audience.
    pub aud: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Not-before, seconds since the epoch.
    pub nbf: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
    /// Unique token id, distinct from the validity key.
    pub jti: String,
    /// Security stamp at issue time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_stamp: Option<String>,
    /// Token validity key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_validity_key: Option<String>,
    /// Token kind discriminator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Validity key of the refresh token an access token was issued with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token_validity_key: Option<String>,
}

impl TokenClaims {
    /// Parses the subject claim.
    pub fn user_id(&self) -> Result<UserId, TokenRejection> {
        UserId::from_str(&self.sub).map_err(|_| TokenRejection::MissingClaim("sub"))
    }

    /// Parses the token kind claim.
    pub fn token_kind(&self) -> Result<TokenKind, TokenRejection> {
        self.token_type
            .as_deref()
            .and_then(|value| TokenKind::from_str(value).ok())
            .ok_or(TokenRejection::MissingClaim("token_type"))
    }

    /// Parses the security stamp claim.
    pub fn security_stamp(&self) -> Result<SecurityStamp, TokenRejection> {
        self.security_stamp
            .as_deref()
            .and_then(|value| SecurityStamp::from_str(value).ok())
            .ok_or(TokenRejection::MissingClaim("security_stamp"))
    }

    /// Parses the token validity key claim.
    pub fn token_key(&self) -> Result<TokenKey, TokenRejection> {
        parse_token_key(self.token_validity_key.as_deref())
            .ok_or(TokenRejection::MissingClaim("token_validity_key"))
    }

    /// Parses the linked refresh token key, when present.
    #[must_use]
    pub fn refresh_token_key(&self) -> Option<TokenKey> {
        parse_token_key(self.refresh_token_validity_key.as_deref())
    }
}

fn parse_token_key(value: Option<&str>) -> Option<TokenKey> {
    value
        .and_then(|value| Uuid::parse_str(value).ok())
        .map(TokenKey::from_uuid)
}

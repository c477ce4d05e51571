//! User identity and security stamp types.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warden_core::AppError;

/// Unique identifier for a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(i64);

impl UserId {
    /// Creates a user identifier from its storage value.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the underlying storage value.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value
            .trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|error| AppError::Validation(format!("invalid user id '{value}': {error}")))
    }
}

/// Rotating per-user value embedded in every issued token.
///
/// Replacing a user's stamp invalidates all tokens issued before the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecurityStamp(Uuid);

impl SecurityStamp {
    /// Creates a fresh random stamp.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a stamp from an existing UUID value.
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

impl std::fmt::Display for SecurityStamp {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for SecurityStamp {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|error| AppError::Validation(format!("invalid security stamp: {error}")))
    }
}

/// Events that rotate a user's security stamp.
///
/// Every variant rotates: credential changes and explicit global sign-out
/// must cut off existing sessions immediately. Role edits are deliberately
/// absent because permissions are resolved per request, not embedded in
/// tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StampRotationReason {
    /// Initial stamp written when the user is created.
    UserCreated,
    /// Password was changed or reset.
    PasswordChanged,
    /// Login email address was changed.
    EmailChanged,
    /// User asked to end every session.
    SignOutEverywhere,
    /// An administrator locked or force-logged-out the account.
    AdministrativeLock,
}

impl StampRotationReason {
    /// Returns a stable value for logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserCreated => "user_created",
            Self::PasswordChanged => "password_changed",
            Self::EmailChanged => "email_changed",
            Self::SignOutEverywhere => "sign_out_everywhere",
            Self::AdministrativeLock => "administrative_lock",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{SecurityStamp, UserId};

    #[test]
    fn user_id_parses_subject_claim() {
        let parsed = UserId::from_str("42");
        assert_eq!(parsed.ok(), Some(UserId::new(42)));
    }

    #[test]
    fn non_numeric_user_id_is_rejected() {
        assert!(UserId::from_str("alice").is_err());
    }

    #[test]
    fn generated_stamps_differ() {
        assert_ne!(SecurityStamp::generate(), SecurityStamp::generate());
    }

    #[test]
    fn security_stamp_roundtrips_through_display() {
        let stamp = SecurityStamp::generate();
        let restored = SecurityStamp::from_str(&stamp.to_string());
        assert_eq!(restored.ok(), Some(stamp));
    }
}

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use warden_core::{AppError, AppResult, NonEmptyString};

/// Reserved role name whose holders are granted everything unless prohibited.
pub const ADMIN_ROLE_NAME: &str = "Admin";

/// Unique identifier for a role record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoleId(i64);

impl RoleId {
    /// Creates a role identifier from its storage value.
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

impl std::fmt::Display for RoleId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for RoleId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value
            .trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|error| AppError::Validation(format!("invalid role id '{value}': {error}")))
    }
}

/// Role as seen by permission resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    /// Stable role identifier.
    pub role_id: RoleId,
    /// Unique role name.
    pub name: String,
    /// Human-readable label.
    pub display_name: String,
    /// Role defaults to every catalog permission instead of none.
    pub is_privileged: bool,
}

impl RoleRecord {
    /// Creates a role record, deriving `is_privileged` from the name.
    pub fn new(
        role_id: RoleId,
        name: impl Into<String>,
        display_name: impl Into<String>,
    ) -> AppResult<Self> {
        let name = NonEmptyString::new(name)?;
        let display_name = NonEmptyString::new(display_name)?;
        let is_privileged = Self::privileged_for_name(name.as_str());

        Ok(Self {
            role_id,
            name: String::from(name).trim().to_owned(),
            display_name: display_name.into(),
            is_privileged,
        })
    }

    /// Returns whether a role with this name is admin-privileged.
    ///
    /// Evaluated once at create and rename time; resolution only reads the
    /// stored flag.
    #[must_use]
    pub fn privileged_for_name(name: &str) -> bool {
        name.trim().eq_ignore_ascii_case(ADMIN_ROLE_NAME)
    }
}

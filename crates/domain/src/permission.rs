//! Permission catalog.
//!
//! Permissions are flat dotted names. The catalog is built once at startup
//! and shared read-only; every name persisted in a grant must exist here.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use warden_core::{AppError, AppResult, NonEmptyString};

/// Stable permission names shipped with the standard catalog.
pub mod permission_names {
    /// Root page access.
    pub const PAGES: &str = "Pages";
    /// Tenant management pages.
    pub const PAGES_TENANTS: &str = "Pages.Tenants";
    /// Administration area.
    pub const PAGES_ADMINISTRATION: &str = "Pages.Administration";
    /// User listing.
    pub const USERS: &str = "Pages.Administration.Users";
    /// User creation.
    pub const USERS_CREATE: &str = "Pages.Administration.Users.Create";
    /// User edits, including role membership.
    pub const USERS_EDIT: &str = "Pages.Administration.Users.Edit";
    /// User deletion.
    pub const USERS_DELETE: &str = "Pages.Administration.Users.Delete";
    /// User-level permission overrides.
    pub const USERS_CHANGE_PERMISSIONS: &str = "Pages.Administration.Users.ChangePermissions";
    /// Forced sign-out of another user.
    pub const USERS_UNLOCK: &str = "Pages.Administration.Users.Unlock";
    /// Role listing.
    pub const ROLES: &str = "Pages.Administration.Roles";
    /// Role creation.
    pub const ROLES_CREATE: &str = "Pages.Administration.Roles.Create";
    /// Role edits, including role grants.
    pub const ROLES_EDIT: &str = "Pages.Administration.Roles.Edit";
    /// Role deletion.
    pub const ROLES_DELETE: &str = "Pages.Administration.Roles.Delete";
    /// Audit log access.
    pub const AUDIT_LOGS: &str = "Pages.Administration.AuditLogs";
    /// Host settings.
    pub const HOST_SETTINGS: &str = "Pages.Administration.Host.Settings";
}

const STANDARD_PERMISSIONS: &[(&str, &str, &str)] = &[
    (permission_names::PAGES, "Pages", "General"),
    (permission_names::PAGES_TENANTS, "Tenants", "Tenants"),
    (
        permission_names::PAGES_ADMINISTRATION,
        "Administration",
        "Administration",
    ),
    (permission_names::USERS, "Users", "Users"),
    (permission_names::USERS_CREATE, "Create user", "Users"),
    (permission_names::USERS_EDIT, "Edit user", "Users"),
    (permission_names::USERS_DELETE, "Delete user", "Users"),
    (
        permission_names::USERS_CHANGE_PERMISSIONS,
        "Change user permissions",
        "Users",
    ),
    (permission_names::USERS_UNLOCK, "Unlock user", "Users"),
    (permission_names::ROLES, "Roles", "Roles"),
    (permission_names::ROLES_CREATE, "Create role", "Roles"),
    (permission_names::ROLES_EDIT, "Edit role", "Roles"),
    (permission_names::ROLES_DELETE, "Delete role", "Roles"),
    (permission_names::AUDIT_LOGS, "Audit logs", "Administration"),
    (
        permission_names::HOST_SETTINGS,
        "Host settings",
        "Administration",
    ),
];

/// One named permission with its display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDefinition {
    name: NonEmptyString,
    display_name: NonEmptyString,
    group: NonEmptyString,
}

impl PermissionDefinition {
    /// Creates a validated permission definition.
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        group: impl Into<String>,
    ) -> AppResult<Self> {
        let name = name.into();
        if name.chars().any(char::is_whitespace) {
            return Err(AppError::Validation(format!(
                "permission name '{name}' must not contain whitespace"
            )));
        }

        Ok(Self {
            name: NonEmptyString::new(name)?,
            display_name: NonEmptyString::new(display_name)?,
            group: NonEmptyString::new(group)?,
        })
    }

    /// Returns the stable permission name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the human-readable label.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the group label used for UI grouping.
    #[must_use]
    pub fn group(&self) -> &str {
        self.group.as_str()
    }
}

/// Immutable registry of every valid permission.
#[derive(Debug, Clone, Default)]
pub struct PermissionCatalog {
    definitions: Vec<PermissionDefinition>,
    index: HashMap<String, usize>,
}

impl PermissionCatalog {
    /// Builds a catalog, rejecting duplicate names.
    pub fn new(definitions: impl IntoIterator<Item = PermissionDefinition>) -> AppResult<Self> {
        let mut catalog = Self::default();
        for definition in definitions {
            if catalog.index.contains_key(definition.name()) {
                return Err(AppError::Validation(format!(
                    "duplicate permission '{}' in catalog",
                    definition.name()
                )));
            }

            catalog.push(definition);
        }

        Ok(catalog)
    }

    /// Builds the catalog shipped with the service.
    pub fn standard() -> AppResult<Self> {
        let definitions = STANDARD_PERMISSIONS
            .iter()
            .map(|(name, display_name, group)| PermissionDefinition::new(*name, *display_name, *group))
            .collect::<AppResult<Vec<_>>>()?;

        Self::new(definitions)
    }

    fn push(&mut self, definition: PermissionDefinition) {
        self.index
            .insert(definition.name().to_owned(), self.definitions.len());
        self.definitions.push(definition);
    }

    /// Returns the definition registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PermissionDefinition> {
        self.index
            .get(name)
            .and_then(|position| self.definitions.get(*position))
    }

    /// Returns whether `name` is a known permission.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Returns every definition in registration order.
    #[must_use]
    pub fn definitions(&self) -> &[PermissionDefinition] {
        &self.definitions
    }

    /// Returns every permission name.
    #[must_use]
    pub fn names(&self) -> BTreeSet<String> {
        self.definitions
            .iter()
            .map(|definition| definition.name().to_owned())
            .collect()
    }

    /// Returns definitions keyed by group label.
    #[must_use]
    pub fn groups(&self) -> BTreeMap<&str, Vec<&PermissionDefinition>> {
        let mut groups: BTreeMap<&str, Vec<&PermissionDefinition>> = BTreeMap::new();
        for definition in &self.definitions {
            groups.entry(definition.group()).or_default().push(definition);
        }

        groups
    }

    /// Returns the number of registered permissions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns whether the catalog has no permissions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Fails with a validation error naming every unknown permission.
    pub fn ensure_known<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> AppResult<()> {
        let unknown: BTreeSet<&str> = names
            .into_iter()
            .filter(|name| !self.contains(name))
            .collect();

        if unknown.is_empty() {
            return Ok(());
        }

        Err(AppError::Validation(format!(
            "unknown permission(s): {}",
            unknown.into_iter().collect::<Vec<_>>().join(", ")
        )))
    }
}

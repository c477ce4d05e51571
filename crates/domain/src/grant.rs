use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{RoleId, UserId};

/// Owner of a grant record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum GrantSubject {
    /// Grant attached to a role.
    Role(RoleId),
    /// Override attached to a single user.
    User(UserId),
}

/// Explicit grant or prohibition of one permission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionGrant {
    /// Permission catalog name.
    pub permission_name: String,
    /// `true` grants, `false` prohibits.
    pub is_granted: bool,
}

impl PermissionGrant {
    /// Creates a granting record.
    #[must_use]
    pub fn granted(permission_name: impl Into<String>) -> Self {
        Self {
            permission_name: permission_name.into(),
            is_granted: true,
        }
    }

    /// Creates a prohibiting record.
    #[must_use]
    pub fn prohibited(permission_name: impl Into<String>) -> Self {
        Self {
            permission_name: permission_name.into(),
            is_granted: false,
        }
    }
}

/// Persisted grant row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRecord {
    /// Role or user owning the grant.
    pub subject: GrantSubject,
    /// Granted or prohibited permission.
    pub grant: PermissionGrant,
}

/// Collapses a change list to one entry per permission, last write wins.
///
/// The result is ordered by permission name.
#[must_use]
pub fn normalize_grant_changes(changes: Vec<PermissionGrant>) -> Vec<PermissionGrant> {
    changes
        .into_iter()
        .map(|change| (change.permission_name, change.is_granted))
        .collect::<BTreeMap<_, _>>()
        .into_iter()
        .map(|(permission_name, is_granted)| PermissionGrant {
            permission_name,
            is_granted,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{GrantSubject, PermissionGrant, normalize_grant_changes};
    use crate::RoleId;

    #[test]
    fn later_changes_override_earlier_ones() {
        let normalized = normalize_grant_changes(vec![
            PermissionGrant::granted("B"),
            PermissionGrant::granted("A"),
            PermissionGrant::prohibited("B"),
        ]);

        assert_eq!(
            normalized,
            vec![PermissionGrant::granted("A"), PermissionGrant::prohibited("B")]
        );
    }

    #[test]
    fn grant_subject_serializes_with_kind_tag() {
        let encoded = serde_json::to_string(&GrantSubject::Role(RoleId::new(7)));
        assert_eq!(encoded.ok().as_deref(), Some(r#"{"kind":"role","id":7}"#));
    }
}

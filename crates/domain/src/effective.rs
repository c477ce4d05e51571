//! Effective permission algebra.
//!
//! Pure set combination over grant rows. Callers load the rows; nothing here
//! touches storage, so every function is deterministic for a given input.

use std::collections::BTreeSet;

use crate::{PermissionCatalog, PermissionGrant, RoleRecord};

/// Computes the effective permission set of one role.
///
/// Privileged roles start from the whole catalog and drop every prohibited
/// name. Ordinary roles hold exactly their granted names. A name carrying
/// both a grant and a prohibition row resolves to prohibited in both cases,
/// and names no longer present in the catalog are never returned.
#[must_use]
pub fn role_effective_permissions(
    role: &RoleRecord,
    grants: &[PermissionGrant],
    catalog: &PermissionCatalog,
) -> BTreeSet<String> {
    let prohibited: BTreeSet<&str> = grants
        .iter()
        .filter(|grant| !grant.is_granted)
        .map(|grant| grant.permission_name.as_str())
        .collect();

    if role.is_privileged {
        return catalog
            .definitions()
            .iter()
            .map(|definition| definition.name())
            .filter(|name| !prohibited.contains(name))
            .map(str::to_owned)
            .collect();
    }

    grants
        .iter()
        .filter(|grant| grant.is_granted)
        .map(|grant| grant.permission_name.as_str())
        .filter(|name| !prohibited.contains(name) && catalog.contains(name))
        .map(str::to_owned)
        .collect()
}

/// User-level overrides split by polarity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserGrantPartition {
    /// Names granted directly to the user.
    pub granted: BTreeSet<String>,
    /// Names prohibited for the user regardless of roles.
    pub prohibited: BTreeSet<String>,
}

impl UserGrantPartition {
    /// Partitions user grant rows; a prohibition beats a grant for the same name.
    #[must_use]
    pub fn from_grants(grants: &[PermissionGrant]) -> Self {
        let mut partition = Self::default();
        for grant in grants {
            if grant.is_granted {
                partition.granted.insert(grant.permission_name.clone());
            } else {
                partition.prohibited.insert(grant.permission_name.clone());
            }
        }

        partition
            .granted
            .retain(|name| !partition.prohibited.contains(name));
        partition
    }

    /// Rebuilds a partition from cached sets.
    #[must_use]
    pub fn from_sets(granted: BTreeSet<String>, prohibited: BTreeSet<String>) -> Self {
        let granted = granted
            .into_iter()
            .filter(|name| !prohibited.contains(name))
            .collect();

        Self {
            granted,
            prohibited,
        }
    }

    /// Decides one permission without materializing the whole set.
    ///
    /// Always agrees with membership in [`user_effective_permissions`] for
    /// the same inputs.
    #[must_use]
    pub fn decides<'a>(
        &self,
        permission_name: &str,
        role_sets: impl IntoIterator<Item = &'a BTreeSet<String>>,
    ) -> bool {
        if self.prohibited.contains(permission_name) {
            return false;
        }

        if self.granted.contains(permission_name) {
            return true;
        }

        role_sets
            .into_iter()
            .any(|permissions| permissions.contains(permission_name))
    }
}

/// Combines user overrides with the effective sets of the user's roles.
///
/// User grants always apply, user prohibitions always win over role grants.
#[must_use]
pub fn user_effective_permissions<'a>(
    partition: &UserGrantPartition,
    role_sets: impl IntoIterator<Item = &'a BTreeSet<String>>,
) -> BTreeSet<String> {
    let mut effective = partition.granted.clone();
    for permissions in role_sets {
        effective.extend(
            permissions
                .iter()
                .filter(|name| !partition.prohibited.contains(*name))
                .cloned(),
        );
    }

    effective
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use super::{UserGrantPartition, role_effective_permissions, user_effective_permissions};
    use crate::{PermissionCatalog, PermissionDefinition, PermissionGrant, RoleId, RoleRecord};

    fn catalog(names: &[&str]) -> PermissionCatalog {
        let definitions = names
            .iter()
            .map(|name| PermissionDefinition::new(*name, *name, "Test"))
            .collect::<Result<Vec<_>, _>>()
            .unwrap_or_default();
        PermissionCatalog::new(definitions).unwrap_or_default()
    }

    fn role(name: &str) -> RoleRecord {
        RoleRecord::new(RoleId::new(1), name, name).unwrap_or_else(|_| panic!("valid role"))
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|name| (*name).to_owned()).collect()
    }

    #[test]
    fn admin_without_grants_gets_whole_catalog() {
        let catalog = catalog(&["A", "B", "C"]);
        let effective = role_effective_permissions(&role("ADMIN"), &[], &catalog);
        assert_eq!(effective, catalog.names());
    }

    #[test]
    fn admin_prohibition_removes_only_that_permission() {
        let catalog = catalog(&["A", "B", "C"]);
        let effective = role_effective_permissions(
            &role("admin"),
            &[PermissionGrant::prohibited("B")],
            &catalog,
        );
        assert_eq!(effective, set(&["A", "C"]));
    }

    #[test]
    fn ordinary_role_holds_only_granted_permissions() {
        let catalog = catalog(&["A", "B", "C"]);
        let effective = role_effective_permissions(
            &role("Editor"),
            &[PermissionGrant::granted("A"), PermissionGrant::prohibited("B")],
            &catalog,
        );
        assert_eq!(effective, set(&["A"]));
    }

    #[test]
    fn ordinary_role_ignores_names_missing_from_catalog() {
        let catalog = catalog(&["A"]);
        let effective = role_effective_permissions(
            &role("Editor"),
            &[PermissionGrant::granted("A"), PermissionGrant::granted("Gone")],
            &catalog,
        );
        assert_eq!(effective, set(&["A"]));
    }

    #[test]
    fn duplicate_rows_resolve_to_prohibited() {
        let catalog = catalog(&["A"]);
        let grants = [PermissionGrant::granted("A"), PermissionGrant::prohibited("A")];
        assert!(role_effective_permissions(&role("Editor"), &grants, &catalog).is_empty());

        let partition = UserGrantPartition::from_grants(&grants);
        assert!(partition.granted.is_empty());
        assert_eq!(partition.prohibited, set(&["A"]));
    }

    #[test]
    fn user_prohibition_beats_role_grant_and_user_grant_adds() {
        let partition = UserGrantPartition::from_grants(&[
            PermissionGrant::prohibited("B"),
            PermissionGrant::granted("C"),
        ]);
        let role_set = set(&["A", "B"]);

        let effective = user_effective_permissions(&partition, [&role_set]);
        assert_eq!(effective, set(&["A", "C"]));
    }

    fn grants_strategy() -> impl Strategy<Value = Vec<PermissionGrant>> {
        prop::collection::vec(
            ("[A-F]", any::<bool>()).prop_map(|(permission_name, is_granted)| PermissionGrant {
                permission_name,
                is_granted,
            }),
            0..8,
        )
    }

    fn role_sets_strategy() -> impl Strategy<Value = Vec<BTreeSet<String>>> {
        prop::collection::vec(prop::collection::btree_set("[A-F]", 0..6), 0..4)
    }

    proptest! {
        #[test]
        fn prohibited_user_permissions_never_appear(
            grants in grants_strategy(),
            role_sets in role_sets_strategy(),
        ) {
            let partition = UserGrantPartition::from_grants(&grants);
            let effective = user_effective_permissions(&partition, &role_sets);
            prop_assert!(effective.is_disjoint(&partition.prohibited));
            prop_assert!(partition.granted.is_subset(&effective));
        }

        #[test]
        fn single_decision_matches_full_resolution(
            grants in grants_strategy(),
            role_sets in role_sets_strategy(),
            probe in "[A-G]",
        ) {
            let partition = UserGrantPartition::from_grants(&grants);
            let effective = user_effective_permissions(&partition, &role_sets);
            prop_assert_eq!(
                partition.decides(&probe, &role_sets),
                effective.contains(&probe)
            );
        }

        #[test]
        fn admin_set_is_catalog_minus_prohibitions(grants in grants_strategy()) {
            let catalog = catalog(&["A", "B", "C", "D", "E", "F"]);
            let effective = role_effective_permissions(&role("Admin"), &grants, &catalog);
            for name in catalog.names() {
                let prohibited = grants
                    .iter()
                    .any(|grant| !grant.is_granted && grant.permission_name == name);
                prop_assert_eq!(effective.contains(&name), !prohibited);
            }
        }
    }
}

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::info;
use warden_core::{AppError, AppResult};
use warden_domain::{PermissionGrant, RoleId, RoleRecord, UserId, permission_names};

use crate::{AuthorizationRepository, AuthorizationService, SecurityAdminRepository};

mod roles;
mod users;


/// Application service for permission and role administration.
///
/// Every write validates names against the catalog first and invalidates the
/// affected cache items before returning.
#[derive(Clone)]
pub struct SecurityAdminService {
    authorization_service: AuthorizationService,
    authorization_repository: Arc<dyn AuthorizationRepository>,
    repository: Arc<dyn SecurityAdminRepository>,
}

impl SecurityAdminService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        authorization_repository: Arc<dyn AuthorizationRepository>,
        repository: Arc<dyn SecurityAdminRepository>,
    ) -> Self {
        Self {
            authorization_service,
            authorization_repository,
            repository,
        }
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<RoleRecord> {
        self.authorization_repository
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))
    }

    fn ensure_catalog_names(&self, names: &BTreeSet<String>) -> AppResult<()> {
        self.authorization_service
            .catalog()
            .ensure_known(names.iter().map(String::as_str))
    }

    /// Derives the grant rows that give a role exactly `desired`.
    ///
    /// Ordinary roles store one granted row per name. Privileged roles hold
    /// everything by default, so they store one prohibited row per catalog
    /// name left out of `desired`.
    fn role_grant_rows(&self, is_privileged: bool, desired: &BTreeSet<String>) -> Vec<PermissionGrant> {
        if is_privileged {
            return self
                .authorization_service
                .catalog()
                .definitions()
                .iter()
                .filter(|definition| !desired.contains(definition.name()))
                .map(|definition| PermissionGrant::prohibited(definition.name()))
                .collect();
        }

        desired.iter().map(PermissionGrant::granted).collect()
    }
}

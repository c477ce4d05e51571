use std::time::Duration;

use warden_application::{AuthorizationService, SecurityAdminService, TokenService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub authorization_service: AuthorizationService,
    pub security_admin_service: SecurityAdminService,
    pub token_service: TokenService,
    /// Upper bound for validating a bearer token, store round trips included.
    pub auth_deadline: Duration,
}

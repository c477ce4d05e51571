use serde::{Deserialize, Serialize};
use warden_application::IssuedToken;
use warden_domain::{PermissionDefinition, PermissionGrant};

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Incoming payload for access token refresh.
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// API representation of a signed token.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in_seconds: i64,
}

impl From<IssuedToken> for TokenResponse {
    fn from(value: IssuedToken) -> Self {
        Self {
            access_token: value.token,
            token_type: "Bearer",
            expires_in_seconds: value.expires_in_seconds,
        }
    }
}

/// API representation of a catalog permission.
#[derive(Debug, Serialize)]
pub struct PermissionResponse {
    pub name: String,
    pub display_name: String,
    pub group: String,
}

impl From<&PermissionDefinition> for PermissionResponse {
    fn from(value: &PermissionDefinition) -> Self {
        Self {
            name: value.name().to_owned(),
            display_name: value.display_name().to_owned(),
            group: value.group().to_owned(),
        }
    }
}

/// Answer to a single permission check.
#[derive(Debug, Serialize)]
pub struct PermissionCheckResponse {
    pub name: String,
    pub is_granted: bool,
}

/// Incoming payload replacing the permissions of a role.
#[derive(Debug, Deserialize)]
pub struct SetRolePermissionsRequest {
    pub granted_permissions: Vec<String>,
}

/// One user-level override.
#[derive(Debug, Deserialize)]
pub struct PermissionGrantRequest {
    pub name: String,
    pub is_granted: bool,
}

impl From<PermissionGrantRequest> for PermissionGrant {
    fn from(value: PermissionGrantRequest) -> Self {
        Self {
            permission_name: value.name,
            is_granted: value.is_granted,
        }
    }
}

/// Incoming payload replacing the user-level overrides of a user.
#[derive(Debug, Deserialize)]
pub struct SetUserPermissionsRequest {
    pub grants: Vec<PermissionGrantRequest>,
}

/// Incoming payload replacing the role assignments of a user.
#[derive(Debug, Deserialize)]
pub struct SetUserRolesRequest {
    pub role_ids: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use warden_application::IssuedToken;
    use warden_domain::{PermissionGrant, TokenKey};

    use super::{SetUserPermissionsRequest, TokenResponse};

    #[test]
    fn token_response_hides_the_token_key() {
        let response = TokenResponse::from(IssuedToken {
            token: "header.payload.signature".to_owned(),
            token_key: TokenKey::generate(),
            expires_in_seconds: 3600,
        });

        let value = serde_json::to_value(&response)
            .unwrap_or_else(|error| panic!("response should serialize: {error}"));

        assert_eq!(
            value,
            serde_json::json!({
                "access_token": "header.payload.signature",
                "token_type": "Bearer",
                "expires_in_seconds": 3600,
            })
        );
    }

    #[test]
    fn user_permission_payload_maps_to_grants() {
        let payload: SetUserPermissionsRequest = serde_json::from_str(
            r#"{"grants":[{"name":"Pages","is_granted":true},{"name":"Pages.Tenants","is_granted":false}]}"#,
        )
        .unwrap_or_else(|error| panic!("payload should parse: {error}"));

        let grants: Vec<PermissionGrant> =
            payload.grants.into_iter().map(PermissionGrant::from).collect();

        assert_eq!(
            grants,
            vec![
                PermissionGrant::granted("Pages"),
                PermissionGrant::prohibited("Pages.Tenants"),
            ]
        );
    }
}

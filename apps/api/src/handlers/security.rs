use super::*;

use warden_domain::{PermissionGrant, RoleId, StampRotationReason, UserId, permission_names};

use crate::dto::{SetRolePermissionsRequest, SetUserPermissionsRequest, SetUserRolesRequest};

pub async fn set_role_permissions_handler(
    State(state): State<AppState>,
    Extension(token): Extension<ValidatedToken>,
    Path(role_id): Path<i64>,
    Json(payload): Json<SetRolePermissionsRequest>,
) -> ApiResult<StatusCode> {
    state
        .security_admin_service
        .set_role_permissions(
            token.user_id,
            RoleId::new(role_id),
            payload.granted_permissions,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_user_permissions_handler(
    State(state): State<AppState>,
    Extension(token): Extension<ValidatedToken>,
    Path(user_id): Path<i64>,
    Json(payload): Json<SetUserPermissionsRequest>,
) -> ApiResult<StatusCode> {
    let grants = payload
        .grants
        .into_iter()
        .map(PermissionGrant::from)
        .collect();

    state
        .security_admin_service
        .set_user_permissions(token.user_id, UserId::new(user_id), grants)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_user_roles_handler(
    State(state): State<AppState>,
    Extension(token): Extension<ValidatedToken>,
    Path(user_id): Path<i64>,
    Json(payload): Json<SetUserRolesRequest>,
) -> ApiResult<StatusCode> {
    let role_ids = payload.role_ids.into_iter().map(RoleId::new).collect();

    state
        .security_admin_service
        .set_user_roles(token.user_id, UserId::new(user_id), role_ids)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Ends every session of another user.
pub async fn force_sign_out_handler(
    State(state): State<AppState>,
    Extension(token): Extension<ValidatedToken>,
    Path(user_id): Path<i64>,
) -> ApiResult<StatusCode> {
    state
        .authorization_service
        .require_permission(token.user_id, permission_names::USERS_UNLOCK)
        .await?;

    state
        .token_service
        .rotate_security_stamp(UserId::new(user_id), StampRotationReason::AdministrativeLock)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

use super::*;

use crate::dto::{PermissionCheckResponse, PermissionResponse};

pub async fn list_permission_catalog_handler(
    State(state): State<AppState>,
) -> Json<Vec<PermissionResponse>> {
    Json(
        state
            .authorization_service
            .catalog()
            .definitions()
            .iter()
            .map(PermissionResponse::from)
            .collect(),
    )
}

pub async fn list_my_permissions_handler(
    State(state): State<AppState>,
    Extension(token): Extension<ValidatedToken>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let permissions = state
        .authorization_service
        .list_granted_permissions(token.user_id)
        .await?
        .iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn check_my_permission_handler(
    State(state): State<AppState>,
    Extension(token): Extension<ValidatedToken>,
    Path(name): Path<String>,
) -> ApiResult<Json<PermissionCheckResponse>> {
    let is_granted = state
        .authorization_service
        .has_permission(token.user_id, &name)
        .await?;

    Ok(Json(PermissionCheckResponse { name, is_granted }))
}

use super::*;

use warden_domain::StampRotationReason;

use crate::dto::{RefreshTokenRequest, TokenResponse};

pub async fn refresh_token_handler(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let issued = state
        .token_service
        .refresh_access_token(payload.refresh_token.trim())
        .await?;

    Ok(Json(TokenResponse::from(issued)))
}

pub async fn sign_out_handler(
    State(state): State<AppState>,
    Extension(token): Extension<ValidatedToken>,
) -> ApiResult<StatusCode> {
    state
        .token_service
        .revoke_tokens(token.user_id, &token.claims)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn sign_out_everywhere_handler(
    State(state): State<AppState>,
    Extension(token): Extension<ValidatedToken>,
) -> ApiResult<StatusCode> {
    state
        .token_service
        .rotate_security_stamp(token.user_id, StampRotationReason::SignOutEverywhere)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

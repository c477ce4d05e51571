use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info, warn};
use warden_core::AppError;
use warden_domain::TokenKind;

use crate::error::ApiResult;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Validates the bearer access token and exposes the `ValidatedToken` to handlers.
///
/// Validation that outlives the configured deadline is abandoned and the
/// request is rejected; dropping the future cancels any pending store calls.
pub async fn require_bearer_token(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = bearer_token(&request)?.to_owned();

    let validated = tokio::time::timeout(
        state.auth_deadline,
        state.token_service.validate_token(&token, TokenKind::Access),
    )
    .await
    .map_err(|_| {
        warn!(deadline = ?state.auth_deadline, "token validation timed out");
        AppError::Unauthorized("token validation timed out".to_owned())
    })?
    .inspect_err(|error| match error.token_rejection() {
        Some(rejection) if rejection.is_revocation() => {
            info!(reason = %rejection, "revoked token presented");
        }
        Some(rejection) => warn!(reason = %rejection, "token rejected"),
        None => warn!(error = %error, "token validation failed"),
    })?;

    request.extensions_mut().insert(validated);
    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Result<&str, AppError> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("bearer token required".to_owned()))
}

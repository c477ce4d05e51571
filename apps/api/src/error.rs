use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;
use warden_core::AppError;

/// API error payload.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    message: String,
}

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) | AppError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Internal details stay in the logs.
        let message = match &self.0 {
            AppError::Internal(detail) => {
                error!(%status, error = %detail, "request failed");
                "internal server error".to_owned()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use warden_core::{AppError, TokenRejection};

    use super::ApiError;

    #[test]
    fn token_rejections_map_to_unauthorized() {
        let error = ApiError::from(AppError::from(TokenRejection::InvalidTokenKey));

        assert_eq!(error.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn forbidden_and_validation_keep_their_status() {
        assert_eq!(
            ApiError(AppError::Forbidden("missing".to_owned())).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError(AppError::Validation("bad".to_owned())).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn internal_details_are_not_sent_to_clients() {
        let response =
            ApiError(AppError::Internal("failed to lock role: connection reset".to_owned()))
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_else(|error| panic!("body should be readable: {error}"));
        let payload: serde_json::Value = serde_json::from_slice(&body)
            .unwrap_or_else(|error| panic!("body should be json: {error}"));

        assert_eq!(payload["message"], "internal server error");
    }
}

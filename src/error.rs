use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::{auth::jwt::TokenError, users::repo::RepoError};

/// Client-facing error taxonomy. Repository and token failures are
/// translated into one of these before they reach the wire; internal
/// causes stay in the server logs.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Username already exists")]
    DuplicateUsername,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("User not found")]
    NotFound,
    #[error("Invalid or expired token")]
    Unauthorized,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::DuplicateUsername => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::DuplicateUsername => ApiError::DuplicateUsername,
            RepoError::NotFound => ApiError::NotFound,
            RepoError::Sqlx(e) => ApiError::Internal(e.into()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(_: TokenError) -> Self {
        ApiError::Unauthorized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn status_mapping() {
        assert_eq!(body_json(ApiError::DuplicateUsername).await.0, StatusCode::BAD_REQUEST);
        assert_eq!(body_json(ApiError::InvalidCredentials).await.0, StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(ApiError::Unauthorized).await.0, StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(ApiError::NotFound).await.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn internal_error_body_is_generic() {
        let (status, body) =
            body_json(ApiError::Internal(anyhow::anyhow!("secret detail"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn repo_errors_translate() {
        let (status, body) = body_json(RepoError::DuplicateUsername.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Username already exists");

        let (status, _) = body_json(RepoError::NotFound.into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn token_errors_merge_to_unauthorized() {
        let (expired, _) = body_json(TokenError::Expired.into()).await;
        let (invalid, _) = body_json(TokenError::Invalid.into()).await;
        assert_eq!(expired, StatusCode::UNAUTHORIZED);
        assert_eq!(invalid, StatusCode::UNAUTHORIZED);
    }
}

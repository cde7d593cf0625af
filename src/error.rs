/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / {resultCode, msg} の JSON body)
 * - RepoError / AuthError を統一的に変換
 * - 内部エラーの詳細はログにだけ残し、クライアントには返さない
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::AuthError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub result_code: &'static str,
    pub msg: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {msg}")]
    BadRequest { code: &'static str, msg: String },
    #[error("{code}: {msg}")]
    Unauthorized { code: &'static str, msg: String },
    #[error("{code}: {msg}")]
    Forbidden { code: &'static str, msg: String },
    #[error("{code}: {msg}")]
    NotFound { code: &'static str, msg: String },
    #[error("{code}: {msg}")]
    Conflict { code: &'static str, msg: String },
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, msg: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            msg: msg.into(),
        }
    }

    pub fn unauthorized(code: &'static str, msg: impl Into<String>) -> Self {
        Self::Unauthorized {
            code,
            msg: msg.into(),
        }
    }

    pub fn forbidden(code: &'static str, msg: impl Into<String>) -> Self {
        Self::Forbidden {
            code,
            msg: msg.into(),
        }
    }

    pub fn not_found(code: &'static str, msg: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            msg: msg.into(),
        }
    }

    pub fn conflict(code: &'static str, msg: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            msg: msg.into(),
        }
    }

    /// Caller is anonymous on an endpoint that needs a member.
    pub fn login_required() -> Self {
        Self::unauthorized("401-1", "Login is required.")
    }

    pub fn result_code(&self) -> &'static str {
        match self {
            AppError::BadRequest { code, .. }
            | AppError::Unauthorized { code, .. }
            | AppError::Forbidden { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Conflict { code, .. } => code,
            AppError::Internal => "500-1",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let result_code = self.result_code();
        let msg = match self {
            AppError::BadRequest { msg, .. }
            | AppError::Unauthorized { msg, .. }
            | AppError::Forbidden { msg, .. }
            | AppError::NotFound { msg, .. }
            | AppError::Conflict { msg, .. } => msg,
            AppError::Internal => "Internal server error.".to_string(),
        };

        (status, Json(ErrorBody { result_code, msg })).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::DuplicateUsername => {
                AppError::conflict("409-1", "Username is already taken.")
            }
            RepoError::DuplicateApiKey => {
                AppError::conflict("409-2", "API key is already in use.")
            }
            RepoError::Db(err) => {
                tracing::error!(error = %err, "identity store failure");
                AppError::Internal
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MalformedCredential | AuthError::UnresolvableApiKey => {
                AppError::unauthorized(e.result_code(), e.to_string())
            }
            AuthError::Store(err) => AppError::from(err),
            AuthError::TokenIssue(err) => {
                tracing::error!(error = %err, "access token issuance failed");
                AppError::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn body_carries_result_code_and_msg() {
        let response = AppError::forbidden("403-1", "Admins only.").into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["resultCode"], "403-1");
        assert_eq!(body["msg"], "Admins only.");
    }

    #[tokio::test]
    async fn internal_error_hides_detail() {
        let err = AppError::from(RepoError::Db(sqlx::Error::PoolTimedOut));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(err.into_response().into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["resultCode"], "500-1");
        assert!(!body["msg"].as_str().unwrap().contains("pool"));
    }

    #[test]
    fn gateway_errors_map_to_their_codes() {
        let malformed = AppError::from(AuthError::MalformedCredential);
        assert_eq!(malformed.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(malformed.result_code(), "401-2");

        let unknown = AppError::from(AuthError::UnresolvableApiKey);
        assert_eq!(unknown.result_code(), "401-3");
    }

    #[test]
    fn key_collision_is_a_conflict_not_a_500() {
        let err = AppError::from(RepoError::DuplicateApiKey);
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.result_code(), "409-2");
    }
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use supplydesk_auth::AuthzError;
use supplydesk_core::DomainError;
use supplydesk_infra::RepoError;

/// Every failure a handler or middleware can surface.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    /// Logged in full; the client only sees a generic message.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized => json_error(StatusCode::UNAUTHORIZED, "unauthorized", "unauthorized"),
            ApiError::Forbidden => json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden"),
            ApiError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
            ApiError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
            ApiError::Internal(detail) => {
                error!(%detail, "request failed");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal server error")
            }
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Unauthorized => ApiError::Unauthorized,
            AuthzError::Forbidden(_) => ApiError::Forbidden,
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => ApiError::NotFound,
            RepoError::Rejected(msg) => ApiError::Validation(msg),
            RepoError::Persistence(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => ApiError::Validation(msg),
            DomainError::NotFound => ApiError::NotFound,
            DomainError::Unauthorized => ApiError::Unauthorized,
            DomainError::Forbidden => ApiError::Forbidden,
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

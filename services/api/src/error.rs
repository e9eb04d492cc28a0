//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ledger::LedgerError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or invalid credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// One or more request fields failed validation
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// Resource not found, or not owned by the caller
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflicting state, e.g. a duplicate category name
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The category still has expenses attached
    #[error("Category has {0} associated expenses")]
    CategoryInUse(i64),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,

    /// Ledger routine error
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::Validation(errors) => (StatusCode::BAD_REQUEST, json!({ "errors": errors })),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            ApiError::CategoryInUse(count) => (
                StatusCode::CONFLICT,
                json!({
                    "error": "Cannot delete category with associated expenses",
                    "expenseCount": count,
                }),
            ),
            ApiError::Ledger(LedgerError::CategoryExists { .. }) => (
                StatusCode::CONFLICT,
                json!({ "error": "Category with this name already exists" }),
            ),
            ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error" }),
            ),
            ApiError::Ledger(e) => {
                error!("Ledger error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Log a repository failure and turn it into a generic 500
pub fn internal(context: &'static str) -> impl FnOnce(anyhow::Error) -> ApiError {
    move |e| {
        error!(context, "Request failed: {}", e);
        ApiError::InternalServerError
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = vec![
            (ApiError::Unauthorized("nope".into()), StatusCode::UNAUTHORIZED),
            (ApiError::BadRequest("bad".into()), StatusCode::BAD_REQUEST),
            (ApiError::Validation(vec!["x".into()]), StatusCode::BAD_REQUEST),
            (ApiError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (ApiError::Conflict("dup".into()), StatusCode::CONFLICT),
            (ApiError::CategoryInUse(3), StatusCode::CONFLICT),
            (
                ApiError::Ledger(LedgerError::CategoryExists {
                    name: "Travel".into(),
                }),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::Ledger(LedgerError::Store("down".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ApiError::InternalServerError, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_validation_message() {
        let err = ApiError::Validation(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "Validation failed: a, b");
    }
}

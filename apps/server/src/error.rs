//! API error mapping.
//!
//! Business outcomes (validation, not-found, forbidden, conflicts, invalid
//! transitions) are returned typed with their message; everything else is
//! logged server-side and surfaced as an opaque internal error.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use referra_core::errors::DatabaseError;
use referra_core::Error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let (status, message) = match &err {
            Error::Unauthorized(_) => (StatusCode::UNAUTHORIZED, err.to_string()),
            Error::Forbidden(_) => (StatusCode::FORBIDDEN, err.to_string()),
            Error::NotFound(_) | Error::Database(DatabaseError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, err.to_string())
            }
            Error::Conflict(_) | Error::Database(DatabaseError::UniqueViolation(_)) => {
                (StatusCode::CONFLICT, err.to_string())
            }
            Error::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
            e if e.is_invalid_state() => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
            _ => {
                tracing::error!("internal error handling request: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

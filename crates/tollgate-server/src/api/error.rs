//! API error responses.
//!
//! Every failure leaves the server as `{code, message}` with a stable code.
//! Store and internal failures are logged here and reach the caller only
//! as a generic message.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tollgate_core::error::TollgateError;

use crate::api::types::ErrorResponse;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<TollgateError> for ApiError {
    fn from(err: TollgateError) -> Self {
        match err {
            TollgateError::Unauthenticated => {
                ApiError::new(StatusCode::UNAUTHORIZED, "unauthorized", "authentication required")
            }
            TollgateError::UserNotFound => {
                ApiError::new(StatusCode::NOT_FOUND, "user_not_found", "user not found")
            }
            TollgateError::Forbidden { reason } => {
                ApiError::new(StatusCode::FORBIDDEN, "forbidden", reason)
            }
            TollgateError::Validation { message } => {
                api_validation_error(&message)
            }
            TollgateError::Conflict { message } => {
                ApiError::new(StatusCode::CONFLICT, "conflict", message)
            }
            TollgateError::NotFound { entity, id } => ApiError::new(
                StatusCode::NOT_FOUND,
                "not_found",
                format!("{entity} not found: {id}"),
            ),
            TollgateError::Database(_) | TollgateError::Internal(_) => {
                tracing::error!(error = %err, "request failed with internal error");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "internal server error",
                )
            }
        }
    }
}

pub fn api_validation_error(message: &str) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "validation_error", message)
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        api_validation_error(&rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        api_validation_error(&rejection.body_text())
    }
}

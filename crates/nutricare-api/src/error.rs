use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use nutricare_core::error::CoreError;
use nutricare_core::followup::FollowUpError;

/// Unified API error type for all route handlers.
///
/// Transport failures keep their underlying message — the user sees what
/// happened and may retry the action; nothing is retried automatically.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Conflict(String),
    BadGateway(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<nutricare_storage::error::StorageError> for ApiError {
    fn from(e: nutricare_storage::error::StorageError) -> Self {
        match e {
            nutricare_storage::error::StorageError::NotFound { key } => {
                ApiError::NotFound(format!("record not found: {key}"))
            }
            other => ApiError::BadGateway(other.to_string()),
        }
    }
}

impl From<nutricare_bedrock::error::BedrockError> for ApiError {
    fn from(e: nutricare_bedrock::error::BedrockError) -> Self {
        ApiError::BadGateway(e.to_string())
    }
}

impl From<nutricare_auth::error::AuthError> for ApiError {
    fn from(e: nutricare_auth::error::AuthError) -> Self {
        ApiError::Unauthorized(e.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::MissingField(_) | CoreError::InvalidKind(_) => {
                ApiError::BadRequest(e.to_string())
            }
            CoreError::Serialization(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<FollowUpError> for ApiError {
    fn from(e: FollowUpError) -> Self {
        match e {
            FollowUpError::NoParentAssessment => ApiError::BadRequest(e.to_string()),
            // Distinct fatal condition: the user must redo the
            // recalculation step, not fix a form field.
            FollowUpError::RecalculationMissing | FollowUpError::AlreadySaved => {
                ApiError::Conflict(e.to_string())
            }
            FollowUpError::Core(inner) => ApiError::from(inner),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

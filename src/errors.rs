use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use sea_orm::SqlErr;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, warn};
use utoipa::ToSchema;

static EXPOSE_INTERNAL_DETAILS: AtomicBool = AtomicBool::new(false);

/// Controls whether 5xx bodies carry the underlying error text.
/// Enabled outside production at startup.
pub fn expose_internal_details(enabled: bool) {
    EXPOSE_INTERNAL_DETAILS.store(enabled, Ordering::Relaxed);
}

fn current_request_id() -> Option<String> {
    crate::observability::current_request_id().map(|rid| rid.as_str().to_string())
}

/// Error body returned by every endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({ "error": "Product not found" }))]
pub struct ErrorResponse {
    /// Human-readable error description
    pub error: String,
    /// Underlying failure, only for internal errors outside production
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Hash error: {0}")]
    HashError(String),

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            // Duplicates are reported as 400 to keep the public contract.
            Self::ValidationError(_) | Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) | Self::TokenError(_) => StatusCode::UNAUTHORIZED,
            Self::InsufficientStock(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::DatabaseError(_)
            | Self::InternalError(_)
            | Self::HashError(_)
            | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Internal errors return a generic message.
    pub fn response_message(&self) -> String {
        match self {
            Self::NotFound(msg)
            | Self::ValidationError(msg)
            | Self::Unauthorized(msg)
            | Self::Conflict(msg)
            | Self::InsufficientStock(msg)
            | Self::TokenError(msg) => msg.clone(),
            Self::DatabaseError(_)
            | Self::InternalError(_)
            | Self::HashError(_)
            | Self::Other(_) => "Internal server error".to_string(),
        }
    }
}

/// True when `err` reports a unique constraint violation.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let request_id = current_request_id();

        let details = if status.is_server_error() {
            error!(request_id = ?request_id, error = %self, "request failed");
            EXPOSE_INTERNAL_DETAILS
                .load(Ordering::Relaxed)
                .then(|| self.to_string())
        } else {
            None
        };

        let body = ErrorResponse {
            error: self.response_message(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// API Error type for HTTP responses
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Service error: {0}")]
    ServiceError(#[from] ServiceError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::ServiceError(err) => err.into_response(),
            ApiError::BadRequest(message) => {
                warn!(request_id = ?current_request_id(), %message, "rejected request body");
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: message,
                        details: None,
                    }),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use test_case::test_case;

    #[test_case(ServiceError::NotFound("x".into()), StatusCode::NOT_FOUND)]
    #[test_case(ServiceError::ValidationError("x".into()), StatusCode::BAD_REQUEST)]
    #[test_case(ServiceError::Conflict("x".into()), StatusCode::BAD_REQUEST)]
    #[test_case(ServiceError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED)]
    #[test_case(ServiceError::TokenError("x".into()), StatusCode::UNAUTHORIZED)]
    #[test_case(ServiceError::InsufficientStock("x".into()), StatusCode::UNPROCESSABLE_ENTITY)]
    #[test_case(ServiceError::InternalError("x".into()), StatusCode::INTERNAL_SERVER_ERROR)]
    #[test_case(ServiceError::HashError("x".into()), StatusCode::INTERNAL_SERVER_ERROR)]
    fn status_code_mapping(err: ServiceError, expected: StatusCode) {
        assert_eq!(err.status_code(), expected);
    }

    #[test]
    fn internal_errors_hide_their_message() {
        let err = ServiceError::DatabaseError(DbErr::Custom("connection reset".into()));
        assert_eq!(err.response_message(), "Internal server error");

        let err = ServiceError::NotFound("Order not found".into());
        assert_eq!(err.response_message(), "Order not found");
    }

    #[tokio::test]
    async fn unauthorized_body_only_carries_error() {
        let response = ServiceError::Unauthorized("Unauthorized".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload, serde_json::json!({ "error": "Unauthorized" }));
    }

    #[tokio::test]
    async fn bad_request_uses_same_shape() {
        let response = ApiError::BadRequest("Invalid JSON body".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload.error, "Invalid JSON body");
        assert!(payload.details.is_none());
    }

    #[test]
    fn custom_db_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(&DbErr::Custom("boom".into())));
    }
}

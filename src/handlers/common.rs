use crate::errors::{ApiError, ServiceError};
use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// `{"message": ...}` acknowledgement body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

pub fn message_response(message: &str) -> Response {
    success_response(MessageResponse {
        message: message.to_string(),
    })
}

/// Validate request input, reporting the first failing rule's message
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ApiError> {
    input
        .validate()
        .map_err(|errors| ApiError::BadRequest(first_message(&errors)))
}

fn first_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Invalid request".to_string())
}

/// Path ids that are not UUIDs cannot name an existing row.
pub fn parse_id(raw: &str, not_found: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw).map_err(|_| ServiceError::NotFound(not_found.to_string()))
}

/// JSON body extractor whose rejections use the API error shape
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection_message(&rejection))),
        }
    }
}

fn rejection_message(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "Expected request with `Content-Type: application/json`".to_string()
        }
        JsonRejection::JsonSyntaxError(_) => "Malformed JSON body".to_string(),
        other => format!("Invalid request body: {}", other.body_text()),
    }
}

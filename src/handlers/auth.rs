use crate::{
    errors::{ApiError, ErrorResponse, ServiceError},
    handlers::common::{created_response, success_response, JsonBody},
    services::accounts::{AuthResponse, UserProfile},
    AppState,
};
use axum::{
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

pub fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    pub user: UserProfile,
}

/// Create an account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Missing fields, short password or duplicate email", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state
        .services
        .accounts
        .register(
            payload.name.as_deref().unwrap_or_default(),
            payload.email.as_deref().unwrap_or_default(),
            payload.password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(created_response(response))
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 400, description = "Missing fields", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state
        .services
        .accounts
        .login(
            payload.email.as_deref().unwrap_or_default(),
            payload.password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(success_response(response))
}

/// Resolve the bearer token to the signed-in user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let caller = state
        .services
        .auth
        .authenticate(&headers)
        .map_err(|err| ServiceError::Unauthorized(err.to_string()))?;

    let user = state.services.accounts.current_user(caller.user_id).await?;

    Ok(success_response(MeResponse { user }))
}

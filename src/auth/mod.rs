/*!
 * # Authentication Module
 *
 * Stateless bearer credentials for storefront customers:
 *
 * - HS256 JWTs carrying the user id and email, issued at register/login
 * - `auth_middleware` guarding routes that need a signed-in user
 * - `AuthUser` / `OptionalAuthUser` extractors for handlers
 */

use crate::config::AppConfig;
use crate::errors::ServiceError;
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};
use uuid::Uuid;

pub mod password;

/// Claim structure for JWT tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,   // Subject (user ID)
    pub email: String, // User's email
    pub iat: i64,      // Issued at time
    pub exp: i64,      // Expiration time
}

/// Signed-in user resolved from a bearer credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

/// Why a request could not be authenticated
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("No token provided")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,
}

/// Issues and verifies bearer credentials
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiration: ChronoDuration,
}

impl AuthService {
    pub fn new(secret: &str, expiration_secs: usize) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiration: ChronoDuration::seconds(expiration_secs as i64),
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(&cfg.jwt_secret, cfg.jwt_expiration)
    }

    /// Signs a credential for `user_id`
    pub fn issue_token(&self, user_id: Uuid, email: &str) -> Result<String, ServiceError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.expiration).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            error!("Failed to sign token: {}", e);
            ServiceError::TokenError(e.to_string())
        })
    }

    /// Checks signature and expiry
    pub fn verify_token(&self, token: &str) -> Result<AuthUser, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!("Rejected bearer token: {}", e);
            AuthError::InvalidToken
        })?;

        let user_id = Uuid::parse_str(&data.claims.sub).map_err(|_| AuthError::InvalidToken)?;

        Ok(AuthUser {
            user_id,
            email: data.claims.email,
        })
    }

    /// Resolves the `Authorization: Bearer <token>` header
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<AuthUser, AuthError> {
        let token = bearer_token(headers).ok_or(AuthError::MissingToken)?;
        self.verify_token(token)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn unauthorized() -> ServiceError {
    ServiceError::Unauthorized("Unauthorized".to_string())
}

/// Makes the auth service reachable from `auth_middleware` and the extractors
pub async fn inject_auth_service(
    State(auth): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Response {
    request.extensions_mut().insert(auth);
    next.run(request).await
}

/// Rejects the request with 401 unless it carries a valid credential
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            error!("Authentication service not available on request");
            return ServiceError::InternalError("authentication service not available".into())
                .into_response();
        }
    };

    match auth_service.authenticate(request.headers()) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(err) => ServiceError::Unauthorized(err.to_string()).into_response(),
    }
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.route_layer(axum::middleware::from_fn(auth_middleware))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(unauthorized)
    }
}

/// The caller if a valid credential was sent, otherwise anonymous
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(Self(Some(user.clone())));
        }

        let user = parts
            .extensions
            .get::<Arc<AuthService>>()
            .and_then(|auth| auth.authenticate(&parts.headers).ok());

        Ok(Self(user))
    }
}

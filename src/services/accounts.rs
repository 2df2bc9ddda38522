use crate::{
    auth::{
        password::{hash_password_blocking, verify_password_blocking},
        AuthService,
    },
    entities::{user, User},
    errors::{is_unique_violation, ServiceError},
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Public part of an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Account details returned by `/auth/me`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Result of a successful register or login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserSummary,
    pub token: String,
}

impl From<user::Model> for UserSummary {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
        }
    }
}

impl From<user::Model> for UserProfile {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            created_at: model.created_at,
        }
    }
}

/// Emails compare case-insensitively and ignore surrounding whitespace.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn invalid_credentials() -> ServiceError {
    ServiceError::Unauthorized("Invalid email or password".to_string())
}

fn duplicate_email() -> ServiceError {
    ServiceError::Conflict("Email already exists".to_string())
}

/// Customer registration, login and profile lookup
#[derive(Clone)]
pub struct AccountService {
    db: Arc<DatabaseConnection>,
    auth: Arc<AuthService>,
}

impl AccountService {
    pub fn new(db: Arc<DatabaseConnection>, auth: Arc<AuthService>) -> Self {
        Self { db, auth }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, ServiceError> {
        Ok(User::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await?)
    }

    /// Creates an account and signs the caller in
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ServiceError> {
        let name = name.trim();
        let email = normalize_email(email);

        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(ServiceError::ValidationError(
                "Name, email, and password are required".to_string(),
            ));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ServiceError::ValidationError(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        if self.find_by_email(&email).await?.is_some() {
            return Err(duplicate_email());
        }

        let hashed = hash_password_blocking(password.to_string()).await?;

        let account = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            email: Set(email),
            password: Set(hashed),
            created_at: Set(Utc::now()),
        };

        let user = match account.insert(&*self.db).await {
            Ok(user) => user,
            Err(err) if is_unique_violation(&err) => {
                warn!("Concurrent registration for the same email");
                return Err(duplicate_email());
            }
            Err(err) => return Err(err.into()),
        };

        let token = self.auth.issue_token(user.id, &user.email)?;
        info!(user_id = %user.id, "Registered account");

        Ok(AuthResponse {
            message: "User created successfully".to_string(),
            user: user.into(),
            token,
        })
    }

    /// Verifies credentials and issues a fresh token
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ServiceError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(ServiceError::ValidationError(
                "Email and password are required".to_string(),
            ));
        }

        let user = self
            .find_by_email(&email)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !verify_password_blocking(user.password.clone(), password.to_string()).await? {
            info!(user_id = %user.id, "Rejected login with wrong password");
            return Err(invalid_credentials());
        }

        let token = self.auth.issue_token(user.id, &user.email)?;

        Ok(AuthResponse {
            message: "Login successful".to_string(),
            user: user.into(),
            token,
        })
    }

    /// Profile of the signed-in user; a deleted account counts as unauthorized
    #[instrument(skip(self))]
    pub async fn current_user(&self, user_id: Uuid) -> Result<UserProfile, ServiceError> {
        User::find_by_id(user_id)
            .one(&*self.db)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| ServiceError::Unauthorized("User not found".to_string()))
    }
}

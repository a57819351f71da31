//! Authentication use cases

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use validator::{Validate, ValidationErrors};

use crate::error::AuthError;
use crate::password::PasswordHasher;
use crate::ports::IdentityStore;
use crate::tokens::{generate_refresh_token, AccessTokenIssuer, REFRESH_TOKEN_TTL_DAYS};
use crate::user::{NewUser, User, UserView, ADMIN_ROLE, DEFAULT_ROLES, USER_ROLE};

/// Credentials for a login
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email or username is required"))]
    pub email_or_username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl LoginRequest {
    pub fn new(email_or_username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email_or_username: email_or_username.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"))]
    pub username: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 6, max = 100, message = "Password must be between 6 and 100 characters"))]
    pub password: String,
    #[validate(length(max = 100, message = "First name cannot be longer than 100 characters"))]
    pub first_name: String,
    #[validate(length(max = 100, message = "Last name cannot be longer than 100 characters"))]
    pub last_name: String,
}

/// A refresh token exchange
///
/// The expired access token is accepted for compatibility but not checked;
/// the refresh token alone identifies the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub token: String,
    pub refresh_token: String,
}

/// Tokens handed out after a login, registration or refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub refresh_token: String,
    /// Expiry of the refresh token
    pub expiration: DateTime<Utc>,
    pub user: UserView,
}

/// What the startup seeding created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub roles_created: usize,
    pub admin_created: bool,
}

pub struct AuthService {
    store: Arc<dyn IdentityStore>,
    issuer: Arc<dyn AccessTokenIssuer>,
    refresh_ttl: Duration,
}

impl AuthService {
    pub fn new(store: Arc<dyn IdentityStore>, issuer: Arc<dyn AccessTokenIssuer>) -> Self {
        Self {
            store,
            issuer,
            refresh_ttl: Duration::days(REFRESH_TOKEN_TTL_DAYS),
        }
    }

    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }

    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError> {
        request.validate().map_err(validation_error)?;

        let email = request.email.trim();
        let username = request.username.trim();
        if self.store.email_taken(email).await? {
            return Err(AuthError::validation("Email is already registered"));
        }
        if self.store.username_taken(username).await? {
            return Err(AuthError::validation("Username is already taken"));
        }

        let user = self
            .store
            .create_user(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash: PasswordHasher::hash(&request.password),
                first_name: request.first_name.trim().to_string(),
                last_name: request.last_name.trim().to_string(),
                roles: vec![USER_ROLE.to_string()],
            })
            .await?;

        info!(user_id = %user.id, "User registered");
        self.start_session(user).await
    }

    #[instrument(skip(self, request), fields(login = %request.email_or_username))]
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        request.validate().map_err(validation_error)?;

        let user = self
            .store
            .find_by_login(request.email_or_username.trim())
            .await?
            .filter(|user| PasswordHasher::verify(&request.password, &user.password_hash))
            .ok_or_else(|| {
                warn!("Rejected login");
                AuthError::unauthorized("Invalid credentials")
            })?;

        if !user.is_active {
            warn!(user_id = %user.id, "Login to deactivated account");
            return Err(AuthError::unauthorized("Account is deactivated"));
        }

        let now = Utc::now();
        self.store.record_login(user.id, now).await?;
        let response = self.start_session(user).await?;
        info!(user_id = %response.user.id, "User logged in");
        Ok(response)
    }

    /// Exchanges an active refresh token for a new pair, revoking the old one
    #[instrument(skip_all)]
    pub async fn refresh(&self, request: RefreshRequest) -> Result<AuthResponse, AuthError> {
        let (token, user) = self
            .store
            .find_refresh_token(request.refresh_token.trim())
            .await?
            .ok_or_else(|| AuthError::unauthorized("Invalid refresh token"))?;

        let now = Utc::now();
        if !token.is_active(now) {
            return Err(AuthError::unauthorized("Refresh token expired"));
        }
        if !user.is_active {
            return Err(AuthError::unauthorized("Account is deactivated"));
        }

        if !self.store.revoke_refresh_token(token.id, now).await? {
            // Lost a race with a concurrent refresh or revoke.
            return Err(AuthError::unauthorized("Refresh token expired"));
        }
        self.start_session(user).await
    }

    /// Revokes a refresh token; returns false when it was unknown or inactive
    #[instrument(skip_all)]
    pub async fn revoke(&self, refresh_token: &str) -> Result<bool, AuthError> {
        let Some((token, user)) = self.store.find_refresh_token(refresh_token.trim()).await? else {
            return Ok(false);
        };
        let now = Utc::now();
        if !token.is_active(now) {
            return Ok(false);
        }
        let revoked = self.store.revoke_refresh_token(token.id, now).await?;
        if revoked {
            info!(user_id = %user.id, "Refresh token revoked");
        }
        Ok(revoked)
    }

    /// Creates the default roles and an admin account when missing
    #[instrument(skip_all)]
    pub async fn seed(&self, admin_password: &str) -> Result<SeedReport, AuthError> {
        let roles_created = self.store.ensure_roles(&DEFAULT_ROLES).await?;
        if roles_created > 0 {
            info!(roles_created, "Seeded default roles");
        }

        if self.store.role_has_members(ADMIN_ROLE).await? {
            return Ok(SeedReport {
                roles_created,
                admin_created: false,
            });
        }

        let admin = self
            .store
            .create_user(NewUser {
                username: "admin".to_string(),
                email: "admin@properties.com".to_string(),
                password_hash: PasswordHasher::hash(admin_password),
                first_name: "System".to_string(),
                last_name: "Administrator".to_string(),
                roles: vec![ADMIN_ROLE.to_string()],
            })
            .await?;
        info!(user_id = %admin.id, username = %admin.username, "Seeded admin user");

        Ok(SeedReport {
            roles_created,
            admin_created: true,
        })
    }

    async fn start_session(&self, user: User) -> Result<AuthResponse, AuthError> {
        let access = self.issuer.issue(&user)?;
        let refresh = self
            .store
            .add_refresh_token(user.id, &generate_refresh_token(), Utc::now() + self.refresh_ttl)
            .await?;

        Ok(AuthResponse {
            token: access.token,
            refresh_token: refresh.token,
            expiration: refresh.expires_at,
            user: UserView::from(&user),
        })
    }
}

fn validation_error(errors: ValidationErrors) -> AuthError {
    let mut messages: Vec<String> = errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .map(|e| {
            e.message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| e.code.to_string())
        })
        .collect();
    messages.sort();
    AuthError::Validation(messages)
}

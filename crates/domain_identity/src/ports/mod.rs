//! Storage port for users, roles and refresh tokens

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_kernel::{DomainPort, HealthCheckable, PortError, RefreshTokenId, UserId};

use crate::user::{NewUser, RefreshToken, RoleSeed, User};

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[async_trait]
pub trait IdentityStore: DomainPort + HealthCheckable {
    /// A user whose email or username equals `login`, ignoring case
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, PortError>;

    async fn email_taken(&self, email: &str) -> Result<bool, PortError>;

    async fn username_taken(&self, username: &str) -> Result<bool, PortError>;

    /// Inserts a user with its roles; duplicate username or email is a conflict
    async fn create_user(&self, user: NewUser) -> Result<User, PortError>;

    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> Result<(), PortError>;

    async fn add_refresh_token(
        &self,
        user_id: UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, PortError>;

    /// The token and the user it belongs to
    async fn find_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<(RefreshToken, User)>, PortError>;

    /// Revokes a token that is not already revoked; returns false otherwise
    async fn revoke_refresh_token(
        &self,
        id: RefreshTokenId,
        at: DateTime<Utc>,
    ) -> Result<bool, PortError>;

    /// Creates the missing roles; returns how many were created
    async fn ensure_roles(&self, roles: &[RoleSeed]) -> Result<usize, PortError>;

    /// Returns true when some user holds the role
    async fn role_has_members(&self, role: &str) -> Result<bool, PortError>;
}

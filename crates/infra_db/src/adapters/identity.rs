//! PostgreSQL adapter for the identity store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_kernel::{
    DomainPort, HealthCheckResult, HealthCheckable, PortError, RefreshTokenId, UserId,
};
use domain_identity::{IdentityStore, NewUser, RefreshToken, RoleSeed, User};
use sqlx::PgPool;
use tracing::instrument;

use crate::error::DatabaseError;
use crate::repositories::UserRepository;

const ADAPTER_ID: &str = "postgres-identity-adapter";

#[derive(Debug, Clone)]
pub struct PostgresIdentityAdapter {
    users: UserRepository,
}

impl PostgresIdentityAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }
}

impl DomainPort for PostgresIdentityAdapter {}

#[async_trait]
impl HealthCheckable for PostgresIdentityAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(self.users.pool(), ADAPTER_ID).await
    }
}

#[async_trait]
impl IdentityStore for PostgresIdentityAdapter {
    #[instrument(skip(self))]
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, PortError> {
        Ok(self.users.find_by_login(login).await?.map(Into::into))
    }

    async fn email_taken(&self, email: &str) -> Result<bool, PortError> {
        Ok(self.users.email_exists(email).await?)
    }

    async fn username_taken(&self, username: &str) -> Result<bool, PortError> {
        Ok(self.users.username_exists(username).await?)
    }

    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn create_user(&self, user: NewUser) -> Result<User, PortError> {
        let id = match self.users.insert(&user).await {
            Ok(id) => id,
            Err(DatabaseError::DuplicateEntry(_)) => {
                return Err(PortError::conflict("Username or email is already registered"));
            }
            Err(e) => return Err(e.into()),
        };
        self.users
            .find_by_id(id)
            .await?
            .map(Into::into)
            .ok_or_else(|| PortError::not_found("User", id))
    }

    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> Result<(), PortError> {
        Ok(self.users.record_login(id.value(), at).await?)
    }

    #[instrument(skip(self, token), fields(user_id = %user_id))]
    async fn add_refresh_token(
        &self,
        user_id: UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, PortError> {
        Ok(self
            .users
            .insert_refresh_token(user_id.value(), token, expires_at)
            .await?
            .into())
    }

    #[instrument(skip(self, token))]
    async fn find_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<(RefreshToken, User)>, PortError> {
        let Some(row) = self.users.find_refresh_token(token).await? else {
            return Ok(None);
        };
        let Some(user) = self.users.find_by_id(row.user_id).await? else {
            return Ok(None);
        };
        Ok(Some((row.into(), user.into())))
    }

    async fn revoke_refresh_token(
        &self,
        id: RefreshTokenId,
        at: DateTime<Utc>,
    ) -> Result<bool, PortError> {
        Ok(self.users.revoke_refresh_token(id.value(), at).await?)
    }

    #[instrument(skip(self, roles), fields(count = roles.len()))]
    async fn ensure_roles(&self, roles: &[RoleSeed]) -> Result<usize, PortError> {
        Ok(self.users.insert_missing_roles(roles).await?)
    }

    async fn role_has_members(&self, role: &str) -> Result<bool, PortError> {
        Ok(self.users.role_has_members(role).await?)
    }
}

//! In-memory identity store

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_kernel::{
    DomainPort, HealthCheckResult, HealthCheckable, PortError, RefreshTokenId, RoleId, UserId,
};
use tokio::sync::RwLock;

use super::IdentityStore;
use crate::user::{NewUser, RefreshToken, Role, RoleSeed, User};

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<UserId, User>,
    roles: BTreeMap<RoleId, Role>,
    tokens: BTreeMap<RefreshTokenId, RefreshToken>,
}

impl State {
    fn next_user_id(&self) -> UserId {
        UserId::new(self.users.keys().next_back().map_or(0, UserId::value) + 1)
    }
}

/// Identity store kept in memory
#[derive(Debug, Clone, Default)]
pub struct MockIdentityStore {
    state: Arc<RwLock<State>>,
}

impl MockIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the default roles already present
    pub async fn with_default_roles() -> Self {
        let store = Self::new();
        let _ = store.ensure_roles(&crate::user::DEFAULT_ROLES).await;
        store
    }

    pub async fn user(&self, id: UserId) -> Option<User> {
        self.state.read().await.users.get(&id).cloned()
    }

    pub async fn set_active(&self, id: UserId, active: bool) {
        if let Some(user) = self.state.write().await.users.get_mut(&id) {
            user.is_active = active;
        }
    }

    pub async fn tokens_for(&self, user_id: UserId) -> Vec<RefreshToken> {
        self.state
            .read()
            .await
            .tokens
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Moves a token's expiry, for exercising expired tokens
    pub async fn expire_token(&self, token: &str, at: DateTime<Utc>) {
        let mut state = self.state.write().await;
        if let Some(stored) = state.tokens.values_mut().find(|t| t.token == token) {
            stored.expires_at = at;
        }
    }

    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }
}

impl DomainPort for MockIdentityStore {}

#[async_trait]
impl HealthCheckable for MockIdentityStore {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("mock-identity-store", 0)
    }
}

#[async_trait]
impl IdentityStore for MockIdentityStore {
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, PortError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(login) || u.username.eq_ignore_ascii_case(login))
            .cloned())
    }

    async fn email_taken(&self, email: &str) -> Result<bool, PortError> {
        let state = self.state.read().await;
        Ok(state.users.values().any(|u| u.email.eq_ignore_ascii_case(email)))
    }

    async fn username_taken(&self, username: &str) -> Result<bool, PortError> {
        let state = self.state.read().await;
        Ok(state.users.values().any(|u| u.username.eq_ignore_ascii_case(username)))
    }

    async fn create_user(&self, user: NewUser) -> Result<User, PortError> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| {
            u.email.eq_ignore_ascii_case(&user.email)
                || u.username.eq_ignore_ascii_case(&user.username)
        }) {
            return Err(PortError::conflict("User already exists"));
        }

        let roles = user
            .roles
            .iter()
            .filter(|name| state.roles.values().any(|r| &r.name == *name))
            .cloned()
            .collect();
        let stored = User {
            id: state.next_user_id(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            is_active: true,
            last_login_at: None,
            roles,
            created_at: Utc::now(),
        };
        state.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> Result<(), PortError> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| PortError::not_found("User", id))?;
        user.last_login_at = Some(at);
        Ok(())
    }

    async fn add_refresh_token(
        &self,
        user_id: UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, PortError> {
        let mut state = self.state.write().await;
        if state.tokens.values().any(|t| t.token == token) {
            return Err(PortError::conflict("Refresh token already exists"));
        }
        let id = RefreshTokenId::new(state.tokens.len() as i64 + 1);
        let stored = RefreshToken {
            id,
            user_id,
            token: token.to_string(),
            expires_at,
            revoked_at: None,
            created_at: Utc::now(),
        };
        state.tokens.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<(RefreshToken, User)>, PortError> {
        let state = self.state.read().await;
        Ok(state
            .tokens
            .values()
            .find(|t| t.token == token)
            .and_then(|t| state.users.get(&t.user_id).map(|u| (t.clone(), u.clone()))))
    }

    async fn revoke_refresh_token(
        &self,
        id: RefreshTokenId,
        at: DateTime<Utc>,
    ) -> Result<bool, PortError> {
        let mut state = self.state.write().await;
        match state.tokens.get_mut(&id).filter(|t| t.revoked_at.is_none()) {
            Some(token) => {
                token.revoked_at = Some(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ensure_roles(&self, roles: &[RoleSeed]) -> Result<usize, PortError> {
        let mut state = self.state.write().await;
        let mut created = 0;
        for seed in roles {
            if state.roles.values().any(|r| r.name == seed.name) {
                continue;
            }
            let id = RoleId::new(state.roles.len() as i64 + 1);
            state.roles.insert(
                id,
                Role {
                    id,
                    name: seed.name.to_string(),
                    description: Some(seed.description.to_string()),
                },
            );
            created += 1;
        }
        Ok(created)
    }

    async fn role_has_members(&self, role: &str) -> Result<bool, PortError> {
        let state = self.state.read().await;
        Ok(state.users.values().any(|u| u.roles.iter().any(|r| r == role)))
    }
}

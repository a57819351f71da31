//! Users, roles and refresh tokens

use chrono::{DateTime, Utc};
use core_kernel::{RefreshTokenId, RoleId, UserId};
use serde::{Deserialize, Serialize};

pub const ADMIN_ROLE: &str = "Admin";
pub const USER_ROLE: &str = "User";
pub const AGENT_ROLE: &str = "Agent";

/// A role created at startup when missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleSeed {
    pub name: &'static str,
    pub description: &'static str,
}

pub const DEFAULT_ROLES: [RoleSeed; 3] = [
    RoleSeed {
        name: ADMIN_ROLE,
        description: "Administrator with full access",
    },
    RoleSeed {
        name: USER_ROLE,
        description: "Standard user with basic access",
    },
    RoleSeed {
        name: AGENT_ROLE,
        description: "Real estate agent with property management access",
    },
];

/// A stored user with the names of its roles
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }
}

/// A user about to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    /// Role names to attach; unknown names are skipped
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub description: Option<String>,
}

/// A refresh token issued to a user
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshToken {
    pub id: RefreshTokenId,
    pub user_id: UserId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Neither revoked nor expired
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && !self.is_expired(now)
    }
}

/// User fields returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub roles: Vec<String>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            roles: user.roles.clone(),
        }
    }
}

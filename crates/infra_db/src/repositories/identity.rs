//! User, role and refresh token repository

use chrono::{DateTime, Utc};
use core_kernel::{RefreshTokenId, UserId};
use domain_identity::{NewUser, RefreshToken, RoleSeed, User};
use sqlx::PgPool;

use crate::error::DatabaseError;

/// Users joined with their role names
const USER_SELECT: &str = r#"
    SELECT u.id, u.username, u.email, u.password_hash, u.first_name, u.last_name,
           u.is_active, u.last_login_at, u.created_at,
           COALESCE(array_agg(r.name::TEXT ORDER BY r.name) FILTER (WHERE r.name IS NOT NULL),
                    '{}'::TEXT[]) AS roles
    FROM users u
    LEFT JOIN user_roles ur ON ur.user_id = u.id
    LEFT JOIN roles r ON r.id = ur.role_id
"#;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub roles: Vec<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId::new(row.id),
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            first_name: row.first_name,
            last_name: row.last_name,
            is_active: row.is_active,
            last_login_at: row.last_login_at,
            roles: row.roles,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshTokenRow {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<RefreshTokenRow> for RefreshToken {
    fn from(row: RefreshTokenRow) -> Self {
        RefreshToken {
            id: RefreshTokenId::new(row.id),
            user_id: UserId::new(row.user_id),
            token: row.token,
            expires_at: row.expires_at,
            revoked_at: row.revoked_at,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<UserRow>, DatabaseError> {
        let sql = format!("{USER_SELECT} WHERE u.id = $1 GROUP BY u.id");
        Ok(sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// A user whose email or username matches, ignoring case
    pub async fn find_by_login(&self, login: &str) -> Result<Option<UserRow>, DatabaseError> {
        let sql = format!(
            "{USER_SELECT} WHERE lower(u.email) = lower($1) OR lower(u.username) = lower($1) \
             GROUP BY u.id ORDER BY u.id LIMIT 1"
        );
        Ok(sqlx::query_as::<_, UserRow>(&sql)
            .bind(login)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, DatabaseError> {
        Ok(sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE lower(email) = lower($1))")
            .bind(email)
            .fetch_one(&self.pool)
            .await?)
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool, DatabaseError> {
        Ok(
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE lower(username) = lower($1))")
                .bind(username)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    /// Inserts the user and attaches the named roles that exist, atomically
    pub async fn insert(&self, user: &NewUser) -> Result<i64, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (username, email, password_hash, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO user_roles (user_id, role_id) SELECT $1, id FROM roles WHERE name = ANY($2)")
            .bind(id)
            .bind(&user.roles)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(id)
    }

    pub async fn record_login(&self, id: i64, at: DateTime<Utc>) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE users SET last_login_at = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("User", id));
        }
        Ok(())
    }

    pub async fn insert_refresh_token(
        &self,
        user_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshTokenRow, DatabaseError> {
        Ok(sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            INSERT INTO refresh_tokens (user_id, token, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, token, expires_at, revoked_at, created_at
            "#,
        )
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?)
    }

    pub async fn find_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenRow>, DatabaseError> {
        Ok(sqlx::query_as::<_, RefreshTokenRow>(
            "SELECT id, user_id, token, expires_at, revoked_at, created_at FROM refresh_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Returns false when the token was already revoked
    pub async fn revoke_refresh_token(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE refresh_tokens SET revoked_at = $2 WHERE id = $1 AND revoked_at IS NULL")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Inserts the roles that do not exist yet; returns how many were inserted
    pub async fn insert_missing_roles(&self, roles: &[RoleSeed]) -> Result<usize, DatabaseError> {
        let mut created = 0;
        for role in roles {
            let result = sqlx::query(
                "INSERT INTO roles (name, description) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING",
            )
            .bind(role.name)
            .bind(role.description)
            .execute(&self.pool)
            .await?;
            created += result.rows_affected() as usize;
        }
        Ok(created)
    }

    pub async fn role_has_members(&self, role: &str) -> Result<bool, DatabaseError> {
        Ok(sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM user_roles ur JOIN roles r ON r.id = ur.role_id WHERE r.name = $1
            )
            "#,
        )
        .bind(role)
        .fetch_one(&self.pool)
        .await?)
    }
}

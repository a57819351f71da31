//! Access and refresh token generation

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use rand::RngCore;

use crate::error::AuthError;
use crate::user::User;

/// Lifetime of a refresh token
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

const REFRESH_TOKEN_BYTES: usize = 64;

/// A signed access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs access tokens for authenticated users
pub trait AccessTokenIssuer: Send + Sync {
    fn issue(&self, user: &User) -> Result<AccessToken, AuthError>;
}

/// 64 random bytes, base64 encoded
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

//! Identity Domain
//!
//! Users, their roles and the refresh tokens that keep sessions alive.
//!
//! Passwords are stored as `base64(hash):base64(salt):iterations:SHA256`
//! (PBKDF2-HMAC-SHA256). Access tokens are produced by an
//! [`AccessTokenIssuer`] supplied by the interface layer, so this crate does
//! not depend on a JWT library.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_identity::{AuthService, LoginRequest};
//!
//! let service = AuthService::new(store, issuer);
//! let response = service.login(LoginRequest::new("admin", "secret")).await?;
//! ```

pub mod error;
pub mod password;
pub mod ports;
pub mod service;
pub mod tokens;
pub mod user;

pub use error::AuthError;
pub use password::PasswordHasher;
pub use ports::IdentityStore;
pub use service::{
    AuthResponse, AuthService, LoginRequest, RefreshRequest, RegisterRequest, SeedReport,
};
pub use tokens::{AccessToken, AccessTokenIssuer, REFRESH_TOKEN_TTL_DAYS};
pub use user::{NewUser, RefreshToken, Role, RoleSeed, User, UserView, DEFAULT_ROLES};

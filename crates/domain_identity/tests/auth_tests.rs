//! Authentication flows against the in-memory identity store

use std::sync::Arc;

use chrono::{Duration, Utc};

use domain_identity::ports::mock::MockIdentityStore;
use domain_identity::ports::IdentityStore;
use domain_identity::{
    AccessToken, AccessTokenIssuer, AuthError, AuthService, LoginRequest, PasswordHasher,
    RefreshRequest, RegisterRequest, User,
};
use test_utils::{assert_unauthorized, NewUserBuilder};

struct StubIssuer;

impl AccessTokenIssuer for StubIssuer {
    fn issue(&self, user: &User) -> Result<AccessToken, AuthError> {
        Ok(AccessToken {
            token: format!("access-{}-{}", user.id, user.roles.join(",")),
            expires_at: Utc::now() + Duration::hours(1),
        })
    }
}

async fn service() -> (MockIdentityStore, AuthService) {
    let store = MockIdentityStore::with_default_roles().await;
    let service = AuthService::new(Arc::new(store.clone()), Arc::new(StubIssuer));
    (store, service)
}

fn registration(username: &str, email: &str) -> RegisterRequest {
    RegisterRequest {
        username: username.to_string(),
        email: email.to_string(),
        password: "s3cret!".to_string(),
        first_name: "Ana".to_string(),
        last_name: "Gomez".to_string(),
    }
}

// ============================================================================
// Registration
// ============================================================================

mod registration {
    use super::*;

    #[tokio::test]
    async fn test_register_assigns_user_role_and_hashes_password() {
        let (store, service) = service().await;

        let response = service.register(registration("ana", "ana@example.com")).await.unwrap();

        assert_eq!(response.user.roles, vec!["User".to_string()]);
        assert_eq!(response.token, format!("access-{}-User", response.user.id));
        let stored = store.user(response.user.id).await.unwrap();
        assert_ne!(stored.password_hash, "s3cret!");
        assert!(PasswordHasher::verify("s3cret!", &stored.password_hash));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let (_, service) = service().await;
        service.register(registration("ana", "ana@example.com")).await.unwrap();

        let err = service
            .register(registration("other", "ANA@example.com"))
            .await
            .unwrap_err();

        assert_eq!(err.messages(), vec!["Email is already registered".to_string()]);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let (_, service) = service().await;
        service.register(registration("ana", "ana@example.com")).await.unwrap();

        let err = service
            .register(registration("ana", "second@example.com"))
            .await
            .unwrap_err();

        assert_eq!(err.messages(), vec!["Username is already taken".to_string()]);
    }

    #[tokio::test]
    async fn test_short_password_fails_validation() {
        let (_, service) = service().await;
        let mut request = registration("ana", "ana@example.com");
        request.password = "123".to_string();

        let err = service.register(request).await.unwrap_err();

        assert!(matches!(err, AuthError::Validation(_)));
    }
}

// ============================================================================
// Login
// ============================================================================

mod login {
    use super::*;

    #[tokio::test]
    async fn test_login_by_username_or_email() {
        let (store, service) = service().await;
        let registered = service.register(registration("ana", "ana@example.com")).await.unwrap();

        let by_name = service.login(LoginRequest::new("ana", "s3cret!")).await.unwrap();
        let by_email = service.login(LoginRequest::new("ana@example.com", "s3cret!")).await.unwrap();

        assert_eq!(by_name.user.id, registered.user.id);
        assert_eq!(by_email.user.id, registered.user.id);
        assert_ne!(by_name.refresh_token, by_email.refresh_token);
        assert!(store.user(registered.user.id).await.unwrap().last_login_at.is_some());
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_the_same() {
        let (_, service) = service().await;
        service.register(registration("ana", "ana@example.com")).await.unwrap();

        let wrong = service.login(LoginRequest::new("ana", "nope")).await.unwrap_err();
        let unknown = service.login(LoginRequest::new("ghost", "s3cret!")).await.unwrap_err();

        assert_unauthorized(&wrong, "Invalid credentials");
        assert_unauthorized(&unknown, "Invalid credentials");
    }

    #[tokio::test]
    async fn test_stored_user_signs_in_with_its_roles() {
        let (store, service) = service().await;
        let user = store
            .create_user(
                NewUserBuilder::new()
                    .with_username("agente")
                    .with_email("agente@example.com")
                    .with_password("clave123")
                    .with_roles(&["Agent", "User"])
                    .build(),
            )
            .await
            .unwrap();

        let response = service
            .login(LoginRequest::new("agente@example.com", "clave123"))
            .await
            .unwrap();

        assert_eq!(response.user.id, user.id);
        assert_eq!(response.user.roles, vec!["Agent".to_string(), "User".to_string()]);
        assert_eq!(response.token, format!("access-{}-Agent,User", user.id));
    }

    #[tokio::test]
    async fn test_deactivated_account_is_refused() {
        let (store, service) = service().await;
        let registered = service.register(registration("ana", "ana@example.com")).await.unwrap();
        store.set_active(registered.user.id, false).await;

        let err = service.login(LoginRequest::new("ana", "s3cret!")).await.unwrap_err();

        assert_unauthorized(&err, "Account is deactivated");
    }

    #[tokio::test]
    async fn test_refresh_token_expires_after_seven_days() {
        let (_, service) = service().await;

        let response = service.register(registration("ana", "ana@example.com")).await.unwrap();

        let remaining = response.expiration - Utc::now();
        assert!(remaining > Duration::days(6) && remaining <= Duration::days(7));
    }
}

// ============================================================================
// Refresh tokens
// ============================================================================

mod refresh_tokens {
    use super::*;

    fn exchange(refresh_token: &str) -> RefreshRequest {
        RefreshRequest {
            token: String::new(),
            refresh_token: refresh_token.to_string(),
        }
    }

    #[tokio::test]
    async fn test_refresh_rotates_the_token() {
        let (store, service) = service().await;
        let first = service.register(registration("ana", "ana@example.com")).await.unwrap();

        let second = service.refresh(exchange(&first.refresh_token)).await.unwrap();

        assert_ne!(second.refresh_token, first.refresh_token);
        let tokens = store.tokens_for(first.user.id).await;
        assert_eq!(tokens.len(), 2);
        assert!(tokens.iter().any(|t| t.token == first.refresh_token && t.revoked_at.is_some()));

        let reused = service.refresh(exchange(&first.refresh_token)).await.unwrap_err();
        assert_eq!(reused.to_string(), "Refresh token expired");
    }

    #[tokio::test]
    async fn test_unknown_refresh_token() {
        let (_, service) = service().await;

        let err = service.refresh(exchange("bogus")).await.unwrap_err();

        assert_unauthorized(&err, "Invalid refresh token");
    }

    #[tokio::test]
    async fn test_expired_refresh_token() {
        let (store, service) = service().await;
        let first = service.register(registration("ana", "ana@example.com")).await.unwrap();
        store.expire_token(&first.refresh_token, Utc::now() - Duration::minutes(1)).await;

        let err = service.refresh(exchange(&first.refresh_token)).await.unwrap_err();

        assert!(matches!(err, AuthError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_revoke_only_once() {
        let (_, service) = service().await;
        let first = service.register(registration("ana", "ana@example.com")).await.unwrap();

        assert!(service.revoke(&first.refresh_token).await.unwrap());
        assert!(!service.revoke(&first.refresh_token).await.unwrap());
        assert!(!service.revoke("bogus").await.unwrap());
    }
}

// ============================================================================
// Seeding
// ============================================================================

mod seeding {
    use super::*;

    #[tokio::test]
    async fn test_seed_creates_roles_and_admin_once() {
        let store = MockIdentityStore::new();
        let service = AuthService::new(Arc::new(store.clone()), Arc::new(StubIssuer));

        let first = service.seed("Admin123").await.unwrap();
        let second = service.seed("Admin123").await.unwrap();

        assert_eq!(first.roles_created, 3);
        assert!(first.admin_created);
        assert_eq!(second.roles_created, 0);
        assert!(!second.admin_created);
        assert_eq!(store.user_count().await, 1);

        let admin = service.login(LoginRequest::new("admin@properties.com", "Admin123")).await.unwrap();
        assert_eq!(admin.user.roles, vec!["Admin".to_string()]);
    }
}

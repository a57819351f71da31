//! HTTP routing, auth and error mapping against the in-memory stores

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use core_kernel::{OwnerId, PropertyId};
use domain_identity::ports::mock::MockIdentityStore;
use domain_identity::AuthService;
use domain_property::ports::mock::MockPropertyStore;
use domain_property::PropertyContext;
use infra_cache::{CacheSettings, MokaCacheStore};
use interface_api::auth::JwtIssuer;
use interface_api::{create_router, AppState};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use test_utils::{seeded_store, PNG_PIXEL};

struct TestApp {
    server: TestServer,
    store: MockPropertyStore,
    token: String,
}

async fn app() -> TestApp {
    let store = seeded_store().await;
    let cache = Arc::new(MokaCacheStore::new(
        CacheSettings::default().health_probe_ttl(Duration::from_millis(20)),
    ));
    let context = PropertyContext::in_memory(store.clone(), cache.clone());

    let jwt = Arc::new(JwtIssuer::new(
        "test-secret-test-secret-test-secret",
        "properties-api",
        "properties-clients",
        chrono::Duration::minutes(5),
    ));
    let identity = Arc::new(MockIdentityStore::with_default_roles().await);
    let auth = AuthService::new(identity, jwt.clone());

    let server = TestServer::new(create_router(AppState::new(&context, auth, jwt, cache))).unwrap();

    let registered = server
        .post("/api/auth/register")
        .json(&json!({
            "username": "maria",
            "email": "maria@example.com",
            "password": "secret123",
            "first_name": "Maria",
            "last_name": "Lopez"
        }))
        .await;
    registered.assert_status_ok();
    let token = registered.json::<Value>()["token"].as_str().unwrap().to_string();

    TestApp { server, store, token }
}

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).unwrap(),
        other => Decimal::from_str(&other.to_string()).unwrap(),
    }
}

// ============================================================================
// Health and authentication
// ============================================================================

mod auth {
    use super::*;

    #[tokio::test]
    async fn test_health_routes_are_public() {
        let app = app().await;

        app.server.get("/health").await.assert_status_ok();
        let database = app.server.get("/api/health/database").await;
        database.assert_status_ok();
        assert_eq!(database.json::<Value>()["status"], "healthy");

        app.server.get("/api/health/cache").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let app = app().await;

        let response = app.server.get("/api/owners").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body = response.json::<Value>();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Authentication required");

        app.server
            .get("/api/owners")
            .authorization_bearer("not-a-jwt")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_with_username_or_email() {
        let app = app().await;

        for login in ["maria", "MARIA@example.com"] {
            let response = app
                .server
                .post("/api/auth/login")
                .json(&json!({ "email_or_username": login, "password": "secret123" }))
                .await;
            response.assert_status_ok();
            let body = response.json::<Value>();
            assert_eq!(body["user"]["username"], "maria");
            assert_eq!(body["user"]["roles"], json!(["User"]));
        }
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let app = app().await;

        let response = app
            .server
            .post("/api/auth/login")
            .json(&json!({ "email_or_username": "maria", "password": "wrong-one" }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["message"], "Invalid credentials");
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_bad_request() {
        let app = app().await;

        let response = app
            .server
            .post("/api/auth/register")
            .json(&json!({
                "username": "otra",
                "email": "maria@example.com",
                "password": "secret123",
                "first_name": "Otra",
                "last_name": "Persona"
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["errors"], json!(["Email is already registered"]));
    }

    #[tokio::test]
    async fn test_refresh_then_revoke() {
        let app = app().await;

        let login = app
            .server
            .post("/api/auth/login")
            .json(&json!({ "email_or_username": "maria", "password": "secret123" }))
            .await
            .json::<Value>();
        let refresh_token = login["refresh_token"].as_str().unwrap().to_string();

        let refreshed = app
            .server
            .post("/api/auth/refresh-token")
            .json(&json!({ "token": login["token"], "refresh_token": refresh_token }))
            .await;
        refreshed.assert_status_ok();
        let new_refresh = refreshed.json::<Value>()["refresh_token"].as_str().unwrap().to_string();
        assert_ne!(new_refresh, refresh_token);

        app.server
            .post("/api/auth/refresh-token")
            .json(&json!({ "refresh_token": refresh_token }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        app.server
            .post("/api/auth/revoke-token")
            .authorization_bearer(&app.token)
            .json(&json!({ "refresh_token": new_refresh }))
            .await
            .assert_status_ok();

        let again = app
            .server
            .post("/api/auth/revoke-token")
            .authorization_bearer(&app.token)
            .json(&json!({ "refresh_token": new_refresh }))
            .await;
        again.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(again.json::<Value>()["message"], "Invalid token");
    }
}

// ============================================================================
// Owners
// ============================================================================

mod owners {
    use super::*;

    #[tokio::test]
    async fn test_list_and_get_owner() {
        let app = app().await;

        let list = app.server.get("/api/owners").authorization_bearer(&app.token).await;
        list.assert_status_ok();
        let body = list.json::<Value>();
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Owners retrieved successfully");
        assert_eq!(body["data"].as_array().unwrap().len(), 2);

        let owner = app.server.get("/api/owners/1").authorization_bearer(&app.token).await;
        owner.assert_status_ok();
        let data = &owner.json::<Value>()["data"];
        assert_eq!(data["name"], "Ana Gomez");
        assert_eq!(data["properties"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_owner_is_not_found() {
        let app = app().await;

        let response = app.server.get("/api/owners/999").authorization_bearer(&app.token).await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["success"], false);
    }

    #[tokio::test]
    async fn test_create_owner_and_conflict() {
        let app = app().await;

        let created = app
            .server
            .post("/api/owners")
            .authorization_bearer(&app.token)
            .json(&json!({ "name": "Marta Ruiz", "address": "Calle 5", "birthday": "1990-01-01" }))
            .await;
        created.assert_status(StatusCode::CREATED);
        assert_eq!(created.json::<Value>()["data"]["id"], 3);

        let conflict = app
            .server
            .post("/api/owners")
            .authorization_bearer(&app.token)
            .json(&json!({ "id_owner": 1, "name": "Otra", "birthday": "1990-01-01" }))
            .await;
        conflict.assert_status(StatusCode::CONFLICT);
        assert_eq!(conflict.json::<Value>()["message"], "Owner with ID 1 already exists");
    }

    #[tokio::test]
    async fn test_photo_upload() {
        let app = app().await;

        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(PNG_PIXEL.to_vec()).file_name("me.png").mime_type("image/png"),
        );
        app.server
            .post("/api/owners/2/photo")
            .authorization_bearer(&app.token)
            .multipart(form)
            .await
            .assert_status_ok();

        let owner = app.store.owner(OwnerId::new(2)).await.unwrap();
        assert!(owner.photo.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_photo_must_be_an_image() {
        let app = app().await;

        let form = MultipartForm::new().add_part(
            "file",
            Part::text("hello").file_name("notes.txt").mime_type("text/plain"),
        );
        let response = app
            .server
            .post("/api/owners/2/photo")
            .authorization_bearer(&app.token)
            .multipart(form)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["message"], "The file must be an image");
    }
}

// ============================================================================
// Properties
// ============================================================================

mod properties {
    use super::*;

    #[tokio::test]
    async fn test_list_with_filter_and_paging() {
        let app = app().await;

        let response = app
            .server
            .get("/api/properties")
            .authorization_bearer(&app.token)
            .add_query_param("min_price", "300000")
            .add_query_param("page_size", "1")
            .await;
        response.assert_status_ok();
        let page = &response.json::<Value>()["data"];
        assert_eq!(page["total_count"], 2);
        assert_eq!(page["total_pages"], 2);
        assert_eq!(page["page_number"], 1);
        assert_eq!(page["properties"][0]["name"], "Apartamento Centro");
    }

    #[tokio::test]
    async fn test_inverted_price_range_is_bad_request() {
        let app = app().await;

        let response = app
            .server
            .get("/api/properties")
            .authorization_bearer(&app.token)
            .add_query_param("min_price", "500")
            .add_query_param("max_price", "100")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>()["errors"],
            json!(["Minimum price cannot be greater than maximum price"])
        );
    }

    #[tokio::test]
    async fn test_create_update_and_read_property() {
        let app = app().await;

        let created = app
            .server
            .post("/api/properties")
            .authorization_bearer(&app.token)
            .json(&json!({
                "name": "Casa Roja",
                "address": "Calle 1",
                "price": "120000",
                "code_internal": "CR-010",
                "year": 2005,
                "id_owner": 2
            }))
            .await;
        created.assert_status(StatusCode::CREATED);
        let id = created.json::<Value>()["data"]["id"].as_i64().unwrap();

        let updated = app
            .server
            .put(&format!("/api/properties/{id}"))
            .authorization_bearer(&app.token)
            .json(&json!({ "price": "130000" }))
            .await;
        updated.assert_status_ok();
        let update = &updated.json::<Value>()["data"];
        assert_eq!(update["price_changed"], true);
        assert_eq!(decimal(&update["old_price"]), dec!(120000));

        let details = app
            .server
            .get(&format!("/api/properties/{id}"))
            .authorization_bearer(&app.token)
            .await;
        details.assert_status_ok();
        let data = &details.json::<Value>()["data"];
        assert_eq!(decimal(&data["price"]), dec!(130000));
        assert_eq!(data["traces"].as_array().unwrap().len(), 2);
        assert_eq!(data["owner"]["id"], 2);
    }

    #[tokio::test]
    async fn test_duplicate_code_is_conflict() {
        let app = app().await;

        let response = app
            .server
            .post("/api/properties")
            .authorization_bearer(&app.token)
            .json(&json!({
                "name": "Copia",
                "address": "Calle 2",
                "price": "1000",
                "code_internal": "CA-001",
                "year": 2005,
                "id_owner": 1
            }))
            .await;
        response.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_sell_property() {
        let app = app().await;

        let response = app
            .server
            .post("/api/properties/1/sell")
            .authorization_bearer(&app.token)
            .json(&json!({ "new_owner_id": 2, "sale_price": "250000", "tax_percentage": "10" }))
            .await;
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["message"], "Property sold successfully");
        assert_eq!(decimal(&body["data"]["tax"]), dec!(25000));

        let property = app.store.property(PropertyId::new(1)).await.unwrap();
        assert_eq!(property.owner_id, OwnerId::new(2));
    }

    #[tokio::test]
    async fn test_sell_missing_property_is_not_found() {
        let app = app().await;

        app.server
            .post("/api/properties/999/sell")
            .authorization_bearer(&app.token)
            .json(&json!({ "new_owner_id": 2, "sale_price": "250000", "tax_percentage": "10" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_image_upload_read_and_delete() {
        let app = app().await;

        let form = MultipartForm::new()
            .add_part("images", Part::bytes(PNG_PIXEL.to_vec()).file_name("front.png").mime_type("image/png"))
            .add_part("images", Part::bytes(PNG_PIXEL.to_vec()).file_name("back.png").mime_type("image/png"));
        let uploaded = app
            .server
            .post("/api/properties/3/images")
            .authorization_bearer(&app.token)
            .multipart(form)
            .await;
        uploaded.assert_status_ok();
        let body = uploaded.json::<Value>();
        assert_eq!(body["message"], "Successfully uploaded 2 of 2 images");
        let image_id = body["data"]["image_ids"][0].as_i64().unwrap();

        let image = app
            .server
            .get(&format!("/api/properties/images/{image_id}"))
            .authorization_bearer(&app.token)
            .await;
        image.assert_status_ok();
        let data = &image.json::<Value>()["data"];
        assert_eq!(data["property_id"], 3);
        assert!(data["file"].as_str().unwrap().starts_with("data:image/png;base64,"));

        app.server
            .delete(&format!("/api/properties/images/{image_id}"))
            .authorization_bearer(&app.token)
            .await
            .assert_status_ok();

        app.server
            .get(&format!("/api/properties/images/{image_id}"))
            .authorization_bearer(&app.token)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_rejects_non_images() {
        let app = app().await;

        let form = MultipartForm::new()
            .add_part("images", Part::text("plain").file_name("notes.txt").mime_type("text/plain"));
        app.server
            .post("/api/properties/3/images")
            .authorization_bearer(&app.token)
            .multipart(form)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}

//! HTTP API Layer
//!
//! This crate provides the REST API for the real-estate backend using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Thin adapters that turn HTTP input into dispatcher
//!   requests or auth service calls
//! - **Middleware**: Bearer authentication and audit logging
//! - **DTOs**: Request bodies and query strings that differ from the domain requests
//! - **Error Handling**: Every domain route answers with the same envelope
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(AppState::new(&context, auth, jwt, cache_health));
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use core_kernel::HealthCheckable;
use domain_identity::AuthService;
use domain_property::{Dispatcher, PropertyContext, TransactionManager};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::auth::JwtIssuer;
use crate::handlers::{auth as auth_handlers, health, owners, properties};
use crate::middleware::{audit_middleware, auth_middleware};

/// Largest accepted request body; uploads carry several images at once
const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub auth: Arc<AuthService>,
    pub jwt: Arc<JwtIssuer>,
    /// Probed by the database health route
    pub database: Arc<dyn TransactionManager>,
    /// Probed by the cache health route
    pub cache: Arc<dyn HealthCheckable>,
}

impl AppState {
    pub fn new(
        context: &PropertyContext,
        auth: AuthService,
        jwt: Arc<JwtIssuer>,
        cache: Arc<dyn HealthCheckable>,
    ) -> Self {
        Self {
            dispatcher: Arc::new(context.dispatcher()),
            auth: Arc::new(auth),
            jwt,
            database: context.transactions.clone(),
            cache,
        }
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/api/health/database", get(health::database_check))
        .route("/api/health/cache", get(health::cache_check))
        .route("/api/auth/login", post(auth_handlers::login))
        .route("/api/auth/register", post(auth_handlers::register))
        .route("/api/auth/refresh-token", post(auth_handlers::refresh_token));

    let owner_routes = Router::new()
        .route("/", get(owners::list_owners).post(owners::create_owner))
        .route("/:id", get(owners::get_owner))
        .route("/:id/photo", post(owners::update_photo));

    let property_routes = Router::new()
        .route("/", get(properties::list_properties).post(properties::create_property))
        .route("/:id", get(properties::get_property).put(properties::update_property))
        .route("/:id/images", post(properties::upload_images))
        .route("/:id/sell", post(properties::sell_property))
        .route(
            "/images/:image_id",
            get(properties::get_image).delete(properties::delete_image),
        );

    // Protected API routes
    let api_routes = Router::new()
        .route("/auth/revoke-token", post(auth_handlers::revoke_token))
        .nest("/owners", owner_routes)
        .nest("/properties", property_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

//! Real-Estate API - Server Binary
//!
//! Starts the HTTP API server for the real-estate backend.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin real-estate-api
//!
//! # Run with environment variables
//! API_PORT=8080 API_DATABASE_URL=postgres://... cargo run --bin real-estate-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST`, `API_PORT` - Bind address (default: 0.0.0.0:8080)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_LOG_LEVEL` - Log level when `RUST_LOG` is unset (default: info)
//! * `API_JWT_SECRET`, `API_JWT_ISSUER`, `API_JWT_AUDIENCE` - Token signing and validation
//! * `API_JWT_EXPIRATION_MINUTES` - Access token lifetime (default: 60)
//! * `API_CACHE__MAX_CAPACITY` - Maximum cached read models (default: 10000)
//! * `API_ADMIN_PASSWORD` - Password of the seeded `admin` user

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use domain_identity::AuthService;
use domain_property::{CachePolicies, PropertyContext};
use infra_cache::MokaCacheStore;
use infra_db::{
    create_pool, run_migrations, DatabaseConfig, PostgresIdentityAdapter, PostgresPropertyAdapter,
};
use interface_api::auth::JwtIssuer;
use interface_api::{config::ApiConfig, create_router, AppState};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("Invalid API configuration")?;
    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting Real-Estate API Server"
    );

    config.cache.validate().context("Invalid cache configuration")?;

    let pool = create_pool(DatabaseConfig::new(&config.database_url))
        .await
        .context("Failed to connect to database")?;
    run_migrations(&pool).await.context("Failed to apply migrations")?;

    let cache = Arc::new(MokaCacheStore::new(config.cache.clone()));
    let property_store = Arc::new(PostgresPropertyAdapter::new(pool.clone()));
    let context = PropertyContext::new(
        property_store.clone(),
        property_store.clone(),
        property_store.clone(),
        property_store,
        cache.clone(),
    )
    .with_policies(CachePolicies::with_default(config.cache.default_policy()));

    let jwt = Arc::new(JwtIssuer::from_config(&config));
    let auth = AuthService::new(Arc::new(PostgresIdentityAdapter::new(pool)), jwt.clone());
    let seeded = auth
        .seed(&config.admin_password)
        .await
        .context("Failed to seed roles and the admin user")?;
    tracing::info!(
        roles_created = seeded.roles_created,
        admin_created = seeded.admin_created,
        "Identity data seeded"
    );

    let app = create_router(AppState::new(&context, auth, jwt, cache));

    let addr: SocketAddr = config.server_addr().parse().context("Invalid server address")?;
    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber; `RUST_LOG` wins over the configured level
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

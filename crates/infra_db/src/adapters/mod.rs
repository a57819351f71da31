//! Domain Adapters
//!
//! Implementations of the domain ports on PostgreSQL. Each adapter:
//! - implements the domain's port traits
//! - assembles read models from the repository rows
//! - translates `DatabaseError` into `PortError`
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_property::PropertyRepository;
//! use infra_db::adapters::PostgresPropertyAdapter;
//!
//! let adapter = Arc::new(PostgresPropertyAdapter::new(pool));
//! let details = adapter.find_details(property_id).await?;
//! ```

pub mod identity;
pub mod property;
pub mod unit_of_work;

pub use identity::PostgresIdentityAdapter;
pub use property::PostgresPropertyAdapter;
pub use unit_of_work::PgUnitOfWork;

use std::time::Instant;

use core_kernel::HealthCheckResult;
use sqlx::PgPool;

/// Runs `SELECT 1` and reports the latency
pub(crate) async fn ping(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = Instant::now();
    let result = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HealthCheckResult::healthy(adapter_id, latency_ms),
        Err(e) => HealthCheckResult::unhealthy(adapter_id, latency_ms, format!("Database error: {}", e)),
    }
}

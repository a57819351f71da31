//! Infrastructure Database Layer
//!
//! PostgreSQL implementations of the property and identity ports, built on
//! SQLx.
//!
//! # Architecture
//!
//! - **repositories**: SQL and row types, one module per table group. They
//!   return [`DatabaseError`] and know nothing about the ports.
//! - **adapters**: implement the domain ports on top of the repositories and
//!   translate errors into `PortError`.
//!
//! Multi-row workflows run in a [`PgUnitOfWork`], which wraps one database
//! transaction and locks the property rows it reads (`FOR UPDATE`).
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresPropertyAdapter};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/properties")).await?;
//! run_migrations(&pool).await?;
//! let adapter = PostgresPropertyAdapter::new(pool);
//! ```

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use adapters::{PgUnitOfWork, PostgresIdentityAdapter, PostgresPropertyAdapter};
pub use error::DatabaseError;
pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool};

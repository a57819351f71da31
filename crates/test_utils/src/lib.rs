//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! real-estate test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built owners, properties, uploads and a seeded in-memory store
//! - `builders`: Builder patterns for entities and requests
//! - `database`: PostgreSQL test containers with the schema migrated
//! - `assertions`: Assertion helpers for domain errors and prices
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;

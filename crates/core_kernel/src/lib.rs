//! Core Kernel - Foundational types shared by every real-estate crate
//!
//! This crate provides the building blocks used across the domain, infrastructure
//! and interface layers:
//! - Strongly-typed integer identifiers
//! - Price and percentage helpers with precise decimal arithmetic
//! - Port error types and health-check contracts (hexagonal architecture)
//! - The process-local cache contract with sliding/absolute expiration
//! - Retry policy for transient failures

pub mod money;
pub mod identifiers;
pub mod error;
pub mod ports;
pub mod cache;
pub mod retry;

pub use money::{MoneyError, Percentage, round_money, ensure_positive};
pub use identifiers::{
    OwnerId, PropertyId, PropertyImageId, PropertyTraceId,
    UserId, RoleId, RefreshTokenId,
};
pub use error::CoreError;
pub use ports::{
    PortError, DomainPort, AdapterHealth, HealthCheckable, HealthCheckResult,
};
pub use cache::{CacheError, CacheStore, CacheStoreExt, ExpirationPolicy};
pub use retry::RetryPolicy;

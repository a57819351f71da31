//! Cache Infrastructure
//!
//! Implements the `core_kernel::cache::CacheStore` contract on top of
//! [moka](https://docs.rs/moka). Each entry carries its own expiration
//! policy: a sliding window renewed by reads, capped by an absolute ceiling
//! measured from the write.
//!
//! # Example
//!
//! ```rust,ignore
//! use core_kernel::{CacheStoreExt, ExpirationPolicy};
//! use infra_cache::{CacheSettings, MokaCacheStore};
//!
//! let cache = MokaCacheStore::new(CacheSettings::default());
//! cache.set_json("Owner_1", &owner, ExpirationPolicy::entity()).await?;
//! let cached: Option<Owner> = cache.get_json("Owner_1").await?;
//! ```

pub mod config;
pub mod moka_store;

pub use config::CacheSettings;
pub use moka_store::{MokaCacheStore, CacheStats};

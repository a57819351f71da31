//! Process-local cache contract
//!
//! Read models are cached as serialized JSON under string keys. Each entry
//! carries an [`ExpirationPolicy`] combining a sliding window, which is
//! renewed on every read, with an absolute ceiling measured from the write.
//! An entry expires at whichever deadline comes first.
//!
//! Implementations live in `infra_cache`; the domain only depends on the
//! [`CacheStore`] trait and the typed helpers in [`CacheStoreExt`].

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors raised by cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache backend error: {0}")]
    Backend(String),
}

/// Sliding expiration capped by an absolute expiration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpirationPolicy {
    /// Idle window, renewed on each read
    pub sliding: Option<Duration>,
    /// Hard ceiling measured from the time the entry was written
    pub absolute: Option<Duration>,
}

impl ExpirationPolicy {
    /// Creates a policy with both windows
    pub const fn new(sliding: Duration, absolute: Duration) -> Self {
        Self {
            sliding: Some(sliding),
            absolute: Some(absolute),
        }
    }

    /// A policy that only enforces the absolute ceiling
    pub const fn absolute_only(absolute: Duration) -> Self {
        Self {
            sliding: None,
            absolute: Some(absolute),
        }
    }

    /// Policy for single entities (owner/property by id): 15 min sliding, 2 h absolute
    pub const fn entity() -> Self {
        Self::new(Duration::from_secs(15 * 60), Duration::from_secs(2 * 60 * 60))
    }

    /// Policy for list results: 5 min sliding, 1 h absolute
    pub const fn list() -> Self {
        Self::new(Duration::from_secs(5 * 60), Duration::from_secs(60 * 60))
    }

    /// Time to live granted when the entry is written
    pub fn ttl_on_write(&self) -> Option<Duration> {
        match (self.sliding, self.absolute) {
            (Some(sliding), Some(absolute)) => Some(sliding.min(absolute)),
            (sliding, absolute) => sliding.or(absolute),
        }
    }

    /// Time to live granted by a read that happens `elapsed` after the write
    pub fn ttl_on_read(&self, elapsed: Duration) -> Option<Duration> {
        let remaining = self.absolute.map(|absolute| absolute.saturating_sub(elapsed));
        match (self.sliding, remaining) {
            (Some(sliding), Some(remaining)) => Some(sliding.min(remaining)),
            (Some(sliding), None) => Some(sliding),
            (None, remaining) => remaining,
        }
    }
}

impl Default for ExpirationPolicy {
    /// 10 min sliding, 1 h absolute
    fn default() -> Self {
        Self::new(Duration::from_secs(10 * 60), Duration::from_secs(60 * 60))
    }
}

/// Byte-level cache contract
///
/// Individual key operations are atomic; sequences of operations are not.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Reads an entry, renewing its sliding window
    async fn get_raw(&self, key: &str) -> Option<Vec<u8>>;

    /// Writes an entry, replacing any previous value and policy
    async fn set_raw(&self, key: &str, value: Vec<u8>, policy: ExpirationPolicy);

    /// Removes a single entry
    async fn remove(&self, key: &str);

    /// Removes every entry whose key starts with `prefix`, ignoring ASCII case
    async fn remove_by_prefix(&self, prefix: &str) -> Result<(), CacheError>;
}

/// Typed JSON helpers on top of [`CacheStore`]
#[async_trait]
pub trait CacheStoreExt: CacheStore {
    /// Reads and deserializes an entry
    async fn get_json<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned + Send,
    {
        match self.get_raw(key).await {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Serializes and writes an entry
    async fn set_json<T>(
        &self,
        key: &str,
        value: &T,
        policy: ExpirationPolicy,
    ) -> Result<(), CacheError>
    where
        T: Serialize + Sync,
    {
        let bytes = serde_json::to_vec(value)?;
        self.set_raw(key, bytes, policy).await;
        Ok(())
    }
}

impl<S: CacheStore + ?Sized> CacheStoreExt for S {}

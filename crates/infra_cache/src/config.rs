//! Cache configuration

use std::time::Duration;

use core_kernel::{CoreError, ExpirationPolicy};
use serde::Deserialize;

/// Settings for the in-process cache
///
/// Loaded as part of the API configuration (`API_CACHE__MAX_CAPACITY`, ...).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Maximum number of entries before least-recently-used eviction
    pub max_capacity: u64,
    /// Sliding window for entries written with the default policy
    pub default_sliding_secs: u64,
    /// Absolute ceiling for entries written with the default policy
    pub default_absolute_secs: u64,
    /// Lifetime of the probe entry written by the health check
    pub health_probe_ttl_ms: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            default_sliding_secs: 10 * 60,
            default_absolute_secs: 60 * 60,
            health_probe_ttl_ms: 1_000,
        }
    }
}

impl CacheSettings {
    /// Sets the maximum number of entries
    pub fn max_capacity(mut self, max: u64) -> Self {
        self.max_capacity = max;
        self
    }

    /// Sets the probe lifetime used by the health check
    pub fn health_probe_ttl(mut self, ttl: Duration) -> Self {
        self.health_probe_ttl_ms = ttl.as_millis() as u64;
        self
    }

    /// Policy applied by callers that do not pick one explicitly
    pub fn default_policy(&self) -> ExpirationPolicy {
        ExpirationPolicy::new(
            Duration::from_secs(self.default_sliding_secs),
            Duration::from_secs(self.default_absolute_secs),
        )
    }

    /// Rejects settings the store cannot honour
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.max_capacity == 0 {
            return Err(CoreError::configuration("cache max_capacity must be greater than 0"));
        }
        if self.default_sliding_secs > self.default_absolute_secs {
            return Err(CoreError::configuration(
                "cache sliding expiration cannot exceed the absolute expiration",
            ));
        }
        if self.health_probe_ttl_ms == 0 {
            return Err(CoreError::configuration("cache health probe ttl must be greater than 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_the_default_policy() {
        let settings = CacheSettings::default();
        assert_eq!(settings.default_policy(), ExpirationPolicy::default());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_sliding_longer_than_absolute_is_rejected() {
        let settings = CacheSettings {
            default_sliding_secs: 7200,
            ..CacheSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}

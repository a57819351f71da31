//! Cache keys, policies and tag based invalidation
//!
//! Queries cache their read models under the keys built here. Commands do
//! not remove keys directly: they name the [`CacheTag`]s their write
//! touched and [`invalidate`] expands each tag into key or prefix removals.

use std::fmt::Write as _;
use std::future::Future;

use core_kernel::{CacheStore, CacheStoreExt, ExpirationPolicy, OwnerId, PropertyId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::PropertyError;
use crate::ports::PropertyFilter;

/// Key of the owner listing
pub const ALL_OWNERS_KEY: &str = "AllOwners";

/// Prefix shared by every cached property listing page
pub const PROPERTY_LIST_PREFIX: &str = "PropertiesList_";

/// Key of a single owner
pub fn owner_key(id: OwnerId) -> String {
    format!("Owner_{}", id)
}

/// Key of a single property
pub fn property_key(id: PropertyId) -> String {
    format!("Property_{}", id)
}

/// Key of one page of the property listing
///
/// Paging is always part of the key; filters add one segment each.
pub fn property_list_key(filter: &PropertyFilter) -> String {
    let mut key = format!(
        "{}Page_{}_Size_{}",
        PROPERTY_LIST_PREFIX, filter.page_number, filter.page_size
    );
    if let Some(name) = &filter.name {
        let _ = write!(key, "_Name_{}", name.trim());
    }
    if let Some(min) = filter.min_price {
        let _ = write!(key, "_MinPrice_{}", min);
    }
    if let Some(max) = filter.max_price {
        let _ = write!(key, "_MaxPrice_{}", max);
    }
    if let Some(year) = filter.year {
        let _ = write!(key, "_Year_{}", year);
    }
    if let Some(owner) = filter.owner_id {
        let _ = write!(key, "_Owner_{}", owner);
    }
    key
}

/// A group of cached entries affected by a write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheTag {
    Owner(OwnerId),
    Property(PropertyId),
    OwnerList,
    PropertyList,
}

impl CacheTag {
    async fn evict(&self, cache: &dyn CacheStore) {
        match self {
            CacheTag::Owner(id) => cache.remove(&owner_key(*id)).await,
            CacheTag::Property(id) => cache.remove(&property_key(*id)).await,
            CacheTag::OwnerList => cache.remove(ALL_OWNERS_KEY).await,
            CacheTag::PropertyList => {
                if let Err(e) = cache.remove_by_prefix(PROPERTY_LIST_PREFIX).await {
                    warn!(error = %e, "Failed to invalidate property listings");
                }
            }
        }
    }
}

/// Removes every entry covered by the tags
///
/// Runs after the write committed. Failures are logged and never returned;
/// the removals are independent, so a reader may briefly see a mix of old
/// and new entries.
pub async fn invalidate(cache: &dyn CacheStore, tags: &[CacheTag]) {
    let mut seen = Vec::with_capacity(tags.len());
    for tag in tags {
        if seen.contains(tag) {
            continue;
        }
        seen.push(*tag);
        tag.evict(cache).await;
    }
    debug!(?seen, "Cache invalidated");
}

/// Expiration policies per kind of read model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicies {
    /// Owner listing and anything without a dedicated policy
    pub default: ExpirationPolicy,
    /// Single owner or property
    pub entity: ExpirationPolicy,
    /// Property listing pages
    pub list: ExpirationPolicy,
}

impl CachePolicies {
    /// Uses `default` for general entries and the standard entity/list windows
    pub fn with_default(default: ExpirationPolicy) -> Self {
        Self {
            default,
            entity: ExpirationPolicy::entity(),
            list: ExpirationPolicy::list(),
        }
    }
}

impl Default for CachePolicies {
    fn default() -> Self {
        Self::with_default(ExpirationPolicy::default())
    }
}

/// Returns the cached value under `key`, or loads and caches it
///
/// Cache faults degrade to a load. Errors from `load` are returned and
/// nothing is cached.
pub async fn read_through<T, F, Fut>(
    cache: &dyn CacheStore,
    key: &str,
    policy: ExpirationPolicy,
    load: F,
) -> Result<T, PropertyError>
where
    T: Serialize + DeserializeOwned + Send + Sync,
    F: FnOnce() -> Fut + Send,
    Fut: Future<Output = Result<T, PropertyError>> + Send,
{
    match cache.get_json::<T>(key).await {
        Ok(Some(value)) => {
            debug!(key, "Served from cache");
            return Ok(value);
        }
        Ok(None) => {}
        Err(e) => warn!(key, error = %e, "Discarding unreadable cache entry"),
    }

    let value = load().await?;
    if let Err(e) = cache.set_json(key, &value, policy).await {
        warn!(key, error = %e, "Failed to cache value");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_entity_keys() {
        assert_eq!(owner_key(OwnerId::new(5)), "Owner_5");
        assert_eq!(property_key(PropertyId::new(9)), "Property_9");
    }

    #[test]
    fn test_unfiltered_list_key_includes_paging() {
        let key = property_list_key(&PropertyFilter::page(2, 20));
        assert_eq!(key, "PropertiesList_Page_2_Size_20");
    }

    #[test]
    fn test_filtered_list_key_appends_segments_in_order() {
        let filter = PropertyFilter {
            name: Some("Lago".to_string()),
            min_price: Some(dec!(100)),
            max_price: Some(dec!(900)),
            year: Some(2001),
            owner_id: Some(OwnerId::new(3)),
            ..PropertyFilter::page(1, 10)
        };
        assert_eq!(
            property_list_key(&filter),
            "PropertiesList_Page_1_Size_10_Name_Lago_MinPrice_100_MaxPrice_900_Year_2001_Owner_3"
        );
    }
}

//! Behavioural tests for the moka cache store
//!
//! Timings are kept short with generous margins so the tests stay stable on
//! loaded machines.

use std::time::Duration;

use core_kernel::{AdapterHealth, CacheStore, CacheStoreExt, ExpirationPolicy, HealthCheckable};
use infra_cache::{CacheSettings, MokaCacheStore};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct OwnerView {
    id: i64,
    name: String,
}

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

// ============================================================================
// Expiration
// ============================================================================

mod expiration {
    use super::*;

    #[tokio::test]
    async fn test_sliding_window_is_renewed_by_reads() {
        let store = MokaCacheStore::default();
        let policy = ExpirationPolicy::new(ms(300), Duration::from_secs(10));
        store.set_raw("Owner_1", vec![1], policy).await;

        sleep(ms(200)).await;
        assert!(store.get_raw("Owner_1").await.is_some());
        sleep(ms(200)).await;
        assert!(store.get_raw("Owner_1").await.is_some(), "read should have renewed the window");

        sleep(ms(450)).await;
        assert!(store.get_raw("Owner_1").await.is_none());
    }

    #[tokio::test]
    async fn test_absolute_ceiling_wins_over_frequent_reads() {
        let store = MokaCacheStore::default();
        let policy = ExpirationPolicy::new(ms(300), ms(700));
        store.set_raw("Property_9", vec![9], policy).await;

        for _ in 0..3 {
            sleep(ms(200)).await;
            assert!(store.get_raw("Property_9").await.is_some());
        }

        sleep(ms(250)).await;
        assert!(store.get_raw("Property_9").await.is_none());
    }

    #[tokio::test]
    async fn test_rewrite_resets_the_entry_age() {
        let store = MokaCacheStore::default();
        let policy = ExpirationPolicy::absolute_only(ms(400));
        store.set_raw("AllOwners", vec![1], policy).await;

        sleep(ms(250)).await;
        store.set_raw("AllOwners", vec![2], policy).await;
        sleep(ms(250)).await;

        assert_eq!(store.get_raw("AllOwners").await, Some(vec![2]));
    }
}

// ============================================================================
// Removal
// ============================================================================

mod removal {
    use super::*;

    #[tokio::test]
    async fn test_remove_by_prefix_ignores_case() {
        let store = MokaCacheStore::default();
        let policy = ExpirationPolicy::list();
        store.set_raw("PropertiesList_Page_1_Size_10", vec![1], policy).await;
        store.set_raw("propertieslist_Page_2_Size_10", vec![2], policy).await;
        store.set_raw("Property_1", vec![3], policy).await;

        store.remove_by_prefix("PropertiesList_").await.unwrap();

        assert!(store.get_raw("PropertiesList_Page_1_Size_10").await.is_none());
        assert!(store.get_raw("propertieslist_Page_2_Size_10").await.is_none());
        assert_eq!(store.get_raw("Property_1").await, Some(vec![3]));
    }

    #[tokio::test]
    async fn test_entries_written_after_prefix_removal_survive() {
        let store = MokaCacheStore::default();
        let policy = ExpirationPolicy::list();
        store.set_raw("PropertiesList_Page_1_Size_10", vec![1], policy).await;

        store.remove_by_prefix("PropertiesList_").await.unwrap();
        store.set_raw("PropertiesList_Page_1_Size_10", vec![2], policy).await;

        assert_eq!(store.get_raw("PropertiesList_Page_1_Size_10").await, Some(vec![2]));
    }

    #[tokio::test]
    async fn test_prefix_longer_than_key_matches_nothing() {
        let store = MokaCacheStore::default();
        store.set_raw("Owner", vec![1], ExpirationPolicy::default()).await;

        store.remove_by_prefix("Owner_1234").await.unwrap();

        assert!(store.get_raw("Owner").await.is_some());
    }
}

// ============================================================================
// Typed helpers and health
// ============================================================================

mod typed {
    use super::*;

    #[tokio::test]
    async fn test_json_roundtrip_through_dyn_store() {
        let store: Box<dyn CacheStore> = Box::new(MokaCacheStore::default());
        let owner = OwnerView { id: 3, name: "Ana".to_string() };

        store.set_json("Owner_3", &owner, ExpirationPolicy::entity()).await.unwrap();
        let cached: Option<OwnerView> = store.get_json("Owner_3").await.unwrap();

        assert_eq!(cached, Some(owner));
    }

    #[tokio::test]
    async fn test_json_type_mismatch_is_an_error() {
        let store = MokaCacheStore::default();
        store.set_raw("Owner_4", b"\"not an owner\"".to_vec(), ExpirationPolicy::entity()).await;

        let result = store.get_json::<OwnerView>("Owner_4").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_health_check_probe_expires() {
        let store = MokaCacheStore::new(CacheSettings::default().health_probe_ttl(ms(50)));

        let result = store.health_check().await;

        assert_eq!(result.status, AdapterHealth::Healthy);
        assert_eq!(result.adapter_id, "moka-cache");
    }
}

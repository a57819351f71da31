//! PostgreSQL adapter tests
//!
//! These start a PostgreSQL container and are ignored by default. Run them
//! with `cargo test -p infra_db -- --ignored` on a machine with Docker.

use std::sync::Arc;

use core_kernel::{HealthCheckable, OwnerId, PropertyId, RetryPolicy};
use domain_property::{
    CreateOwner, CreateProperty, Dispatcher, GetOwnerById, GetPropertyById, ListProperties,
    PropertyChanges, PropertyContext, PropertyFilter, SellProperty, UpdateProperty,
};
use infra_cache::{CacheSettings, MokaCacheStore};
use infra_db::{PostgresPropertyAdapter, DatabaseError};
use rust_decimal_macros::dec;
use test_utils::{
    assert_already_exists, assert_decimal_eq, create_isolated_test_database, TemporalFixtures,
    TestDatabase,
};

async fn dispatcher(db: &TestDatabase) -> Dispatcher {
    let adapter = Arc::new(PostgresPropertyAdapter::new(db.pool().clone()));
    PropertyContext::new(
        adapter.clone(),
        adapter.clone(),
        adapter.clone(),
        adapter,
        Arc::new(MokaCacheStore::new(CacheSettings::default())),
    )
    .with_update_retry(RetryPolicy::none())
    .dispatcher()
}

fn create_owner(name: &str) -> CreateOwner {
    CreateOwner {
        id_owner: None,
        name: name.to_string(),
        address: Some("Calle 10".to_string()),
        birthday: TemporalFixtures::birthday(),
    }
}

fn create_property(code: &str, owner: OwnerId) -> CreateProperty {
    CreateProperty {
        name: "Casa Azul".to_string(),
        address: "Carrera 7 #45".to_string(),
        price: dec!(200000),
        code_internal: code.to_string(),
        year: 1995,
        id_owner: owner,
        owner: None,
    }
}

// ============================================================================
// Schema and health
// ============================================================================

#[tokio::test]
#[ignore = "requires docker"]
async fn test_adapter_reports_healthy() {
    let db = create_isolated_test_database().await.unwrap();
    let adapter = PostgresPropertyAdapter::new(db.pool().clone());

    let health = adapter.health_check().await;
    assert!(health.is_healthy());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_code_unique_among_active_properties() {
    let db = create_isolated_test_database().await.unwrap();
    sqlx::query("INSERT INTO owners (name, birthday) VALUES ('Ana', '1980-04-12')")
        .execute(db.pool())
        .await
        .unwrap();

    let insert = "INSERT INTO properties (name, address, price, code_internal, year, owner_id) \
                  VALUES ('A', 'B', 1, 'DUP-1', 2000, 1)";
    sqlx::query(insert).execute(db.pool()).await.unwrap();
    let err = sqlx::query(insert).execute(db.pool()).await.unwrap_err();
    assert!(matches!(DatabaseError::from(err), DatabaseError::DuplicateEntry(_)));

    sqlx::query("UPDATE properties SET is_active = FALSE").execute(db.pool()).await.unwrap();
    sqlx::query(insert).execute(db.pool()).await.unwrap();
}

// ============================================================================
// Workflows end to end
// ============================================================================

#[tokio::test]
#[ignore = "requires docker"]
async fn test_create_and_sell_property() {
    let db = create_isolated_test_database().await.unwrap();
    let dispatcher = dispatcher(&db).await;

    let seller = dispatcher.send(create_owner("Ana Gomez")).await.unwrap();
    let buyer = dispatcher.send(create_owner("Luis Perez")).await.unwrap();
    let created = dispatcher.send(create_property("CA-001", seller.id)).await.unwrap();

    let receipt = dispatcher
        .send(SellProperty::to_owner(created.id, buyer.id, dec!(250000), dec!(10)))
        .await
        .unwrap();
    assert_decimal_eq(receipt.tax, dec!(25000));
    assert_eq!(receipt.previous_owner_id, seller.id);

    let details = dispatcher.send(GetPropertyById { id: created.id }).await.unwrap();
    assert_eq!(details.owner.map(|o| o.id), Some(buyer.id));
    assert_decimal_eq(details.property.price, dec!(250000));
    assert_eq!(details.traces.len(), 2);
    assert_eq!(details.traces[0].name, "Sold to Luis Perez");

    let seller_details = dispatcher.send(GetOwnerById { id: seller.id }).await.unwrap();
    assert!(seller_details.properties.is_empty());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_inline_owner_keeps_requested_id() {
    let db = create_isolated_test_database().await.unwrap();
    let dispatcher = dispatcher(&db).await;

    let requested = CreateOwner {
        id_owner: Some(OwnerId::new(40)),
        ..create_owner("Marta Ruiz")
    };
    let owner = dispatcher.send(requested).await.unwrap();
    assert_eq!(owner.id, OwnerId::new(40));

    let next = dispatcher.send(create_owner("Pedro Diaz")).await.unwrap();
    assert!(next.id.value() > 40);

    let duplicate = CreateOwner {
        id_owner: Some(OwnerId::new(40)),
        ..create_owner("Otra")
    };
    let err = dispatcher.send(duplicate).await.unwrap_err();
    assert_already_exists(&err, "Owner with ID 40 already exists");
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_update_rejects_duplicate_code_and_traces_price() {
    let db = create_isolated_test_database().await.unwrap();
    let dispatcher = dispatcher(&db).await;

    let owner = dispatcher.send(create_owner("Ana Gomez")).await.unwrap();
    let first = dispatcher.send(create_property("CA-001", owner.id)).await.unwrap();
    dispatcher.send(create_property("CA-002", owner.id)).await.unwrap();

    let err = dispatcher
        .send(UpdateProperty {
            id: first.id,
            changes: PropertyChanges {
                code_internal: Some("CA-002".to_string()),
                ..PropertyChanges::default()
            },
        })
        .await
        .unwrap_err();
    assert_already_exists(&err, "A property with code 'CA-002' already exists");

    let update = dispatcher
        .send(UpdateProperty {
            id: first.id,
            changes: PropertyChanges {
                price: Some(dec!(210000)),
                ..PropertyChanges::default()
            },
        })
        .await
        .unwrap();
    assert!(update.price_changed);
    assert_eq!(update.old_price, Some(dec!(200000.00)));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_listing_filters_and_pages() {
    let db = create_isolated_test_database().await.unwrap();
    let dispatcher = dispatcher(&db).await;

    let owner = dispatcher.send(create_owner("Ana Gomez")).await.unwrap();
    for n in 0..5 {
        let mut request = create_property(&format!("LS-{n}"), owner.id);
        request.name = format!("Casa {n}");
        request.price = dec!(100000) * rust_decimal::Decimal::from(n + 1);
        dispatcher.send(request).await.unwrap();
    }

    let page = dispatcher
        .send(ListProperties {
            filter: PropertyFilter {
                min_price: Some(dec!(200000)),
                ..PropertyFilter::page(1, 2)
            },
        })
        .await
        .unwrap();

    assert_eq!(page.total_count, 4);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.properties.len(), 2);
    assert!(page.properties.iter().all(|p| p.owner_name.as_deref() == Some("Ana Gomez")));
    assert!(page.properties.iter().all(|p| p.last_trace.is_some()));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_missing_property_is_not_found() {
    let db = create_isolated_test_database().await.unwrap();
    let dispatcher = dispatcher(&db).await;

    let err = dispatcher
        .send(GetPropertyById { id: PropertyId::new(12345) })
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for owners, properties and uploads.
//! These fixtures are consistent and predictable so tests can assert on
//! exact names, codes and prices.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::{OwnerId, PropertyId};
use domain_property::ports::mock::MockPropertyStore;
use domain_property::{ImageUpload, Owner, Property};
use rust_decimal_macros::dec;

use crate::builders::{OwnerBuilder, PropertyBuilder};

/// The smallest valid PNG: a 1x1 transparent pixel
pub const PNG_PIXEL: [u8; 67] = [
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f, 0x15, 0xc4,
    0x89, 0x00, 0x00, 0x00, 0x0a, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae,
    0x42, 0x60, 0x82,
];

/// Fixture for timestamps and dates
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// A fixed instant for tests that compare timestamps
    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    /// Birthday used by the standard owners
    pub fn birthday() -> NaiveDate {
        NaiveDate::from_ymd_opt(1980, 4, 12).unwrap()
    }
}

/// Fixture for owners
pub struct OwnerFixtures;

impl OwnerFixtures {
    /// Owner 1, holds properties 1 and 2 in the seeded store
    pub fn ana() -> Owner {
        OwnerBuilder::new()
            .with_id(1)
            .with_name("Ana Gomez")
            .with_address("Calle 10 #20-30")
            .build()
    }

    /// Owner 2, holds property 3 in the seeded store
    pub fn luis() -> Owner {
        OwnerBuilder::new().with_id(2).with_name("Luis Perez").without_address().build()
    }
}

/// Fixture for properties
pub struct PropertyFixtures;

impl PropertyFixtures {
    pub fn casa_azul() -> Property {
        PropertyBuilder::new()
            .with_id(1)
            .with_name("Casa Azul")
            .with_code("CA-001")
            .with_price(dec!(200000))
            .with_year(1995)
            .with_owner(1)
            .build()
    }

    pub fn apartamento_centro() -> Property {
        PropertyBuilder::new()
            .with_id(2)
            .with_name("Apartamento Centro")
            .with_code("AC-002")
            .with_price(dec!(350000))
            .with_year(2010)
            .with_owner(1)
            .build()
    }

    pub fn finca_verde() -> Property {
        PropertyBuilder::new()
            .with_id(3)
            .with_name("Finca Verde")
            .with_code("FV-003")
            .with_price(dec!(900000))
            .with_year(2018)
            .with_owner(2)
            .build()
    }
}

/// Fixture for image uploads
pub struct UploadFixtures;

impl UploadFixtures {
    pub fn png(file_name: &str) -> ImageUpload {
        ImageUpload::new(file_name, "image/png", PNG_PIXEL.to_vec())
    }

    /// A text file that must be rejected
    pub fn text_file() -> ImageUpload {
        ImageUpload::new("notes.txt", "text/plain", b"not an image".to_vec())
    }

    /// A PNG larger than the 1 MB upload limit
    pub fn oversized_png() -> ImageUpload {
        let mut bytes = PNG_PIXEL.to_vec();
        bytes.resize(1024 * 1024 + 1, 0);
        ImageUpload::new("huge.png", "image/png", bytes)
    }

    /// An owner photo as a data URL
    pub fn photo_data_url() -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(PNG_PIXEL))
    }
}

/// An in-memory store holding the two standard owners and three properties
pub async fn seeded_store() -> MockPropertyStore {
    let store = MockPropertyStore::new();
    store.insert_owner(OwnerFixtures::ana()).await;
    store.insert_owner(OwnerFixtures::luis()).await;
    store.insert_property(PropertyFixtures::casa_azul()).await;
    store.insert_property(PropertyFixtures::apartamento_centro()).await;
    store.insert_property(PropertyFixtures::finca_verde()).await;
    store
}

/// Ids of the standard fixtures
pub struct IdFixtures;

impl IdFixtures {
    pub fn ana() -> OwnerId {
        OwnerId::new(1)
    }

    pub fn luis() -> OwnerId {
        OwnerId::new(2)
    }

    pub fn casa_azul() -> PropertyId {
        PropertyId::new(1)
    }

    pub fn unknown_property() -> PropertyId {
        PropertyId::new(9999)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_upload_is_acceptable() {
        assert!(UploadFixtures::png("front.png").is_acceptable());
        assert!(!UploadFixtures::text_file().is_acceptable());
        assert!(!UploadFixtures::oversized_png().is_acceptable());
    }

    #[test]
    fn test_photo_fixture_passes_validation() {
        assert!(domain_property::owner::validate_photo(&UploadFixtures::photo_data_url()).is_ok());
    }

    #[tokio::test]
    async fn test_seeded_store_contents() {
        let store = seeded_store().await;
        assert_eq!(store.owner_count().await, 2);
        let property = store.property(IdFixtures::casa_azul()).await.unwrap();
        assert_eq!(property.owner_id, IdFixtures::ana());
    }
}

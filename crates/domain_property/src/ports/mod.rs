//! Port definitions for the property domain
//!
//! Ports describe what the domain needs from storage without naming a
//! database. Reads and single-row writes go through the repositories; the
//! sale, update and creation workflows go through a [`UnitOfWork`] obtained
//! from the [`TransactionManager`], which commits every write together or
//! none of them.

use async_trait::async_trait;
use core_kernel::{DomainPort, HealthCheckable, OwnerId, PortError, PropertyId, PropertyImageId};
use rust_decimal::Decimal;

use crate::image::PropertyImage;
use crate::owner::Owner;
use crate::property::Property;
use crate::trace::{NewPropertyTrace, PropertyTrace};
use crate::tracking::Tracked;
use crate::views::{OwnerDetails, OwnerSummary, PropertyDetails, PropertyListItem};

#[cfg(any(test, feature = "mock"))]
pub mod mock;

/// Page size used when the caller does not pick one
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page a caller may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// Search criteria for the property listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyFilter {
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub year: Option<i32>,
    pub owner_id: Option<OwnerId>,
    /// 1-based page number
    pub page_number: u32,
    pub page_size: u32,
}

impl PropertyFilter {
    /// An unfiltered page
    pub fn page(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number,
            page_size,
            ..Self::default()
        }
        .normalized()
    }

    /// Trims the name and clamps paging into range
    pub fn normalized(mut self) -> Self {
        self.name = self
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        self.page_number = self.page_number.max(1);
        self.page_size = match self.page_size {
            0 => DEFAULT_PAGE_SIZE,
            size => size.min(MAX_PAGE_SIZE),
        };
        self
    }

    /// Rows to skip for the current page
    pub fn offset(&self) -> u64 {
        u64::from(self.page_number.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// Returns true when an active property passes every criterion
    pub fn matches(&self, property: &Property) -> bool {
        property.is_active
            && self.name.as_ref().map_or(true, |name| {
                property.name.to_lowercase().contains(&name.to_lowercase())
            })
            && self.min_price.map_or(true, |min| property.price >= min)
            && self.max_price.map_or(true, |max| property.price <= max)
            && self.year.map_or(true, |year| property.year == year)
            && self.owner_id.map_or(true, |owner| property.owner_id == owner)
    }
}

/// Read access to owners plus the photo update
#[async_trait]
pub trait OwnerRepository: DomainPort + HealthCheckable {
    /// All active owners ordered by id, each with its active properties
    async fn list_with_properties(&self) -> Result<Vec<OwnerSummary>, PortError>;

    /// An owner with its active properties, their traces and image flags
    async fn find_details(&self, id: OwnerId) -> Result<Option<OwnerDetails>, PortError>;

    /// Replaces the photo; returns false when the owner does not exist
    async fn update_photo(&self, id: OwnerId, photo: &str) -> Result<bool, PortError>;
}

/// Read access to properties
#[async_trait]
pub trait PropertyRepository: DomainPort + HealthCheckable {
    /// An active property
    async fn find_by_id(&self, id: PropertyId) -> Result<Option<Property>, PortError>;

    /// An active property with its owner, active images and traces
    async fn find_details(&self, id: PropertyId) -> Result<Option<PropertyDetails>, PortError>;

    /// One page of matching properties and the total match count
    async fn search(
        &self,
        filter: &PropertyFilter,
    ) -> Result<(Vec<PropertyListItem>, u64), PortError>;
}

/// Storage for property images
#[async_trait]
pub trait PropertyImageRepository: DomainPort + HealthCheckable {
    /// An active image
    async fn find_active(&self, id: PropertyImageId) -> Result<Option<PropertyImage>, PortError>;

    /// Stores an active image for the property
    async fn add(&self, property_id: PropertyId, file: String) -> Result<PropertyImage, PortError>;

    /// Clears the active flag; returns the deactivated image, or None when
    /// there was no active image with that id
    async fn deactivate(&self, id: PropertyImageId) -> Result<Option<PropertyImage>, PortError>;
}

/// Opens units of work
#[async_trait]
pub trait TransactionManager: DomainPort + HealthCheckable {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, PortError>;
}

/// A transaction scoped set of reads and writes
///
/// Rows read through a unit of work are locked until it ends. Dropping a
/// unit of work without committing discards its writes.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Loads and locks an owner
    async fn find_owner(&mut self, id: OwnerId) -> Result<Option<Tracked<Owner>>, PortError>;

    /// Loads and locks an active property
    async fn find_property(
        &mut self,
        id: PropertyId,
    ) -> Result<Option<Tracked<Property>>, PortError>;

    /// Reserves an owner id
    async fn next_owner_id(&mut self) -> Result<OwnerId, PortError>;

    /// Reserves a property id
    async fn next_property_id(&mut self) -> Result<PropertyId, PortError>;

    /// Returns true when an active property other than `excluding` uses the code
    async fn code_in_use(
        &mut self,
        code: &str,
        excluding: Option<PropertyId>,
    ) -> Result<bool, PortError>;

    /// Inserts a new owner or updates a dirty one
    async fn save_owner(&mut self, owner: &mut Tracked<Owner>) -> Result<(), PortError>;

    /// Inserts a new property or updates a dirty one
    async fn save_property(&mut self, property: &mut Tracked<Property>) -> Result<(), PortError>;

    /// Appends a trace
    async fn append_trace(&mut self, trace: NewPropertyTrace) -> Result<PropertyTrace, PortError>;

    async fn commit(self: Box<Self>) -> Result<(), PortError>;

    async fn rollback(self: Box<Self>) -> Result<(), PortError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalized_clamps_paging() {
        let filter = PropertyFilter {
            name: Some("   ".to_string()),
            page_number: 0,
            page_size: 500,
            ..PropertyFilter::default()
        }
        .normalized();

        assert_eq!(filter.name, None);
        assert_eq!(filter.page_number, 1);
        assert_eq!(filter.page_size, MAX_PAGE_SIZE);
        assert_eq!(filter.offset(), 0);
    }

    #[test]
    fn test_default_page_size() {
        let filter = PropertyFilter::page(3, 0);
        assert_eq!(filter.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(filter.offset(), 20);
    }

    #[test]
    fn test_matches_name_case_insensitively_with_inclusive_bounds() {
        let (property, _) = crate::property::Property::create(
            PropertyId::new(1),
            crate::property::NewProperty {
                name: "Casa del Lago".to_string(),
                address: "Km 4".to_string(),
                price: dec!(200),
                code_internal: "CL-1".to_string(),
                year: 2001,
                owner_id: OwnerId::new(1),
            },
            chrono::Utc::now(),
        );

        let filter = PropertyFilter {
            name: Some("LAGO".to_string()),
            min_price: Some(dec!(100)),
            max_price: Some(dec!(200)),
            ..PropertyFilter::page(1, 10)
        };
        assert!(filter.matches(&property));

        let filter = PropertyFilter {
            year: Some(2002),
            ..PropertyFilter::page(1, 10)
        };
        assert!(!filter.matches(&property));
    }
}

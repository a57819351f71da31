//! Read models returned by the use cases
//!
//! These are the shapes that get cached and serialized onto the wire, so
//! they are plain data with both serde directions derived.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{OwnerId, PropertyId, PropertyImageId, PropertyTraceId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::image::PropertyImage;
use crate::owner::Owner;
use crate::property::Property;
use crate::trace::PropertyTrace;

/// Owner fields shown alongside other data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerView {
    pub id: OwnerId,
    pub name: String,
    pub address: Option<String>,
    pub photo: String,
    pub birthday: NaiveDate,
}

/// Property fields without related collections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySummary {
    pub id: PropertyId,
    pub name: String,
    pub address: String,
    pub price: Decimal,
    pub code_internal: String,
    pub year: i32,
}

/// An owner with the summaries of its active properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerSummary {
    #[serde(flatten)]
    pub owner: OwnerView,
    pub properties: Vec<PropertySummary>,
}

/// A trace as shown to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceView {
    pub id: PropertyTraceId,
    pub name: String,
    pub date: DateTime<Utc>,
    pub value: Decimal,
    pub tax: Decimal,
}

/// Image id with its active flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFlag {
    pub id: PropertyImageId,
    pub enabled: bool,
}

/// A property of an owner with its history and image flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnedProperty {
    #[serde(flatten)]
    pub property: PropertySummary,
    pub traces: Vec<TraceView>,
    pub images: Vec<ImageFlag>,
}

/// An owner with its active properties in full
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerDetails {
    #[serde(flatten)]
    pub owner: OwnerView,
    pub properties: Vec<OwnedProperty>,
}

/// An image including its content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageView {
    pub id: PropertyImageId,
    pub file: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A property with its owner, active images and traces (newest first)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDetails {
    #[serde(flatten)]
    pub property: PropertySummary,
    pub owner: Option<OwnerView>,
    pub images: Vec<ImageView>,
    pub traces: Vec<TraceView>,
}

/// One row of the property listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyListItem {
    pub id: PropertyId,
    pub name: String,
    pub address: String,
    pub price: Decimal,
    pub year: i32,
    pub code_internal: String,
    pub owner_name: Option<String>,
    pub image_count: u32,
    pub last_trace: Option<TraceView>,
}

/// A page of the property listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyPage {
    pub properties: Vec<PropertyListItem>,
    pub total_count: u64,
    pub page_number: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl PropertyPage {
    pub fn new(
        properties: Vec<PropertyListItem>,
        total_count: u64,
        page_number: u32,
        page_size: u32,
    ) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            total_count.div_ceil(u64::from(page_size)) as u32
        };
        Self {
            properties,
            total_count,
            page_number,
            page_size,
            total_pages,
        }
    }
}

/// A single active image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyImageView {
    pub id: PropertyImageId,
    pub file: String,
    pub enabled: bool,
    pub property_id: PropertyId,
}

/// Result of a completed sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleReceipt {
    pub property_id: PropertyId,
    pub previous_owner_id: OwnerId,
    pub new_owner_id: OwnerId,
    pub sale_price: Decimal,
    pub tax: Decimal,
    pub sale_date: DateTime<Utc>,
}

/// Result of a property update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub id: PropertyId,
    /// The price before the update, only when it changed
    pub old_price: Option<Decimal>,
    pub new_price: Decimal,
    pub price_changed: bool,
}

/// Result of an image upload batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUploadReport {
    pub property_id: PropertyId,
    pub image_ids: Vec<PropertyImageId>,
    pub total: usize,
}

impl ImageUploadReport {
    pub fn uploaded(&self) -> usize {
        self.image_ids.len()
    }

    pub fn message(&self) -> String {
        format!("Successfully uploaded {} of {} images", self.uploaded(), self.total)
    }
}

impl From<&Owner> for OwnerView {
    fn from(owner: &Owner) -> Self {
        Self {
            id: owner.id,
            name: owner.name.clone(),
            address: owner.address.clone(),
            photo: owner.photo.clone(),
            birthday: owner.birthday,
        }
    }
}

impl From<&Property> for PropertySummary {
    fn from(property: &Property) -> Self {
        Self {
            id: property.id,
            name: property.name.clone(),
            address: property.address.clone(),
            price: property.price,
            code_internal: property.code_internal.clone(),
            year: property.year,
        }
    }
}

impl From<&PropertyTrace> for TraceView {
    fn from(trace: &PropertyTrace) -> Self {
        Self {
            id: trace.id,
            name: trace.name.clone(),
            date: trace.date_sale,
            value: trace.value,
            tax: trace.tax,
        }
    }
}

impl From<&PropertyImage> for ImageView {
    fn from(image: &PropertyImage) -> Self {
        Self {
            id: image.id,
            file: image.file.clone(),
            is_active: image.is_active,
            created_at: image.created_at,
        }
    }
}

impl From<&PropertyImage> for ImageFlag {
    fn from(image: &PropertyImage) -> Self {
        Self {
            id: image.id,
            enabled: image.is_active,
        }
    }
}

impl From<&PropertyImage> for PropertyImageView {
    fn from(image: &PropertyImage) -> Self {
        Self {
            id: image.id,
            file: image.file.clone(),
            enabled: image.is_active,
            property_id: image.property_id,
        }
    }
}

/// Orders traces newest first, breaking ties by id
pub fn newest_first(traces: &mut [TraceView]) {
    traces.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(PropertyPage::new(vec![], 21, 1, 10).total_pages, 3);
        assert_eq!(PropertyPage::new(vec![], 20, 1, 10).total_pages, 2);
        assert_eq!(PropertyPage::new(vec![], 0, 1, 10).total_pages, 0);
    }

    #[test]
    fn test_upload_report_message() {
        let report = ImageUploadReport {
            property_id: PropertyId::new(1),
            image_ids: vec![PropertyImageId::new(4), PropertyImageId::new(5)],
            total: 3,
        };
        assert_eq!(report.message(), "Successfully uploaded 2 of 3 images");
    }
}

//! Request and response bodies that differ from the domain requests
//!
//! Most routes deserialize straight into a domain request. The types here
//! cover the cases where part of the request comes from the path or the
//! query string.

use core_kernel::{OwnerId, PropertyId};
use domain_property::{OwnerProfile, PropertyFilter, SellProperty};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/properties/:id/sell`
#[derive(Debug, Clone, Deserialize)]
pub struct SellPropertyBody {
    /// Absent or 0 when the buyer is given inline
    pub new_owner_id: Option<i64>,
    #[serde(default)]
    pub new_owner: Option<OwnerProfile>,
    pub sale_price: Decimal,
    pub tax_percentage: Decimal,
    pub notes: Option<String>,
}

impl SellPropertyBody {
    pub fn into_request(self, property_id: PropertyId) -> SellProperty {
        let mut request = SellProperty::to_owner(
            property_id,
            OwnerId::new(self.new_owner_id.unwrap_or(0)),
            self.sale_price,
            self.tax_percentage,
        );
        request.new_owner = self.new_owner;
        if let Some(notes) = self.notes.filter(|n| !n.trim().is_empty()) {
            request.notes = notes;
        }
        request
    }
}

/// Query string of `GET /api/properties`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPropertiesQuery {
    pub name: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub year: Option<i32>,
    pub owner_id: Option<i64>,
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
}

impl From<ListPropertiesQuery> for PropertyFilter {
    fn from(query: ListPropertiesQuery) -> Self {
        PropertyFilter {
            name: query.name,
            min_price: query.min_price,
            max_price: query.max_price,
            year: query.year,
            owner_id: query.owner_id.map(OwnerId::new),
            page_number: query.page_number.unwrap_or(1),
            page_size: query.page_size.unwrap_or(0),
        }
    }
}

/// Body of `POST /api/auth/revoke-token`
#[derive(Debug, Clone, Deserialize)]
pub struct RevokeTokenBody {
    #[serde(alias = "token")]
    pub refresh_token: String,
}

/// A plain acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Service liveness
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

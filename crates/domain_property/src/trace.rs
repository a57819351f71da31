//! Property traces
//!
//! A trace records a sale or a price change. Traces are append-only: they
//! are never updated or removed, so the list for a property is its full
//! price history.

use chrono::{DateTime, Utc};
use core_kernel::{PropertyId, PropertyTraceId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Label of the trace written when a property is created
pub const PROPERTY_CREATED: &str = "Property Created";

/// Label of the trace written when an update changes the price
pub const PRICE_UPDATE: &str = "price update";

/// Longest label the store accepts
pub const MAX_TRACE_NAME: usize = 100;

/// A stored trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyTrace {
    pub id: PropertyTraceId,
    pub property_id: PropertyId,
    pub date_sale: DateTime<Utc>,
    pub name: String,
    pub value: Decimal,
    pub tax: Decimal,
    pub created_at: DateTime<Utc>,
}

/// A trace waiting to be appended
#[derive(Debug, Clone, PartialEq)]
pub struct NewPropertyTrace {
    pub property_id: PropertyId,
    pub date_sale: DateTime<Utc>,
    pub name: String,
    pub value: Decimal,
    pub tax: Decimal,
}

impl NewPropertyTrace {
    pub fn new(
        property_id: PropertyId,
        name: impl Into<String>,
        value: Decimal,
        tax: Decimal,
        date_sale: DateTime<Utc>,
    ) -> Self {
        let mut name: String = name.into();
        if let Some((cut, _)) = name.char_indices().nth(MAX_TRACE_NAME) {
            name.truncate(cut);
        }
        Self {
            property_id,
            date_sale,
            name,
            value,
            tax,
        }
    }

    /// Assigns the stored id
    pub fn into_trace(self, id: PropertyTraceId, created_at: DateTime<Utc>) -> PropertyTrace {
        PropertyTrace {
            id,
            property_id: self.property_id,
            date_sale: self.date_sale,
            name: self.name,
            value: self.value,
            tax: self.tax,
            created_at,
        }
    }
}

/// Label of the trace written when a property is sold
pub fn sale_label(buyer_name: &str) -> String {
    format!("Sold to {}", buyer_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_long_labels_are_cut_on_a_char_boundary() {
        let buyer = "ñ".repeat(150);
        let trace = NewPropertyTrace::new(
            PropertyId::new(1),
            sale_label(&buyer),
            dec!(10),
            dec!(0),
            Utc::now(),
        );
        assert_eq!(trace.name.chars().count(), MAX_TRACE_NAME);
        assert!(trace.name.starts_with("Sold to ñ"));
    }
}

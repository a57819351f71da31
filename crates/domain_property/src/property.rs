//! Property entity
//!
//! A property always belongs to exactly one owner. Every change to its price
//! or owner comes with a [`NewPropertyTrace`] that the caller appends in the
//! same unit of work.

use chrono::{DateTime, Utc};
use core_kernel::{round_money, MoneyError, OwnerId, Percentage, PropertyId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::owner::{non_blank, Owner};
use crate::trace::{sale_label, NewPropertyTrace, PRICE_UPDATE, PROPERTY_CREATED};

/// A listed real-estate property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub name: String,
    pub address: String,
    pub price: Decimal,
    /// Business code, unique among active properties
    pub code_internal: String,
    pub year: i32,
    pub owner_id: OwnerId,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields of a property about to be created
#[derive(Debug, Clone, PartialEq)]
pub struct NewProperty {
    pub name: String,
    pub address: String,
    pub price: Decimal,
    pub code_internal: String,
    pub year: i32,
    pub owner_id: OwnerId,
}

/// Partial update of a property; absent or blank fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct PropertyChanges {
    #[validate(length(max = 100, message = "Name cannot be longer than 100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 200, message = "Address cannot be longer than 200 characters"))]
    pub address: Option<String>,
    pub price: Option<Decimal>,
    #[validate(length(max = 50, message = "Code internal cannot be longer than 50 characters"))]
    pub code_internal: Option<String>,
    #[validate(range(min = 1800, max = 2100, message = "Year must be between 1800 and 2100"))]
    pub year: Option<i32>,
}

/// Outcome of a sale applied to a property
#[derive(Debug, Clone, PartialEq)]
pub struct Sale {
    pub previous_owner_id: OwnerId,
    pub tax: Decimal,
    pub trace: NewPropertyTrace,
}

impl Property {
    /// Creates an active property and the trace recording its creation
    pub fn create(
        id: PropertyId,
        new: NewProperty,
        now: DateTime<Utc>,
    ) -> (Self, NewPropertyTrace) {
        let property = Self {
            id,
            name: new.name.trim().to_string(),
            address: new.address.trim().to_string(),
            price: round_money(new.price),
            code_internal: new.code_internal.trim().to_string(),
            year: new.year,
            owner_id: new.owner_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let trace = NewPropertyTrace::new(id, PROPERTY_CREATED, property.price, Decimal::ZERO, now);
        (property, trace)
    }

    /// Transfers the property to `buyer` at `sale_price`
    ///
    /// The tax is `sale_price * tax_rate / 100`, rounded to cents.
    pub fn sell_to(
        &mut self,
        buyer: &Owner,
        sale_price: Decimal,
        tax_rate: Percentage,
        now: DateTime<Utc>,
    ) -> Result<Sale, MoneyError> {
        let sale_price = round_money(sale_price);
        let tax = tax_rate.of(sale_price)?;
        let previous_owner_id = self.owner_id;

        self.owner_id = buyer.id;
        self.price = sale_price;
        self.updated_at = now;

        Ok(Sale {
            previous_owner_id,
            tax,
            trace: NewPropertyTrace::new(self.id, sale_label(&buyer.name), sale_price, tax, now),
        })
    }

    /// Applies a partial update
    ///
    /// Returns the price-change trace when the price actually moved.
    pub fn apply(
        &mut self,
        changes: &PropertyChanges,
        now: DateTime<Utc>,
    ) -> Option<NewPropertyTrace> {
        if let Some(name) = non_blank(changes.name.as_deref()) {
            self.name = name;
        }
        if let Some(address) = non_blank(changes.address.as_deref()) {
            self.address = address;
        }
        if let Some(code) = changes.new_code() {
            self.code_internal = code;
        }
        if let Some(year) = changes.year {
            self.year = year;
        }
        self.updated_at = now;

        let price = changes.price.map(round_money).filter(|price| *price != self.price)?;
        self.price = price;
        Some(NewPropertyTrace::new(self.id, PRICE_UPDATE, price, Decimal::ZERO, now))
    }
}

impl PropertyChanges {
    /// Returns true when no field would be touched
    pub fn is_empty(&self) -> bool {
        non_blank(self.name.as_deref()).is_none()
            && non_blank(self.address.as_deref()).is_none()
            && self.price.is_none()
            && self.new_code().is_none()
            && self.year.is_none()
    }

    /// The trimmed code, when one was supplied
    pub fn new_code(&self) -> Option<String> {
        non_blank(self.code_internal.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn property() -> Property {
        let (property, _) = Property::create(
            PropertyId::new(10),
            NewProperty {
                name: " Casa Azul ".to_string(),
                address: "Calle 1".to_string(),
                price: dec!(250000),
                code_internal: "CA-1".to_string(),
                year: 1999,
                owner_id: OwnerId::new(1),
            },
            Utc::now(),
        );
        property
    }

    fn buyer() -> Owner {
        Owner::new(
            OwnerId::new(2),
            "Luis",
            None,
            NaiveDate::from_ymd_opt(1975, 1, 1).unwrap(),
            Utc::now(),
        )
    }

    #[test]
    fn test_create_emits_creation_trace() {
        let (property, trace) = Property::create(
            PropertyId::new(3),
            NewProperty {
                name: "Loft".to_string(),
                address: "Av 5".to_string(),
                price: dec!(100.005),
                code_internal: " L-3 ".to_string(),
                year: 2010,
                owner_id: OwnerId::new(1),
            },
            Utc::now(),
        );
        assert_eq!(property.code_internal, "L-3");
        assert_eq!(trace.name, PROPERTY_CREATED);
        assert_eq!(trace.value, dec!(100.01));
        assert_eq!(trace.tax, Decimal::ZERO);
    }

    #[test]
    fn test_sell_reassigns_and_computes_tax() {
        let mut property = property();
        let rate = Percentage::new(dec!(5)).unwrap();

        let sale = property.sell_to(&buyer(), dec!(300000), rate, Utc::now()).unwrap();

        assert_eq!(sale.previous_owner_id, OwnerId::new(1));
        assert_eq!(sale.tax, dec!(15000.00));
        assert_eq!(sale.trace.name, "Sold to Luis");
        assert_eq!(property.owner_id, OwnerId::new(2));
        assert_eq!(property.price, dec!(300000));
    }

    #[test]
    fn test_apply_same_price_emits_no_trace() {
        let mut property = property();
        let changes = PropertyChanges {
            price: Some(dec!(250000.00)),
            name: Some("Casa Roja".to_string()),
            ..PropertyChanges::default()
        };
        assert!(property.apply(&changes, Utc::now()).is_none());
        assert_eq!(property.name, "Casa Roja");
    }

    #[test]
    fn test_apply_new_price_emits_price_update_trace() {
        let mut property = property();
        let changes = PropertyChanges {
            price: Some(dec!(260000)),
            ..PropertyChanges::default()
        };
        let trace = property.apply(&changes, Utc::now()).unwrap();
        assert_eq!(trace.name, PRICE_UPDATE);
        assert_eq!(trace.value, dec!(260000));
        assert_eq!(property.price, dec!(260000));
    }

    #[test]
    fn test_blank_changes_are_empty() {
        let changes = PropertyChanges {
            name: Some("  ".to_string()),
            code_internal: Some(String::new()),
            ..PropertyChanges::default()
        };
        assert!(changes.is_empty());
    }
}

//! Property sale
//!
//! A sale reassigns the property, sets its price to the sale price and
//! appends a trace carrying the computed tax. Creating or updating the
//! buyer, the property update and the trace all commit together.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_kernel::{OwnerId, Percentage, PropertyId, RetryPolicy};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use validator::Validate;

use super::resolve_owner;
use crate::caching::CacheTag;
use crate::context::PropertyContext;
use crate::dispatcher::{Request, RequestHandler};
use crate::error::PropertyError;
use crate::owner::OwnerProfile;
use crate::ports::UnitOfWork;
use crate::transaction::execute_in_transaction;
use crate::validation;
use crate::views::SaleReceipt;

fn default_notes() -> String {
    "Property Sale".to_string()
}

/// Sells a property to an existing or inline owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellProperty {
    pub property_id: PropertyId,
    /// Buyer id; may be 0 when the buyer is given inline
    pub new_owner_id: OwnerId,
    /// Creates the buyer when unknown, or updates it when known
    #[serde(default)]
    pub new_owner: Option<OwnerProfile>,
    pub sale_price: Decimal,
    /// Tax rate in percent, 0 to 100
    pub tax_percentage: Decimal,
    #[serde(default = "default_notes")]
    pub notes: String,
}

impl SellProperty {
    /// A sale to an owner that already exists
    pub fn to_owner(
        property_id: PropertyId,
        buyer: OwnerId,
        sale_price: Decimal,
        tax_percentage: Decimal,
    ) -> Self {
        Self {
            property_id,
            new_owner_id: buyer,
            new_owner: None,
            sale_price,
            tax_percentage,
            notes: default_notes(),
        }
    }

    fn check(&self) -> Result<(), PropertyError> {
        let mut errors = Vec::new();
        if !self.property_id.is_valid() {
            errors.push("Property ID must be greater than 0".to_string());
        }
        if self.sale_price <= Decimal::ZERO {
            errors.push("Sale price must be greater than 0".to_string());
        }
        if Percentage::new(self.tax_percentage).is_err() {
            errors.push("Tax must be between 0 and 100".to_string());
        }
        if !self.new_owner_id.is_valid() && self.new_owner.is_none() {
            errors.push("A new owner ID or new owner data is required".to_string());
        }
        if self.notes.chars().count() > 500 {
            errors.push("Notes cannot be longer than 500 characters".to_string());
        }
        if let Some(Err(owner_errors)) = self.new_owner.as_ref().map(Validate::validate) {
            errors.extend(validation::messages(&owner_errors));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(PropertyError::Validation(errors))
        }
    }
}

impl Request for SellProperty {
    type Response = SaleReceipt;
}

pub struct SellPropertyHandler {
    ctx: PropertyContext,
}

impl SellPropertyHandler {
    pub fn new(ctx: PropertyContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl RequestHandler<SellProperty> for SellPropertyHandler {
    #[instrument(skip(self, request), fields(property_id = %request.property_id, new_owner_id = %request.new_owner_id))]
    async fn handle(&self, request: SellProperty) -> Result<SaleReceipt, PropertyError> {
        request.check()?;

        let outcome = execute_in_transaction(
            self.ctx.transactions.as_ref(),
            RetryPolicy::none(),
            |uow| Box::pin(sell(uow, request.clone(), Utc::now())),
        )
        .await;

        let receipt = match outcome {
            Ok(receipt) => receipt,
            Err(err @ PropertyError::OperationFailed { .. }) => {
                error!(error = %err, "Sale failed and was rolled back");
                return Err(err);
            }
            Err(err) => {
                warn!(error = %err, "Sale rejected");
                return Err(err);
            }
        };

        self.ctx
            .invalidate(&[
                CacheTag::Property(receipt.property_id),
                CacheTag::Owner(receipt.previous_owner_id),
                CacheTag::Owner(receipt.new_owner_id),
                CacheTag::OwnerList,
                CacheTag::PropertyList,
            ])
            .await;

        info!(
            sale_price = %receipt.sale_price,
            tax = %receipt.tax,
            notes = %request.notes,
            "Property sold"
        );
        Ok(receipt)
    }
}

async fn sell(
    uow: &mut (dyn UnitOfWork + 'static),
    request: SellProperty,
    now: DateTime<Utc>,
) -> Result<SaleReceipt, PropertyError> {
    let mut property = uow
        .find_property(request.property_id)
        .await?
        .ok_or_else(|| PropertyError::not_found("Property", request.property_id))?;

    let buyer = resolve_owner(uow, request.new_owner_id, request.new_owner.as_ref(), now).await?;
    let rate = Percentage::new(request.tax_percentage)?;

    let sale = property.edit(|p| p.sell_to(&buyer, request.sale_price, rate, now))?;
    uow.save_property(&mut property).await?;
    uow.append_trace(sale.trace).await?;

    Ok(SaleReceipt {
        property_id: property.id,
        previous_owner_id: sale.previous_owner_id,
        new_owner_id: buyer.id,
        sale_price: property.price,
        tax: sale.tax,
        sale_date: now,
    })
}

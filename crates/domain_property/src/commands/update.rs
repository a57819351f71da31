use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_kernel::{OwnerId, PropertyId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::caching::CacheTag;
use crate::context::PropertyContext;
use crate::dispatcher::{Request, RequestHandler};
use crate::error::PropertyError;
use crate::ports::UnitOfWork;
use crate::property::PropertyChanges;
use crate::transaction::execute_in_transaction;
use crate::validation;
use crate::views::PriceUpdate;

/// Partially updates a property
///
/// Runs with the context's retry policy, so transient storage faults re-run
/// the whole update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProperty {
    pub id: PropertyId,
    #[serde(flatten)]
    pub changes: PropertyChanges,
}

impl Request for UpdateProperty {
    type Response = PriceUpdate;
}

impl UpdateProperty {
    fn check(&self) -> Result<(), PropertyError> {
        let mut extra = Vec::new();
        if !self.id.is_valid() {
            extra.push("Invalid property ID".to_string());
        }
        if self.changes.price.is_some_and(|price| price < Decimal::ZERO) {
            extra.push("Price cannot be negative".to_string());
        }
        if self.changes.is_empty() {
            extra.push("At least one field must be provided for update".to_string());
        }
        validation::check(&self.changes, extra)
    }
}

pub struct UpdatePropertyHandler {
    ctx: PropertyContext,
}

impl UpdatePropertyHandler {
    pub fn new(ctx: PropertyContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl RequestHandler<UpdateProperty> for UpdatePropertyHandler {
    #[instrument(skip(self, request), fields(property_id = %request.id))]
    async fn handle(&self, request: UpdateProperty) -> Result<PriceUpdate, PropertyError> {
        request.check()?;

        let (update, owner_id) = execute_in_transaction(
            self.ctx.transactions.as_ref(),
            self.ctx.update_retry,
            |uow| Box::pin(apply_update(uow, request.clone(), Utc::now())),
        )
        .await
        .map_err(|err| {
            warn!(error = %err, "Property update failed");
            err.wrap_unexpected("An error occurred while updating the property")
        })?;

        self.ctx
            .invalidate(&[
                CacheTag::Property(update.id),
                CacheTag::Owner(owner_id),
                CacheTag::OwnerList,
                CacheTag::PropertyList,
            ])
            .await;

        info!(price_changed = update.price_changed, "Property updated");
        Ok(update)
    }
}

async fn apply_update(
    uow: &mut (dyn UnitOfWork + 'static),
    request: UpdateProperty,
    now: DateTime<Utc>,
) -> Result<(PriceUpdate, OwnerId), PropertyError> {
    let mut property = uow
        .find_property(request.id)
        .await?
        .ok_or_else(|| PropertyError::not_found("Property", request.id))?;

    if let Some(code) = request.changes.new_code() {
        if code != property.code_internal && uow.code_in_use(&code, Some(property.id)).await? {
            return Err(PropertyError::AlreadyExists(format!(
                "A property with code '{}' already exists",
                code
            )));
        }
    }

    let old_price = property.price;
    let trace = property.edit(|p| p.apply(&request.changes, now));
    let price_changed = trace.is_some();

    uow.save_property(&mut property).await?;
    if let Some(trace) = trace {
        uow.append_trace(trace).await?;
    }

    Ok((
        PriceUpdate {
            id: property.id,
            old_price: price_changed.then_some(old_price),
            new_price: property.price,
            price_changed,
        },
        property.owner_id,
    ))
}

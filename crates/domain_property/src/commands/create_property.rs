use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_kernel::{OwnerId, PropertyId, RetryPolicy};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;

use super::resolve_owner;
use crate::caching::CacheTag;
use crate::context::PropertyContext;
use crate::dispatcher::{Request, RequestHandler};
use crate::error::PropertyError;
use crate::owner::OwnerProfile;
use crate::ports::UnitOfWork;
use crate::property::{NewProperty, Property};
use crate::tracking::Tracked;
use crate::transaction::execute_in_transaction;
use crate::validation;

/// Lists a new property for an existing or inline owner
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProperty {
    #[validate(length(min = 1, max = 100, message = "Name is required and cannot be longer than 100 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 200, message = "Address is required and cannot be longer than 200 characters"))]
    pub address: String,
    pub price: Decimal,
    #[validate(length(min = 1, max = 50, message = "Code internal is required and cannot be longer than 50 characters"))]
    pub code_internal: String,
    #[validate(range(min = 1800, max = 2100, message = "Year must be between 1800 and 2100"))]
    pub year: i32,
    pub id_owner: OwnerId,
    /// Creates the owner when unknown, or updates it when known
    #[serde(default)]
    pub owner: Option<OwnerProfile>,
}

/// Ids assigned by a property creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedProperty {
    pub id: PropertyId,
    pub owner_id: OwnerId,
}

impl Request for CreateProperty {
    type Response = CreatedProperty;
}

impl CreateProperty {
    fn check(&self) -> Result<(), PropertyError> {
        let mut extra = Vec::new();
        if self.price < Decimal::ZERO {
            extra.push("Price cannot be negative".to_string());
        }
        if self.code_internal.trim().is_empty() && !self.code_internal.is_empty() {
            extra.push("Code internal cannot be blank".to_string());
        }
        if let Some(Err(errors)) = self.owner.as_ref().map(Validate::validate) {
            extra.extend(validation::messages(&errors));
        }
        validation::check(self, extra)
    }
}

pub struct CreatePropertyHandler {
    ctx: PropertyContext,
}

impl CreatePropertyHandler {
    pub fn new(ctx: PropertyContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl RequestHandler<CreateProperty> for CreatePropertyHandler {
    #[instrument(skip(self, request), fields(owner_id = %request.id_owner, code = %request.code_internal))]
    async fn handle(&self, request: CreateProperty) -> Result<CreatedProperty, PropertyError> {
        request.check()?;

        let created = execute_in_transaction(
            self.ctx.transactions.as_ref(),
            RetryPolicy::none(),
            |uow| Box::pin(insert_property(uow, request.clone(), Utc::now())),
        )
        .await?;

        self.ctx
            .invalidate(&[
                CacheTag::Property(created.id),
                CacheTag::PropertyList,
                CacheTag::Owner(created.owner_id),
                CacheTag::OwnerList,
            ])
            .await;
        info!(property_id = %created.id, "Property created");
        Ok(created)
    }
}

async fn insert_property(
    uow: &mut (dyn UnitOfWork + 'static),
    request: CreateProperty,
    now: DateTime<Utc>,
) -> Result<CreatedProperty, PropertyError> {
    let owner = resolve_owner(uow, request.id_owner, request.owner.as_ref(), now).await?;

    let code = request.code_internal.trim();
    if uow.code_in_use(code, None).await? {
        return Err(PropertyError::AlreadyExists(format!(
            "A property with code '{}' already exists",
            code
        )));
    }

    let id = uow.next_property_id().await?;
    let (property, trace) = Property::create(
        id,
        NewProperty {
            name: request.name,
            address: request.address,
            price: request.price,
            code_internal: code.to_string(),
            year: request.year,
            owner_id: owner.id,
        },
        now,
    );

    let mut property = Tracked::new(property);
    uow.save_property(&mut property).await?;
    uow.append_trace(trace).await?;

    Ok(CreatedProperty {
        id,
        owner_id: owner.id,
    })
}

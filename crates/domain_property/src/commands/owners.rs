use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use core_kernel::{OwnerId, RetryPolicy};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::caching::CacheTag;
use crate::context::PropertyContext;
use crate::dispatcher::{Request, RequestHandler};
use crate::error::PropertyError;
use crate::owner::{validate_photo, Owner};
use crate::ports::UnitOfWork;
use crate::tracking::Tracked;
use crate::transaction::execute_in_transaction;
use crate::validation;

/// Registers a new owner
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOwner {
    /// Requested id; assigned by the store when absent or not positive
    #[serde(default)]
    pub id_owner: Option<OwnerId>,
    #[validate(length(max = 100, message = "Name cannot be longer than 100 characters"))]
    pub name: String,
    #[validate(length(max = 200, message = "Address cannot be longer than 200 characters"))]
    pub address: Option<String>,
    pub birthday: NaiveDate,
}

impl Request for CreateOwner {
    type Response = Owner;
}

impl CreateOwner {
    fn check(&self) -> Result<(), PropertyError> {
        let mut extra = Vec::new();
        if self.name.trim().is_empty() {
            extra.push("Name is required".to_string());
        }
        if self.birthday > Utc::now().date_naive() {
            extra.push("Birthday cannot be in the future".to_string());
        }
        validation::check(self, extra)
    }
}

pub struct CreateOwnerHandler {
    ctx: PropertyContext,
}

impl CreateOwnerHandler {
    pub fn new(ctx: PropertyContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl RequestHandler<CreateOwner> for CreateOwnerHandler {
    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn handle(&self, request: CreateOwner) -> Result<Owner, PropertyError> {
        request.check()?;

        let owner = execute_in_transaction(
            self.ctx.transactions.as_ref(),
            RetryPolicy::none(),
            |uow| Box::pin(insert_owner(uow, request.clone())),
        )
        .await?;

        self.ctx.invalidate(&[CacheTag::OwnerList]).await;
        info!(owner_id = %owner.id, "Owner created");
        Ok(owner)
    }
}

async fn insert_owner(
    uow: &mut (dyn UnitOfWork + 'static),
    request: CreateOwner,
) -> Result<Owner, PropertyError> {
    let requested = request.id_owner.filter(OwnerId::is_valid);
    let id = match requested {
        Some(id) => {
            if uow.find_owner(id).await?.is_some() {
                return Err(PropertyError::AlreadyExists(format!(
                    "Owner with ID {} already exists",
                    id
                )));
            }
            id
        }
        None => uow.next_owner_id().await?,
    };

    let mut owner = Tracked::new(Owner::new(
        id,
        &request.name,
        request.address.as_deref(),
        request.birthday,
        Utc::now(),
    ));
    uow.save_owner(&mut owner).await?;
    Ok(owner.into_inner())
}

/// Replaces an owner's photo with a `data:image/...;base64,` URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOwnerPhoto {
    pub owner_id: OwnerId,
    pub photo: String,
}

impl Request for UpdateOwnerPhoto {
    type Response = ();
}

impl UpdateOwnerPhoto {
    fn check(&self) -> Result<(), PropertyError> {
        let mut errors = Vec::new();
        if !self.owner_id.is_valid() {
            errors.push("Owner ID must be greater than zero.".to_string());
        }
        if let Err(photo_errors) = validate_photo(&self.photo) {
            errors.extend(photo_errors);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(PropertyError::Validation(errors))
        }
    }
}

pub struct UpdateOwnerPhotoHandler {
    ctx: PropertyContext,
}

impl UpdateOwnerPhotoHandler {
    pub fn new(ctx: PropertyContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl RequestHandler<UpdateOwnerPhoto> for UpdateOwnerPhotoHandler {
    #[instrument(skip(self, request), fields(owner_id = %request.owner_id))]
    async fn handle(&self, request: UpdateOwnerPhoto) -> Result<(), PropertyError> {
        request.check()?;

        let updated = self
            .ctx
            .owners
            .update_photo(request.owner_id, request.photo.trim())
            .await?;
        if !updated {
            warn!("Owner not found for photo update");
            return Err(PropertyError::not_found("Owner", request.owner_id));
        }

        self.ctx
            .invalidate(&[CacheTag::Owner(request.owner_id), CacheTag::OwnerList])
            .await;
        info!("Owner photo updated");
        Ok(())
    }
}

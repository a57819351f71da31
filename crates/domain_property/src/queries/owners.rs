use async_trait::async_trait;
use core_kernel::OwnerId;
use tracing::instrument;

use crate::caching::{owner_key, read_through, ALL_OWNERS_KEY};
use crate::context::PropertyContext;
use crate::dispatcher::{Request, RequestHandler};
use crate::error::PropertyError;
use crate::views::{OwnerDetails, OwnerSummary};

/// Every active owner with its active properties
#[derive(Debug, Clone, Copy, Default)]
pub struct GetAllOwners;

impl Request for GetAllOwners {
    type Response = Vec<OwnerSummary>;
}

pub struct GetAllOwnersHandler {
    ctx: PropertyContext,
}

impl GetAllOwnersHandler {
    pub fn new(ctx: PropertyContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl RequestHandler<GetAllOwners> for GetAllOwnersHandler {
    #[instrument(skip_all)]
    async fn handle(&self, _request: GetAllOwners) -> Result<Vec<OwnerSummary>, PropertyError> {
        let owners = self.ctx.owners.as_ref();
        read_through(
            self.ctx.cache.as_ref(),
            ALL_OWNERS_KEY,
            self.ctx.policies.default,
            || async move { Ok(owners.list_with_properties().await?) },
        )
        .await
    }
}

/// One owner with its properties, their traces and image flags
#[derive(Debug, Clone, Copy)]
pub struct GetOwnerById {
    pub id: OwnerId,
}

impl Request for GetOwnerById {
    type Response = OwnerDetails;
}

pub struct GetOwnerByIdHandler {
    ctx: PropertyContext,
}

impl GetOwnerByIdHandler {
    pub fn new(ctx: PropertyContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl RequestHandler<GetOwnerById> for GetOwnerByIdHandler {
    #[instrument(skip(self), fields(owner_id = %request.id))]
    async fn handle(&self, request: GetOwnerById) -> Result<OwnerDetails, PropertyError> {
        if !request.id.is_valid() {
            return Err(PropertyError::validation("Owner ID must be greater than 0"));
        }

        let owners = self.ctx.owners.as_ref();
        let key = owner_key(request.id);
        read_through(self.ctx.cache.as_ref(), &key, self.ctx.policies.entity, || async move {
            owners
                .find_details(request.id)
                .await?
                .ok_or_else(|| PropertyError::not_found("Owner", request.id))
        })
        .await
    }
}

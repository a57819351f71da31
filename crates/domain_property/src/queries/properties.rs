use async_trait::async_trait;
use core_kernel::{PropertyId, PropertyImageId};
use rust_decimal::Decimal;
use tracing::instrument;

use crate::caching::{property_key, property_list_key, read_through};
use crate::context::PropertyContext;
use crate::dispatcher::{Request, RequestHandler};
use crate::error::PropertyError;
use crate::ports::PropertyFilter;
use crate::views::{PropertyDetails, PropertyImageView, PropertyPage};

/// One active property with its owner, images and traces
#[derive(Debug, Clone, Copy)]
pub struct GetPropertyById {
    pub id: PropertyId,
}

impl Request for GetPropertyById {
    type Response = PropertyDetails;
}

pub struct GetPropertyByIdHandler {
    ctx: PropertyContext,
}

impl GetPropertyByIdHandler {
    pub fn new(ctx: PropertyContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl RequestHandler<GetPropertyById> for GetPropertyByIdHandler {
    #[instrument(skip(self), fields(property_id = %request.id))]
    async fn handle(&self, request: GetPropertyById) -> Result<PropertyDetails, PropertyError> {
        if !request.id.is_valid() {
            return Err(PropertyError::validation("Property ID must be greater than 0"));
        }

        let properties = self.ctx.properties.as_ref();
        let key = property_key(request.id);
        read_through(self.ctx.cache.as_ref(), &key, self.ctx.policies.entity, || async move {
            properties
                .find_details(request.id)
                .await?
                .ok_or_else(|| PropertyError::not_found("Property", request.id))
        })
        .await
    }
}

/// A filtered page of active properties, ordered by id
#[derive(Debug, Clone, Default)]
pub struct ListProperties {
    pub filter: PropertyFilter,
}

impl Request for ListProperties {
    type Response = PropertyPage;
}

impl ListProperties {
    fn check(&self) -> Result<(), PropertyError> {
        let mut errors = Vec::new();
        let negative = |value: Option<Decimal>| value.is_some_and(|v| v < Decimal::ZERO);
        if negative(self.filter.min_price) || negative(self.filter.max_price) {
            errors.push("Prices cannot be negative".to_string());
        }
        if let (Some(min), Some(max)) = (self.filter.min_price, self.filter.max_price) {
            if min > max {
                errors.push("Minimum price cannot be greater than maximum price".to_string());
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(PropertyError::Validation(errors))
        }
    }
}

pub struct ListPropertiesHandler {
    ctx: PropertyContext,
}

impl ListPropertiesHandler {
    pub fn new(ctx: PropertyContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl RequestHandler<ListProperties> for ListPropertiesHandler {
    #[instrument(skip_all)]
    async fn handle(&self, request: ListProperties) -> Result<PropertyPage, PropertyError> {
        request.check()?;

        let filter = request.filter.normalized();
        let key = property_list_key(&filter);
        let properties = self.ctx.properties.as_ref();
        read_through(self.ctx.cache.as_ref(), &key, self.ctx.policies.list, || async move {
            let (items, total) = properties.search(&filter).await?;
            Ok(PropertyPage::new(items, total, filter.page_number, filter.page_size))
        })
        .await
    }
}

/// One active image with its content
#[derive(Debug, Clone, Copy)]
pub struct GetPropertyImage {
    pub image_id: PropertyImageId,
}

impl Request for GetPropertyImage {
    type Response = PropertyImageView;
}

pub struct GetPropertyImageHandler {
    ctx: PropertyContext,
}

impl GetPropertyImageHandler {
    pub fn new(ctx: PropertyContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl RequestHandler<GetPropertyImage> for GetPropertyImageHandler {
    #[instrument(skip(self), fields(image_id = %request.image_id))]
    async fn handle(&self, request: GetPropertyImage) -> Result<PropertyImageView, PropertyError> {
        if !request.image_id.is_valid() {
            return Err(PropertyError::validation("Image ID must be greater than 0"));
        }

        let image = self
            .ctx
            .images
            .find_active(request.image_id)
            .await?
            .ok_or_else(|| PropertyError::not_found("Property image", request.image_id))?;
        Ok(PropertyImageView::from(&image))
    }
}

use async_trait::async_trait;
use core_kernel::{PropertyId, PropertyImageId};
use tracing::{info, instrument, warn};

use crate::caching::CacheTag;
use crate::context::PropertyContext;
use crate::dispatcher::{Request, RequestHandler};
use crate::error::PropertyError;
use crate::image::ImageUpload;
use crate::views::ImageUploadReport;

/// Attaches uploaded images to a property
#[derive(Debug, Clone)]
pub struct CreatePropertyImages {
    pub property_id: PropertyId,
    pub images: Vec<ImageUpload>,
}

impl Request for CreatePropertyImages {
    type Response = ImageUploadReport;
}

impl CreatePropertyImages {
    fn check(&self) -> Result<(), PropertyError> {
        let mut errors = Vec::new();
        if !self.property_id.is_valid() {
            errors.push("Property ID must be greater than zero.".to_string());
        }
        if self.images.is_empty() {
            errors.push("At least one image must be provided.".to_string());
        } else if !self.images.iter().all(ImageUpload::is_acceptable) {
            errors.push(
                "One or more files are not valid images or exceed the maximum size of 1MB.".to_string(),
            );
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(PropertyError::Validation(errors))
        }
    }
}

pub struct CreatePropertyImagesHandler {
    ctx: PropertyContext,
}

impl CreatePropertyImagesHandler {
    pub fn new(ctx: PropertyContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl RequestHandler<CreatePropertyImages> for CreatePropertyImagesHandler {
    #[instrument(skip(self, request), fields(property_id = %request.property_id, count = request.images.len()))]
    async fn handle(
        &self,
        request: CreatePropertyImages,
    ) -> Result<ImageUploadReport, PropertyError> {
        request.check()?;

        let property = self
            .ctx
            .properties
            .find_by_id(request.property_id)
            .await?
            .ok_or_else(|| PropertyError::not_found("Property", request.property_id))?;

        let mut image_ids = Vec::with_capacity(request.images.len());
        for upload in &request.images {
            match self.ctx.images.add(property.id, upload.to_data_url()).await {
                Ok(image) => image_ids.push(image.id),
                Err(e) => warn!(file = %upload.file_name, error = %e, "Failed to store image"),
            }
        }

        let report = ImageUploadReport {
            property_id: property.id,
            image_ids,
            total: request.images.len(),
        };

        if report.uploaded() > 0 {
            self.ctx
                .invalidate(&[
                    CacheTag::Property(property.id),
                    CacheTag::Owner(property.owner_id),
                    CacheTag::PropertyList,
                ])
                .await;
        }

        info!(uploaded = report.uploaded(), "Property images stored");
        Ok(report)
    }
}

/// Soft-deletes a property image
#[derive(Debug, Clone, Copy)]
pub struct DeletePropertyImage {
    pub image_id: PropertyImageId,
}

impl Request for DeletePropertyImage {
    type Response = ();
}

pub struct DeletePropertyImageHandler {
    ctx: PropertyContext,
}

impl DeletePropertyImageHandler {
    pub fn new(ctx: PropertyContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl RequestHandler<DeletePropertyImage> for DeletePropertyImageHandler {
    #[instrument(skip(self), fields(image_id = %request.image_id))]
    async fn handle(&self, request: DeletePropertyImage) -> Result<(), PropertyError> {
        if !request.image_id.is_valid() {
            return Err(PropertyError::validation("Image ID must be greater than zero."));
        }

        let image = self
            .ctx
            .images
            .deactivate(request.image_id)
            .await?
            .ok_or_else(|| PropertyError::not_found("Property image", request.image_id))?;

        let mut tags = vec![CacheTag::Property(image.property_id), CacheTag::PropertyList];
        match self.ctx.properties.find_by_id(image.property_id).await {
            Ok(Some(property)) => tags.push(CacheTag::Owner(property.owner_id)),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Could not resolve owner for cache invalidation"),
        }
        self.ctx.invalidate(&tags).await;

        info!(property_id = %image.property_id, "Property image deleted");
        Ok(())
    }
}

//! Property handlers

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use core_kernel::{PropertyId, PropertyImageId};
use domain_property::commands::CreatedProperty;
use domain_property::{
    CreateProperty, CreatePropertyImages, DeletePropertyImage, GetPropertyById, GetPropertyImage,
    ImageUploadReport, ListProperties, PriceUpdate, PropertyChanges, PropertyDetails,
    PropertyImageView, PropertyPage, SaleReceipt, UpdateProperty,
};

use super::read_files;
use crate::dto::{ListPropertiesQuery, SellPropertyBody};
use crate::error::{ApiError, ApiResponse};
use crate::AppState;

pub async fn list_properties(
    State(state): State<AppState>,
    Query(query): Query<ListPropertiesQuery>,
) -> Result<Json<ApiResponse<PropertyPage>>, ApiError> {
    let page = state.dispatcher.send(ListProperties { filter: query.into() }).await?;
    Ok(Json(ApiResponse::ok("Properties retrieved successfully", page)))
}

pub async fn create_property(
    State(state): State<AppState>,
    Json(request): Json<CreateProperty>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedProperty>>), ApiError> {
    let created = state.dispatcher.send(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Property created successfully", created)),
    ))
}

pub async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<PropertyDetails>>, ApiError> {
    let property = state.dispatcher.send(GetPropertyById { id: PropertyId::new(id) }).await?;
    Ok(Json(ApiResponse::ok("Property retrieved successfully", property)))
}

pub async fn update_property(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(changes): Json<PropertyChanges>,
) -> Result<Json<ApiResponse<PriceUpdate>>, ApiError> {
    let update = state
        .dispatcher
        .send(UpdateProperty {
            id: PropertyId::new(id),
            changes,
        })
        .await?;
    Ok(Json(ApiResponse::ok("Property updated successfully", update)))
}

pub async fn upload_images(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ImageUploadReport>>, ApiError> {
    let images = read_files(multipart).await?;
    let report = state
        .dispatcher
        .send(CreatePropertyImages {
            property_id: PropertyId::new(id),
            images,
        })
        .await?;

    if report.uploaded() == 0 {
        return Err(ApiError::Internal(report.message()));
    }
    Ok(Json(ApiResponse::ok(report.message(), report)))
}

pub async fn sell_property(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<SellPropertyBody>,
) -> Result<Json<ApiResponse<SaleReceipt>>, ApiError> {
    let receipt = state.dispatcher.send(body.into_request(PropertyId::new(id))).await?;
    Ok(Json(ApiResponse::ok("Property sold successfully", receipt)))
}

pub async fn get_image(
    State(state): State<AppState>,
    Path(image_id): Path<i64>,
) -> Result<Json<ApiResponse<PropertyImageView>>, ApiError> {
    let image = state
        .dispatcher
        .send(GetPropertyImage {
            image_id: PropertyImageId::new(image_id),
        })
        .await?;
    Ok(Json(ApiResponse::ok("Image retrieved successfully", image)))
}

pub async fn delete_image(
    State(state): State<AppState>,
    Path(image_id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .dispatcher
        .send(DeletePropertyImage {
            image_id: PropertyImageId::new(image_id),
        })
        .await?;
    Ok(Json(ApiResponse::done("Image deleted successfully")))
}

//! Owner handlers

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use core_kernel::OwnerId;
use domain_property::{
    CreateOwner, GetAllOwners, GetOwnerById, Owner, OwnerDetails, OwnerSummary, UpdateOwnerPhoto,
};

use super::read_files;
use crate::error::{ApiError, ApiResponse};
use crate::AppState;

pub async fn list_owners(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<OwnerSummary>>>, ApiError> {
    let owners = state.dispatcher.send(GetAllOwners).await?;
    Ok(Json(ApiResponse::ok("Owners retrieved successfully", owners)))
}

pub async fn create_owner(
    State(state): State<AppState>,
    Json(request): Json<CreateOwner>,
) -> Result<(StatusCode, Json<ApiResponse<Owner>>), ApiError> {
    let owner = state.dispatcher.send(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok("Owner created successfully", owner))))
}

pub async fn get_owner(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<OwnerDetails>>, ApiError> {
    let owner = state.dispatcher.send(GetOwnerById { id: OwnerId::new(id) }).await?;
    Ok(Json(ApiResponse::ok("Owner retrieved successfully", owner)))
}

/// Replaces the owner's photo with the first uploaded file
pub async fn update_photo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let Some(file) = read_files(multipart).await?.into_iter().next() else {
        return Err(ApiError::bad_request("No file was provided"));
    };
    if !file.content_type.starts_with("image/") {
        return Err(ApiError::bad_request("The file must be an image"));
    }

    state
        .dispatcher
        .send(UpdateOwnerPhoto {
            owner_id: OwnerId::new(id),
            photo: file.to_data_url(),
        })
        .await?;
    Ok(Json(ApiResponse::done("Owner photo updated successfully")))
}

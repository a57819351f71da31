//! Request handlers, one module per resource

pub mod auth;
pub mod health;
pub mod owners;
pub mod properties;

use axum::extract::Multipart;
use domain_property::ImageUpload;

use crate::error::ApiError;

/// Reads every file part of a multipart body
///
/// Parts without a file name are ignored. A part without a content type is
/// treated as `application/octet-stream`.
pub(crate) async fn read_files(mut multipart: Multipart) -> Result<Vec<ImageUpload>, ApiError> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await?;
        files.push(ImageUpload::new(file_name, content_type, bytes.to_vec()));
    }
    Ok(files)
}

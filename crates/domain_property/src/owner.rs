//! Owner entity
//!
//! Owners hold zero or more properties. They are created explicitly, or
//! implicitly when a property is created or sold to an owner that does not
//! exist yet and the request carries the owner's profile inline.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::OwnerId;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::PropertyError;

/// Largest decoded photo accepted for an owner
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

const PHOTO_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/gif"];

/// A person who owns properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub id: OwnerId,
    pub name: String,
    pub address: Option<String>,
    /// Photo as a `data:image/...;base64,` URL, empty when unset
    pub photo: String,
    pub birthday: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owner {
    /// Creates an active owner without a photo, trimming the text fields
    pub fn new(
        id: OwnerId,
        name: &str,
        address: Option<&str>,
        birthday: NaiveDate,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.trim().to_string(),
            address: non_blank(address),
            photo: String::new(),
            birthday,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates an owner from an inline profile
    ///
    /// The profile must carry a name and a birthday.
    pub fn from_profile(
        id: OwnerId,
        profile: &OwnerProfile,
        now: DateTime<Utc>,
    ) -> Result<Self, PropertyError> {
        let name = non_blank(profile.name.as_deref()).ok_or_else(|| {
            PropertyError::invalid_operation("Owner name is required to create a new owner")
        })?;
        let birthday = profile.birthday.ok_or_else(|| {
            PropertyError::invalid_operation("Owner birthday is required to create a new owner")
        })?;

        let mut owner = Self::new(id, &name, profile.address.as_deref(), birthday, now);
        if let Some(photo) = non_blank(profile.photo.as_deref()) {
            owner.photo = photo;
        }
        Ok(owner)
    }

    /// Overwrites fields with the non-blank values of the profile
    ///
    /// Returns true when anything changed.
    pub fn apply_profile(&mut self, profile: &OwnerProfile, now: DateTime<Utc>) -> bool {
        let mut changed = false;

        if let Some(name) = non_blank(profile.name.as_deref()) {
            changed |= replace(&mut self.name, name);
        }
        if let Some(address) = non_blank(profile.address.as_deref()) {
            changed |= replace(&mut self.address, Some(address));
        }
        if let Some(photo) = non_blank(profile.photo.as_deref()) {
            changed |= replace(&mut self.photo, photo);
        }
        if let Some(birthday) = profile.birthday {
            changed |= replace(&mut self.birthday, birthday);
        }

        if changed {
            self.updated_at = now;
        }
        changed
    }
}

/// Owner fields supplied inline with a property creation or sale
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct OwnerProfile {
    #[validate(length(max = 100, message = "Owner name cannot be longer than 100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 200, message = "Owner address cannot be longer than 200 characters"))]
    pub address: Option<String>,
    pub photo: Option<String>,
    pub birthday: Option<NaiveDate>,
}

/// Checks an owner photo data URL
///
/// Returns every rule the photo breaks.
pub fn validate_photo(photo: &str) -> Result<(), Vec<String>> {
    let photo = photo.trim();
    if photo.is_empty() {
        return Err(vec!["A base64 encoded image is required.".to_string()]);
    }

    let mut errors = Vec::new();
    let decoded = photo
        .strip_prefix("data:image/")
        .and_then(|_| photo.split_once(','))
        .and_then(|(_, payload)| STANDARD.decode(payload.trim()).ok());

    match decoded {
        None => errors.push("The provided string is not a valid base64 encoded image.".to_string()),
        Some(bytes) if bytes.len() > MAX_PHOTO_BYTES => {
            errors.push("The image size must not exceed 5MB.".to_string())
        }
        Some(_) => {}
    }

    let mime = photo
        .strip_prefix("data:")
        .and_then(|rest| rest.split([';', ',']).next())
        .unwrap_or_default();
    if !PHOTO_MIME_TYPES.contains(&mime) {
        errors.push("The image must be a valid type (JPEG, PNG, GIF).".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

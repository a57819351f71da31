//! Write use cases
//!
//! Every command validates its input up front, performs its writes inside
//! a unit of work where more than one row changes, and invalidates the
//! affected cache tags only after the writes are committed.

mod create_property;
mod images;
mod owners;
mod sell;
mod update;

pub use create_property::{CreateProperty, CreatePropertyHandler, CreatedProperty};
pub use images::{
    CreatePropertyImages, CreatePropertyImagesHandler, DeletePropertyImage,
    DeletePropertyImageHandler,
};
pub use owners::{CreateOwner, CreateOwnerHandler, UpdateOwnerPhoto, UpdateOwnerPhotoHandler};
pub use sell::{SellProperty, SellPropertyHandler};
pub use update::{UpdateProperty, UpdatePropertyHandler};

use chrono::{DateTime, Utc};
use core_kernel::OwnerId;
use tracing::info;

use crate::error::PropertyError;
use crate::owner::{Owner, OwnerProfile};
use crate::ports::UnitOfWork;
use crate::tracking::{EntityState, Tracked};

/// Finds the owner a property is being assigned to, creating or updating it
/// from the inline profile
///
/// - known owner, no profile: used as is
/// - known owner with profile: non-blank profile fields overwrite it
/// - unknown owner with profile: created, keeping the requested id when valid
/// - unknown owner, no profile: invalid operation
pub(crate) async fn resolve_owner(
    uow: &mut (dyn UnitOfWork + 'static),
    id: OwnerId,
    profile: Option<&OwnerProfile>,
    now: DateTime<Utc>,
) -> Result<Owner, PropertyError> {
    let existing = if id.is_valid() {
        uow.find_owner(id).await?
    } else {
        None
    };

    let mut owner = match (existing, profile) {
        (Some(owner), None) => owner,
        (Some(mut owner), Some(profile)) => {
            owner.update(|o| o.apply_profile(profile, now));
            owner
        }
        (None, Some(profile)) => {
            let id = if id.is_valid() {
                id
            } else {
                uow.next_owner_id().await?
            };
            Tracked::new(Owner::from_profile(id, profile, now)?)
        }
        (None, None) => {
            return Err(PropertyError::invalid_operation(format!(
                "Owner with ID {} not found and no owner data provided to create a new one",
                id
            )));
        }
    };

    let created = owner.state() == EntityState::New;
    uow.save_owner(&mut owner).await?;
    if created {
        info!(owner_id = %owner.id, "Created owner from inline profile");
    }
    Ok(owner.into_inner())
}

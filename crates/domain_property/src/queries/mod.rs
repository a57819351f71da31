//! Read use cases
//!
//! Queries read through the cache: a hit is returned as is, a miss loads
//! from the repositories and stores the result under the query's key.

mod owners;
mod properties;

pub use owners::{GetAllOwners, GetAllOwnersHandler, GetOwnerById, GetOwnerByIdHandler};
pub use properties::{
    GetPropertyById, GetPropertyByIdHandler, GetPropertyImage, GetPropertyImageHandler,
    ListProperties, ListPropertiesHandler,
};

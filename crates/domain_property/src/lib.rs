//! Property Management Domain
//!
//! Owners, the properties they hold, the append-only price history of each
//! property (traces) and its images.
//!
//! # Architecture
//!
//! - **Entities**: [`Owner`], [`Property`], [`PropertyTrace`], [`PropertyImage`]
//! - **Ports**: repositories for reads and single-row writes, plus a
//!   [`UnitOfWork`] for the multi-row workflows
//! - **Use cases**: one request type per operation, routed through the
//!   [`Dispatcher`]
//! - **Caching**: read models are cached by key and invalidated by tag after
//!   every successful write
//!
//! # Workflows
//!
//! ```text
//! SellProperty   : load property FOR UPDATE -> resolve buyer -> trace -> reassign -> commit
//! UpdateProperty : load property FOR UPDATE -> apply fields -> trace if price changed -> commit
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_property::{PropertyContext, SellProperty};
//!
//! let dispatcher = context.dispatcher();
//! let receipt = dispatcher.send(SellProperty::to_owner(property_id, buyer_id, price, tax)).await?;
//! ```

pub mod caching;
pub mod commands;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod image;
pub mod owner;
pub mod ports;
pub mod property;
pub mod queries;
pub mod trace;
pub mod tracking;
pub mod transaction;
pub mod views;

mod validation;

pub use caching::{invalidate, CachePolicies, CacheTag};
pub use commands::{
    CreateOwner, CreateProperty, CreatePropertyImages, DeletePropertyImage, SellProperty,
    UpdateOwnerPhoto, UpdateProperty,
};
pub use context::PropertyContext;
pub use dispatcher::{Dispatcher, Request, RequestHandler};
pub use error::PropertyError;
pub use image::{ImageUpload, PropertyImage};
pub use owner::{Owner, OwnerProfile};
pub use ports::{
    OwnerRepository, PropertyFilter, PropertyImageRepository, PropertyRepository,
    TransactionManager, UnitOfWork,
};
pub use property::{NewProperty, Property, PropertyChanges};
pub use queries::{GetAllOwners, GetOwnerById, GetPropertyById, GetPropertyImage, ListProperties};
pub use trace::{NewPropertyTrace, PropertyTrace};
pub use tracking::{EntityState, Tracked};
pub use transaction::execute_in_transaction;
pub use views::{
    ImageUploadReport, OwnerDetails, OwnerSummary, OwnerView, PriceUpdate, PropertyDetails,
    PropertyImageView, PropertyListItem, PropertyPage, SaleReceipt,
};

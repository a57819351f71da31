//! Repository implementations
//!
//! Each repository owns the SQL for one table group and maps rows into
//! domain types. Reads run on the pool; the functions taking a
//! `&mut PgConnection` are the writes and locking reads a unit of work
//! performs inside its transaction.

pub mod identity;
pub mod image;
pub mod owner;
pub mod property;
pub mod trace;

pub use identity::UserRepository;
pub use image::ImageRepository;
pub use owner::OwnerRepository;
pub use property::PropertyRepository;
pub use trace::TraceRepository;

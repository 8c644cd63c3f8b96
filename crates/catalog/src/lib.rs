//! Owner-scoped materials catalog.
//!
//! This crate provides:
//! - The `Material` record and its owner/identifier newtypes
//! - Validation of user-supplied material fields
//! - The `CatalogStore` trait consumed by the recommendation engine
//! - In-memory and JSON-file backed store implementations

pub mod error;
pub mod model;
mod schema;
pub mod store;

pub use error::{CatalogError, ValidationError};
pub use model::{Material, MaterialId, NewMaterial, OwnerId, DEFAULT_CATEGORY};
pub use store::{CatalogStore, MemCatalogStore, StateCatalogStore};

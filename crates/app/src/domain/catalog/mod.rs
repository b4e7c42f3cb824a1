//! Catalog
//!
//! Products, add-on items and charges: the priced things an order can carry.

pub mod data;
pub mod errors;
pub mod records;
pub(crate) mod repositories;
pub mod service;

pub use errors::CatalogServiceError;
pub use service::*;

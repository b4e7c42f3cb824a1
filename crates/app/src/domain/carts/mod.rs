//! Carts
//!
//! Product lines and add-on item / charge memberships of an order, kept in step with the
//! order's price record.

pub mod errors;
mod read_model;
pub mod records;
pub(crate) mod repositories;
pub mod service;

pub use errors::CartsServiceError;
pub use service::*;

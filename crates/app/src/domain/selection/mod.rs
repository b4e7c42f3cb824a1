//! Selected Order
//!
//! The single "order currently being edited" pointer. All writes go through one
//! coordinator task, so check-then-set decisions never interleave.

mod coordinator;
pub mod errors;
mod repository;
pub mod service;

pub use errors::SelectionError;
pub use service::*;

//! Bistro Domain Concerns

pub mod carts;
pub mod catalog;
pub mod ledger;
pub mod orders;
pub mod selection;

//! Point-of-sale order data layer: catalog, orders, carts, price records and the selected
//! order.

pub mod config;
pub mod context;
pub mod database;
pub mod domain;
pub mod errors;
pub mod ids;
pub mod observability;

#[cfg(test)]
mod test;

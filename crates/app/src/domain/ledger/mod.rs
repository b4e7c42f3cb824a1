//! Price Ledger
//!
//! Keeps each order's `{base, discount, total}` price record in step with its cart lines,
//! add-on items and charges by applying signed deltas instead of re-summing the order.

pub mod errors;
mod price_ledger;
pub mod pricing;
pub mod records;
mod repository;

pub use errors::LedgerError;
pub use price_ledger::PriceLedger;

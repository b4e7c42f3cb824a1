//! Catalog Records

use jiff::Timestamp;
use serde::Serialize;

use crate::ids::TypedId;

/// Product Id
pub type ProductId = TypedId<ProductRecord>;

/// Product Record
#[derive(Debug, Clone, Serialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: String,
    pub price: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Add-on Item Id
pub type AddOnItemId = TypedId<AddOnItemRecord>;

/// Add-on Item Record
///
/// A non-applicable add-on item is free to the customer: its price is booked as
/// discount as well as base.
#[derive(Debug, Clone, Serialize)]
pub struct AddOnItemRecord {
    pub id: AddOnItemId,
    pub name: String,
    pub price: u64,
    pub is_applicable: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Charge Id
pub type ChargeId = TypedId<ChargeRecord>;

/// Charge Record
#[derive(Debug, Clone, Serialize)]
pub struct ChargeRecord {
    pub id: ChargeId,
    pub name: String,
    pub price: u64,
    pub is_applicable: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

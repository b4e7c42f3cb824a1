//! Cart Records

use jiff::Timestamp;
use serde::Serialize;

use crate::domain::{
    catalog::records::{AddOnItemId, ChargeId, ProductId},
    ledger::records::PriceRecord,
    orders::records::{OrderId, OrderRecord},
};

/// One `(product, quantity)` line of an order. Quantity is always at least one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineRecord {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Add-on item attached to an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOnMembershipRecord {
    pub order_id: OrderId,
    pub add_on_item_id: AddOnItemId,
    pub created_at: Timestamp,
}

/// Charge attached to an order.
///
/// `complimentary` memberships were auto-included when the order was created and are
/// booked as both base and discount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeMembershipRecord {
    pub order_id: OrderId,
    pub charge_id: ChargeId,
    pub complimentary: bool,
    pub created_at: Timestamp,
}

/// Cart line resolved against the current catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: u64,
    pub quantity: u32,
    pub line_total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartAddOnItem {
    pub add_on_item_id: AddOnItemId,
    pub name: String,
    pub price: u64,
    pub is_applicable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartCharge {
    pub charge_id: ChargeId,
    pub name: String,
    pub price: u64,
    pub complimentary: bool,
}

/// Immutable, denormalised view of an order's cart.
#[derive(Debug, Clone, Serialize)]
pub struct CartSnapshot {
    pub order: OrderRecord,
    pub price: PriceRecord,
    pub lines: Vec<CartLine>,
    pub add_on_items: Vec<CartAddOnItem>,
    pub charges: Vec<CartCharge>,
    pub item_count: u64,
}

/// Outcome of toggling an add-on item or charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MembershipToggle {
    /// Whether the item is attached after the toggle.
    pub included: bool,
    pub price: PriceRecord,
}

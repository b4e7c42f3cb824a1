//! Order Records

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::Timestamp;
use serde::Serialize;

use crate::ids::TypedId;

/// Order Id
pub type OrderId = TypedId<OrderRecord>;

/// Customer, owned by the customer directory.
#[derive(Debug)]
pub struct Customer;

/// Customer Id
pub type CustomerId = TypedId<Customer>;

/// Delivery address, owned by the customer directory.
#[derive(Debug)]
pub struct Address;

/// Address Id
pub type AddressId = TypedId<Address>;

/// Delivery partner (aggregator or in-house rider pool).
#[derive(Debug)]
pub struct DeliveryPartner;

/// Delivery Partner Id
pub type DeliveryPartnerId = TypedId<DeliveryPartner>;

/// Where the order is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    DineIn,
    DineOut,
}

impl OrderType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DineIn => "dine_in",
            Self::DineOut => "dine_out",
        }
    }
}

impl Display for OrderType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dine_in" => Ok(Self::DineIn),
            "dine_out" => Ok(Self::DineOut),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Order lifecycle status. Only processing orders are editable or selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Processing,
    Placed,
}

impl OrderStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Placed => "placed",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(Self::Processing),
            "placed" => Ok(Self::Placed),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// A stored enum column held a value this build does not know.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown variant `{0}`")]
pub struct UnknownVariant(pub String);

/// Order Record
#[derive(Debug, Clone, Serialize)]
pub struct OrderRecord {
    pub id: OrderId,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub charges_included: bool,
    pub customer: Option<CustomerId>,
    pub address: Option<AddressId>,
    pub delivery_partner: Option<DeliveryPartnerId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl OrderRecord {
    #[must_use]
    pub fn is_editable(&self) -> bool {
        self.status == OrderStatus::Processing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_type_round_trips_through_column_text() {
        for order_type in [OrderType::DineIn, OrderType::DineOut] {
            assert_eq!(order_type.as_str().parse::<OrderType>(), Ok(order_type));
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        let result = "cancelled".parse::<OrderStatus>();

        assert_eq!(result, Err(UnknownVariant("cancelled".to_string())));
    }
}

//! Order Data

use crate::domain::orders::records::{AddressId, CustomerId, DeliveryPartnerId, OrderType};

/// New Order Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub order_type: OrderType,

    /// Auto-include applicable charges when the order is dine-out.
    pub charges_included: bool,
    pub customer: Option<CustomerId>,
    pub address: Option<AddressId>,
    pub delivery_partner: Option<DeliveryPartnerId>,
}

impl NewOrder {
    #[must_use]
    pub fn dine_in() -> Self {
        Self {
            order_type: OrderType::DineIn,
            charges_included: false,
            customer: None,
            address: None,
            delivery_partner: None,
        }
    }

    #[must_use]
    pub fn dine_out(charges_included: bool) -> Self {
        Self {
            order_type: OrderType::DineOut,
            charges_included,
            customer: None,
            address: None,
            delivery_partner: None,
        }
    }

    /// Dine-in orders never carry a customer or address.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        is_consistent(self.order_type, self.customer, self.address)
    }
}

/// Order Update Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderUpdate {
    pub order_type: OrderType,
    pub customer: Option<CustomerId>,
    pub address: Option<AddressId>,
    pub delivery_partner: Option<DeliveryPartnerId>,
}

impl OrderUpdate {
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        is_consistent(self.order_type, self.customer, self.address)
    }
}

fn is_consistent(
    order_type: OrderType,
    customer: Option<CustomerId>,
    address: Option<AddressId>,
) -> bool {
    order_type == OrderType::DineOut || (customer.is_none() && address.is_none())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dine_in_with_customer_is_inconsistent() {
        let order = NewOrder {
            customer: Some(CustomerId::from_i64(7)),
            ..NewOrder::dine_in()
        };

        assert!(!order.is_consistent());
    }

    #[test]
    fn dine_out_may_carry_customer_and_address() {
        let order = NewOrder {
            customer: Some(CustomerId::from_i64(7)),
            address: Some(AddressId::from_i64(3)),
            ..NewOrder::dine_out(true)
        };

        assert!(order.is_consistent());
    }
}

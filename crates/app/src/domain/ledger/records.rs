//! Price Records

use serde::Serialize;

use crate::domain::{
    ledger::{errors::LedgerError, pricing::PriceDelta},
    orders::records::OrderId,
};

/// Cached price breakdown of one order.
///
/// `total_price == base_price - discount_price` and `base_price >= discount_price` hold for
/// every record that can be constructed through [`PriceRecord::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceRecord {
    pub order_id: OrderId,
    pub base_price: u64,
    pub discount_price: u64,
    pub total_price: u64,
}

impl PriceRecord {
    #[must_use]
    pub const fn zero(order_id: OrderId) -> Self {
        Self {
            order_id,
            base_price: 0,
            discount_price: 0,
            total_price: 0,
        }
    }

    /// The record after `delta`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NegativeBalance`] if any field would drop below zero or the
    /// discount would exceed the base.
    pub fn apply(&self, delta: PriceDelta) -> Result<Self, LedgerError> {
        let base_price = self
            .base_price
            .checked_add_signed(delta.base)
            .ok_or(LedgerError::NegativeBalance)?;

        let discount_price = self
            .discount_price
            .checked_add_signed(delta.discount)
            .ok_or(LedgerError::NegativeBalance)?;

        let total_price = base_price
            .checked_sub(discount_price)
            .ok_or(LedgerError::NegativeBalance)?;

        Ok(Self {
            order_id: self.order_id,
            base_price,
            discount_price,
            total_price,
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn apply_keeps_total_equal_to_base_minus_discount() -> TestResult {
        let record = PriceRecord::zero(OrderId::from_i64(1)).apply(PriceDelta {
            base: 280,
            discount: 80,
        })?;

        assert_eq!(record.total_price, 200);

        let record = record.apply(PriceDelta {
            base: -30,
            discount: -30,
        })?;

        assert_eq!(
            (record.base_price, record.discount_price, record.total_price),
            (250, 50, 200)
        );

        Ok(())
    }

    #[test]
    fn apply_rejects_discount_above_base() {
        let result = PriceRecord::zero(OrderId::from_i64(1)).apply(PriceDelta {
            base: 10,
            discount: 20,
        });

        assert!(
            matches!(result, Err(LedgerError::NegativeBalance)),
            "expected NegativeBalance, got {result:?}"
        );
    }

    #[test]
    fn apply_rejects_negative_base() {
        let result = PriceRecord::zero(OrderId::from_i64(1)).apply(PriceDelta {
            base: -1,
            discount: 0,
        });

        assert!(
            matches!(result, Err(LedgerError::NegativeBalance)),
            "expected NegativeBalance, got {result:?}"
        );
    }
}

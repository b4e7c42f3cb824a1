//! Pricing rules
//!
//! The single place where an item's membership change is turned into a price delta.

use std::ops::Add;

use crate::domain::ledger::errors::LedgerError;

/// Something whose price contributes to an order's price record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricedItem {
    /// One unit of a product line.
    ProductUnit { price: u64 },

    /// A non-applicable add-on is free to the customer: booked as base and discount.
    AddOnItem { price: u64, is_applicable: bool },

    /// A complimentary charge was auto-included at order creation and nets to zero.
    Charge { price: u64, complimentary: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipAction {
    Add,
    Remove,
}

/// Signed change to a price record. The total always moves by `base - discount`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriceDelta {
    pub base: i64,
    pub discount: i64,
}

impl PriceDelta {
    pub const ZERO: Self = Self {
        base: 0,
        discount: 0,
    };

    #[must_use]
    pub const fn total(self) -> i64 {
        self.base - self.discount
    }

    /// Repeats the delta `times` times, e.g. for a line with quantity > 1.
    #[must_use]
    pub fn checked_times(self, times: u32) -> Option<Self> {
        let times = i64::from(times);

        Some(Self {
            base: self.base.checked_mul(times)?,
            discount: self.discount.checked_mul(times)?,
        })
    }

    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        Some(Self {
            base: self.base.checked_add(other.base)?,
            discount: self.discount.checked_add(other.discount)?,
        })
    }
}

impl Add for PriceDelta {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            base: self.base + other.base,
            discount: self.discount + other.discount,
        }
    }
}

/// Price delta caused by adding or removing `item`.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidPrice`] when the price does not fit a signed amount.
pub fn contribution(item: PricedItem, action: MembershipAction) -> Result<PriceDelta, LedgerError> {
    let (price, discounted) = match item {
        PricedItem::ProductUnit { price } => (price, false),
        PricedItem::AddOnItem {
            price,
            is_applicable,
        } => (price, !is_applicable),
        PricedItem::Charge {
            price,
            complimentary,
        } => (price, complimentary),
    };

    let amount = i64::try_from(price)?;

    let amount = match action {
        MembershipAction::Add => amount,
        MembershipAction::Remove => -amount,
    };

    Ok(PriceDelta {
        base: amount,
        discount: if discounted { amount } else { 0 },
    })
}

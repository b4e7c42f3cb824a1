//! Price Ledger operations.
//!
//! Every operation runs on the caller's connection so that it commits or rolls back
//! together with the membership change that caused it.

use jiff::Timestamp;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::domain::{
    carts::{
        records::ChargeMembershipRecord,
        repositories::{
            SqliteAddOnMembershipsRepository, SqliteCartLinesRepository,
            SqliteChargeMembershipsRepository,
        },
    },
    catalog::{
        records::{AddOnItemId, ChargeId, ProductId},
        repositories::{
            SqliteAddOnItemsRepository, SqliteChargesRepository, SqliteProductsRepository,
        },
    },
    ledger::{
        errors::LedgerError,
        pricing::{MembershipAction, PriceDelta, PricedItem, contribution},
        records::PriceRecord,
        repository::SqlitePriceRecordsRepository,
    },
    orders::records::{OrderId, OrderRecord, OrderType},
};

#[derive(Debug, Clone, Default)]
pub struct PriceLedger {
    price_records: SqlitePriceRecordsRepository,
    products: SqliteProductsRepository,
    add_on_items: SqliteAddOnItemsRepository,
    charges: SqliteChargesRepository,
    lines: SqliteCartLinesRepository,
    add_on_memberships: SqliteAddOnMembershipsRepository,
    charge_memberships: SqliteChargeMembershipsRepository,
}

impl PriceLedger {
    #[must_use]
    pub fn new() -> Self {
        Self {
            price_records: SqlitePriceRecordsRepository::new(),
            products: SqliteProductsRepository::new(),
            add_on_items: SqliteAddOnItemsRepository::new(),
            charges: SqliteChargesRepository::new(),
            lines: SqliteCartLinesRepository::new(),
            add_on_memberships: SqliteAddOnMembershipsRepository::new(),
            charge_memberships: SqliteChargeMembershipsRepository::new(),
        }
    }

    /// Writes the initial price record of a freshly created order.
    ///
    /// When the order is dine-out with charges included, every applicable charge is attached
    /// as a complimentary membership: added to base and discount alike, netting to zero.
    pub(crate) async fn seed(
        &self,
        conn: &mut SqliteConnection,
        order: &OrderRecord,
    ) -> Result<PriceRecord, LedgerError> {
        let mut delta = PriceDelta::ZERO;

        if order.charges_included && order.order_type == OrderType::DineOut {
            let now = Timestamp::now();

            for charge in self.charges.list_applicable_charges(&mut *conn).await? {
                self.charge_memberships
                    .create_membership(&mut *conn, order.id, charge.id, true, now)
                    .await?;

                let item = PricedItem::Charge {
                    price: charge.price,
                    complimentary: true,
                };

                delta = delta
                    .checked_add(contribution(item, MembershipAction::Add)?)
                    .ok_or(LedgerError::NegativeBalance)?;
            }
        }

        let record = PriceRecord::zero(order.id).apply(delta)?;

        let record = self
            .price_records
            .create_price_record(&mut *conn, &record)
            .await?;

        debug!(order_id = %order.id, base_price = record.base_price, "seeded price record");

        Ok(record)
    }

    pub(crate) async fn add_product_line(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
        product: ProductId,
    ) -> Result<PriceRecord, LedgerError> {
        self.product_unit(conn, order, product, MembershipAction::Add)
            .await
    }

    pub(crate) async fn remove_product_line(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
        product: ProductId,
    ) -> Result<PriceRecord, LedgerError> {
        self.product_unit(conn, order, product, MembershipAction::Remove)
            .await
    }

    pub(crate) async fn add_add_on_item(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
        item: AddOnItemId,
    ) -> Result<PriceRecord, LedgerError> {
        self.add_on_item(conn, order, item, MembershipAction::Add)
            .await
    }

    pub(crate) async fn remove_add_on_item(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
        item: AddOnItemId,
    ) -> Result<PriceRecord, LedgerError> {
        self.add_on_item(conn, order, item, MembershipAction::Remove)
            .await
    }

    pub(crate) async fn add_charge(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
        charge: ChargeId,
    ) -> Result<PriceRecord, LedgerError> {
        self.charge(conn, order, charge, false, MembershipAction::Add)
            .await
    }

    /// Reverses the contribution the membership was booked with.
    pub(crate) async fn remove_charge(
        &self,
        conn: &mut SqliteConnection,
        membership: &ChargeMembershipRecord,
    ) -> Result<PriceRecord, LedgerError> {
        self.charge(
            conn,
            membership.order_id,
            membership.charge_id,
            membership.complimentary,
            MembershipAction::Remove,
        )
        .await
    }

    pub(crate) async fn price_record(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
    ) -> Result<PriceRecord, LedgerError> {
        self.price_records
            .find_price_record(conn, order)
            .await?
            .ok_or(LedgerError::PriceRecordNotFound(order))
    }

    /// Sums every line, add-on item and charge of the order at current catalog prices.
    pub(crate) async fn from_scratch(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
    ) -> Result<PriceRecord, LedgerError> {
        let mut delta = PriceDelta::ZERO;

        for line in self.lines.list_lines(&mut *conn, order).await? {
            let unit = contribution(
                PricedItem::ProductUnit {
                    price: line.unit_price,
                },
                MembershipAction::Add,
            )?;

            delta = unit
                .checked_times(line.quantity)
                .and_then(|line_delta| delta.checked_add(line_delta))
                .ok_or(LedgerError::NegativeBalance)?;
        }

        for item in self
            .add_on_memberships
            .list_add_on_items(&mut *conn, order)
            .await?
        {
            let item = PricedItem::AddOnItem {
                price: item.price,
                is_applicable: item.is_applicable,
            };

            delta = delta
                .checked_add(contribution(item, MembershipAction::Add)?)
                .ok_or(LedgerError::NegativeBalance)?;
        }

        for charge in self
            .charge_memberships
            .list_charges(&mut *conn, order)
            .await?
        {
            let item = PricedItem::Charge {
                price: charge.price,
                complimentary: charge.complimentary,
            };

            delta = delta
                .checked_add(contribution(item, MembershipAction::Add)?)
                .ok_or(LedgerError::NegativeBalance)?;
        }

        PriceRecord::zero(order).apply(delta)
    }

    /// Replaces the cached record with a from-scratch sum.
    pub(crate) async fn recalculate(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
    ) -> Result<PriceRecord, LedgerError> {
        let record = self.from_scratch(&mut *conn, order).await?;

        self.price_records
            .replace_price_record(&mut *conn, &record)
            .await?
            .ok_or(LedgerError::PriceRecordNotFound(order))
    }

    async fn product_unit(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
        product: ProductId,
        action: MembershipAction,
    ) -> Result<PriceRecord, LedgerError> {
        let product = self
            .products
            .find_product(&mut *conn, product)
            .await?
            .ok_or(LedgerError::NotFound("product"))?;

        let item = PricedItem::ProductUnit {
            price: product.price,
        };

        self.apply(conn, order, contribution(item, action)?).await
    }

    async fn add_on_item(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
        item: AddOnItemId,
        action: MembershipAction,
    ) -> Result<PriceRecord, LedgerError> {
        let item = self
            .add_on_items
            .find_add_on_item(&mut *conn, item)
            .await?
            .ok_or(LedgerError::NotFound("add-on item"))?;

        let item = PricedItem::AddOnItem {
            price: item.price,
            is_applicable: item.is_applicable,
        };

        self.apply(conn, order, contribution(item, action)?).await
    }

    async fn charge(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
        charge: ChargeId,
        complimentary: bool,
        action: MembershipAction,
    ) -> Result<PriceRecord, LedgerError> {
        let charge = self
            .charges
            .find_charge(&mut *conn, charge)
            .await?
            .ok_or(LedgerError::NotFound("charge"))?;

        let item = PricedItem::Charge {
            price: charge.price,
            complimentary,
        };

        self.apply(conn, order, contribution(item, action)?).await
    }

    /// Checks the delta against the current record, then applies it in one statement.
    async fn apply(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
        delta: PriceDelta,
    ) -> Result<PriceRecord, LedgerError> {
        let current = self.price_record(&mut *conn, order).await?;

        current.apply(delta)?;

        let record = self
            .price_records
            .apply_delta(&mut *conn, order, delta)
            .await?
            .ok_or(LedgerError::PriceRecordNotFound(order))?;

        debug!(
            order_id = %order,
            base_delta = delta.base,
            discount_delta = delta.discount,
            total_price = record.total_price,
            "applied price delta"
        );

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use testresult::TestResult;

    use crate::{
        domain::orders::{data::NewOrder, repository::SqliteOrdersRepository},
        errors::FailureKind,
        test::TestContext,
    };

    use super::*;

    #[tokio::test]
    async fn seed_books_applicable_charges_as_complimentary() -> TestResult {
        let ctx = TestContext::new().await;
        ctx.charge("Packing", 50, true).await;
        ctx.charge("Corkage", 100, false).await;

        let mut conn = ctx.db.pool().acquire().await?;
        let order = SqliteOrdersRepository::new()
            .create_order(&mut conn, &NewOrder::dine_out(true), Timestamp::now())
            .await?;

        let record = PriceLedger::new().seed(&mut conn, &order).await?;

        assert_eq!(record.base_price, 50);
        assert_eq!(record.discount_price, 50);
        assert_eq!(record.total_price, 0);

        Ok(())
    }

    #[tokio::test]
    async fn delta_without_price_record_is_not_found_and_writes_nothing() -> TestResult {
        let ctx = TestContext::new().await;
        let naan = ctx.product("Naan", 40).await;

        let mut conn = ctx.db.pool().acquire().await?;
        let order = SqliteOrdersRepository::new()
            .create_order(&mut conn, &NewOrder::dine_in(), Timestamp::now())
            .await?;

        let result = PriceLedger::new()
            .add_product_line(&mut conn, order.id, naan.id)
            .await;

        let Err(error) = result else {
            panic!("ledger delta without a record should fail");
        };

        assert!(matches!(error, LedgerError::PriceRecordNotFound(id) if id == order.id));
        assert_eq!(error.kind(), FailureKind::NotFound);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM price_records")
            .fetch_one(&mut *conn)
            .await?;

        assert_eq!(count, 0);

        Ok(())
    }

    #[tokio::test]
    async fn recalculate_without_price_record_is_not_found() -> TestResult {
        let ctx = TestContext::new().await;

        let mut conn = ctx.db.pool().acquire().await?;
        let order = SqliteOrdersRepository::new()
            .create_order(&mut conn, &NewOrder::dine_in(), Timestamp::now())
            .await?;

        let result = PriceLedger::new().recalculate(&mut conn, order.id).await;

        assert!(
            matches!(result, Err(LedgerError::PriceRecordNotFound(_))),
            "expected PriceRecordNotFound, got {result:?}"
        );

        Ok(())
    }
}

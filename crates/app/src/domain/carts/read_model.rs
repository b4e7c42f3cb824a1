//! Cart read model.
//!
//! Builds a [`CartSnapshot`] from independent reads issued concurrently, each on its own
//! pooled connection.

use sqlx::{Sqlite, pool::PoolConnection};

use crate::{
    database::Db,
    domain::{
        carts::{
            errors::CartsServiceError,
            records::{CartAddOnItem, CartCharge, CartLine, CartSnapshot},
            repositories::{
                SqliteAddOnMembershipsRepository, SqliteCartLinesRepository,
                SqliteChargeMembershipsRepository,
            },
        },
        ledger::{PriceLedger, records::PriceRecord},
        orders::{
            records::{OrderId, OrderRecord},
            repository::SqliteOrdersRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub(crate) struct SqliteCartReadModel {
    db: Db,
    orders: SqliteOrdersRepository,
    ledger: PriceLedger,
    lines: SqliteCartLinesRepository,
    add_on_memberships: SqliteAddOnMembershipsRepository,
    charge_memberships: SqliteChargeMembershipsRepository,
}

impl SqliteCartReadModel {
    #[must_use]
    pub(crate) fn new(db: Db) -> Self {
        Self {
            db,
            orders: SqliteOrdersRepository::new(),
            ledger: PriceLedger::new(),
            lines: SqliteCartLinesRepository::new(),
            add_on_memberships: SqliteAddOnMembershipsRepository::new(),
            charge_memberships: SqliteChargeMembershipsRepository::new(),
        }
    }

    pub(crate) async fn snapshot(&self, order: OrderId) -> Result<CartSnapshot, CartsServiceError> {
        let (order, price, lines, add_on_items, charges) = tokio::try_join!(
            self.order(order),
            self.price(order),
            self.lines(order),
            self.add_on_items(order),
            self.charges(order),
        )?;

        let item_count = lines.iter().map(|line| u64::from(line.quantity)).sum();

        Ok(CartSnapshot {
            order,
            price,
            lines,
            add_on_items,
            charges,
            item_count,
        })
    }

    async fn connection(&self) -> Result<PoolConnection<Sqlite>, CartsServiceError> {
        Ok(self.db.pool().acquire().await?)
    }

    async fn order(&self, order: OrderId) -> Result<OrderRecord, CartsServiceError> {
        let mut conn = self.connection().await?;

        self.orders
            .find_order(&mut conn, order)
            .await?
            .ok_or(CartsServiceError::OrderNotFound)
    }

    async fn price(&self, order: OrderId) -> Result<PriceRecord, CartsServiceError> {
        let mut conn = self.connection().await?;

        Ok(self.ledger.price_record(&mut conn, order).await?)
    }

    async fn lines(&self, order: OrderId) -> Result<Vec<CartLine>, CartsServiceError> {
        let mut conn = self.connection().await?;

        Ok(self.lines.list_lines(&mut conn, order).await?)
    }

    async fn add_on_items(&self, order: OrderId) -> Result<Vec<CartAddOnItem>, CartsServiceError> {
        let mut conn = self.connection().await?;

        Ok(self
            .add_on_memberships
            .list_add_on_items(&mut conn, order)
            .await?)
    }

    async fn charges(&self, order: OrderId) -> Result<Vec<CartCharge>, CartsServiceError> {
        let mut conn = self.connection().await?;

        Ok(self.charge_memberships.list_charges(&mut conn, order).await?)
    }
}

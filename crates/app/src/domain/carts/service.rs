//! Carts service.

use std::hash::Hash;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rustc_hash::FxHashSet;
use sqlx::SqliteConnection;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        carts::{
            errors::CartsServiceError,
            read_model::SqliteCartReadModel,
            records::{CartSnapshot, MembershipToggle},
            repositories::{
                SqliteAddOnMembershipsRepository, SqliteCartLinesRepository,
                SqliteChargeMembershipsRepository,
            },
        },
        catalog::records::{AddOnItemId, ChargeId, ProductId},
        ledger::{PriceLedger, records::PriceRecord},
        orders::{
            records::{OrderId, OrderRecord},
            repository::SqliteOrdersRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub struct SqliteCartsService {
    db: Db,
    orders: SqliteOrdersRepository,
    lines: SqliteCartLinesRepository,
    add_on_memberships: SqliteAddOnMembershipsRepository,
    charge_memberships: SqliteChargeMembershipsRepository,
    ledger: PriceLedger,
    read_model: SqliteCartReadModel,
}

impl SqliteCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            read_model: SqliteCartReadModel::new(db.clone()),
            db,
            orders: SqliteOrdersRepository::new(),
            lines: SqliteCartLinesRepository::new(),
            add_on_memberships: SqliteAddOnMembershipsRepository::new(),
            charge_memberships: SqliteChargeMembershipsRepository::new(),
            ledger: PriceLedger::new(),
        }
    }

    /// Loads the order and rejects it unless it is still processing.
    async fn editable_order(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
    ) -> Result<OrderRecord, CartsServiceError> {
        let record = self
            .orders
            .find_order(conn, order)
            .await?
            .ok_or(CartsServiceError::OrderNotFound)?;

        if !record.is_editable() {
            return Err(CartsServiceError::OrderPlaced(order));
        }

        Ok(record)
    }

    async fn touch(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
        now: Timestamp,
    ) -> Result<(), CartsServiceError> {
        self.orders.touch_order(conn, order, now).await?;

        Ok(())
    }

    async fn attach_add_on_item(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
        item: AddOnItemId,
        now: Timestamp,
    ) -> Result<PriceRecord, CartsServiceError> {
        let price = self.ledger.add_add_on_item(&mut *conn, order, item).await?;

        self.add_on_memberships
            .create_membership(&mut *conn, order, item, now)
            .await?;

        Ok(price)
    }

    async fn detach_add_on_item(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
        item: AddOnItemId,
    ) -> Result<PriceRecord, CartsServiceError> {
        self.add_on_memberships
            .delete_membership(&mut *conn, order, item)
            .await?;

        Ok(self
            .ledger
            .remove_add_on_item(&mut *conn, order, item)
            .await?)
    }

    async fn attach_charge(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
        charge: ChargeId,
        now: Timestamp,
    ) -> Result<PriceRecord, CartsServiceError> {
        let price = self.ledger.add_charge(&mut *conn, order, charge).await?;

        self.charge_memberships
            .create_membership(&mut *conn, order, charge, false, now)
            .await?;

        Ok(price)
    }

    async fn detach_charge(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
        charge: ChargeId,
    ) -> Result<Option<PriceRecord>, CartsServiceError> {
        let Some(membership) = self
            .charge_memberships
            .find_membership(&mut *conn, order, charge)
            .await?
        else {
            return Ok(None);
        };

        self.charge_memberships
            .delete_membership(&mut *conn, order, charge)
            .await?;

        let price = self.ledger.remove_charge(&mut *conn, &membership).await?;

        Ok(Some(price))
    }
}

/// Ids in `desired` but not in `current`, then ids in `current` but not in `desired`, each
/// sorted so that the resulting operations are applied in a stable order.
fn membership_diff<T: Copy + Ord + Hash>(
    current: &FxHashSet<T>,
    desired: &FxHashSet<T>,
) -> (Vec<T>, Vec<T>) {
    let mut added: Vec<T> = desired.difference(current).copied().collect();
    let mut removed: Vec<T> = current.difference(desired).copied().collect();

    added.sort_unstable();
    removed.sort_unstable();

    (added, removed)
}

#[async_trait]
impl CartsService for SqliteCartsService {
    #[tracing::instrument(
        name = "carts.service.add_product",
        skip(self),
        fields(order_id = %order, product_id = %product),
        err
    )]
    async fn add_product(
        &self,
        order: OrderId,
        product: ProductId,
    ) -> Result<PriceRecord, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;
        let now = Timestamp::now();

        self.editable_order(&mut tx, order).await?;

        let price = self.ledger.add_product_line(&mut tx, order, product).await?;

        match self.lines.find_line(&mut tx, order, product).await? {
            Some(line) => {
                let quantity = line
                    .quantity
                    .checked_add(1)
                    .ok_or(CartsServiceError::QuantityOverflow)?;

                self.lines
                    .set_quantity(&mut tx, order, product, quantity, now)
                    .await?
                    .ok_or(CartsServiceError::LineNotFound)?;
            }
            None => {
                self.lines.create_line(&mut tx, order, product, now).await?;
            }
        }

        self.touch(&mut tx, order, now).await?;

        tx.commit().await?;

        info!(total_price = price.total_price, "added product");

        Ok(price)
    }

    #[tracing::instrument(
        name = "carts.service.remove_product",
        skip(self),
        fields(order_id = %order, product_id = %product),
        err
    )]
    async fn remove_product(
        &self,
        order: OrderId,
        product: ProductId,
    ) -> Result<PriceRecord, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;
        let now = Timestamp::now();

        self.editable_order(&mut tx, order).await?;

        let line = self
            .lines
            .find_line(&mut tx, order, product)
            .await?
            .ok_or(CartsServiceError::LineNotFound)?;

        if line.quantity > 1 {
            self.lines
                .set_quantity(&mut tx, order, product, line.quantity - 1, now)
                .await?;
        } else {
            self.lines.delete_line(&mut tx, order, product).await?;
        }

        let price = self
            .ledger
            .remove_product_line(&mut tx, order, product)
            .await?;

        self.touch(&mut tx, order, now).await?;

        tx.commit().await?;

        info!(total_price = price.total_price, "removed product");

        Ok(price)
    }

    #[tracing::instrument(
        name = "carts.service.toggle_add_on_item",
        skip(self),
        fields(order_id = %order, add_on_item_id = %item),
        err
    )]
    async fn toggle_add_on_item(
        &self,
        order: OrderId,
        item: AddOnItemId,
    ) -> Result<MembershipToggle, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;
        let now = Timestamp::now();

        self.editable_order(&mut tx, order).await?;

        let attached = self
            .add_on_memberships
            .find_membership(&mut tx, order, item)
            .await?
            .is_some();

        let price = if attached {
            self.detach_add_on_item(&mut tx, order, item).await?
        } else {
            self.attach_add_on_item(&mut tx, order, item, now).await?
        };

        self.touch(&mut tx, order, now).await?;

        tx.commit().await?;

        info!(included = !attached, total_price = price.total_price, "toggled add-on item");

        Ok(MembershipToggle {
            included: !attached,
            price,
        })
    }

    #[tracing::instrument(
        name = "carts.service.toggle_charge",
        skip(self),
        fields(order_id = %order, charge_id = %charge),
        err
    )]
    async fn toggle_charge(
        &self,
        order: OrderId,
        charge: ChargeId,
    ) -> Result<MembershipToggle, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;
        let now = Timestamp::now();

        self.editable_order(&mut tx, order).await?;

        let (included, price) = match self.detach_charge(&mut tx, order, charge).await? {
            Some(price) => (false, price),
            None => (true, self.attach_charge(&mut tx, order, charge, now).await?),
        };

        self.touch(&mut tx, order, now).await?;

        tx.commit().await?;

        info!(included, total_price = price.total_price, "toggled charge");

        Ok(MembershipToggle { included, price })
    }

    #[tracing::instrument(
        name = "carts.service.replace_add_on_items",
        skip(self, items),
        fields(order_id = %order, desired = items.len()),
        err
    )]
    async fn replace_add_on_items(
        &self,
        order: OrderId,
        items: Vec<AddOnItemId>,
    ) -> Result<PriceRecord, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;
        let now = Timestamp::now();

        self.editable_order(&mut tx, order).await?;

        let current: FxHashSet<AddOnItemId> = self
            .add_on_memberships
            .list_add_on_items(&mut tx, order)
            .await?
            .into_iter()
            .map(|item| item.add_on_item_id)
            .collect();

        let desired: FxHashSet<AddOnItemId> = items.into_iter().collect();

        let (added, removed) = membership_diff(&current, &desired);

        for item in &added {
            self.attach_add_on_item(&mut tx, order, *item, now).await?;
        }

        for item in &removed {
            self.detach_add_on_item(&mut tx, order, *item).await?;
        }

        if !added.is_empty() || !removed.is_empty() {
            self.touch(&mut tx, order, now).await?;
        }

        let price = self.ledger.price_record(&mut tx, order).await?;

        tx.commit().await?;

        info!(
            added = added.len(),
            removed = removed.len(),
            total_price = price.total_price,
            "replaced add-on items"
        );

        Ok(price)
    }

    #[tracing::instrument(
        name = "carts.service.replace_charges",
        skip(self, charges),
        fields(order_id = %order, desired = charges.len()),
        err
    )]
    async fn replace_charges(
        &self,
        order: OrderId,
        charges: Vec<ChargeId>,
    ) -> Result<PriceRecord, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;
        let now = Timestamp::now();

        self.editable_order(&mut tx, order).await?;

        let current: FxHashSet<ChargeId> = self
            .charge_memberships
            .list_charges(&mut tx, order)
            .await?
            .into_iter()
            .map(|charge| charge.charge_id)
            .collect();

        let desired: FxHashSet<ChargeId> = charges.into_iter().collect();

        let (added, removed) = membership_diff(&current, &desired);

        for charge in &added {
            self.attach_charge(&mut tx, order, *charge, now).await?;
        }

        for charge in &removed {
            self.detach_charge(&mut tx, order, *charge).await?;
        }

        if !added.is_empty() || !removed.is_empty() {
            self.touch(&mut tx, order, now).await?;
        }

        let price = self.ledger.price_record(&mut tx, order).await?;

        tx.commit().await?;

        info!(
            added = added.len(),
            removed = removed.len(),
            total_price = price.total_price,
            "replaced charges"
        );

        Ok(price)
    }

    async fn get_cart(&self, order: OrderId) -> Result<CartSnapshot, CartsServiceError> {
        self.read_model.snapshot(order).await
    }

    async fn price_record(&self, order: OrderId) -> Result<PriceRecord, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let price = self.ledger.price_record(&mut tx, order).await?;

        tx.commit().await?;

        Ok(price)
    }

    #[tracing::instrument(
        name = "carts.service.recalculate",
        skip(self),
        fields(order_id = %order),
        err
    )]
    async fn recalculate(&self, order: OrderId) -> Result<PriceRecord, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        self.orders
            .find_order(&mut tx, order)
            .await?
            .ok_or(CartsServiceError::OrderNotFound)?;

        let price = self.ledger.recalculate(&mut tx, order).await?;

        tx.commit().await?;

        info!(total_price = price.total_price, "recalculated price record");

        Ok(price)
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Adds one unit of `product`, creating the line on first add.
    async fn add_product(
        &self,
        order: OrderId,
        product: ProductId,
    ) -> Result<PriceRecord, CartsServiceError>;

    /// Removes one unit of `product`, deleting the line once its quantity reaches zero.
    async fn remove_product(
        &self,
        order: OrderId,
        product: ProductId,
    ) -> Result<PriceRecord, CartsServiceError>;

    /// Attaches the add-on item if absent, detaches it otherwise.
    async fn toggle_add_on_item(
        &self,
        order: OrderId,
        item: AddOnItemId,
    ) -> Result<MembershipToggle, CartsServiceError>;

    /// Attaches the charge if absent, detaches it otherwise.
    async fn toggle_charge(
        &self,
        order: OrderId,
        charge: ChargeId,
    ) -> Result<MembershipToggle, CartsServiceError>;

    /// Makes the attached add-on items exactly `items`. Duplicates are ignored.
    async fn replace_add_on_items(
        &self,
        order: OrderId,
        items: Vec<AddOnItemId>,
    ) -> Result<PriceRecord, CartsServiceError>;

    /// Makes the attached charges exactly `charges`. Duplicates are ignored.
    async fn replace_charges(
        &self,
        order: OrderId,
        charges: Vec<ChargeId>,
    ) -> Result<PriceRecord, CartsServiceError>;

    async fn get_cart(&self, order: OrderId) -> Result<CartSnapshot, CartsServiceError>;

    async fn price_record(&self, order: OrderId) -> Result<PriceRecord, CartsServiceError>;

    /// Rebuilds the price record from the cart contents at current catalog prices.
    async fn recalculate(&self, order: OrderId) -> Result<PriceRecord, CartsServiceError>;
}

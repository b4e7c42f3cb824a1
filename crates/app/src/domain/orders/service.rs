//! Orders service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::{
        ledger::PriceLedger,
        orders::{
            data::{NewOrder, OrderUpdate},
            errors::OrdersServiceError,
            records::{OrderId, OrderRecord, OrderStatus},
            repository::SqliteOrdersRepository,
        },
        selection::SelectionService,
    },
};

#[derive(Clone)]
pub struct SqliteOrdersService {
    db: Db,
    orders: SqliteOrdersRepository,
    ledger: PriceLedger,
    selection: Arc<dyn SelectionService>,
}

impl SqliteOrdersService {
    #[must_use]
    pub fn new(db: Db, selection: Arc<dyn SelectionService>) -> Self {
        Self {
            db,
            orders: SqliteOrdersRepository::new(),
            ledger: PriceLedger::new(),
            selection,
        }
    }

    /// Selecting a created or updated order runs after its own commit. A failure is logged
    /// and left for the next reconcile.
    async fn select(&self, order: OrderId) {
        if let Err(error) = self.selection.select(order).await {
            warn!(order_id = %order, %error, "failed to select order");
        }
    }
}

#[async_trait]
impl OrdersService for SqliteOrdersService {
    #[tracing::instrument(
        name = "orders.service.create_order",
        skip(self, order),
        fields(order_type = %order.order_type, charges_included = order.charges_included),
        err
    )]
    async fn create_order(&self, order: NewOrder) -> Result<OrderRecord, OrdersServiceError> {
        if !order.is_consistent() {
            return Err(OrdersServiceError::Inconsistent);
        }

        let mut tx = self.db.begin_transaction().await?;

        let created = self
            .orders
            .create_order(&mut tx, &order, Timestamp::now())
            .await?;

        let price = self.ledger.seed(&mut tx, &created).await?;

        tx.commit().await?;

        info!(
            order_id = %created.id,
            base_price = price.base_price,
            discount_price = price.discount_price,
            "created order"
        );

        self.select(created.id).await;

        Ok(created)
    }

    #[tracing::instrument(
        name = "orders.service.update_order",
        skip(self, update),
        fields(order_id = %order),
        err
    )]
    async fn update_order(
        &self,
        order: OrderId,
        update: OrderUpdate,
    ) -> Result<OrderRecord, OrdersServiceError> {
        if !update.is_consistent() {
            return Err(OrdersServiceError::Inconsistent);
        }

        let mut tx = self.db.begin_transaction().await?;

        let current = self
            .orders
            .find_order(&mut tx, order)
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        if !current.is_editable() {
            return Err(OrdersServiceError::AlreadyPlaced(order));
        }

        let updated = self
            .orders
            .update_order(&mut tx, order, &update, Timestamp::now())
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        tx.commit().await?;

        info!(order_id = %order, "updated order");

        self.select(order).await;

        Ok(updated)
    }

    async fn get_order(&self, order: OrderId) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self
            .orders
            .find_order(&mut tx, order)
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        tx.commit().await?;

        Ok(record)
    }

    async fn list_orders(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        if let Err(error) = self.selection.reconcile().await {
            warn!(%error, "failed to reconcile selected order");
        }

        let mut tx = self.db.begin_transaction().await?;

        let orders = self.orders.list_orders(&mut tx, status).await?;

        tx.commit().await?;

        Ok(orders)
    }

    #[tracing::instrument(
        name = "orders.service.place_order",
        skip(self),
        fields(order_id = %order),
        err
    )]
    async fn place_order(&self, order: OrderId) -> Result<OrderRecord, OrdersServiceError> {
        let placed = self.selection.place_order(order).await?;

        info!(order_id = %order, "placed order");

        Ok(placed)
    }

    #[tracing::instrument(
        name = "orders.service.delete_order",
        skip(self),
        fields(order_id = %order),
        err
    )]
    async fn delete_order(&self, order: OrderId) -> Result<(), OrdersServiceError> {
        self.selection.delete_order(order).await?;

        info!(order_id = %order, "deleted order");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Creates a processing order, seeds its price record and selects it.
    async fn create_order(&self, order: NewOrder) -> Result<OrderRecord, OrdersServiceError>;

    /// Changes the attributes of a processing order and selects it.
    async fn update_order(
        &self,
        order: OrderId,
        update: OrderUpdate,
    ) -> Result<OrderRecord, OrdersServiceError>;

    async fn get_order(&self, order: OrderId) -> Result<OrderRecord, OrdersServiceError>;

    /// Orders, most recently modified first.
    async fn list_orders(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// Moves a processing order to placed and moves the selection off it in the same
    /// transaction. Placed orders are immutable.
    async fn place_order(&self, order: OrderId) -> Result<OrderRecord, OrdersServiceError>;

    /// Deletes the order together with its lines, memberships and price record, re-pointing
    /// the selection in the same transaction.
    async fn delete_order(&self, order: OrderId) -> Result<(), OrdersServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::{
            carts::CartsService,
            orders::records::{AddressId, CustomerId, OrderType},
            selection::{MockSelectionService, SelectionError},
        },
        errors::FailureKind,
        test::TestContext,
    };

    use super::*;

    #[tokio::test]
    async fn create_dine_in_order_seeds_zero_price_record() -> TestResult {
        let ctx = TestContext::new().await;
        ctx.charge("Service", 50, true).await;

        let order = ctx.orders.create_order(NewOrder::dine_in()).await?;
        let price = ctx.carts.price_record(order.id).await?;

        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.order_type, OrderType::DineIn);
        assert_eq!(
            (price.base_price, price.discount_price, price.total_price),
            (0, 0, 0)
        );

        Ok(())
    }

    #[tokio::test]
    async fn dine_in_ignores_charges_included_flag() -> TestResult {
        let ctx = TestContext::new().await;
        ctx.charge("Service", 50, true).await;

        let order = ctx
            .orders
            .create_order(NewOrder {
                charges_included: true,
                ..NewOrder::dine_in()
            })
            .await?;

        let cart = ctx.carts.get_cart(order.id).await?;

        assert!(cart.charges.is_empty());
        assert_eq!(cart.price.base_price, 0);

        Ok(())
    }

    #[tokio::test]
    async fn dine_out_with_charges_included_seeds_applicable_charges_as_discount() -> TestResult {
        let ctx = TestContext::new().await;
        let packing = ctx.charge("Packing", 50, true).await;
        ctx.charge("Delivery", 30, true).await;
        ctx.charge("Corkage", 100, false).await;

        let order = ctx.orders.create_order(NewOrder::dine_out(true)).await?;
        let cart = ctx.carts.get_cart(order.id).await?;

        assert_eq!(
            (cart.price.base_price, cart.price.discount_price, cart.price.total_price),
            (80, 80, 0)
        );
        assert_eq!(cart.charges.len(), 2);
        assert!(cart.charges.iter().all(|charge| charge.complimentary));
        assert!(
            cart.charges
                .iter()
                .any(|charge| charge.charge_id == packing.id)
        );

        Ok(())
    }

    #[tokio::test]
    async fn dine_out_without_charges_included_seeds_nothing() -> TestResult {
        let ctx = TestContext::new().await;
        ctx.charge("Packing", 50, true).await;

        let order = ctx.orders.create_order(NewOrder::dine_out(false)).await?;
        let price = ctx.carts.price_record(order.id).await?;

        assert_eq!(price.base_price, 0);

        Ok(())
    }

    #[tokio::test]
    async fn create_dine_in_with_customer_is_invalid_state() {
        let ctx = TestContext::new().await;

        let result = ctx
            .orders
            .create_order(NewOrder {
                customer: Some(CustomerId::from_i64(4)),
                ..NewOrder::dine_in()
            })
            .await;

        let Err(error) = result else {
            panic!("dine-in order with a customer should be rejected");
        };

        assert!(matches!(error, OrdersServiceError::Inconsistent));
        assert_eq!(error.kind(), FailureKind::InvalidState);
    }

    #[tokio::test]
    async fn create_order_selects_it() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.orders.create_order(NewOrder::dine_in()).await?;
        let second = ctx.orders.create_order(NewOrder::dine_out(false)).await?;

        assert_eq!(ctx.selection.current().await?, Some(second.id));

        Ok(())
    }

    #[tokio::test]
    async fn update_order_switches_type_and_selects_it() -> TestResult {
        let ctx = TestContext::new().await;
        let first = ctx.dine_in_order().await;
        ctx.dine_in_order().await;

        let updated = ctx
            .orders
            .update_order(
                first.id,
                OrderUpdate {
                    order_type: OrderType::DineOut,
                    customer: Some(CustomerId::from_i64(9)),
                    address: Some(AddressId::from_i64(2)),
                    delivery_partner: None,
                },
            )
            .await?;

        assert_eq!(updated.order_type, OrderType::DineOut);
        assert_eq!(updated.customer, Some(CustomerId::from_i64(9)));
        assert!(updated.updated_at >= first.updated_at);
        assert_eq!(ctx.selection.current().await?, Some(first.id));

        Ok(())
    }

    #[tokio::test]
    async fn update_placed_order_is_invalid_state() -> TestResult {
        let ctx = TestContext::new().await;
        let order = ctx.dine_in_order().await;

        ctx.orders.place_order(order.id).await?;

        let result = ctx
            .orders
            .update_order(
                order.id,
                OrderUpdate {
                    order_type: OrderType::DineOut,
                    customer: None,
                    address: None,
                    delivery_partner: None,
                },
            )
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::AlreadyPlaced(_))),
            "expected AlreadyPlaced, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn place_order_twice_is_invalid_state() -> TestResult {
        let ctx = TestContext::new().await;
        let order = ctx.dine_in_order().await;

        let placed = ctx.orders.place_order(order.id).await?;

        assert_eq!(placed.status, OrderStatus::Placed);

        let Err(error) = ctx.orders.place_order(order.id).await else {
            panic!("placing twice should fail");
        };

        assert_eq!(error.kind(), FailureKind::InvalidState);

        Ok(())
    }

    #[tokio::test]
    async fn get_unknown_order_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.orders.get_order(OrderId::from_i64(404)).await;

        assert!(
            matches!(result, Err(OrdersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn delete_order_removes_cart_and_price_record() -> TestResult {
        let ctx = TestContext::new().await;
        let burger = ctx.product("Burger", 120).await;
        let order = ctx.dine_in_order().await;

        ctx.carts.add_product(order.id, burger.id).await?;
        ctx.orders.delete_order(order.id).await?;

        let price = ctx.carts.price_record(order.id).await;

        assert!(price.is_err(), "price record should be gone");
        assert!(matches!(
            ctx.orders.get_order(order.id).await,
            Err(OrdersServiceError::NotFound)
        ));

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cart_lines")
            .fetch_one(ctx.db.pool())
            .await?;

        assert_eq!(remaining, 0);

        Ok(())
    }

    #[tokio::test]
    async fn delete_unknown_order_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.orders.delete_order(OrderId::from_i64(8)).await;

        assert!(matches!(result, Err(OrdersServiceError::NotFound)));
    }

    #[tokio::test]
    async fn list_orders_filters_by_status_newest_first() -> TestResult {
        let ctx = TestContext::new().await;
        let first = ctx.dine_in_order().await;
        let second = ctx.dine_in_order().await;
        let third = ctx.dine_in_order().await;

        ctx.orders.place_order(second.id).await?;

        let processing = ctx
            .orders
            .list_orders(Some(OrderStatus::Processing))
            .await?;
        let ids: Vec<_> = processing.iter().map(|order| order.id).collect();

        assert_eq!(ids, vec![third.id, first.id]);
        assert_eq!(ctx.orders.list_orders(None).await?.len(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn create_order_asks_selection_to_select_it() -> TestResult {
        let ctx = TestContext::new().await;

        let mut selection = MockSelectionService::new();

        selection
            .expect_select()
            .times(1)
            .returning(|order| Ok(order));

        let orders = SqliteOrdersService::new(ctx.db.clone(), Arc::new(selection));

        orders.create_order(NewOrder::dine_in()).await?;

        Ok(())
    }

    #[tokio::test]
    async fn selection_failure_after_create_keeps_committed_order() -> TestResult {
        let ctx = TestContext::new().await;

        let mut selection = MockSelectionService::new();

        selection
            .expect_select()
            .returning(|_| Err(SelectionError::Unavailable));

        let orders = SqliteOrdersService::new(ctx.db.clone(), Arc::new(selection));

        let order = orders.create_order(NewOrder::dine_in()).await?;

        assert_eq!(orders.get_order(order.id).await?.status, OrderStatus::Processing);

        Ok(())
    }

    #[tokio::test]
    async fn unavailable_coordinator_leaves_order_processing_and_selected() -> TestResult {
        let ctx = TestContext::new().await;
        let order = ctx.dine_in_order().await;

        assert_eq!(ctx.selection.current().await?, Some(order.id));

        let mut selection = MockSelectionService::new();

        selection
            .expect_place_order()
            .times(1)
            .returning(|_| Err(SelectionError::Unavailable));

        let orders = SqliteOrdersService::new(ctx.db.clone(), Arc::new(selection));

        let Err(error) = orders.place_order(order.id).await else {
            panic!("placing without a coordinator should fail");
        };

        assert_eq!(error.kind(), FailureKind::PersistenceFailure);
        assert_eq!(
            ctx.orders.get_order(order.id).await?.status,
            OrderStatus::Processing
        );
        assert_eq!(ctx.selection.current().await?, Some(order.id));

        Ok(())
    }

    #[tokio::test]
    async fn placing_the_selected_order_never_leaves_pointer_on_it() -> TestResult {
        let ctx = TestContext::new().await;
        let order = ctx.dine_in_order().await;

        ctx.orders.place_order(order.id).await?;

        let selected = ctx.selection.current().await?;

        assert_ne!(selected, Some(order.id));
        assert_eq!(selected, None);

        Ok(())
    }

    #[tokio::test]
    async fn list_orders_reconciles_selection_first() -> TestResult {
        let ctx = TestContext::new().await;

        let mut selection = MockSelectionService::new();

        selection.expect_reconcile().times(1).returning(|| Ok(None));

        let orders = SqliteOrdersService::new(ctx.db.clone(), Arc::new(selection));

        assert!(orders.list_orders(None).await?.is_empty());

        Ok(())
    }
}

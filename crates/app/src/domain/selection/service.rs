//! Selection service.

use async_trait::async_trait;
use mockall::automock;
use tokio::sync::{mpsc, oneshot};

use crate::{
    database::Db,
    domain::{
        orders::records::{OrderId, OrderRecord},
        selection::{
            coordinator::{Reply, SelectionCoordinator, SelectionRequest},
            errors::SelectionError,
        },
    },
};

const COORDINATOR_BUFFER: usize = 64;

/// Handle to the selection coordinator task.
#[derive(Debug, Clone)]
pub struct SqliteSelectionService {
    sender: mpsc::Sender<SelectionRequest>,
}

impl SqliteSelectionService {
    /// Spawn the coordinator on the current tokio runtime. It stops once every handle is
    /// dropped.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    #[must_use]
    pub fn spawn(db: Db) -> Self {
        let (coordinator, sender) = SelectionCoordinator::new(db, COORDINATOR_BUFFER);

        tokio::spawn(coordinator.run());

        Self { sender }
    }

    async fn request<T>(
        &self,
        request: impl FnOnce(Reply<T>) -> SelectionRequest,
    ) -> Result<T, SelectionError> {
        let (respond_to, response) = oneshot::channel();

        self.sender
            .send(request(respond_to))
            .await
            .map_err(|_closed| SelectionError::Unavailable)?;

        response
            .await
            .map_err(|_dropped| SelectionError::Unavailable)?
    }
}

#[async_trait]
impl SelectionService for SqliteSelectionService {
    async fn current(&self) -> Result<Option<OrderId>, SelectionError> {
        self.request(|respond_to| SelectionRequest::Current { respond_to })
            .await
    }

    #[tracing::instrument(
        name = "selection.service.select",
        skip(self),
        fields(order_id = %order),
        err
    )]
    async fn select(&self, order: OrderId) -> Result<OrderId, SelectionError> {
        self.request(|respond_to| SelectionRequest::Select { order, respond_to })
            .await
    }

    async fn place_order(&self, order: OrderId) -> Result<OrderRecord, SelectionError> {
        self.request(|respond_to| SelectionRequest::Place { order, respond_to })
            .await
    }

    async fn delete_order(&self, order: OrderId) -> Result<(), SelectionError> {
        self.request(|respond_to| SelectionRequest::Delete { order, respond_to })
            .await
    }

    async fn reconcile(&self) -> Result<Option<OrderId>, SelectionError> {
        self.request(|respond_to| SelectionRequest::Reconcile { respond_to })
            .await
    }
}

/// The "currently selected order" pointer.
///
/// Whenever present it names a processing order.
#[automock]
#[async_trait]
pub trait SelectionService: Send + Sync {
    /// The selected order, if any.
    async fn current(&self) -> Result<Option<OrderId>, SelectionError>;

    /// Selects a created or updated order. Placed orders cannot be selected.
    async fn select(&self, order: OrderId) -> Result<OrderId, SelectionError>;

    /// Moves a processing order to placed and re-points the selection, atomically.
    async fn place_order(&self, order: OrderId) -> Result<OrderRecord, SelectionError>;

    /// Deletes the order (cascading to its cart) and re-points the selection, atomically.
    async fn delete_order(&self, order: OrderId) -> Result<(), SelectionError>;

    /// Heals a missing or stale selection on app resume or list view.
    async fn reconcile(&self) -> Result<Option<OrderId>, SelectionError>;
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use testresult::TestResult;

    use crate::{
        domain::{
            orders::{
                OrdersService, records::OrderStatus, repository::SqliteOrdersRepository,
            },
            selection::repository::SqliteSelectionRepository,
        },
        errors::FailureKind,
        test::TestContext,
    };

    use super::*;

    #[tokio::test]
    async fn select_processing_order_sets_pointer() -> TestResult {
        let ctx = TestContext::new().await;
        let first = ctx.dine_in_order().await;
        ctx.dine_in_order().await;

        ctx.selection.select(first.id).await?;

        assert_eq!(ctx.selection.current().await?, Some(first.id));

        Ok(())
    }

    #[tokio::test]
    async fn select_placed_order_is_rejected_and_leaves_pointer() -> TestResult {
        let ctx = TestContext::new().await;
        let placed = ctx.dine_in_order().await;
        let open = ctx.dine_in_order().await;

        ctx.orders.place_order(placed.id).await?;
        ctx.selection.select(open.id).await?;

        let result = ctx.selection.select(placed.id).await;

        let Err(error) = result else {
            panic!("selecting a placed order should fail");
        };

        assert!(
            matches!(error, SelectionError::OrderPlaced(id) if id == placed.id),
            "expected OrderPlaced, got {error:?}"
        );
        assert_eq!(error.kind(), FailureKind::InvalidState);
        assert_eq!(ctx.selection.current().await?, Some(open.id));

        Ok(())
    }

    #[tokio::test]
    async fn select_unknown_order_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.selection.select(OrderId::from_i64(77)).await;

        assert!(
            matches!(result, Err(SelectionError::OrderNotFound(_))),
            "expected OrderNotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn placing_moves_selection_to_latest_processing_then_clears() -> TestResult {
        let ctx = TestContext::new().await;
        let older = ctx.dine_in_order().await;
        let newer = ctx.dine_in_order().await;

        tokio::time::sleep(Duration::from_millis(2)).await;
        ctx.touch_order(newer.id).await;

        assert_eq!(ctx.selection.current().await?, Some(newer.id));

        ctx.orders.place_order(newer.id).await?;

        assert_eq!(ctx.selection.current().await?, Some(older.id));

        ctx.orders.delete_order(older.id).await?;

        assert_eq!(ctx.selection.current().await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn most_recently_modified_order_wins_over_newer_id() -> TestResult {
        let ctx = TestContext::new().await;
        let older = ctx.dine_in_order().await;
        let newer = ctx.dine_in_order().await;
        let placed = ctx.dine_in_order().await;

        tokio::time::sleep(Duration::from_millis(2)).await;
        ctx.touch_order(older.id).await;

        ctx.selection.place_order(placed.id).await?;

        let selected = ctx.selection.current().await?;

        assert_eq!(selected, Some(older.id));
        assert_ne!(selected, Some(newer.id));

        Ok(())
    }

    #[tokio::test]
    async fn place_order_flips_status_and_pointer_together() -> TestResult {
        let ctx = TestContext::new().await;
        let order = ctx.dine_in_order().await;

        assert_eq!(ctx.selection.current().await?, Some(order.id));

        let placed = ctx.selection.place_order(order.id).await?;

        assert_eq!(placed.status, OrderStatus::Placed);
        assert_eq!(ctx.selection.current().await?, None);

        let result = ctx.selection.place_order(order.id).await;

        assert!(
            matches!(result, Err(SelectionError::OrderPlaced(id)) if id == order.id),
            "expected OrderPlaced, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn delete_unknown_order_leaves_selection() -> TestResult {
        let ctx = TestContext::new().await;
        let order = ctx.dine_in_order().await;

        let result = ctx.selection.delete_order(OrderId::from_i64(99)).await;

        assert!(
            matches!(result, Err(SelectionError::OrderNotFound(_))),
            "expected OrderNotFound, got {result:?}"
        );
        assert_eq!(ctx.selection.current().await?, Some(order.id));

        Ok(())
    }

    #[tokio::test]
    async fn reconcile_populates_missing_selection() -> TestResult {
        let ctx = TestContext::new().await;
        let order = ctx.dine_in_order().await;

        let mut conn = ctx.db.pool().acquire().await?;
        SqliteSelectionRepository::new().clear(&mut conn).await?;
        drop(conn);

        assert_eq!(ctx.selection.current().await?, None);
        assert_eq!(ctx.selection.reconcile().await?, Some(order.id));
        assert_eq!(ctx.selection.current().await?, Some(order.id));

        Ok(())
    }

    #[tokio::test]
    async fn reconcile_replaces_pointer_to_order_placed_elsewhere() -> TestResult {
        let ctx = TestContext::new().await;
        let other = ctx.dine_in_order().await;
        let selected = ctx.dine_in_order().await;

        let mut conn = ctx.db.pool().acquire().await?;
        SqliteOrdersRepository::new()
            .set_status(&mut conn, selected.id, OrderStatus::Placed, jiff::Timestamp::now())
            .await?;
        drop(conn);

        assert_eq!(ctx.selection.current().await?, Some(selected.id));
        assert_eq!(ctx.selection.reconcile().await?, Some(other.id));

        Ok(())
    }

    #[tokio::test]
    async fn reconcile_without_candidates_stays_empty() -> TestResult {
        let ctx = TestContext::new().await;

        assert_eq!(ctx.selection.reconcile().await?, None);
        assert_eq!(ctx.selection.current().await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_requests_are_serialized() -> TestResult {
        let ctx = TestContext::new().await;
        let a = ctx.dine_in_order().await;
        let b = ctx.dine_in_order().await;

        let (first, second, reconciled) = tokio::join!(
            ctx.selection.select(a.id),
            ctx.selection.select(b.id),
            ctx.selection.reconcile(),
        );

        first?;
        second?;

        let current = ctx.selection.current().await?;

        assert!(current == Some(a.id) || current == Some(b.id));
        assert!(reconciled?.is_some());

        Ok(())
    }
}

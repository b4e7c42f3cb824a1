//! Selection coordinator task.

use jiff::Timestamp;
use sqlx::SqliteConnection;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::{
    database::Db,
    domain::{
        orders::{
            records::{OrderId, OrderRecord, OrderStatus},
            repository::SqliteOrdersRepository,
        },
        selection::{errors::SelectionError, repository::SqliteSelectionRepository},
    },
};

pub(crate) type Reply<T> = oneshot::Sender<Result<T, SelectionError>>;

#[derive(Debug)]
pub(crate) enum SelectionRequest {
    Current {
        respond_to: Reply<Option<OrderId>>,
    },
    Select {
        order: OrderId,
        respond_to: Reply<OrderId>,
    },
    Place {
        order: OrderId,
        respond_to: Reply<OrderRecord>,
    },
    Delete {
        order: OrderId,
        respond_to: Reply<()>,
    },
    Reconcile {
        respond_to: Reply<Option<OrderId>>,
    },
}

/// Sole writer of the selected-order row. Requests are handled one at a time, each in
/// its own transaction. Placing and deleting an order happen here too, so the order leaves
/// PROCESSING in the same transaction that moves the pointer off it.
#[derive(Debug)]
pub(crate) struct SelectionCoordinator {
    receiver: mpsc::Receiver<SelectionRequest>,
    db: Db,
    selection: SqliteSelectionRepository,
    orders: SqliteOrdersRepository,
}

impl SelectionCoordinator {
    pub(crate) fn new(db: Db, buffer: usize) -> (Self, mpsc::Sender<SelectionRequest>) {
        let (sender, receiver) = mpsc::channel(buffer);

        let coordinator = Self {
            receiver,
            db,
            selection: SqliteSelectionRepository::new(),
            orders: SqliteOrdersRepository::new(),
        };

        (coordinator, sender)
    }

    pub(crate) async fn run(mut self) {
        while let Some(request) = self.receiver.recv().await {
            match request {
                SelectionRequest::Current { respond_to } => {
                    reply(respond_to, self.current().await);
                }
                SelectionRequest::Select { order, respond_to } => {
                    reply(respond_to, self.select(order).await);
                }
                SelectionRequest::Place { order, respond_to } => {
                    reply(respond_to, self.place(order).await);
                }
                SelectionRequest::Delete { order, respond_to } => {
                    reply(respond_to, self.delete(order).await);
                }
                SelectionRequest::Reconcile { respond_to } => {
                    reply(respond_to, self.reconcile().await);
                }
            }
        }

        debug!("selection coordinator stopped");
    }

    async fn current(&self) -> Result<Option<OrderId>, SelectionError> {
        let mut tx = self.db.begin_transaction().await?;

        let selected = self.selection.get(&mut tx).await?;

        tx.commit().await?;

        Ok(selected)
    }

    async fn select(&self, order: OrderId) -> Result<OrderId, SelectionError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self
            .orders
            .find_order(&mut tx, order)
            .await?
            .ok_or(SelectionError::OrderNotFound(order))?;

        if !record.is_editable() {
            return Err(SelectionError::OrderPlaced(order));
        }

        self.selection.set(&mut tx, order).await?;

        tx.commit().await?;

        info!(order_id = %order, "selected order");

        Ok(order)
    }

    async fn place(&self, order: OrderId) -> Result<OrderRecord, SelectionError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self
            .orders
            .find_order(&mut tx, order)
            .await?
            .ok_or(SelectionError::OrderNotFound(order))?;

        if !record.is_editable() {
            return Err(SelectionError::OrderPlaced(order));
        }

        let placed = self
            .orders
            .set_status(&mut tx, order, OrderStatus::Placed, Timestamp::now())
            .await?
            .ok_or(SelectionError::OrderNotFound(order))?;

        let selected = self.promote_latest(&mut tx).await?;

        tx.commit().await?;

        info!(placed = %order, selected = ?selected, "moved selection off placed order");

        Ok(placed)
    }

    async fn delete(&self, order: OrderId) -> Result<(), SelectionError> {
        let mut tx = self.db.begin_transaction().await?;

        if self.orders.delete_order(&mut tx, order).await? == 0 {
            return Err(SelectionError::OrderNotFound(order));
        }

        let selected = self.promote_latest(&mut tx).await?;

        tx.commit().await?;

        info!(deleted = %order, selected = ?selected, "moved selection off deleted order");

        Ok(())
    }

    async fn reconcile(&self) -> Result<Option<OrderId>, SelectionError> {
        let mut tx = self.db.begin_transaction().await?;

        let selected = match self.selection.get(&mut tx).await? {
            None => self.promote_latest(&mut tx).await?,
            Some(order) => {
                let still_editable = self
                    .orders
                    .find_order(&mut tx, order)
                    .await?
                    .is_some_and(|record| record.is_editable());

                if still_editable {
                    Some(order)
                } else {
                    self.promote_latest(&mut tx).await?
                }
            }
        };

        tx.commit().await?;

        Ok(selected)
    }

    async fn promote_latest(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<Option<OrderId>, SelectionError> {
        let candidate = self.orders.latest_processing_order(&mut *conn).await?;

        match candidate {
            Some(order) => self.selection.set(&mut *conn, order).await?,
            None => self.selection.clear(&mut *conn).await?,
        }

        Ok(candidate)
    }
}

fn reply<T>(respond_to: Reply<T>, result: Result<T, SelectionError>) {
    if respond_to.send(result).is_err() {
        debug!("selection requester went away before the reply");
    }
}

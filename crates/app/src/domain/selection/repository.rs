//! Selected Order Repository

use sqlx::{Sqlite, SqliteConnection, query, query_scalar};

use crate::domain::orders::records::OrderId;

const GET_SELECTED_ORDER_SQL: &str = include_str!("sql/get_selected_order.sql");
const SET_SELECTED_ORDER_SQL: &str = include_str!("sql/set_selected_order.sql");
const CLEAR_SELECTED_ORDER_SQL: &str = include_str!("sql/clear_selected_order.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct SqliteSelectionRepository;

impl SqliteSelectionRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<Option<OrderId>, sqlx::Error> {
        let id = query_scalar::<Sqlite, i64>(GET_SELECTED_ORDER_SQL)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(id.map(OrderId::from_i64))
    }

    pub(crate) async fn set(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
    ) -> Result<(), sqlx::Error> {
        query(SET_SELECTED_ORDER_SQL)
            .bind(order.into_i64())
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    pub(crate) async fn clear(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        query(CLEAR_SELECTED_ORDER_SQL).execute(&mut *conn).await?;

        Ok(())
    }
}

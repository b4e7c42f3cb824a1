//! Orders Repository

use std::str::FromStr;

use jiff::Timestamp;
use sqlx::{
    FromRow, Row, Sqlite, SqliteConnection, query, query_as, query_scalar, sqlite::SqliteRow,
};

use crate::{
    database::{timestamp_to_i64, try_get_timestamp},
    domain::orders::{
        data::{NewOrder, OrderUpdate},
        records::{
            AddressId, CustomerId, DeliveryPartnerId, OrderId, OrderRecord, OrderStatus, OrderType,
            UnknownVariant,
        },
    },
};

const GET_ORDER_SQL: &str = include_str!("sql/get_order.sql");
const LIST_ORDERS_SQL: &str = include_str!("sql/list_orders.sql");
const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const UPDATE_ORDER_SQL: &str = include_str!("sql/update_order.sql");
const SET_ORDER_STATUS_SQL: &str = include_str!("sql/set_order_status.sql");
const TOUCH_ORDER_SQL: &str = include_str!("sql/touch_order.sql");
const DELETE_ORDER_SQL: &str = include_str!("sql/delete_order.sql");
const LATEST_PROCESSING_ORDER_SQL: &str = include_str!("sql/latest_processing_order.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct SqliteOrdersRepository;

impl SqliteOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_order(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        query_as::<Sqlite, OrderRecord>(GET_ORDER_SQL)
            .bind(order.into_i64())
            .fetch_optional(&mut *conn)
            .await
    }

    /// Orders, most recently modified first.
    pub(crate) async fn list_orders(
        &self,
        conn: &mut SqliteConnection,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        query_as::<Sqlite, OrderRecord>(LIST_ORDERS_SQL)
            .bind(status.map(OrderStatus::as_str))
            .fetch_all(&mut *conn)
            .await
    }

    pub(crate) async fn create_order(
        &self,
        conn: &mut SqliteConnection,
        order: &NewOrder,
        now: Timestamp,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Sqlite, OrderRecord>(CREATE_ORDER_SQL)
            .bind(order.order_type.as_str())
            .bind(order.charges_included)
            .bind(order.customer.map(CustomerId::into_i64))
            .bind(order.address.map(AddressId::into_i64))
            .bind(order.delivery_partner.map(DeliveryPartnerId::into_i64))
            .bind(timestamp_to_i64(now))
            .fetch_one(&mut *conn)
            .await
    }

    pub(crate) async fn update_order(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
        update: &OrderUpdate,
        now: Timestamp,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        query_as::<Sqlite, OrderRecord>(UPDATE_ORDER_SQL)
            .bind(order.into_i64())
            .bind(update.order_type.as_str())
            .bind(update.customer.map(CustomerId::into_i64))
            .bind(update.address.map(AddressId::into_i64))
            .bind(update.delivery_partner.map(DeliveryPartnerId::into_i64))
            .bind(timestamp_to_i64(now))
            .fetch_optional(&mut *conn)
            .await
    }

    pub(crate) async fn set_status(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
        status: OrderStatus,
        now: Timestamp,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        query_as::<Sqlite, OrderRecord>(SET_ORDER_STATUS_SQL)
            .bind(order.into_i64())
            .bind(status.as_str())
            .bind(timestamp_to_i64(now))
            .fetch_optional(&mut *conn)
            .await
    }

    /// Marks the order as modified without changing any attribute.
    pub(crate) async fn touch_order(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
        now: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(TOUCH_ORDER_SQL)
            .bind(order.into_i64())
            .bind(timestamp_to_i64(now))
            .execute(&mut *conn)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Deletes the order; owned lines, memberships and the price record cascade.
    pub(crate) async fn delete_order(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_ORDER_SQL)
            .bind(order.into_i64())
            .execute(&mut *conn)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn latest_processing_order(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<Option<OrderId>, sqlx::Error> {
        let id = query_scalar::<Sqlite, i64>(LATEST_PROCESSING_ORDER_SQL)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(id.map(OrderId::from_i64))
    }
}

fn try_get_enum<T>(row: &SqliteRow, col: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = UnknownVariant>,
{
    let value: String = row.try_get(col)?;

    value.parse().map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, SqliteRow> for OrderRecord {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: OrderId::from_i64(row.try_get("id")?),
            order_type: try_get_enum::<OrderType>(row, "order_type")?,
            status: try_get_enum::<OrderStatus>(row, "status")?,
            charges_included: row.try_get("charges_included")?,
            customer: row
                .try_get::<Option<i64>, _>("customer_id")?
                .map(CustomerId::from_i64),
            address: row
                .try_get::<Option<i64>, _>("address_id")?
                .map(AddressId::from_i64),
            delivery_partner: row
                .try_get::<Option<i64>, _>("delivery_partner_id")?
                .map(DeliveryPartnerId::from_i64),
            created_at: try_get_timestamp(row, "created_at")?,
            updated_at: try_get_timestamp(row, "updated_at")?,
        })
    }
}

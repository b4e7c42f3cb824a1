//! Price Records Repository

use sqlx::{FromRow, Row, Sqlite, SqliteConnection, query_as, sqlite::SqliteRow};

use crate::{
    database::{amount_to_i64, try_get_amount},
    domain::{
        ledger::{pricing::PriceDelta, records::PriceRecord},
        orders::records::OrderId,
    },
};

const GET_PRICE_RECORD_SQL: &str = include_str!("sql/get_price_record.sql");
const CREATE_PRICE_RECORD_SQL: &str = include_str!("sql/create_price_record.sql");
const APPLY_PRICE_DELTA_SQL: &str = include_str!("sql/apply_price_delta.sql");
const REPLACE_PRICE_RECORD_SQL: &str = include_str!("sql/replace_price_record.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct SqlitePriceRecordsRepository;

impl SqlitePriceRecordsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_price_record(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
    ) -> Result<Option<PriceRecord>, sqlx::Error> {
        query_as::<Sqlite, PriceRecord>(GET_PRICE_RECORD_SQL)
            .bind(order.into_i64())
            .fetch_optional(&mut *conn)
            .await
    }

    pub(crate) async fn create_price_record(
        &self,
        conn: &mut SqliteConnection,
        record: &PriceRecord,
    ) -> Result<PriceRecord, sqlx::Error> {
        query_as::<Sqlite, PriceRecord>(CREATE_PRICE_RECORD_SQL)
            .bind(record.order_id.into_i64())
            .bind(amount_to_i64(record.base_price, "base_price")?)
            .bind(amount_to_i64(record.discount_price, "discount_price")?)
            .bind(amount_to_i64(record.total_price, "total_price")?)
            .fetch_one(&mut *conn)
            .await
    }

    /// Applies `delta` in a single statement; `None` when the order has no record.
    pub(crate) async fn apply_delta(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
        delta: PriceDelta,
    ) -> Result<Option<PriceRecord>, sqlx::Error> {
        query_as::<Sqlite, PriceRecord>(APPLY_PRICE_DELTA_SQL)
            .bind(order.into_i64())
            .bind(delta.base)
            .bind(delta.discount)
            .fetch_optional(&mut *conn)
            .await
    }

    pub(crate) async fn replace_price_record(
        &self,
        conn: &mut SqliteConnection,
        record: &PriceRecord,
    ) -> Result<Option<PriceRecord>, sqlx::Error> {
        query_as::<Sqlite, PriceRecord>(REPLACE_PRICE_RECORD_SQL)
            .bind(record.order_id.into_i64())
            .bind(amount_to_i64(record.base_price, "base_price")?)
            .bind(amount_to_i64(record.discount_price, "discount_price")?)
            .bind(amount_to_i64(record.total_price, "total_price")?)
            .fetch_optional(&mut *conn)
            .await
    }
}

impl<'r> FromRow<'r, SqliteRow> for PriceRecord {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            order_id: OrderId::from_i64(row.try_get("order_id")?),
            base_price: try_get_amount(row, "base_price")?,
            discount_price: try_get_amount(row, "discount_price")?,
            total_price: try_get_amount(row, "total_price")?,
        })
    }
}

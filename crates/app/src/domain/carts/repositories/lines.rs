//! Cart Lines Repository

use jiff::Timestamp;
use sqlx::{FromRow, Row, Sqlite, SqliteConnection, query, query_as, sqlite::SqliteRow};

use crate::{
    database::{timestamp_to_i64, try_get_amount, try_get_timestamp},
    domain::{
        carts::records::{CartLine, CartLineRecord},
        catalog::records::ProductId,
        orders::records::OrderId,
    },
};

const GET_CART_LINE_SQL: &str = include_str!("../sql/get_cart_line.sql");
const CREATE_CART_LINE_SQL: &str = include_str!("../sql/create_cart_line.sql");
const UPDATE_CART_LINE_QUANTITY_SQL: &str = include_str!("../sql/update_cart_line_quantity.sql");
const DELETE_CART_LINE_SQL: &str = include_str!("../sql/delete_cart_line.sql");
const LIST_CART_LINES_SQL: &str = include_str!("../sql/list_cart_lines.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct SqliteCartLinesRepository;

impl SqliteCartLinesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_line(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
        product: ProductId,
    ) -> Result<Option<CartLineRecord>, sqlx::Error> {
        query_as::<Sqlite, CartLineRecord>(GET_CART_LINE_SQL)
            .bind(order.into_i64())
            .bind(product.into_i64())
            .fetch_optional(&mut *conn)
            .await
    }

    /// Inserts a new line with quantity one.
    pub(crate) async fn create_line(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
        product: ProductId,
        now: Timestamp,
    ) -> Result<CartLineRecord, sqlx::Error> {
        query_as::<Sqlite, CartLineRecord>(CREATE_CART_LINE_SQL)
            .bind(order.into_i64())
            .bind(product.into_i64())
            .bind(timestamp_to_i64(now))
            .fetch_one(&mut *conn)
            .await
    }

    pub(crate) async fn set_quantity(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
        product: ProductId,
        quantity: u32,
        now: Timestamp,
    ) -> Result<Option<CartLineRecord>, sqlx::Error> {
        query_as::<Sqlite, CartLineRecord>(UPDATE_CART_LINE_QUANTITY_SQL)
            .bind(order.into_i64())
            .bind(product.into_i64())
            .bind(i64::from(quantity))
            .bind(timestamp_to_i64(now))
            .fetch_optional(&mut *conn)
            .await
    }

    pub(crate) async fn delete_line(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
        product: ProductId,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_LINE_SQL)
            .bind(order.into_i64())
            .bind(product.into_i64())
            .execute(&mut *conn)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Lines of the order with product names and current unit prices.
    pub(crate) async fn list_lines(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
    ) -> Result<Vec<CartLine>, sqlx::Error> {
        query_as::<Sqlite, CartLine>(LIST_CART_LINES_SQL)
            .bind(order.into_i64())
            .fetch_all(&mut *conn)
            .await
    }
}

fn try_get_quantity(row: &SqliteRow) -> Result<u32, sqlx::Error> {
    let quantity: i64 = row.try_get("quantity")?;

    u32::try_from(quantity).map_err(|e| sqlx::Error::ColumnDecode {
        index: "quantity".to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, SqliteRow> for CartLineRecord {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            order_id: OrderId::from_i64(row.try_get("order_id")?),
            product_id: ProductId::from_i64(row.try_get("product_id")?),
            quantity: try_get_quantity(row)?,
            created_at: try_get_timestamp(row, "created_at")?,
            updated_at: try_get_timestamp(row, "updated_at")?,
        })
    }
}

impl<'r> FromRow<'r, SqliteRow> for CartLine {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        let unit_price = try_get_amount(row, "unit_price")?;
        let quantity = try_get_quantity(row)?;

        let line_total = unit_price.checked_mul(u64::from(quantity)).ok_or_else(|| {
            sqlx::Error::Decode(format!("line total overflows: {unit_price} x {quantity}").into())
        })?;

        Ok(Self {
            product_id: ProductId::from_i64(row.try_get("product_id")?),
            name: row.try_get("name")?,
            unit_price,
            quantity,
            line_total,
        })
    }
}

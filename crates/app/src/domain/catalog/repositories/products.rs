//! Products Repository

use jiff::Timestamp;
use sqlx::{FromRow, Row, Sqlite, SqliteConnection, query, query_as, sqlite::SqliteRow};

use crate::{
    database::{amount_to_i64, timestamp_to_i64, try_get_amount, try_get_timestamp},
    domain::catalog::{
        data::NewProduct,
        records::{ProductId, ProductRecord},
    },
};

const LIST_PRODUCTS_SQL: &str = include_str!("../sql/list_products.sql");
const GET_PRODUCT_SQL: &str = include_str!("../sql/get_product.sql");
const CREATE_PRODUCT_SQL: &str = include_str!("../sql/create_product.sql");
const UPDATE_PRODUCT_PRICE_SQL: &str = include_str!("../sql/update_product_price.sql");
const DELETE_PRODUCT_SQL: &str = include_str!("../sql/delete_product.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct SqliteProductsRepository;

impl SqliteProductsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_products(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<Vec<ProductRecord>, sqlx::Error> {
        query_as::<Sqlite, ProductRecord>(LIST_PRODUCTS_SQL)
            .fetch_all(&mut *conn)
            .await
    }

    pub(crate) async fn find_product(
        &self,
        conn: &mut SqliteConnection,
        product: ProductId,
    ) -> Result<Option<ProductRecord>, sqlx::Error> {
        query_as::<Sqlite, ProductRecord>(GET_PRODUCT_SQL)
            .bind(product.into_i64())
            .fetch_optional(&mut *conn)
            .await
    }

    pub(crate) async fn create_product(
        &self,
        conn: &mut SqliteConnection,
        product: &NewProduct,
        now: Timestamp,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Sqlite, ProductRecord>(CREATE_PRODUCT_SQL)
            .bind(product.name.as_str())
            .bind(amount_to_i64(product.price, "price")?)
            .bind(timestamp_to_i64(now))
            .fetch_one(&mut *conn)
            .await
    }

    pub(crate) async fn update_product_price(
        &self,
        conn: &mut SqliteConnection,
        product: ProductId,
        price: u64,
        now: Timestamp,
    ) -> Result<Option<ProductRecord>, sqlx::Error> {
        query_as::<Sqlite, ProductRecord>(UPDATE_PRODUCT_PRICE_SQL)
            .bind(product.into_i64())
            .bind(amount_to_i64(price, "price")?)
            .bind(timestamp_to_i64(now))
            .fetch_optional(&mut *conn)
            .await
    }

    pub(crate) async fn delete_product(
        &self,
        conn: &mut SqliteConnection,
        product: ProductId,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_PRODUCT_SQL)
            .bind(product.into_i64())
            .execute(&mut *conn)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, SqliteRow> for ProductRecord {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: ProductId::from_i64(row.try_get("id")?),
            name: row.try_get("name")?,
            price: try_get_amount(row, "price")?,
            created_at: try_get_timestamp(row, "created_at")?,
            updated_at: try_get_timestamp(row, "updated_at")?,
        })
    }
}

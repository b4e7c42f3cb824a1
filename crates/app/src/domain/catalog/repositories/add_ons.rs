//! Add-on Items Repository

use jiff::Timestamp;
use sqlx::{FromRow, Row, Sqlite, SqliteConnection, query_as, sqlite::SqliteRow};

use crate::{
    database::{amount_to_i64, timestamp_to_i64, try_get_amount, try_get_timestamp},
    domain::catalog::{
        data::{AddOnItemUpdate, NewAddOnItem},
        records::{AddOnItemId, AddOnItemRecord},
    },
};

const LIST_ADD_ON_ITEMS_SQL: &str = include_str!("../sql/list_add_on_items.sql");
const GET_ADD_ON_ITEM_SQL: &str = include_str!("../sql/get_add_on_item.sql");
const CREATE_ADD_ON_ITEM_SQL: &str = include_str!("../sql/create_add_on_item.sql");
const UPDATE_ADD_ON_ITEM_SQL: &str = include_str!("../sql/update_add_on_item.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct SqliteAddOnItemsRepository;

impl SqliteAddOnItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_add_on_items(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<Vec<AddOnItemRecord>, sqlx::Error> {
        query_as::<Sqlite, AddOnItemRecord>(LIST_ADD_ON_ITEMS_SQL)
            .fetch_all(&mut *conn)
            .await
    }

    pub(crate) async fn find_add_on_item(
        &self,
        conn: &mut SqliteConnection,
        item: AddOnItemId,
    ) -> Result<Option<AddOnItemRecord>, sqlx::Error> {
        query_as::<Sqlite, AddOnItemRecord>(GET_ADD_ON_ITEM_SQL)
            .bind(item.into_i64())
            .fetch_optional(&mut *conn)
            .await
    }

    pub(crate) async fn create_add_on_item(
        &self,
        conn: &mut SqliteConnection,
        item: &NewAddOnItem,
        now: Timestamp,
    ) -> Result<AddOnItemRecord, sqlx::Error> {
        query_as::<Sqlite, AddOnItemRecord>(CREATE_ADD_ON_ITEM_SQL)
            .bind(item.name.as_str())
            .bind(amount_to_i64(item.price, "price")?)
            .bind(item.is_applicable)
            .bind(timestamp_to_i64(now))
            .fetch_one(&mut *conn)
            .await
    }

    pub(crate) async fn update_add_on_item(
        &self,
        conn: &mut SqliteConnection,
        item: AddOnItemId,
        update: &AddOnItemUpdate,
        now: Timestamp,
    ) -> Result<Option<AddOnItemRecord>, sqlx::Error> {
        query_as::<Sqlite, AddOnItemRecord>(UPDATE_ADD_ON_ITEM_SQL)
            .bind(item.into_i64())
            .bind(amount_to_i64(update.price, "price")?)
            .bind(update.is_applicable)
            .bind(timestamp_to_i64(now))
            .fetch_optional(&mut *conn)
            .await
    }
}

impl<'r> FromRow<'r, SqliteRow> for AddOnItemRecord {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: AddOnItemId::from_i64(row.try_get("id")?),
            name: row.try_get("name")?,
            price: try_get_amount(row, "price")?,
            is_applicable: row.try_get("is_applicable")?,
            created_at: try_get_timestamp(row, "created_at")?,
            updated_at: try_get_timestamp(row, "updated_at")?,
        })
    }
}

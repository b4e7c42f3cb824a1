//! Add-on Memberships Repository

use jiff::Timestamp;
use sqlx::{FromRow, Row, Sqlite, SqliteConnection, query, query_as, sqlite::SqliteRow};

use crate::{
    database::{timestamp_to_i64, try_get_amount, try_get_timestamp},
    domain::{
        carts::records::{AddOnMembershipRecord, CartAddOnItem},
        catalog::records::AddOnItemId,
        orders::records::OrderId,
    },
};

const GET_ORDER_ADD_ON_ITEM_SQL: &str = include_str!("../sql/get_order_add_on_item.sql");
const CREATE_ORDER_ADD_ON_ITEM_SQL: &str = include_str!("../sql/create_order_add_on_item.sql");
const DELETE_ORDER_ADD_ON_ITEM_SQL: &str = include_str!("../sql/delete_order_add_on_item.sql");
const LIST_ORDER_ADD_ON_ITEMS_SQL: &str = include_str!("../sql/list_order_add_on_items.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct SqliteAddOnMembershipsRepository;

impl SqliteAddOnMembershipsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_membership(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
        item: AddOnItemId,
    ) -> Result<Option<AddOnMembershipRecord>, sqlx::Error> {
        query_as::<Sqlite, AddOnMembershipRecord>(GET_ORDER_ADD_ON_ITEM_SQL)
            .bind(order.into_i64())
            .bind(item.into_i64())
            .fetch_optional(&mut *conn)
            .await
    }

    pub(crate) async fn create_membership(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
        item: AddOnItemId,
        now: Timestamp,
    ) -> Result<AddOnMembershipRecord, sqlx::Error> {
        query_as::<Sqlite, AddOnMembershipRecord>(CREATE_ORDER_ADD_ON_ITEM_SQL)
            .bind(order.into_i64())
            .bind(item.into_i64())
            .bind(timestamp_to_i64(now))
            .fetch_one(&mut *conn)
            .await
    }

    pub(crate) async fn delete_membership(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
        item: AddOnItemId,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_ORDER_ADD_ON_ITEM_SQL)
            .bind(order.into_i64())
            .bind(item.into_i64())
            .execute(&mut *conn)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Attached add-on items with their current catalog price and applicability.
    pub(crate) async fn list_add_on_items(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
    ) -> Result<Vec<CartAddOnItem>, sqlx::Error> {
        query_as::<Sqlite, CartAddOnItem>(LIST_ORDER_ADD_ON_ITEMS_SQL)
            .bind(order.into_i64())
            .fetch_all(&mut *conn)
            .await
    }
}

impl<'r> FromRow<'r, SqliteRow> for AddOnMembershipRecord {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            order_id: OrderId::from_i64(row.try_get("order_id")?),
            add_on_item_id: AddOnItemId::from_i64(row.try_get("add_on_item_id")?),
            created_at: try_get_timestamp(row, "created_at")?,
        })
    }
}

impl<'r> FromRow<'r, SqliteRow> for CartAddOnItem {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            add_on_item_id: AddOnItemId::from_i64(row.try_get("add_on_item_id")?),
            name: row.try_get("name")?,
            price: try_get_amount(row, "price")?,
            is_applicable: row.try_get("is_applicable")?,
        })
    }
}

//! Charge Memberships Repository

use jiff::Timestamp;
use sqlx::{FromRow, Row, Sqlite, SqliteConnection, query, query_as, sqlite::SqliteRow};

use crate::{
    database::{timestamp_to_i64, try_get_amount, try_get_timestamp},
    domain::{
        carts::records::{CartCharge, ChargeMembershipRecord},
        catalog::records::ChargeId,
        orders::records::OrderId,
    },
};

const GET_ORDER_CHARGE_SQL: &str = include_str!("../sql/get_order_charge.sql");
const CREATE_ORDER_CHARGE_SQL: &str = include_str!("../sql/create_order_charge.sql");
const DELETE_ORDER_CHARGE_SQL: &str = include_str!("../sql/delete_order_charge.sql");
const LIST_ORDER_CHARGES_SQL: &str = include_str!("../sql/list_order_charges.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct SqliteChargeMembershipsRepository;

impl SqliteChargeMembershipsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_membership(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
        charge: ChargeId,
    ) -> Result<Option<ChargeMembershipRecord>, sqlx::Error> {
        query_as::<Sqlite, ChargeMembershipRecord>(GET_ORDER_CHARGE_SQL)
            .bind(order.into_i64())
            .bind(charge.into_i64())
            .fetch_optional(&mut *conn)
            .await
    }

    pub(crate) async fn create_membership(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
        charge: ChargeId,
        complimentary: bool,
        now: Timestamp,
    ) -> Result<ChargeMembershipRecord, sqlx::Error> {
        query_as::<Sqlite, ChargeMembershipRecord>(CREATE_ORDER_CHARGE_SQL)
            .bind(order.into_i64())
            .bind(charge.into_i64())
            .bind(complimentary)
            .bind(timestamp_to_i64(now))
            .fetch_one(&mut *conn)
            .await
    }

    pub(crate) async fn delete_membership(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
        charge: ChargeId,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_ORDER_CHARGE_SQL)
            .bind(order.into_i64())
            .bind(charge.into_i64())
            .execute(&mut *conn)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Attached charges with their current catalog price.
    pub(crate) async fn list_charges(
        &self,
        conn: &mut SqliteConnection,
        order: OrderId,
    ) -> Result<Vec<CartCharge>, sqlx::Error> {
        query_as::<Sqlite, CartCharge>(LIST_ORDER_CHARGES_SQL)
            .bind(order.into_i64())
            .fetch_all(&mut *conn)
            .await
    }
}

impl<'r> FromRow<'r, SqliteRow> for ChargeMembershipRecord {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            order_id: OrderId::from_i64(row.try_get("order_id")?),
            charge_id: ChargeId::from_i64(row.try_get("charge_id")?),
            complimentary: row.try_get("complimentary")?,
            created_at: try_get_timestamp(row, "created_at")?,
        })
    }
}

impl<'r> FromRow<'r, SqliteRow> for CartCharge {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            charge_id: ChargeId::from_i64(row.try_get("charge_id")?),
            name: row.try_get("name")?,
            price: try_get_amount(row, "price")?,
            complimentary: row.try_get("complimentary")?,
        })
    }
}

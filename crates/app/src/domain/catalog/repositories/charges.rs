//! Charges Repository

use jiff::Timestamp;
use sqlx::{FromRow, Row, Sqlite, SqliteConnection, query_as, sqlite::SqliteRow};

use crate::{
    database::{amount_to_i64, timestamp_to_i64, try_get_amount, try_get_timestamp},
    domain::catalog::{
        data::{ChargeUpdate, NewCharge},
        records::{ChargeId, ChargeRecord},
    },
};

const LIST_CHARGES_SQL: &str = include_str!("../sql/list_charges.sql");
const LIST_APPLICABLE_CHARGES_SQL: &str = include_str!("../sql/list_applicable_charges.sql");
const GET_CHARGE_SQL: &str = include_str!("../sql/get_charge.sql");
const CREATE_CHARGE_SQL: &str = include_str!("../sql/create_charge.sql");
const UPDATE_CHARGE_SQL: &str = include_str!("../sql/update_charge.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct SqliteChargesRepository;

impl SqliteChargesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_charges(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<Vec<ChargeRecord>, sqlx::Error> {
        query_as::<Sqlite, ChargeRecord>(LIST_CHARGES_SQL)
            .fetch_all(&mut *conn)
            .await
    }

    /// Charges whose own `is_applicable` flag is set.
    pub(crate) async fn list_applicable_charges(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<Vec<ChargeRecord>, sqlx::Error> {
        query_as::<Sqlite, ChargeRecord>(LIST_APPLICABLE_CHARGES_SQL)
            .fetch_all(&mut *conn)
            .await
    }

    pub(crate) async fn find_charge(
        &self,
        conn: &mut SqliteConnection,
        charge: ChargeId,
    ) -> Result<Option<ChargeRecord>, sqlx::Error> {
        query_as::<Sqlite, ChargeRecord>(GET_CHARGE_SQL)
            .bind(charge.into_i64())
            .fetch_optional(&mut *conn)
            .await
    }

    pub(crate) async fn create_charge(
        &self,
        conn: &mut SqliteConnection,
        charge: &NewCharge,
        now: Timestamp,
    ) -> Result<ChargeRecord, sqlx::Error> {
        query_as::<Sqlite, ChargeRecord>(CREATE_CHARGE_SQL)
            .bind(charge.name.as_str())
            .bind(amount_to_i64(charge.price, "price")?)
            .bind(charge.is_applicable)
            .bind(timestamp_to_i64(now))
            .fetch_one(&mut *conn)
            .await
    }

    pub(crate) async fn update_charge(
        &self,
        conn: &mut SqliteConnection,
        charge: ChargeId,
        update: &ChargeUpdate,
        now: Timestamp,
    ) -> Result<Option<ChargeRecord>, sqlx::Error> {
        query_as::<Sqlite, ChargeRecord>(UPDATE_CHARGE_SQL)
            .bind(charge.into_i64())
            .bind(amount_to_i64(update.price, "price")?)
            .bind(update.is_applicable)
            .bind(timestamp_to_i64(now))
            .fetch_optional(&mut *conn)
            .await
    }
}

impl<'r> FromRow<'r, SqliteRow> for ChargeRecord {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: ChargeId::from_i64(row.try_get("id")?),
            name: row.try_get("name")?,
            price: try_get_amount(row, "price")?,
            is_applicable: row.try_get("is_applicable")?,
            created_at: try_get_timestamp(row, "created_at")?,
            updated_at: try_get_timestamp(row, "updated_at")?,
        })
    }
}

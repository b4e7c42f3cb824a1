//! Test context for service-level integration tests.

use std::sync::Arc;

use jiff::Timestamp;

use crate::{
    database::Db,
    domain::{
        carts::SqliteCartsService,
        catalog::{
            CatalogService, SqliteCatalogService,
            data::{NewAddOnItem, NewCharge, NewProduct},
            records::{AddOnItemRecord, ChargeRecord, ProductRecord},
        },
        orders::{
            OrdersService, SqliteOrdersService,
            data::NewOrder,
            records::{OrderId, OrderRecord},
            repository::SqliteOrdersRepository,
        },
        selection::SqliteSelectionService,
    },
};

use super::db::TestDb;

pub(crate) struct TestContext {
    pub(crate) db: Db,
    pub(crate) catalog: SqliteCatalogService,
    pub(crate) orders: SqliteOrdersService,
    pub(crate) carts: SqliteCartsService,
    pub(crate) selection: SqliteSelectionService,
}

impl TestContext {
    pub(crate) async fn new() -> Self {
        let test_db = TestDb::new().await;
        let db = Db::new(test_db.pool().clone());

        let selection = SqliteSelectionService::spawn(db.clone());

        Self {
            catalog: SqliteCatalogService::new(db.clone()),
            orders: SqliteOrdersService::new(db.clone(), Arc::new(selection.clone())),
            carts: SqliteCartsService::new(db.clone()),
            selection,
            db,
        }
    }

    pub(crate) async fn product(&self, name: &str, price: u64) -> ProductRecord {
        self.catalog
            .create_product(NewProduct {
                name: name.to_string(),
                price,
            })
            .await
            .expect("Failed to create test product")
    }

    pub(crate) async fn add_on_item(
        &self,
        name: &str,
        price: u64,
        is_applicable: bool,
    ) -> AddOnItemRecord {
        self.catalog
            .create_add_on_item(NewAddOnItem {
                name: name.to_string(),
                price,
                is_applicable,
            })
            .await
            .expect("Failed to create test add-on item")
    }

    pub(crate) async fn charge(&self, name: &str, price: u64, is_applicable: bool) -> ChargeRecord {
        self.catalog
            .create_charge(NewCharge {
                name: name.to_string(),
                price,
                is_applicable,
            })
            .await
            .expect("Failed to create test charge")
    }

    pub(crate) async fn dine_in_order(&self) -> OrderRecord {
        self.orders
            .create_order(NewOrder::dine_in())
            .await
            .expect("Failed to create dine-in order")
    }

    pub(crate) async fn dine_out_order(&self, charges_included: bool) -> OrderRecord {
        self.orders
            .create_order(NewOrder::dine_out(charges_included))
            .await
            .expect("Failed to create dine-out order")
    }

    /// Bump the order's `updated_at` without going through a service.
    pub(crate) async fn touch_order(&self, order: OrderId) {
        let mut conn = self
            .db
            .pool()
            .acquire()
            .await
            .expect("Failed to acquire connection");

        SqliteOrdersRepository::new()
            .touch_order(&mut conn, order, Timestamp::now())
            .await
            .expect("Failed to touch order");
    }
}

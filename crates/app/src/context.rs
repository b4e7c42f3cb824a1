//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    database::{self, Db},
    domain::{
        carts::{CartsService, SqliteCartsService},
        catalog::{CatalogService, SqliteCatalogService},
        orders::{OrdersService, SqliteOrdersService},
        selection::{SelectionService, SqliteSelectionService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to run migrations")]
    Migrate(#[source] sqlx::migrate::MigrateError),
}

#[derive(Clone)]
pub struct AppContext {
    pub catalog: Arc<dyn CatalogService>,
    pub orders: Arc<dyn OrdersService>,
    pub carts: Arc<dyn CartsService>,
    pub selection: Arc<dyn SelectionService>,
}

impl AppContext {
    /// Build application context from a database URL, applying pending migrations and
    /// starting the selection coordinator.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection or migrating fails.
    pub async fn from_database_url(url: &str) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        database::migrate(&pool)
            .await
            .map_err(AppInitError::Migrate)?;

        Ok(Self::from_db(Db::new(pool)))
    }

    /// Wire every service onto an already migrated database.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    #[must_use]
    pub fn from_db(db: Db) -> Self {
        let selection: Arc<dyn SelectionService> =
            Arc::new(SqliteSelectionService::spawn(db.clone()));

        Self {
            catalog: Arc::new(SqliteCatalogService::new(db.clone())),
            orders: Arc::new(SqliteOrdersService::new(db.clone(), Arc::clone(&selection))),
            carts: Arc::new(SqliteCartsService::new(db)),
            selection,
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::{catalog::data::NewProduct, orders::data::NewOrder},
        test::TestDb,
    };

    use super::*;

    #[tokio::test]
    async fn context_services_share_one_database() -> TestResult {
        let test_db = TestDb::new().await;
        let ctx = AppContext::from_db(Db::new(test_db.pool().clone()));

        let tea = ctx
            .catalog
            .create_product(NewProduct {
                name: "Tea".to_string(),
                price: 20,
            })
            .await?;
        let order = ctx.orders.create_order(NewOrder::dine_in()).await?;
        let price = ctx.carts.add_product(order.id, tea.id).await?;

        assert_eq!(price.total_price, 20);
        assert_eq!(ctx.selection.current().await?, Some(order.id));

        Ok(())
    }
}

//! Database test utilities

use sqlx::{
    Sqlite, SqlitePool, Transaction,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

/// Test database configuration
///
/// Each `TestDb` owns a private in-memory `SQLite` database with migrations applied.
///
/// ## Isolation model
///
/// Isolation is **database-level**: every test gets its own fresh database. Service methods
/// commit their own transactions normally, so there is no auto-rollback mechanism.
///
/// The pool holds exactly one connection that never expires, because every in-memory
/// connection would otherwise open a distinct, empty database. Callers must release any
/// connection they acquire before calling into a service.
#[derive(Debug, Clone)]
pub(crate) struct TestDb {
    pool: SqlitePool,
}

impl TestDb {
    pub(crate) async fn new() -> Self {
        let options = SqliteConnectOptions::new()
            .in_memory(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .expect("Failed to open in-memory database");

        crate::database::migrate(&pool)
            .await
            .expect("Failed to run migrations on database");

        Self { pool }
    }

    /// Begin a transaction that rolls back when dropped.
    pub(crate) async fn begin_test_transaction(&self) -> Transaction<'_, Sqlite> {
        self.pool
            .begin()
            .await
            .expect("Failed to start test transaction")
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use sqlx::query_scalar;

    use super::*;

    const INSERT_PRODUCT_SQL: &str =
        "INSERT INTO products (name, price, created_at, updated_at) VALUES ('Tea', 20, 0, 0)";

    #[tokio::test]
    async fn migrations_create_every_table() {
        let test_db = TestDb::new().await;

        let tables: Vec<String> =
            query_scalar("SELECT name FROM sqlite_master WHERE type = 'table'")
                .fetch_all(test_db.pool())
                .await
                .expect("Failed to list tables");

        for table in [
            "add_on_items",
            "cart_lines",
            "charges",
            "order_add_on_items",
            "order_charges",
            "orders",
            "price_records",
            "products",
            "selected_order",
        ] {
            assert!(tables.iter().any(|name| name == table), "missing {table}");
        }
    }

    #[tokio::test]
    async fn databases_are_isolated() {
        let first = TestDb::new().await;
        let second = TestDb::new().await;

        sqlx::query(INSERT_PRODUCT_SQL)
            .execute(first.pool())
            .await
            .expect("Failed to insert product");

        let count: i64 = query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(second.pool())
            .await
            .expect("Failed to count products");

        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_transaction_rolls_back_on_drop() {
        let test_db = TestDb::new().await;

        {
            let mut tx = test_db.begin_test_transaction().await;

            sqlx::query(INSERT_PRODUCT_SQL)
                .execute(&mut *tx)
                .await
                .expect("Failed to insert product");
        }

        let count: i64 = query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(test_db.pool())
            .await
            .expect("Failed to count products");

        assert_eq!(count, 0);
    }
}

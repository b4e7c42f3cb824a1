//! Catalog service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::catalog::{
        data::{AddOnItemUpdate, ChargeUpdate, NewAddOnItem, NewCharge, NewProduct},
        errors::CatalogServiceError,
        records::{AddOnItemId, AddOnItemRecord, ChargeId, ChargeRecord, ProductId, ProductRecord},
        repositories::{
            SqliteAddOnItemsRepository, SqliteChargesRepository, SqliteProductsRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub struct SqliteCatalogService {
    db: Db,
    products: SqliteProductsRepository,
    add_on_items: SqliteAddOnItemsRepository,
    charges: SqliteChargesRepository,
}

impl SqliteCatalogService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            products: SqliteProductsRepository::new(),
            add_on_items: SqliteAddOnItemsRepository::new(),
            charges: SqliteChargesRepository::new(),
        }
    }
}

#[async_trait]
impl CatalogService for SqliteCatalogService {
    async fn list_products(&self) -> Result<Vec<ProductRecord>, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let products = self.products.list_products(&mut tx).await?;

        tx.commit().await?;

        Ok(products)
    }

    async fn get_product(&self, product: ProductId) -> Result<ProductRecord, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let product = self
            .products
            .find_product(&mut tx, product)
            .await?
            .ok_or(CatalogServiceError::NotFound("product"))?;

        tx.commit().await?;

        Ok(product)
    }

    #[tracing::instrument(
        name = "catalog.service.create_product",
        skip(self, product),
        fields(product_name = %product.name, price = product.price),
        err
    )]
    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let created = self
            .products
            .create_product(&mut tx, &product, Timestamp::now())
            .await?;

        tx.commit().await?;

        info!(product_id = %created.id, "created product");

        Ok(created)
    }

    #[tracing::instrument(
        name = "catalog.service.update_product_price",
        skip(self),
        fields(product_id = %product),
        err
    )]
    async fn update_product_price(
        &self,
        product: ProductId,
        price: u64,
    ) -> Result<ProductRecord, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let updated = self
            .products
            .update_product_price(&mut tx, product, price, Timestamp::now())
            .await?
            .ok_or(CatalogServiceError::NotFound("product"))?;

        tx.commit().await?;

        Ok(updated)
    }

    #[tracing::instrument(
        name = "catalog.service.delete_product",
        skip(self),
        fields(product_id = %product),
        err
    )]
    async fn delete_product(&self, product: ProductId) -> Result<(), CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let rows_affected = self.products.delete_product(&mut tx, product).await?;

        if rows_affected == 0 {
            return Err(CatalogServiceError::NotFound("product"));
        }

        tx.commit().await?;

        Ok(())
    }

    async fn list_add_on_items(&self) -> Result<Vec<AddOnItemRecord>, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let items = self.add_on_items.list_add_on_items(&mut tx).await?;

        tx.commit().await?;

        Ok(items)
    }

    async fn get_add_on_item(
        &self,
        item: AddOnItemId,
    ) -> Result<AddOnItemRecord, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let item = self
            .add_on_items
            .find_add_on_item(&mut tx, item)
            .await?
            .ok_or(CatalogServiceError::NotFound("add-on item"))?;

        tx.commit().await?;

        Ok(item)
    }

    #[tracing::instrument(
        name = "catalog.service.create_add_on_item",
        skip(self, item),
        fields(item_name = %item.name, price = item.price, is_applicable = item.is_applicable),
        err
    )]
    async fn create_add_on_item(
        &self,
        item: NewAddOnItem,
    ) -> Result<AddOnItemRecord, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let created = self
            .add_on_items
            .create_add_on_item(&mut tx, &item, Timestamp::now())
            .await?;

        tx.commit().await?;

        info!(add_on_item_id = %created.id, "created add-on item");

        Ok(created)
    }

    #[tracing::instrument(
        name = "catalog.service.update_add_on_item",
        skip(self, update),
        fields(add_on_item_id = %item),
        err
    )]
    async fn update_add_on_item(
        &self,
        item: AddOnItemId,
        update: AddOnItemUpdate,
    ) -> Result<AddOnItemRecord, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let updated = self
            .add_on_items
            .update_add_on_item(&mut tx, item, &update, Timestamp::now())
            .await?
            .ok_or(CatalogServiceError::NotFound("add-on item"))?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn list_charges(&self) -> Result<Vec<ChargeRecord>, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let charges = self.charges.list_charges(&mut tx).await?;

        tx.commit().await?;

        Ok(charges)
    }

    async fn get_charge(&self, charge: ChargeId) -> Result<ChargeRecord, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let charge = self
            .charges
            .find_charge(&mut tx, charge)
            .await?
            .ok_or(CatalogServiceError::NotFound("charge"))?;

        tx.commit().await?;

        Ok(charge)
    }

    #[tracing::instrument(
        name = "catalog.service.create_charge",
        skip(self, charge),
        fields(
            charge_name = %charge.name,
            price = charge.price,
            is_applicable = charge.is_applicable
        ),
        err
    )]
    async fn create_charge(&self, charge: NewCharge) -> Result<ChargeRecord, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let created = self
            .charges
            .create_charge(&mut tx, &charge, Timestamp::now())
            .await?;

        tx.commit().await?;

        info!(charge_id = %created.id, "created charge");

        Ok(created)
    }

    #[tracing::instrument(
        name = "catalog.service.update_charge",
        skip(self, update),
        fields(charge_id = %charge),
        err
    )]
    async fn update_charge(
        &self,
        charge: ChargeId,
        update: ChargeUpdate,
    ) -> Result<ChargeRecord, CatalogServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let updated = self
            .charges
            .update_charge(&mut tx, charge, &update, Timestamp::now())
            .await?
            .ok_or(CatalogServiceError::NotFound("charge"))?;

        tx.commit().await?;

        Ok(updated)
    }
}

/// Catalog lookups and maintenance.
///
/// Price changes only affect toggles made afterwards; existing price records keep the
/// amounts that were current when each item was toggled.
#[automock]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Retrieves all products, ordered by name.
    async fn list_products(&self) -> Result<Vec<ProductRecord>, CatalogServiceError>;

    /// Retrieve a single product.
    async fn get_product(&self, product: ProductId) -> Result<ProductRecord, CatalogServiceError>;

    /// Creates a new product.
    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, CatalogServiceError>;

    /// Changes the unit price of a product.
    async fn update_product_price(
        &self,
        product: ProductId,
        price: u64,
    ) -> Result<ProductRecord, CatalogServiceError>;

    /// Deletes a product that no cart line references.
    async fn delete_product(&self, product: ProductId) -> Result<(), CatalogServiceError>;

    async fn list_add_on_items(&self) -> Result<Vec<AddOnItemRecord>, CatalogServiceError>;

    async fn get_add_on_item(
        &self,
        item: AddOnItemId,
    ) -> Result<AddOnItemRecord, CatalogServiceError>;

    async fn create_add_on_item(
        &self,
        item: NewAddOnItem,
    ) -> Result<AddOnItemRecord, CatalogServiceError>;

    /// Changes the price and applicability of an add-on item.
    async fn update_add_on_item(
        &self,
        item: AddOnItemId,
        update: AddOnItemUpdate,
    ) -> Result<AddOnItemRecord, CatalogServiceError>;

    async fn list_charges(&self) -> Result<Vec<ChargeRecord>, CatalogServiceError>;

    async fn get_charge(&self, charge: ChargeId) -> Result<ChargeRecord, CatalogServiceError>;

    async fn create_charge(&self, charge: NewCharge) -> Result<ChargeRecord, CatalogServiceError>;

    /// Changes the price and applicability of a charge.
    async fn update_charge(
        &self,
        charge: ChargeId,
        update: ChargeUpdate,
    ) -> Result<ChargeRecord, CatalogServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{domain::carts::CartsService, errors::FailureKind, test::TestContext};

    use super::*;

    #[tokio::test]
    async fn create_product_returns_name_and_price() -> TestResult {
        let ctx = TestContext::new().await;

        let product = ctx
            .catalog
            .create_product(NewProduct {
                name: "Masala Dosa".to_string(),
                price: 180,
            })
            .await?;

        assert_eq!(product.name, "Masala Dosa");
        assert_eq!(product.price, 180);
        assert_eq!(product.created_at, product.updated_at);

        Ok(())
    }

    #[tokio::test]
    async fn get_product_returns_created_product() -> TestResult {
        let ctx = TestContext::new().await;
        let created = ctx.product("Idli", 60).await;

        let product = ctx.catalog.get_product(created.id).await?;

        assert_eq!(product.id, created.id);
        assert_eq!(product.price, 60);

        Ok(())
    }

    #[tokio::test]
    async fn get_product_unknown_id_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.catalog.get_product(ProductId::from_i64(404)).await;

        assert!(
            matches!(result, Err(CatalogServiceError::NotFound("product"))),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn create_product_duplicate_name_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;
        ctx.product("Vada", 40).await;

        let result = ctx
            .catalog
            .create_product(NewProduct {
                name: "Vada".to_string(),
                price: 45,
            })
            .await;

        let Err(error) = result else {
            panic!("duplicate product should be rejected");
        };

        assert!(
            matches!(error, CatalogServiceError::AlreadyExists(_)),
            "expected AlreadyExists, got {error:?}"
        );
        assert_eq!(error.kind(), FailureKind::PersistenceFailure);

        Ok(())
    }

    #[tokio::test]
    async fn update_product_price_reflects_new_price() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.product("Upma", 90).await;

        let updated = ctx.catalog.update_product_price(product.id, 110).await?;

        assert_eq!(updated.price, 110);
        assert_eq!(ctx.catalog.get_product(product.id).await?.price, 110);

        Ok(())
    }

    #[tokio::test]
    async fn delete_product_makes_it_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.product("Pongal", 120).await;

        ctx.catalog.delete_product(product.id).await?;

        let result = ctx.catalog.get_product(product.id).await;

        assert!(
            matches!(result, Err(CatalogServiceError::NotFound(_))),
            "expected NotFound after deletion, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn delete_product_in_a_cart_returns_invalid_reference() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.product("Pongal", 120).await;
        let order = ctx.dine_in_order().await;

        ctx.carts.add_product(order.id, product.id).await?;

        let result = ctx.catalog.delete_product(product.id).await;

        assert!(
            matches!(result, Err(CatalogServiceError::InvalidReference)),
            "expected InvalidReference, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn delete_product_unknown_id_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.catalog.delete_product(ProductId::from_i64(9)).await;

        assert!(
            matches!(result, Err(CatalogServiceError::NotFound("product"))),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn update_add_on_item_changes_applicability() -> TestResult {
        let ctx = TestContext::new().await;
        let item = ctx.add_on_item("Extra Chutney", 15, true).await;

        let updated = ctx
            .catalog
            .update_add_on_item(
                item.id,
                AddOnItemUpdate {
                    price: 20,
                    is_applicable: false,
                },
            )
            .await?;

        assert_eq!(updated.price, 20);
        assert!(!updated.is_applicable);

        Ok(())
    }

    #[tokio::test]
    async fn list_charges_returns_every_charge() -> TestResult {
        let ctx = TestContext::new().await;
        let packing = ctx.charge("Packing", 20, true).await;
        let delivery = ctx.charge("Delivery", 50, false).await;

        let charges = ctx.catalog.list_charges().await?;
        let ids: Vec<ChargeId> = charges.iter().map(|c| c.id).collect();

        assert_eq!(ids, vec![delivery.id, packing.id]);

        Ok(())
    }

    #[tokio::test]
    async fn update_charge_unknown_id_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx
            .catalog
            .update_charge(
                ChargeId::from_i64(1),
                ChargeUpdate {
                    price: 10,
                    is_applicable: true,
                },
            )
            .await;

        assert!(
            matches!(result, Err(CatalogServiceError::NotFound("charge"))),
            "expected NotFound, got {result:?}"
        );
    }
}

//! [`CatalogStore`] over the Postgres repositories in `catalog_db`.
//!
//! Each batch runs in one transaction. Every row mutation runs inside its
//! own `SAVEPOINT` so a rejected row (unique violation, missing reference)
//! rolls back only that row and leaves the transaction usable.

use async_trait::async_trait;
use catalog_core::catalog::ProductStatus;
use catalog_core::types::DbId;
use catalog_db::models::product::{CreateProduct, Product, ProductExportRow};
use catalog_db::models::variant::{CreateVariant, ProductVariant, VariantExportRow};
use catalog_db::repositories::{CategoryRepo, ProductRepo, VariantRepo};
use catalog_db::DbPool;
use rust_decimal::Decimal;
use sqlx::{PgConnection, Postgres, Transaction};

use super::store::{CatalogStore, CatalogTx, StoreError};

const SAVEPOINT: &str = "SAVEPOINT bulk_row";
const RELEASE: &str = "RELEASE SAVEPOINT bulk_row";
const ROLLBACK_TO: &str = "ROLLBACK TO SAVEPOINT bulk_row";

pub struct PgCatalogStore {
    pool: DbPool,
}

impl PgCatalogStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn begin(&self) -> Result<Box<dyn CatalogTx>, StoreError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Box::new(PgCatalogTx { tx }))
    }

    async fn list_products(&self) -> Result<Vec<ProductExportRow>, StoreError> {
        Ok(ProductRepo::list_for_export(&self.pool).await?)
    }

    async fn list_variants(&self) -> Result<Vec<VariantExportRow>, StoreError> {
        Ok(VariantRepo::list_for_export(&self.pool).await?)
    }
}

pub struct PgCatalogTx {
    tx: Transaction<'static, Postgres>,
}

impl PgCatalogTx {
    async fn savepoint(&mut self) -> Result<(), StoreError> {
        sqlx::query(SAVEPOINT)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }

    /// Release the row savepoint on success, roll back to it on a row-level
    /// failure. A fatal error skips both: the transaction is already gone.
    async fn settle<T>(&mut self, result: Result<T, StoreError>) -> Result<T, StoreError> {
        let statement = match &result {
            Ok(_) => RELEASE,
            Err(err) if err.is_fatal() => return result,
            Err(_) => ROLLBACK_TO,
        };
        sqlx::query(statement)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        result
    }
}

#[async_trait]
impl CatalogTx for PgCatalogTx {
    async fn create_product(&mut self, product: &CreateProduct) -> Result<Product, StoreError> {
        self.savepoint().await?;
        let result = insert_product(&mut *self.tx, product).await;
        self.settle(result).await
    }

    async fn update_product_status(
        &mut self,
        id: DbId,
        status: ProductStatus,
    ) -> Result<Product, StoreError> {
        self.savepoint().await?;
        let result = ProductRepo::update_status(&mut *self.tx, id, status.as_str())
            .await
            .map_err(StoreError::from)
            .and_then(|row| row.ok_or_else(|| product_not_found(id)));
        self.settle(result).await
    }

    async fn assign_category(
        &mut self,
        id: DbId,
        category_id: DbId,
    ) -> Result<Product, StoreError> {
        self.savepoint().await?;
        let result = set_category(&mut *self.tx, id, category_id).await;
        self.settle(result).await
    }

    async fn update_price(&mut self, id: DbId, price: Decimal) -> Result<Product, StoreError> {
        self.savepoint().await?;
        let result = ProductRepo::update_price(&mut *self.tx, id, price)
            .await
            .map_err(StoreError::from)
            .and_then(|row| row.ok_or_else(|| product_not_found(id)));
        self.settle(result).await
    }

    async fn create_variant(
        &mut self,
        variant: &CreateVariant,
    ) -> Result<ProductVariant, StoreError> {
        self.savepoint().await?;
        let result = insert_variant(&mut *self.tx, variant).await;
        self.settle(result).await
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx
            .commit()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

fn product_not_found(id: DbId) -> StoreError {
    StoreError::NotFound {
        entity: "Product",
        id,
    }
}

async fn insert_product(
    conn: &mut PgConnection,
    product: &CreateProduct,
) -> Result<Product, StoreError> {
    if let Some(category_id) = product.category_id {
        if !CategoryRepo::exists(conn, category_id).await? {
            return Err(StoreError::NotFound {
                entity: "Category",
                id: category_id,
            });
        }
    }
    Ok(ProductRepo::create(conn, product).await?)
}

async fn set_category(
    conn: &mut PgConnection,
    id: DbId,
    category_id: DbId,
) -> Result<Product, StoreError> {
    if !CategoryRepo::exists(conn, category_id).await? {
        return Err(StoreError::NotFound {
            entity: "Category",
            id: category_id,
        });
    }
    ProductRepo::update_category(conn, id, category_id)
        .await?
        .ok_or_else(|| product_not_found(id))
}

async fn insert_variant(
    conn: &mut PgConnection,
    variant: &CreateVariant,
) -> Result<ProductVariant, StoreError> {
    if !ProductRepo::exists(conn, variant.product_id).await? {
        return Err(product_not_found(variant.product_id));
    }
    Ok(VariantRepo::create(conn, variant).await?)
}

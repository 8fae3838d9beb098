//! The entity-store seam the bulk engine mutates through.
//!
//! [`CatalogStore::begin`] opens one [`CatalogTx`] per batch. A mutation that
//! fails inside a transaction must leave the transaction usable for the next
//! row; only [`StoreError::Unavailable`] means the transaction itself is gone.

use async_trait::async_trait;
use catalog_core::catalog::ProductStatus;
use catalog_core::types::DbId;
use catalog_db::models::product::{CreateProduct, Product, ProductExportRow};
use catalog_db::models::variant::{CreateVariant, ProductVariant, VariantExportRow};
use rust_decimal::Decimal;

/// SQLSTATE classes that mean the connection or transaction is unusable:
/// connection exception, transaction rollback, insufficient resources,
/// operator intervention.
const FATAL_SQLSTATE_CLASSES: &[&str] = &["08", "40", "53", "57"];

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    #[error("{0}")]
    Constraint(String),

    #[error("Entity store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether this error aborts the whole batch rather than one row.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.into_owned()).unwrap_or_default();
                if FATAL_SQLSTATE_CLASSES.iter().any(|class| code.starts_with(class)) {
                    return StoreError::Unavailable(db_err.message().to_string());
                }
                // PostgreSQL unique constraint violation: error code 23505
                if code == "23505" {
                    let constraint = db_err.constraint().unwrap_or("unknown");
                    return StoreError::Constraint(format!(
                        "Duplicate value violates unique constraint: {constraint}"
                    ));
                }
                StoreError::Constraint(db_err.message().to_string())
            }
            sqlx::Error::RowNotFound => StoreError::Constraint("Row not found".to_string()),
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

/// Transactional catalog store.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Open a transaction for one batch.
    async fn begin(&self) -> Result<Box<dyn CatalogTx>, StoreError>;

    /// Every product with its category name resolved.
    async fn list_products(&self) -> Result<Vec<ProductExportRow>, StoreError>;

    /// Every variant with its parent product name resolved.
    async fn list_variants(&self) -> Result<Vec<VariantExportRow>, StoreError>;
}

/// One open transaction. Dropping it without [`CatalogTx::commit`] rolls
/// back everything written through it.
#[async_trait]
pub trait CatalogTx: Send {
    async fn create_product(&mut self, product: &CreateProduct) -> Result<Product, StoreError>;

    async fn update_product_status(
        &mut self,
        id: DbId,
        status: ProductStatus,
    ) -> Result<Product, StoreError>;

    /// Fails with `NotFound` for either a missing product or category.
    async fn assign_category(
        &mut self,
        id: DbId,
        category_id: DbId,
    ) -> Result<Product, StoreError>;

    async fn update_price(&mut self, id: DbId, price: Decimal) -> Result<Product, StoreError>;

    /// Fails with `NotFound` when the parent product does not exist.
    async fn create_variant(
        &mut self,
        variant: &CreateVariant,
    ) -> Result<ProductVariant, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

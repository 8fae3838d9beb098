//! One handler per operation kind: typed record in, entity mutation out.
//!
//! A handler never decides batch control flow. Conversion failures and
//! row-level store errors come back as failed [`RecordResult`]s; only a
//! fatal [`StoreError`] escapes [`RecordHandler::handle`].

use async_trait::async_trait;
use catalog_core::bulk::RecordResult;
use catalog_core::records::{
    row_identifier, CategoryAssignmentRecord, ImportRecord, PriceUpdateRecord, RecordError,
    StatusUpdateRecord, VariantCreationRecord, COL_NAME, PRODUCT_ID_COLUMNS,
};
use catalog_core::tabular::TabularRow;
use catalog_db::models::product::CreateProduct;
use catalog_db::models::variant::CreateVariant;
use serde_json::Value;

use super::store::{CatalogTx, StoreError};

#[async_trait]
pub trait RecordHandler: Send + Sync {
    type Record: for<'r> TryFrom<&'r TabularRow, Error = RecordError> + Send;

    /// Cells used to label a row whose mutation failed.
    const LABEL_COLUMNS: &'static [&'static str];

    /// Perform the mutation. Returns the success identifier.
    async fn apply(&self, tx: &mut dyn CatalogTx, record: Self::Record)
        -> Result<String, StoreError>;

    /// Convert and apply one row.
    async fn handle(
        &self,
        tx: &mut dyn CatalogTx,
        row: &TabularRow,
    ) -> Result<RecordResult, StoreError> {
        let label = || row_identifier(row, Self::LABEL_COLUMNS);

        let record = match Self::Record::try_from(row) {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!(line = row.line, error = %e, "Row rejected");
                return Ok(RecordResult::failed(label(), e.to_string()));
            }
        };

        match self.apply(tx, record).await {
            Ok(identifier) => Ok(RecordResult::ok(identifier)),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                tracing::debug!(line = row.line, error = %e, "Row mutation failed");
                Ok(RecordResult::failed(label(), e.to_string()))
            }
        }
    }
}

/// Creates products.
pub struct ImportHandler;

#[async_trait]
impl RecordHandler for ImportHandler {
    type Record = ImportRecord;
    const LABEL_COLUMNS: &'static [&'static str] = &[COL_NAME];

    async fn apply(
        &self,
        tx: &mut dyn CatalogTx,
        record: ImportRecord,
    ) -> Result<String, StoreError> {
        let input = CreateProduct {
            name: record.name,
            slug: record.slug,
            description: record.description,
            price: record.price,
            stock: record.stock,
            status: record.status.as_str().to_string(),
            category_id: record.category_id,
        };
        let product = tx.create_product(&input).await?;
        Ok(product.slug)
    }
}

/// Sets product status.
pub struct StatusUpdateHandler;

#[async_trait]
impl RecordHandler for StatusUpdateHandler {
    type Record = StatusUpdateRecord;
    const LABEL_COLUMNS: &'static [&'static str] = PRODUCT_ID_COLUMNS;

    async fn apply(
        &self,
        tx: &mut dyn CatalogTx,
        record: StatusUpdateRecord,
    ) -> Result<String, StoreError> {
        let product = tx
            .update_product_status(record.product_id, record.status)
            .await?;
        Ok(product.id.to_string())
    }
}

/// Points products at a category.
pub struct CategoryAssignmentHandler;

#[async_trait]
impl RecordHandler for CategoryAssignmentHandler {
    type Record = CategoryAssignmentRecord;
    const LABEL_COLUMNS: &'static [&'static str] = PRODUCT_ID_COLUMNS;

    async fn apply(
        &self,
        tx: &mut dyn CatalogTx,
        record: CategoryAssignmentRecord,
    ) -> Result<String, StoreError> {
        let product = tx
            .assign_category(record.product_id, record.category_id)
            .await?;
        Ok(product.id.to_string())
    }
}

/// Sets product price.
pub struct PriceUpdateHandler;

#[async_trait]
impl RecordHandler for PriceUpdateHandler {
    type Record = PriceUpdateRecord;
    const LABEL_COLUMNS: &'static [&'static str] = PRODUCT_ID_COLUMNS;

    async fn apply(
        &self,
        tx: &mut dyn CatalogTx,
        record: PriceUpdateRecord,
    ) -> Result<String, StoreError> {
        let product = tx.update_price(record.product_id, record.price).await?;
        Ok(product.id.to_string())
    }
}

/// Creates variants under an existing product.
pub struct VariantCreationHandler;

#[async_trait]
impl RecordHandler for VariantCreationHandler {
    type Record = VariantCreationRecord;
    const LABEL_COLUMNS: &'static [&'static str] = &[COL_NAME];

    async fn apply(
        &self,
        tx: &mut dyn CatalogTx,
        record: VariantCreationRecord,
    ) -> Result<String, StoreError> {
        let input = CreateVariant {
            product_id: record.parent_id,
            name: record.name,
            sku: record.sku,
            price: record.price,
            stock: record.stock,
            options: Value::Object(record.options),
            inventory_tracking: record.inventory_tracking,
            low_stock_threshold: record.low_stock_threshold,
        };
        let variant = tx.create_variant(&input).await?;
        Ok(variant.id.to_string())
    }
}

//! Catalog export as a downloadable CSV.
//!
//! Reads the full product or variant set with its lookups resolved and
//! flattens each entity into a fixed column list. Export does not touch
//! the progress store.

use catalog_core::types::Timestamp;
use catalog_db::models::product::ProductExportRow;
use catalog_db::models::variant::VariantExportRow;

use super::store::{CatalogStore, StoreError};
use super::tabular::{write_rows, TabularError};

pub const PRODUCT_EXPORT_COLUMNS: &[&str] = &[
    "id",
    "name",
    "slug",
    "description",
    "price",
    "stock",
    "status",
    "category_id",
    "category_name",
    "created_at",
];

pub const VARIANT_EXPORT_COLUMNS: &[&str] = &[
    "id",
    "product_id",
    "product_name",
    "name",
    "sku",
    "price",
    "stock",
    "options",
    "inventory_tracking",
    "low_stock_threshold",
    "created_at",
];

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    All,
    Variants,
}

impl ExportKind {
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "variants" => Ok(Self::Variants),
            _ => Err(format!(
                "Unsupported export type '{s}'. Must be one of: all, variants"
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Variants => "variants",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
}

impl ExportFormat {
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            _ => Err(format!("Unsupported export format '{s}'. Must be: csv")),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Encode(#[from] TabularError),
}

/// A serialized export ready to be sent as an attachment.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

pub async fn export_catalog(
    store: &dyn CatalogStore,
    kind: ExportKind,
    format: ExportFormat,
) -> Result<ExportFile, ExportError> {
    let ExportFormat::Csv = format;

    let body = match kind {
        ExportKind::All => {
            let products = store.list_products().await?;
            write_rows(PRODUCT_EXPORT_COLUMNS, products.iter().map(product_cells))?
        }
        ExportKind::Variants => {
            let variants = store.list_variants().await?;
            write_rows(VARIANT_EXPORT_COLUMNS, variants.iter().map(variant_cells))?
        }
    };

    Ok(ExportFile {
        filename: export_filename(kind, chrono::Utc::now()),
        content_type: CSV_CONTENT_TYPE,
        body,
    })
}

/// `products-<kind>-<unix-millis>.csv`
pub fn export_filename(kind: ExportKind, at: Timestamp) -> String {
    format!("products-{}-{}.csv", kind.as_str(), at.timestamp_millis())
}

pub fn product_cells(p: &ProductExportRow) -> Vec<String> {
    vec![
        p.id.to_string(),
        p.name.clone(),
        p.slug.clone(),
        p.description.clone().unwrap_or_default(),
        p.price.to_string(),
        p.stock.to_string(),
        p.status.clone(),
        optional(p.category_id),
        p.category_name.clone().unwrap_or_default(),
        p.created_at.to_rfc3339(),
    ]
}

pub fn variant_cells(v: &VariantExportRow) -> Vec<String> {
    vec![
        v.id.to_string(),
        v.product_id.to_string(),
        v.product_name.clone(),
        v.name.clone(),
        v.sku.clone().unwrap_or_default(),
        optional(v.price),
        v.stock.to_string(),
        v.options.to_string(),
        v.inventory_tracking.to_string(),
        v.low_stock_threshold.to_string(),
        v.created_at.to_rfc3339(),
    ]
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

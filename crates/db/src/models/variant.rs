//! Product variant models and DTOs. Maps to the `product_variants` table.

use catalog_core::types::{DbId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `product_variants` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProductVariant {
    pub id: DbId,
    pub product_id: DbId,
    pub name: String,
    pub sku: Option<String>,
    pub price: Option<Decimal>,
    pub stock: i32,
    pub options: serde_json::Value,
    pub inventory_tracking: bool,
    pub low_stock_threshold: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A variant joined with its parent product name, as flattened for export.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VariantExportRow {
    pub id: DbId,
    pub product_id: DbId,
    pub product_name: String,
    pub name: String,
    pub sku: Option<String>,
    pub price: Option<Decimal>,
    pub stock: i32,
    pub options: serde_json::Value,
    pub inventory_tracking: bool,
    pub low_stock_threshold: i32,
    pub created_at: Timestamp,
}

/// DTO for inserting a new variant.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateVariant {
    pub product_id: DbId,
    pub name: String,
    pub sku: Option<String>,
    pub price: Option<Decimal>,
    pub stock: i32,
    pub options: serde_json::Value,
    pub inventory_tracking: bool,
    pub low_stock_threshold: i32,
}

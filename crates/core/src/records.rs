//! Strongly typed per-kind records converted from untyped [`TabularRow`]s.
//!
//! Conversion happens at the batch boundary: a row that cannot be converted
//! becomes a failed `RecordResult` carrying the [`RecordError`] text, and the
//! rest of the batch carries on.

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::catalog::{generate_slug, ProductStatus, DEFAULT_LOW_STOCK_THRESHOLD};
use crate::tabular::TabularRow;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Column aliases
// ---------------------------------------------------------------------------

pub const COL_NAME: &str = "name";
pub const COL_DESCRIPTION: &str = "description";
pub const COL_PRICE: &str = "price";
pub const COL_STOCK: &str = "stock";
pub const COL_STATUS: &str = "status";
pub const COL_SKU: &str = "sku";
pub const COL_OPTIONS: &str = "options";
pub const COL_INVENTORY_TRACKING: &str = "inventory_tracking";
pub const COL_LOW_STOCK_THRESHOLD: &str = "low_stock_threshold";

/// Columns addressing an existing product.
pub const PRODUCT_ID_COLUMNS: &[&str] = &["id", "product_id"];
/// Columns addressing a variant's parent product.
pub const PARENT_ID_COLUMNS: &[&str] = &["parent_id", "product_id"];
/// Columns addressing a category.
pub const CATEGORY_ID_COLUMNS: &[&str] = &["category_id"];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a row could not become a typed record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("Missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("Invalid {column} '{value}': expected a decimal number")]
    InvalidDecimal { column: &'static str, value: String },

    #[error("Invalid {column} '{value}': expected an integer")]
    InvalidInteger { column: &'static str, value: String },

    #[error("Invalid {column} '{value}': must not be negative")]
    Negative { column: &'static str, value: String },

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Name '{0}' does not produce a usable slug")]
    EmptySlug(String),
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A new catalog product.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRecord {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub status: ProductStatus,
    pub category_id: Option<DbId>,
}

/// A status change for an existing product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusUpdateRecord {
    pub product_id: DbId,
    pub status: ProductStatus,
}

/// A category reassignment for an existing product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryAssignmentRecord {
    pub product_id: DbId,
    pub category_id: DbId,
}

/// A price change for an existing product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceUpdateRecord {
    pub product_id: DbId,
    pub price: Decimal,
}

/// A new variant under an existing product.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantCreationRecord {
    pub parent_id: DbId,
    pub name: String,
    pub sku: Option<String>,
    pub price: Option<Decimal>,
    pub stock: i32,
    pub options: Map<String, Value>,
    pub inventory_tracking: bool,
    pub low_stock_threshold: i32,
}

impl TryFrom<&TabularRow> for ImportRecord {
    type Error = RecordError;

    fn try_from(row: &TabularRow) -> Result<Self, Self::Error> {
        let name = required(row, &[COL_NAME], COL_NAME)?.to_string();
        let slug = generate_slug(&name);
        if slug.is_empty() {
            return Err(RecordError::EmptySlug(name));
        }

        let price = parse_price(required(row, &[COL_PRICE], COL_PRICE)?)?;
        let stock = optional_int(row, &[COL_STOCK], COL_STOCK)?.unwrap_or(0);
        let status = match row.get(COL_STATUS) {
            Some(s) => ProductStatus::from_str_value(s).map_err(RecordError::InvalidStatus)?,
            None => ProductStatus::default(),
        };
        let category_id = optional_id(row, CATEGORY_ID_COLUMNS, "category_id")?;

        Ok(Self {
            name,
            slug,
            description: row.get(COL_DESCRIPTION).map(str::to_string),
            price,
            stock,
            status,
            category_id,
        })
    }
}

impl TryFrom<&TabularRow> for StatusUpdateRecord {
    type Error = RecordError;

    fn try_from(row: &TabularRow) -> Result<Self, Self::Error> {
        let product_id = required_id(row, PRODUCT_ID_COLUMNS, "id")?;
        let status = ProductStatus::from_str_value(required(row, &[COL_STATUS], COL_STATUS)?)
            .map_err(RecordError::InvalidStatus)?;
        Ok(Self { product_id, status })
    }
}

impl TryFrom<&TabularRow> for CategoryAssignmentRecord {
    type Error = RecordError;

    fn try_from(row: &TabularRow) -> Result<Self, Self::Error> {
        Ok(Self {
            product_id: required_id(row, PRODUCT_ID_COLUMNS, "id")?,
            category_id: required_id(row, CATEGORY_ID_COLUMNS, "category_id")?,
        })
    }
}

impl TryFrom<&TabularRow> for PriceUpdateRecord {
    type Error = RecordError;

    fn try_from(row: &TabularRow) -> Result<Self, Self::Error> {
        Ok(Self {
            product_id: required_id(row, PRODUCT_ID_COLUMNS, "id")?,
            price: parse_price(required(row, &[COL_PRICE], COL_PRICE)?)?,
        })
    }
}

impl TryFrom<&TabularRow> for VariantCreationRecord {
    type Error = RecordError;

    fn try_from(row: &TabularRow) -> Result<Self, Self::Error> {
        let parent_id = required_id(row, PARENT_ID_COLUMNS, "parent_id")?;
        let name = required(row, &[COL_NAME], COL_NAME)?.to_string();

        let options = match row.get(COL_OPTIONS) {
            None => Map::new(),
            Some(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    return Err(RecordError::InvalidOptions(
                        "expected a JSON object".to_string(),
                    ))
                }
                Err(e) => return Err(RecordError::InvalidOptions(e.to_string())),
            },
        };

        // Tracking stays on unless the cell literally says "false".
        let inventory_tracking = !row
            .get(COL_INVENTORY_TRACKING)
            .is_some_and(|v| v.eq_ignore_ascii_case("false"));

        let price = row.get(COL_PRICE).map(parse_price).transpose()?;

        Ok(Self {
            parent_id,
            name,
            sku: row.get(COL_SKU).map(str::to_string),
            price,
            stock: optional_int(row, &[COL_STOCK], COL_STOCK)?.unwrap_or(0),
            options,
            inventory_tracking,
            low_stock_threshold: optional_int(
                row,
                &[COL_LOW_STOCK_THRESHOLD],
                COL_LOW_STOCK_THRESHOLD,
            )?
            .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD),
        })
    }
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Operator-facing label for a row, used on failed results.
///
/// Returns the first present cell among `columns`, or `row <n>`.
pub fn row_identifier(row: &TabularRow, columns: &[&str]) -> String {
    row.get_any(columns)
        .map(str::to_string)
        .unwrap_or_else(|| format!("row {}", row.line))
}

// ---------------------------------------------------------------------------
// Cell parsing helpers
// ---------------------------------------------------------------------------

fn required<'a>(
    row: &'a TabularRow,
    columns: &[&str],
    label: &'static str,
) -> Result<&'a str, RecordError> {
    row.get_any(columns).ok_or(RecordError::MissingColumn(label))
}

fn parse_int(value: &str, column: &'static str) -> Result<i64, RecordError> {
    value.parse::<i64>().map_err(|_| RecordError::InvalidInteger {
        column,
        value: value.to_string(),
    })
}

fn required_id(
    row: &TabularRow,
    columns: &[&str],
    label: &'static str,
) -> Result<DbId, RecordError> {
    parse_int(required(row, columns, label)?, label)
}

fn optional_id(
    row: &TabularRow,
    columns: &[&str],
    label: &'static str,
) -> Result<Option<DbId>, RecordError> {
    row.get_any(columns).map(|v| parse_int(v, label)).transpose()
}

fn optional_int(
    row: &TabularRow,
    columns: &[&str],
    label: &'static str,
) -> Result<Option<i32>, RecordError> {
    row.get_any(columns)
        .map(|v| {
            v.parse::<i32>().map_err(|_| RecordError::InvalidInteger {
                column: label,
                value: v.to_string(),
            })
        })
        .transpose()
}

fn parse_price(value: &str) -> Result<Decimal, RecordError> {
    let price = value
        .parse::<Decimal>()
        .map_err(|_| RecordError::InvalidDecimal {
            column: COL_PRICE,
            value: value.to_string(),
        })?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(RecordError::Negative {
            column: COL_PRICE,
            value: value.to_string(),
        });
    }
    Ok(price)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use assert_matches::assert_matches;

    use super::*;

    fn row(pairs: &[(&str, &str)]) -> TabularRow {
        TabularRow::from_pairs(1, pairs.iter().copied())
    }

    // --- Import ---

    #[test]
    fn import_row_converts_with_defaults() {
        let record =
            ImportRecord::try_from(&row(&[("name", "Linen Apron"), ("price", "19.90")])).unwrap();

        assert_eq!(record.slug, "linen-apron");
        assert_eq!(record.price, Decimal::from_str("19.90").unwrap());
        assert_eq!(record.stock, 0);
        assert_eq!(record.status, ProductStatus::Draft);
        assert_eq!(record.category_id, None);
    }

    #[test]
    fn import_row_keeps_price_precision() {
        let record = ImportRecord::try_from(&row(&[
            ("name", "Bolt"),
            ("price", "0.105"),
            ("stock", "40"),
            ("categoryId", "3"),
        ]))
        .unwrap();

        assert_eq!(record.price.to_string(), "0.105");
        assert_eq!(record.stock, 40);
        assert_eq!(record.category_id, Some(3));
    }

    #[test]
    fn import_row_rejects_bad_price() {
        let err = ImportRecord::try_from(&row(&[("name", "Bolt"), ("price", "ten")])).unwrap_err();
        assert_matches!(err, RecordError::InvalidDecimal { column: "price", .. });
    }

    #[test]
    fn import_row_rejects_fractional_stock() {
        let err = ImportRecord::try_from(&row(&[
            ("name", "Bolt"),
            ("price", "1"),
            ("stock", "2.5"),
        ]))
        .unwrap_err();
        assert_matches!(err, RecordError::InvalidInteger { column: "stock", .. });
    }

    #[test]
    fn import_row_requires_name() {
        let err = ImportRecord::try_from(&row(&[("price", "1")])).unwrap_err();
        assert_eq!(err, RecordError::MissingColumn("name"));
    }

    #[test]
    fn import_row_rejects_unsluggable_name() {
        let err = ImportRecord::try_from(&row(&[("name", "***"), ("price", "1")])).unwrap_err();
        assert_matches!(err, RecordError::EmptySlug(_));
    }

    // --- Status / category / price ---

    #[test]
    fn status_update_accepts_product_id_alias() {
        let record =
            StatusUpdateRecord::try_from(&row(&[("productId", "9"), ("status", "archived")]))
                .unwrap();
        assert_eq!(record.product_id, 9);
        assert_eq!(record.status, ProductStatus::Archived);
    }

    #[test]
    fn status_update_rejects_unknown_status() {
        let err =
            StatusUpdateRecord::try_from(&row(&[("id", "9"), ("status", "gone")])).unwrap_err();
        assert_matches!(err, RecordError::InvalidStatus(_));
    }

    #[test]
    fn category_assignment_requires_both_ids() {
        let err = CategoryAssignmentRecord::try_from(&row(&[("id", "9")])).unwrap_err();
        assert_eq!(err, RecordError::MissingColumn("category_id"));
    }

    #[test]
    fn price_update_rejects_negative_price() {
        let err =
            PriceUpdateRecord::try_from(&row(&[("id", "1"), ("price", "-3.00")])).unwrap_err();
        assert_matches!(err, RecordError::Negative { .. });
    }

    #[test]
    fn price_update_rejects_non_numeric_id() {
        let err =
            PriceUpdateRecord::try_from(&row(&[("id", "abc"), ("price", "3")])).unwrap_err();
        assert_matches!(err, RecordError::InvalidInteger { column: "id", .. });
    }

    // --- Variants ---

    #[test]
    fn variant_defaults_tracking_and_threshold() {
        let record = VariantCreationRecord::try_from(&row(&[
            ("parent_id", "4"),
            ("name", "Large"),
            ("options", r#"{"size":"L"}"#),
        ]))
        .unwrap();

        assert!(record.inventory_tracking);
        assert_eq!(record.low_stock_threshold, DEFAULT_LOW_STOCK_THRESHOLD);
        assert_eq!(record.options["size"], "L");
        assert_eq!(record.price, None);
    }

    #[test]
    fn variant_tracking_only_disabled_by_literal_false() {
        let off = VariantCreationRecord::try_from(&row(&[
            ("parentId", "4"),
            ("name", "L"),
            ("inventoryTracking", "FALSE"),
            ("lowStockThreshold", "2"),
        ]))
        .unwrap();
        assert!(!off.inventory_tracking);
        assert_eq!(off.low_stock_threshold, 2);

        let on = VariantCreationRecord::try_from(&row(&[
            ("parentId", "4"),
            ("name", "L"),
            ("inventoryTracking", "no"),
        ]))
        .unwrap();
        assert!(on.inventory_tracking);
    }

    #[test]
    fn variant_rejects_malformed_options() {
        let err = VariantCreationRecord::try_from(&row(&[
            ("parent_id", "4"),
            ("name", "L"),
            ("options", "{size: L"),
        ]))
        .unwrap_err();
        assert_matches!(err, RecordError::InvalidOptions(_));

        let err = VariantCreationRecord::try_from(&row(&[
            ("parent_id", "4"),
            ("name", "L"),
            ("options", "[1,2]"),
        ]))
        .unwrap_err();
        assert_matches!(err, RecordError::InvalidOptions(_));
    }

    // --- Identifiers ---

    #[test]
    fn identifier_falls_back_to_line_number() {
        let r = TabularRow::from_pairs(42, [("price", "1")]);
        assert_eq!(row_identifier(&r, &["name"]), "row 42");
        assert_eq!(row_identifier(&r, &["price"]), "1");
    }
}

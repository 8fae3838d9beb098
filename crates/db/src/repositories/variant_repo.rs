//! Repository for the `product_variants` table.

use sqlx::{PgConnection, PgPool};

use crate::models::variant::{CreateVariant, ProductVariant, VariantExportRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, product_id, name, sku, price, stock, options, inventory_tracking, \
    low_stock_threshold, created_at, updated_at";

/// Provides create operations for variants plus the export query.
pub struct VariantRepo;

impl VariantRepo {
    /// Insert a new variant, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        body: &CreateVariant,
    ) -> Result<ProductVariant, sqlx::Error> {
        let query = format!(
            "INSERT INTO product_variants \
                (product_id, name, sku, price, stock, options, inventory_tracking, \
                 low_stock_threshold) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProductVariant>(&query)
            .bind(body.product_id)
            .bind(&body.name)
            .bind(&body.sku)
            .bind(body.price)
            .bind(body.stock)
            .bind(&body.options)
            .bind(body.inventory_tracking)
            .bind(body.low_stock_threshold)
            .fetch_one(conn)
            .await
    }

    /// All variants with their parent product name resolved.
    pub async fn list_for_export(pool: &PgPool) -> Result<Vec<VariantExportRow>, sqlx::Error> {
        sqlx::query_as::<_, VariantExportRow>(
            "SELECT v.id, v.product_id, p.name AS product_name, v.name, v.sku, v.price, \
                    v.stock, v.options, v.inventory_tracking, v.low_stock_threshold, \
                    v.created_at \
             FROM product_variants v \
             JOIN products p ON p.id = v.product_id \
             ORDER BY v.product_id, v.id",
        )
        .fetch_all(pool)
        .await
    }
}

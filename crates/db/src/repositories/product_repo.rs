//! Repository for the `products` table.

use catalog_core::types::DbId;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::models::product::{CreateProduct, Product, ProductExportRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, slug, description, price, stock, status, category_id, \
    created_at, updated_at";

/// Provides create/update operations for products plus the export query.
pub struct ProductRepo;

impl ProductRepo {
    /// Insert a new product, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        body: &CreateProduct,
    ) -> Result<Product, sqlx::Error> {
        let query = format!(
            "INSERT INTO products \
                (name, slug, description, price, stock, status, category_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(&body.name)
            .bind(&body.slug)
            .bind(&body.description)
            .bind(body.price)
            .bind(body.stock)
            .bind(&body.status)
            .bind(body.category_id)
            .fetch_one(conn)
            .await
    }

    /// Whether a product with this id exists.
    pub async fn exists(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
            .bind(id)
            .fetch_one(conn)
            .await
    }

    /// Set the status. Returns `None` if no product has this id.
    pub async fn update_status(
        conn: &mut PgConnection,
        id: DbId,
        status: &str,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET status = $2, updated_at = now() \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(conn)
            .await
    }

    /// Set the category reference. Returns `None` if no product has this id.
    pub async fn update_category(
        conn: &mut PgConnection,
        id: DbId,
        category_id: DbId,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET category_id = $2, updated_at = now() \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(category_id)
            .fetch_optional(conn)
            .await
    }

    /// Set the price. Returns `None` if no product has this id.
    pub async fn update_price(
        conn: &mut PgConnection,
        id: DbId,
        price: Decimal,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET price = $2, updated_at = now() \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(price)
            .fetch_optional(conn)
            .await
    }

    /// All products with their category name resolved, oldest first.
    pub async fn list_for_export(pool: &PgPool) -> Result<Vec<ProductExportRow>, sqlx::Error> {
        sqlx::query_as::<_, ProductExportRow>(
            "SELECT p.id, p.name, p.slug, p.description, p.price, p.stock, p.status, \
                    p.category_id, c.name AS category_name, p.created_at \
             FROM products p \
             LEFT JOIN categories c ON c.id = p.category_id \
             ORDER BY p.id",
        )
        .fetch_all(pool)
        .await
    }
}

//! Repository for the `categories` table.

use catalog_core::types::DbId;
use sqlx::PgConnection;

/// Category lookups used when assigning products to categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// Whether a category with this id exists.
    pub async fn exists(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
            .bind(id)
            .fetch_one(conn)
            .await
    }
}

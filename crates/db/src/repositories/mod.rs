//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods. Reads
//! take `&PgPool`; writes take `&mut PgConnection` so callers can run them
//! inside a transaction (`&mut *tx`).

pub mod category_repo;
pub mod product_repo;
pub mod variant_repo;

pub use category_repo::CategoryRepo;
pub use product_repo::ProductRepo;
pub use variant_repo::VariantRepo;

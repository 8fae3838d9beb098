//! Row models and DTOs, one module per table.

pub mod product;
pub mod variant;

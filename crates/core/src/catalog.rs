//! Catalog entity vocabulary: product lifecycle statuses and slugs.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Valid product status strings (stored in the `products.status` column).
pub const PRODUCT_STATUS_DRAFT: &str = "DRAFT";
pub const PRODUCT_STATUS_ACTIVE: &str = "ACTIVE";
pub const PRODUCT_STATUS_ARCHIVED: &str = "ARCHIVED";

/// All valid product status strings.
pub const VALID_PRODUCT_STATUSES: &[&str] = &[
    PRODUCT_STATUS_DRAFT,
    PRODUCT_STATUS_ACTIVE,
    PRODUCT_STATUS_ARCHIVED,
];

/// Default low-stock threshold for new variants.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 5;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Lifecycle status of a catalog product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    #[default]
    Draft,
    Active,
    Archived,
}

impl ProductStatus {
    /// Convert from a database or upload string value (case-insensitive).
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_uppercase().as_str() {
            PRODUCT_STATUS_DRAFT => Ok(Self::Draft),
            PRODUCT_STATUS_ACTIVE => Ok(Self::Active),
            PRODUCT_STATUS_ARCHIVED => Ok(Self::Archived),
            _ => Err(format!(
                "Invalid status '{s}'. Must be one of: {}",
                VALID_PRODUCT_STATUSES.join(", ")
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => PRODUCT_STATUS_DRAFT,
            Self::Active => PRODUCT_STATUS_ACTIVE,
            Self::Archived => PRODUCT_STATUS_ARCHIVED,
        }
    }
}

// ---------------------------------------------------------------------------
// Slug generation
// ---------------------------------------------------------------------------

/// Generate a URL-safe slug from a product name.
///
/// Lowercases, replaces anything outside `[a-z0-9]` with hyphens, collapses
/// runs of hyphens, and trims hyphens from both ends.
pub fn generate_slug(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut prev_hyphen = false;

    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c);
            prev_hyphen = false;
        } else if !prev_hyphen {
            result.push('-');
            prev_hyphen = true;
        }
    }

    result.trim_matches('-').to_string()
}

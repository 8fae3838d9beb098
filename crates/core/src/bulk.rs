//! Bulk catalog operation types (kinds, statuses, results, snapshots).
//!
//! The snapshot defined here is what the progress store holds and what the
//! status endpoint returns verbatim.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Rows committed per transaction.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// How long a snapshot survives after its most recent write.
pub const DEFAULT_PROGRESS_TTL: Duration = Duration::from_secs(5 * 60);

/// Prefix for progress store keys.
pub const PROGRESS_KEY_PREFIX: &str = "bulk:operation:";

/// Valid operation kind strings (as submitted in the `operation` field).
pub const KIND_IMPORT: &str = "IMPORT";
pub const KIND_STATUS_UPDATE: &str = "STATUS_UPDATE";
pub const KIND_CATEGORY_ASSIGNMENT: &str = "CATEGORY_ASSIGNMENT";
pub const KIND_PRICE_UPDATE: &str = "PRICE_UPDATE";
pub const KIND_VARIANT_CREATION: &str = "VARIANT_CREATION";

/// All valid operation kind strings.
pub const VALID_KINDS: &[&str] = &[
    KIND_IMPORT,
    KIND_STATUS_UPDATE,
    KIND_CATEGORY_ASSIGNMENT,
    KIND_PRICE_UPDATE,
    KIND_VARIANT_CREATION,
];

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The closed set of bulk mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationKind {
    Import,
    StatusUpdate,
    CategoryAssignment,
    PriceUpdate,
    VariantCreation,
}

impl OperationKind {
    pub const ALL: [OperationKind; 5] = [
        Self::Import,
        Self::StatusUpdate,
        Self::CategoryAssignment,
        Self::PriceUpdate,
        Self::VariantCreation,
    ];

    /// Parse a submitted selector. Accepts `PRICE_UPDATE`, `price_update`
    /// and `price-update`.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            KIND_IMPORT => Ok(Self::Import),
            KIND_STATUS_UPDATE => Ok(Self::StatusUpdate),
            KIND_CATEGORY_ASSIGNMENT => Ok(Self::CategoryAssignment),
            KIND_PRICE_UPDATE => Ok(Self::PriceUpdate),
            KIND_VARIANT_CREATION => Ok(Self::VariantCreation),
            _ => Err(format!(
                "Invalid operation '{s}'. Must be one of: {}",
                VALID_KINDS.join(", ")
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Import => KIND_IMPORT,
            Self::StatusUpdate => KIND_STATUS_UPDATE,
            Self::CategoryAssignment => KIND_CATEGORY_ASSIGNMENT,
            Self::PriceUpdate => KIND_PRICE_UPDATE,
            Self::VariantCreation => KIND_VARIANT_CREATION,
        }
    }

    /// Lowercase form used in operation ids and file names.
    pub fn slug(&self) -> String {
        self.as_str().to_ascii_lowercase()
    }

    /// Header row an upload for this kind is expected to carry.
    pub fn template_columns(&self) -> &'static [&'static str] {
        match self {
            Self::Import => &["name", "description", "price", "stock", "status", "category_id"],
            Self::StatusUpdate => &["id", "status"],
            Self::CategoryAssignment => &["id", "category_id"],
            Self::PriceUpdate => &["id", "price"],
            Self::VariantCreation => &[
                "parent_id",
                "name",
                "sku",
                "price",
                "stock",
                "options",
                "inventory_tracking",
                "low_stock_threshold",
            ],
        }
    }
}

/// Operation lifecycle. Created as `Processing`; `Completed` and `Failed`
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Processing,
    Completed,
    Failed,
}

impl OperationStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Processing)
    }
}

// ---------------------------------------------------------------------------
// Results and snapshots
// ---------------------------------------------------------------------------

/// Outcome of one input row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordResult {
    pub success: bool,
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecordResult {
    pub fn ok(identifier: impl Into<String>) -> Self {
        Self {
            success: true,
            identifier: identifier.into(),
            error: None,
        }
    }

    pub fn failed(identifier: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            identifier: identifier.into(),
            error: Some(error.into()),
        }
    }
}

/// The state of an operation as held by the progress store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSnapshot {
    pub status: OperationStatus,
    pub kind: OperationKind,
    pub processed: usize,
    pub total: usize,
    /// Results of every committed row, in input order.
    #[serde(default)]
    pub results: Vec<RecordResult>,
    /// Set only when a batch-fatal error terminated the operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: Timestamp,
    pub updated_at: Timestamp,
}

impl OperationSnapshot {
    /// Initial snapshot written at dispatch time.
    pub fn processing(kind: OperationKind, total: usize) -> Self {
        let now = chrono::Utc::now();
        Self {
            status: OperationStatus::Processing,
            kind,
            processed: 0,
            total,
            results: Vec::new(),
            error: None,
            started_at: now,
            updated_at: now,
        }
    }

    /// Number of failed rows among the committed results.
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.success).count()
    }
}

// ---------------------------------------------------------------------------
// Identifiers and batching
// ---------------------------------------------------------------------------

/// Build a fresh operation id: `bulk_<kind>_<unix-millis>_<random>`.
///
/// The random suffix keeps two submissions of the same kind in the same
/// millisecond from sharing a progress key.
pub fn new_operation_id(kind: OperationKind) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("bulk_{}_{}_{}", kind.slug(), millis, &suffix[..12])
}

/// Progress store key for an operation id.
pub fn progress_key(operation_id: &str) -> String {
    format!("{PROGRESS_KEY_PREFIX}{operation_id}")
}

/// Number of batches needed for `total` rows: `ceil(total / batch_size)`.
pub fn batch_count(total: usize, batch_size: usize) -> usize {
    if batch_size == 0 {
        return 0;
    }
    total.div_ceil(batch_size)
}

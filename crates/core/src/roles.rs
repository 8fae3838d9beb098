//! Caller roles carried in the access token's `role` claim.

use serde::{Deserialize, Serialize};

/// Role names are issued by the identity provider; unknown names are kept
/// as [`Role::Other`] so a new role never invalidates a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    Viewer,
    #[serde(other)]
    Other,
}

impl Role {
    /// Bulk mutations and exports are admin-only.
    pub fn can_run_bulk(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

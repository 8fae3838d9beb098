//! Role gate for bulk operations.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// An [`AuthUser`] allowed to run bulk mutations and exports.
/// Rejects with 403 for any other role.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.role.can_run_bulk() {
            return Err(AppError::Forbidden("Admin role required".into()));
        }
        Ok(RequireAdmin(user))
    }
}

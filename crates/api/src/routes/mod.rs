pub mod bulk;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /bulk/operations                                 submit (POST, admin only)
/// /bulk/operations/{id}                            progress snapshot (GET)
/// /bulk/export                                     catalog CSV export (GET, admin only)
/// /bulk/templates/{kind}                           upload header template (GET, admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/bulk", bulk::router())
}

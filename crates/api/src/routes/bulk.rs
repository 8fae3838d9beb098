//! Route definitions for bulk catalog operations.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::bulk;
use crate::state::AppState;

/// Bulk routes mounted at `/bulk`.
///
/// ```text
/// POST   /operations              -> submit_operation
/// GET    /operations/{id}         -> get_operation_status
/// GET    /export                  -> export_catalog
/// GET    /templates/{kind}        -> download_template
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/operations", post(bulk::submit_operation))
        .route("/operations/{id}", get(bulk::get_operation_status))
        .route("/export", get(bulk::export_catalog))
        .route("/templates/{kind}", get(bulk::download_template))
}

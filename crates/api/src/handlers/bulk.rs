//! Handlers for bulk catalog operations, export, and upload templates.
//!
//! Every error from these endpoints is rendered as a `text/plain` body via
//! [`PlainTextError`], including authentication failures, which is why the
//! auth extractors are taken as `Result`s.

use axum::body::Bytes;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use catalog_core::bulk::OperationKind;
use serde::{Deserialize, Serialize};

use crate::engine::export::{self, ExportFormat, ExportKind, CSV_CONTENT_TYPE};
use crate::engine::progress::load_snapshot_raw;
use crate::engine::tabular::write_rows;
use crate::error::{AppError, PlainTextError};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

const FIELD_FILE: &str = "file";
const FIELD_OPERATION: &str = "operation";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub operation_id: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    /// `all` (default) or `variants`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// `csv` (default).
    pub format: Option<String>,
}

/// POST /api/v1/bulk/operations
///
/// Multipart fields: `file` (the CSV upload) and `operation` (the kind).
/// Returns as soon as the operation is dispatched; progress is polled via
/// [`get_operation_status`].
pub async fn submit_operation(
    admin: Result<RequireAdmin, AppError>,
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SubmitResponse>, PlainTextError> {
    let RequireAdmin(user) = admin?;
    let mut multipart = multipart.map_err(|e| upload_error(e.status(), e.body_text()))?;

    let mut file: Option<Bytes> = None;
    let mut operation: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            FIELD_FILE => {
                file = Some(
                    field
                        .bytes()
                        .await
                        .map_err(multipart_error)?,
                );
            }
            FIELD_OPERATION => {
                operation = Some(
                    field
                        .text()
                        .await
                        .map_err(multipart_error)?,
                );
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;
    let operation = operation
        .filter(|op| !op.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Operation type is required".to_string()))?;
    let kind = OperationKind::from_str_value(&operation).map_err(AppError::BadRequest)?;

    let dispatched = state
        .dispatcher
        .dispatch_upload(kind, &file)
        .await
        .map_err(|e| AppError::BadRequest(format!("Could not parse uploaded file: {e}")))?;

    tracing::info!(
        operation_id = %dispatched.operation_id,
        kind = kind.as_str(),
        user_id = user.user_id,
        "Bulk operation submitted",
    );

    Ok(Json(SubmitResponse {
        success: true,
        message: format!(
            "Bulk {} operation started for {} rows",
            kind.as_str(),
            dispatched.total
        ),
        operation_id: dispatched.operation_id,
    }))
}

/// GET /api/v1/bulk/operations/{id}
///
/// Returns the stored snapshot exactly as written by the engine.
pub async fn get_operation_status(
    auth: Result<AuthUser, AppError>,
    State(state): State<AppState>,
    Path(operation_id): Path<String>,
) -> Result<Response, PlainTextError> {
    auth?;

    let raw = load_snapshot_raw(state.progress.as_ref(), &operation_id)
        .await
        .map_err(|e| AppError::InternalError(format!("Progress store read failed: {e}")))?
        .ok_or_else(|| AppError::NotFound("Operation not found".to_string()))?;

    Ok(([(CONTENT_TYPE, "application/json")], raw).into_response())
}

/// GET /api/v1/bulk/export?type=all|variants&format=csv
pub async fn export_catalog(
    admin: Result<RequireAdmin, AppError>,
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> Result<Response, PlainTextError> {
    admin?;

    let kind = ExportKind::from_str_value(params.kind.as_deref().unwrap_or("all"))
        .map_err(AppError::BadRequest)?;
    let format = ExportFormat::from_str_value(params.format.as_deref().unwrap_or("csv"))
        .map_err(AppError::BadRequest)?;

    let file = export::export_catalog(state.catalog.as_ref(), kind, format)
        .await
        .map_err(|e| AppError::InternalError(format!("Export failed: {e}")))?;

    Ok(attachment(file.content_type, &file.filename, file.body))
}

/// GET /api/v1/bulk/templates/{kind}
///
/// A CSV containing only the header row accepted by `kind`.
pub async fn download_template(
    admin: Result<RequireAdmin, AppError>,
    Path(kind): Path<String>,
) -> Result<Response, PlainTextError> {
    admin?;

    let kind = OperationKind::from_str_value(&kind).map_err(AppError::BadRequest)?;
    let body = write_rows(kind.template_columns(), std::iter::empty())
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    Ok(attachment(
        CSV_CONTENT_TYPE,
        &format!("template-{}.csv", kind.slug()),
        body,
    ))
}

fn multipart_error(err: MultipartError) -> AppError {
    upload_error(err.status(), err.body_text())
}

/// Keep 413 for oversized uploads; every other multipart failure is a 400.
fn upload_error(status: StatusCode, message: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(message)
    } else {
        AppError::BadRequest(message)
    }
}

fn attachment(content_type: &str, filename: &str, body: String) -> Response {
    (
        [
            (CONTENT_TYPE, content_type.to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}

use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Error type shared by handlers and request extractors.
///
/// Renders as a JSON `{ error, code }` body by default. [`PlainTextError`]
/// renders the same classification as `text/plain`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The request body exceeded the configured upload limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// A resource addressed by an opaque key does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Logged in full; the caller only sees a generic message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    /// Map the error to an HTTP status, a stable error code, and a message
    /// safe to show to the caller.
    pub fn classify(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.classify();
        (status, axum::Json(json!({ "error": message, "code": code }))).into_response()
    }
}

/// An [`AppError`] rendered as a `text/plain` body.
///
/// Used by the bulk endpoints, whose clients expect a bare message on
/// validation and auth failures.
#[derive(Debug)]
pub struct PlainTextError(pub AppError);

impl From<AppError> for PlainTextError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for PlainTextError {
    fn into_response(self) -> Response {
        let (status, _code, message) = self.0.classify();
        (status, [(CONTENT_TYPE, "text/plain; charset=utf-8")], message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_message_is_not_leaked() {
        let (status, code, message) =
            AppError::InternalError("redis connection reset".into()).classify();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "INTERNAL_ERROR");
        assert_eq!(message, "An internal error occurred");
    }

    #[test]
    fn plain_text_keeps_status() {
        let response = PlainTextError(AppError::Forbidden("Admin role required".into())).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }
}

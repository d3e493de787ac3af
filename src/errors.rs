use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::models::FieldErrors;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Db(StoreError),
    #[error("Validation error: {}", .0.summary())]
    Validation(FieldErrors),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Db(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let detail = self.to_string();
        let body = match self {
            AppError::Validation(errors) => json!({
                "error": "Validation failed",
                "errors": errors.0,
            }),
            AppError::NotFound(msg) | AppError::Conflict(msg) => json!({ "error": msg }),
            AppError::Unauthorized => json!({ "error": "Unauthorized" }),
            AppError::Db(_) | AppError::Internal(_) => json!({
                "error": "Internal server error",
                "detail": detail,
            }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        AppError::Db(value)
    }
}

impl From<FieldErrors> for AppError {
    fn from(value: FieldErrors) -> Self {
        AppError::Validation(value)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection_errors(&rejection.body_text(), "body"))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection_errors(&rejection.body_text(), "query"))
    }
}

fn missing_field(detail: &str) -> Option<&str> {
    let (_, rest) = detail.split_once("missing field `")?;
    rest.split('`').next()
}

// serde_path_to_error prefixes the cause with the offending path, e.g. "purchase: invalid type".
fn invalid_field(detail: &str) -> Option<&str> {
    let (_, cause) = detail.split_once("target type: ")?;
    let (path, _) = cause.split_once(": ")?;
    (!path.is_empty() && !path.contains(' ')).then_some(path)
}

fn rejection_errors(detail: &str, fallback: &str) -> FieldErrors {
    let mut errors = FieldErrors::default();
    if let Some(field) = missing_field(detail) {
        errors.push(field, format!("The {} field is required", field));
    } else {
        errors.push(invalid_field(detail).unwrap_or(fallback), detail);
    }
    errors
}

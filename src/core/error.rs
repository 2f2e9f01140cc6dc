use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use validator::ValidationErrors;

use crate::shared::types::ErrorResponse;

/// Field name -> human readable messages, ordered by field for stable output
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub const VALIDATION_FAIL: &str = "Validation fail";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0:?}")]
    Validation(FieldErrors),

    /// Request understood but refused, rendered as `{error, reason}`
    #[error("{error}: {reason}")]
    Rejected { error: String, reason: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl AppError {
    /// Validation failure on a single field
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        AppError::Validation(errors)
    }

    pub fn rejected(error: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Rejected {
            error: error.into(),
            reason: reason.into(),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();

        for (field, errs) in errors.field_errors() {
            let field = field.to_string();
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("The {} field is invalid.", field))
                })
                .collect::<Vec<_>>();
            fields.entry(field).or_default().extend(messages);
        }

        AppError::Validation(fields)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, reason) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                    serde_json::Value::Null,
                )
            }
            AppError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                VALIDATION_FAIL.to_string(),
                serde_json::to_value(fields).unwrap_or(serde_json::Value::Null),
            ),
            AppError::Rejected { error, reason } => (
                StatusCode::BAD_REQUEST,
                error,
                serde_json::Value::String(reason),
            ),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "Bad request".to_string(),
                serde_json::Value::String(msg),
            ),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    serde_json::Value::Null,
                )
            }
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized".to_string(),
                serde_json::Value::String(msg),
            ),
            AppError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                "Access denied".to_string(),
                serde_json::Value::String(msg),
            ),
        };

        let body = Json(ErrorResponse::new(error, reason));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(required(message = "The name field is required."))]
        name: Option<String>,
        #[validate(range(min = 1))]
        count: i64,
    }

    #[test]
    fn test_validation_errors_become_field_map() {
        let sample = Sample {
            name: None,
            count: 0,
        };
        let err: AppError = sample.validate().unwrap_err().into();

        match err {
            AppError::Validation(fields) => {
                assert_eq!(
                    fields.get("name"),
                    Some(&vec!["The name field is required.".to_string()])
                );
                assert_eq!(
                    fields.get("count"),
                    Some(&vec!["The count field is invalid.".to_string()])
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_validation_status_is_bad_request() {
        let response = AppError::field("start_at", "required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_forbidden_status() {
        let response = AppError::Forbidden("nope".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}

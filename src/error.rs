//! Application error type.
//!
//! Every service returns [`AppError`]. The HTTP boundary turns it into a
//! status code plus the unified [`ApiResponse`] envelope; storage failures
//! are logged and replaced by a generic message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::gateway::types::{ApiResponse, error_codes};

#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed input or business-rule violation (insufficient stock, wrong shop, ...)
    #[error("validation failed: {0}")]
    Validation(String),

    /// Referenced entity is absent
    #[error("{0} not found")]
    NotFound(String),

    /// Authenticated but not allowed to touch this resource
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Uniqueness or concurrent-update conflict
    #[error("conflict: {0}")]
    Conflict(String),

    /// Missing or invalid credentials
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn not_found(entity: impl Into<String>) -> Self {
        Self::NotFound(entity.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// A delete blocked by rows that point at the target.
    pub fn still_referenced() -> Self {
        Self::Conflict("resource is still referenced by other records".to_string())
    }

    /// A write pointing at a row that does not exist.
    pub fn missing_reference() -> Self {
        Self::Conflict("referenced resource does not exist".to_string())
    }

    /// HTTP status for this error.
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) | Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Numeric code carried in the response envelope.
    pub fn code(&self) -> i32 {
        match self {
            Self::Validation(_) => error_codes::INVALID_PARAMETER,
            Self::NotFound(_) => error_codes::NOT_FOUND,
            Self::Forbidden(_) => error_codes::FORBIDDEN,
            Self::Conflict(_) => error_codes::CONFLICT,
            Self::Unauthorized(_) => error_codes::AUTH_FAILED,
            Self::Internal(_) | Self::Database(_) => error_codes::INTERNAL_ERROR,
        }
    }

    /// Message that is safe to show to clients.
    pub fn public_message(&self) -> String {
        match self {
            Self::Internal(_) | Self::Database(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return Self::Conflict(conflict_message(db_err.constraint()).to_string());
            }
            if db_err.is_foreign_key_violation() {
                return foreign_key_conflict(db_err.message());
            }
        }
        Self::Database(err)
    }
}

/// PostgreSQL reports the child side as "insert or update on table ..." and
/// the parent side as "update or delete on table ...".
fn foreign_key_conflict(message: &str) -> AppError {
    if message.starts_with("insert or update") {
        AppError::missing_reference()
    } else {
        AppError::still_referenced()
    }
}

fn conflict_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("users_email_key") => "email already in use",
        Some("shops_owner_id_key") => "shop for this user already exists",
        _ => "resource already exists",
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }
        let body = ApiResponse::<()>::error(self.code(), self.public_message());
        (status, Json(body)).into_response()
    }
}

use thiserror::Error;
use std::collections::HashMap;
use serde::{Serialize, Deserialize};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Structured validation errors with field-level error mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidationErrors {
    Single { field: String, message: String },
    Multiple { fields: HashMap<String, String> },
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationErrors::Single { field, message } => write!(f, "{}: {}", field, message),
            ValidationErrors::Multiple { fields } => {
                let mut parts: Vec<String> = fields
                    .iter()
                    .map(|(field, message)| format!("{}: {}", field, message))
                    .collect();
                parts.sort();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}

/// The custom error type for the application.
#[derive(Debug, Error)]
pub enum Error {
    /// A record that was addressed by id does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Email/password pair did not match any account.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The account exists but has not been approved by an administrator.
    #[error("Account pending approval: {0}")]
    NotApproved(String),

    /// An account with this email already exists.
    #[error("Identity already exists: {0}")]
    DuplicateIdentity(String),

    /// The one-time code was wrong, missing or expired.
    #[error("Invalid or expired verification code")]
    InvalidCode,

    /// The record store cannot be reached or has been closed.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A validation error with field-level details.
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    /// A conflict with existing state (e.g. overlapping stay dates).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A forbidden error (user lacks permission).
    #[error("Access forbidden: {0}")]
    Forbidden(String),

    /// Missing, unknown or expired session.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// An error originating from the sqlx library that is not a connectivity problem.
    #[error("SQLx error: {0}")]
    Sqlx(sqlx::Error),

    /// A stored document could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An internal server error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl Error {
    /// Shorthand for a single-field validation error.
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Error::Validation(ValidationErrors::Single {
            field: field.to_string(),
            message: message.into(),
        })
    }

    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "NOT_FOUND",
            Error::InvalidCredentials => "INVALID_CREDENTIALS",
            Error::NotApproved(_) => "NOT_APPROVED",
            Error::DuplicateIdentity(_) => "DUPLICATE_IDENTITY",
            Error::InvalidCode => "INVALID_CODE",
            Error::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::Conflict(_) => "CONFLICT",
            Error::Forbidden(_) => "FORBIDDEN",
            Error::Authentication(_) => "AUTHENTICATION_FAILED",
            Error::Sqlx(_) | Error::Serialization(_) | Error::Internal(_) => "INTERNAL_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::NotApproved(_) => StatusCode::FORBIDDEN,
            Error::DuplicateIdentity(_) => StatusCode::CONFLICT,
            Error::InvalidCode => StatusCode::UNAUTHORIZED,
            Error::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::Authentication(_) => StatusCode::UNAUTHORIZED,
            Error::Sqlx(_)
            | Error::Serialization(_)
            | Error::Internal(_)
            | Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Connectivity failures surface as `StoreUnavailable`; everything else stays a
/// database error.
impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed => Error::StoreUnavailable(e.to_string()),
            other => Error::Sqlx(other),
        }
    }
}

/// A type alias for `Result<T, Error>` to simplify function signatures.
pub type Result<T> = std::result::Result<T, Error>;

/// Convert custom Error to HTTP response
///
/// Each kind maps to an HTTP status code and a JSON body with an error message
/// and error code. Internal details (SQL, serde) are not exposed.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let body = match &self {
            Error::Validation(errors) => match errors {
                ValidationErrors::Single { field, message } => serde_json::json!({
                    "error": "Validation failed",
                    "code": code,
                    "fields": { field: message }
                }),
                ValidationErrors::Multiple { fields } => serde_json::json!({
                    "error": "Validation failed",
                    "code": code,
                    "fields": fields
                }),
            },
            Error::Sqlx(e) => {
                tracing::error!(error = %e, "Database error");
                serde_json::json!({ "error": "Database error", "code": code })
            }
            Error::Serialization(e) => {
                tracing::error!(error = %e, "Stored document could not be decoded");
                serde_json::json!({ "error": "Internal error", "code": code })
            }
            Error::Config(_) => serde_json::json!({ "error": "Configuration error", "code": code }),
            Error::StoreUnavailable(msg) => {
                tracing::error!(reason = %msg, "Record store unavailable");
                serde_json::json!({ "error": "Service temporarily unavailable", "code": code })
            }
            other => serde_json::json!({ "error": other.to_string(), "code": code }),
        };

        (status, Json(body)).into_response()
    }
}

// ABOUTME: Unified error handling with HTTP status mapping and JSON envelopes
// ABOUTME: Defines the error taxonomy shared by all route handlers and middleware
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Unified Error Handling
//!
//! Central error types for the course archive server. Every failure is
//! converted at the handler boundary into the uniform
//! `{"success": false, "message": ...}` JSON shape; validation failures
//! additionally carry field-level detail under `errors`.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Authentication & Authorization
    #[serde(rename = "AUTH_REQUIRED")]
    AuthRequired,
    #[serde(rename = "AUTH_INVALID")]
    AuthInvalid,
    #[serde(rename = "UNPROVISIONED")]
    Unprovisioned,
    #[serde(rename = "PERMISSION_DENIED")]
    PermissionDenied,

    // Validation
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput,

    // Resource Management
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound,

    // Configuration
    #[serde(rename = "CONFIG_MISSING")]
    ConfigMissing,

    // Internal Errors
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError,
    #[serde(rename = "DATABASE_ERROR")]
    DatabaseError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(self) -> StatusCode {
        match self {
            Self::InvalidInput => StatusCode::BAD_REQUEST,
            Self::AuthRequired | Self::AuthInvalid | Self::Unprovisioned => {
                StatusCode::UNAUTHORIZED
            }
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::ResourceNotFound => StatusCode::NOT_FOUND,
            Self::ConfigMissing | Self::InternalError | Self::DatabaseError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::AuthRequired => "Authentication is required to access this resource",
            Self::AuthInvalid => "The provided authentication credentials are invalid",
            Self::Unprovisioned => "No admin credential has been provisioned",
            Self::PermissionDenied => "You do not have permission to perform this action",
            Self::InvalidInput => "The provided input is invalid",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ConfigMissing => "Required configuration is missing",
            Self::InternalError => "An internal server error occurred",
            Self::DatabaseError => "Database operation failed",
        }
    }
}

/// Field-level validation detail for the wire `errors` array
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the offending request field
    pub field: String,
    /// Human-readable reason
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Field-level validation detail, when applicable
    pub field_errors: Vec<FieldError>,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field_errors: Vec::new(),
            source: None,
        }
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    /// Missing or invalid bearer token at the verification gate.
    /// Reasons are deliberately not disclosed to the caller.
    #[must_use]
    pub fn auth_required() -> Self {
        Self::new(ErrorCode::AuthRequired, "Not authorized")
    }

    /// Invalid credential (password mismatch)
    pub fn auth_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthInvalid, message)
    }

    /// No admin credential exists in the store
    #[must_use]
    pub fn unprovisioned() -> Self {
        Self::new(
            ErrorCode::Unprovisioned,
            "User not found. Please run database seed.",
        )
    }

    /// Rotation-key mismatch (operator-level gate)
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PermissionDenied, message)
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Request validation failure with field-level detail
    #[must_use]
    pub fn validation(field_errors: Vec<FieldError>) -> Self {
        Self {
            code: ErrorCode::InvalidInput,
            message: "Validation failed".into(),
            field_errors,
            source: None,
        }
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Deployment misconfiguration (missing signing secret, ...)
    pub fn config_missing(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigMissing, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// HTTP error response envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl From<&AppError> for ErrorResponse {
    fn from(error: &AppError) -> Self {
        Self {
            success: false,
            message: error.message.clone(),
            errors: if error.field_errors.is_empty() {
                None
            } else {
                Some(error.field_errors.clone())
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.http_status();

        // Internal failures are logged server-side; the client gets a
        // generic message with no internal detail. Misconfiguration keeps
        // its message so operators see what is missing.
        let body = if status == StatusCode::INTERNAL_SERVER_ERROR
            && self.code != ErrorCode::ConfigMissing
        {
            tracing::error!(code = ?self.code, error = %self, "Internal server error");
            ErrorResponse {
                success: false,
                message: "Server error".into(),
                errors: None,
            }
        } else {
            ErrorResponse::from(&self)
        };

        (status, Json(body)).into_response()
    }
}

/// Conversion from `anyhow::Error` (database layer boundary)
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::database(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(
            ErrorCode::AuthRequired.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::Unprovisioned.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::PermissionDenied.http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ErrorCode::ResourceNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ErrorCode::InvalidInput.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::ConfigMissing.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_error_carries_field_detail() {
        let error = AppError::validation(vec![FieldError::new("password", "Password is required")]);
        assert_eq!(error.code, ErrorCode::InvalidInput);

        let response = ErrorResponse::from(&error);
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"success\":false"));
        assert!(json.contains("password"));
    }

    #[test]
    fn test_plain_error_omits_errors_array() {
        let error = AppError::auth_required();
        let response = ErrorResponse::from(&error);
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("errors"));
    }
}

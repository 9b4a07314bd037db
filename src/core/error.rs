//! Typed error handling for magic-mark
//!
//! Every fallible service operation returns [`MarkResult`]. Errors are
//! grouped by category so handlers and clients can match on what went
//! wrong instead of inspecting strings.
//!
//! # Error Categories
//!
//! - [`BookmarkError`]: bookmark lookups and ownership checks
//! - [`LicenseError`]: license server calls and key activation
//! - [`ConfigError`]: configuration parsing and validation
//! - [`ValidationError`]: request payload validation
//! - [`StorageError`]: storage backends
//! - [`RequestError`]: identity and request shape
//!
//! # Example
//!
//! ```rust,ignore
//! use magic_mark::prelude::*;
//!
//! match store.update(&id, input, "user-2").await {
//!     Err(MarkError::Bookmark(BookmarkError::NotOwner { .. })) => { /* 403 */ }
//!     Err(e) => eprintln!("Other error: {}", e),
//!     Ok(bookmark) => println!("Updated {}", bookmark.name),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// The main error type of the crate
#[derive(Debug)]
pub enum MarkError {
    /// Bookmark errors (lookup, ownership)
    Bookmark(BookmarkError),

    /// License server and activation errors
    License(LicenseError),

    /// Configuration errors
    Config(ConfigError),

    /// Validation errors
    Validation(ValidationError),

    /// Storage backend errors
    Storage(StorageError),

    /// HTTP/Request errors
    Request(RequestError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for MarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkError::Bookmark(e) => write!(f, "{}", e),
            MarkError::License(e) => write!(f, "{}", e),
            MarkError::Config(e) => write!(f, "{}", e),
            MarkError::Validation(e) => write!(f, "{}", e),
            MarkError::Storage(e) => write!(f, "{}", e),
            MarkError::Request(e) => write!(f, "{}", e),
            MarkError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for MarkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MarkError::Bookmark(e) => Some(e),
            MarkError::License(e) => Some(e),
            MarkError::Config(e) => Some(e),
            MarkError::Validation(e) => Some(e),
            MarkError::Storage(e) => Some(e),
            MarkError::Request(e) => Some(e),
            MarkError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl MarkError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            MarkError::Bookmark(e) => e.status_code(),
            MarkError::License(e) => e.status_code(),
            MarkError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            MarkError::Validation(_) => StatusCode::BAD_REQUEST,
            MarkError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            MarkError::Request(e) => e.status_code(),
            MarkError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            MarkError::Bookmark(e) => e.error_code(),
            MarkError::License(e) => e.error_code(),
            MarkError::Config(_) => "CONFIG_ERROR",
            MarkError::Validation(_) => "VALIDATION_ERROR",
            MarkError::Storage(_) => "STORAGE_ERROR",
            MarkError::Request(e) => e.error_code(),
            MarkError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            MarkError::Bookmark(BookmarkError::NotFound { id })
            | MarkError::Bookmark(BookmarkError::NotOwner { id, .. }) => {
                Some(serde_json::json!({ "bookmark_id": id.to_string() }))
            }
            MarkError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            _ => None,
        }
    }

    /// Shorthand for a single-field validation failure
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        MarkError::Validation(ValidationError::FieldError {
            field: field.into(),
            message: message.into(),
        })
    }
}

impl IntoResponse for MarkError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Bookmark Errors
// =============================================================================

#[derive(Debug)]
pub enum BookmarkError {
    NotFound { id: Uuid },

    /// Only the creator may edit a bookmark
    NotOwner { id: Uuid, user_id: String },

    /// A reorder referenced a bookmark that does not exist
    UnknownInReorder { id: Uuid },
}

impl fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookmarkError::NotFound { id } => write!(f, "Bookmark with id '{}' not found", id),
            BookmarkError::NotOwner { id, user_id } => write!(
                f,
                "User '{}' can only edit their own bookmarks (bookmark '{}')",
                user_id, id
            ),
            BookmarkError::UnknownInReorder { id } => {
                write!(f, "Cannot reorder unknown bookmark '{}'", id)
            }
        }
    }
}

impl std::error::Error for BookmarkError {}

impl BookmarkError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BookmarkError::NotFound { .. } => StatusCode::NOT_FOUND,
            BookmarkError::NotOwner { .. } => StatusCode::FORBIDDEN,
            BookmarkError::UnknownInReorder { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            BookmarkError::NotFound { .. } => "BOOKMARK_NOT_FOUND",
            BookmarkError::NotOwner { .. } => "BOOKMARK_NOT_OWNER",
            BookmarkError::UnknownInReorder { .. } => "BOOKMARK_UNKNOWN_IN_REORDER",
        }
    }
}

impl From<BookmarkError> for MarkError {
    fn from(err: BookmarkError) -> Self {
        MarkError::Bookmark(err)
    }
}

// =============================================================================
// License Errors
// =============================================================================

#[derive(Debug)]
pub enum LicenseError {
    /// No key has been activated on this instance
    NoKey,

    /// The server rejected the key or reported it inactive/expired
    Invalid { key_prefix: String },

    /// The license exists but belongs to another email address
    EmailMismatch { key_prefix: String },

    /// The server answered `success: false`
    Rejected { operation: String, message: String },

    /// The license server could not be reached
    Unreachable { message: String },

    /// Access refused by the license layer
    Required,
}

impl fmt::Display for LicenseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LicenseError::NoKey => write!(f, "No license key found"),
            LicenseError::Invalid { key_prefix } => {
                write!(f, "Invalid or expired license key ({}...)", key_prefix)
            }
            LicenseError::EmailMismatch { key_prefix } => write!(
                f,
                "Email address does not match license key ({}...)",
                key_prefix
            ),
            LicenseError::Rejected { operation, message } => {
                write!(f, "License {} failed: {}", operation, message)
            }
            LicenseError::Unreachable { message } => {
                write!(f, "License server unreachable: {}", message)
            }
            LicenseError::Required => write!(f, "A valid license is required"),
        }
    }
}

impl std::error::Error for LicenseError {}

impl LicenseError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LicenseError::NoKey => StatusCode::BAD_REQUEST,
            LicenseError::Invalid { .. } => StatusCode::BAD_REQUEST,
            LicenseError::EmailMismatch { .. } => StatusCode::BAD_REQUEST,
            LicenseError::Rejected { .. } => StatusCode::BAD_REQUEST,
            LicenseError::Unreachable { .. } => StatusCode::BAD_GATEWAY,
            LicenseError::Required => StatusCode::FORBIDDEN,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            LicenseError::NoKey => "LICENSE_NO_KEY",
            LicenseError::Invalid { .. } => "LICENSE_INVALID",
            LicenseError::EmailMismatch { .. } => "LICENSE_EMAIL_MISMATCH",
            LicenseError::Rejected { .. } => "LICENSE_REJECTED",
            LicenseError::Unreachable { .. } => "LICENSE_SERVER_UNREACHABLE",
            LicenseError::Required => "LICENSE_REQUIRED",
        }
    }
}

impl From<LicenseError> for MarkError {
    fn from(err: LicenseError) -> Self {
        MarkError::License(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

#[derive(Debug)]
pub enum ConfigError {
    ParseError {
        file: Option<String>,
        message: String,
    },

    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    FileNotFound {
        path: String,
    },

    IoError {
        message: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => write!(
                f,
                "Invalid value '{}' for field '{}': {}",
                value, field, message
            ),
            ConfigError::FileNotFound { path } => {
                write!(f, "Configuration file not found: {}", path)
            }
            ConfigError::IoError { message } => write!(f, "IO error: {}", message),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for MarkError {
    fn from(err: ConfigError) -> Self {
        MarkError::Config(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

#[derive(Debug)]
pub enum ValidationError {
    FieldError { field: String, message: String },

    FieldErrors(Vec<FieldValidationError>),

    InvalidJson { message: String },

    InvalidUuid { value: String },
}

/// A single field validation error
#[derive(Debug, Clone, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldError { field, message } => {
                write!(f, "Validation error for field '{}': {}", field, message)
            }
            ValidationError::FieldErrors(errors) => {
                let msgs: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation errors: {}", msgs.join(", "))
            }
            ValidationError::InvalidJson { message } => write!(f, "Invalid JSON: {}", message),
            ValidationError::InvalidUuid { value } => write!(f, "Invalid UUID format: {}", value),
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for MarkError {
    fn from(err: ValidationError) -> Self {
        MarkError::Validation(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

#[derive(Debug)]
pub enum StorageError {
    /// A lock guarding in-memory state was poisoned
    LockPoisoned { message: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::LockPoisoned { message } => {
                write!(f, "Failed to acquire storage lock: {}", message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for MarkError {
    fn from(err: StorageError) -> Self {
        MarkError::Storage(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

#[derive(Debug)]
pub enum RequestError {
    /// No admin identity on the request
    Unauthorized { message: String },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::Unauthorized { message } => write!(f, "Unauthorized: {}", message),
        }
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::Unauthorized { .. } => "UNAUTHORIZED",
        }
    }
}

impl From<RequestError> for MarkError {
    fn from(err: RequestError) -> Self {
        MarkError::Request(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for MarkError {
    fn from(err: serde_json::Error) -> Self {
        MarkError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<std::io::Error> for MarkError {
    fn from(err: std::io::Error) -> Self {
        MarkError::Config(ConfigError::IoError {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for MarkError {
    fn from(err: serde_yaml::Error) -> Self {
        MarkError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

impl From<uuid::Error> for MarkError {
    fn from(err: uuid::Error) -> Self {
        MarkError::Validation(ValidationError::InvalidUuid {
            value: err.to_string(),
        })
    }
}

impl From<reqwest::Error> for MarkError {
    fn from(err: reqwest::Error) -> Self {
        MarkError::License(LicenseError::Unreachable {
            message: err.to_string(),
        })
    }
}

impl From<anyhow::Error> for MarkError {
    fn from(err: anyhow::Error) -> Self {
        MarkError::Internal(err.to_string())
    }
}

// =============================================================================
// Result type alias
// =============================================================================

pub type MarkResult<T> = Result<T, MarkError>;

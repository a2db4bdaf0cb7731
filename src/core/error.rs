//! Typed error handling for the order backend
//!
//! Errors are grouped by category so the HTTP boundary can map each one to a
//! status code without inspecting messages.
//!
//! # Error Categories
//!
//! - [`ValidationError`]: bad or missing input (400)
//! - [`OrderError`]: business-rule failures on orders (400/404/409)
//! - [`StorageError`]: unexpected persistence failures (500, details hidden)
//! - [`ConfigError`]: configuration loading and validation
//!
//! # Example
//!
//! ```rust,ignore
//! match service.update_order_status(id, OrderStatus::Canceled).await {
//!     Ok(order) => println!("now {}", order.status),
//!     Err(CafeError::Order(OrderError::InvalidTransition { from, to, .. })) => {
//!         println!("cannot go from {} to {}", from, to);
//!     }
//!     Err(e) => eprintln!("other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use uuid::Uuid;

use crate::core::order::OrderStatus;

/// Message returned to clients in place of storage and internal failures
pub const GENERIC_ERROR_MESSAGE: &str = "An internal error occurred";

/// The main error type of the crate
#[derive(Debug, thiserror::Error)]
pub enum CafeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Unexpected failure that fits no other category
    #[error("Internal error: {0}")]
    Internal(String),
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

impl CafeError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            CafeError::Validation(_) => StatusCode::BAD_REQUEST,
            CafeError::Order(e) => e.status_code(),
            CafeError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CafeError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CafeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            CafeError::Validation(_) => "VALIDATION_ERROR",
            CafeError::Order(e) => e.error_code(),
            CafeError::Storage(_) => "STORAGE_ERROR",
            CafeError::Config(_) => "CONFIG_ERROR",
            CafeError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the underlying detail must stay out of client responses
    pub fn is_opaque(&self) -> bool {
        matches!(
            self,
            CafeError::Storage(_) | CafeError::Config(_) | CafeError::Internal(_)
        )
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        let message = if self.is_opaque() {
            GENERIC_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        };

        ErrorResponse {
            code: self.error_code().to_string(),
            message,
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            CafeError::Order(OrderError::NotFound { id })
            | CafeError::Order(OrderError::AlreadyExists { id }) => {
                Some(serde_json::json!({ "id": id.to_string() }))
            }
            CafeError::Order(OrderError::InvalidTransition { id, from, to }) => {
                Some(serde_json::json!({
                    "id": id.to_string(),
                    "from": from,
                    "to": to
                }))
            }
            CafeError::Order(OrderError::Conflict {
                id,
                expected_version,
            }) => Some(serde_json::json!({
                "id": id.to_string(),
                "expected_version": expected_version
            })),
            CafeError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for CafeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.is_opaque() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Validation error for field '{field}': {message}")]
    FieldError { field: String, message: String },

    #[error("Validation errors: {}", join_field_errors(.0))]
    FieldErrors(Vec<FieldValidationError>),

    /// Body missing, not JSON, or not shaped like the expected payload
    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },

    #[error("Invalid order status '{value}', expected one of InProgress, Completed, Canceled")]
    InvalidStatus { value: String },

    #[error("Invalid UUID format: {value}")]
    InvalidUuid { value: String },

    #[error("Invalid time range: 'from' ({from}) is after 'to' ({to})")]
    InvalidTimeRange { from: String, to: String },
}

/// A single field validation error
#[derive(Debug, Clone, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

fn join_field_errors(errors: &[FieldValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Order Errors
// =============================================================================

/// Business-rule failures on orders
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order with id '{id}' not found")]
    NotFound { id: Uuid },

    #[error("Order with id '{id}' already exists")]
    AlreadyExists { id: Uuid },

    #[error("Invalid status transition for order '{id}': {from} -> {to}")]
    InvalidTransition {
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// The stored order changed since it was loaded
    #[error("Order '{id}' was modified concurrently (expected version {expected_version})")]
    Conflict { id: Uuid, expected_version: i64 },
}

impl OrderError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            OrderError::NotFound { .. } => StatusCode::NOT_FOUND,
            OrderError::AlreadyExists { .. } => StatusCode::CONFLICT,
            OrderError::InvalidTransition { .. } => StatusCode::BAD_REQUEST,
            OrderError::Conflict { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            OrderError::NotFound { .. } => "ORDER_NOT_FOUND",
            OrderError::AlreadyExists { .. } => "ORDER_ALREADY_EXISTS",
            OrderError::InvalidTransition { .. } => "INVALID_STATUS_TRANSITION",
            OrderError::Conflict { .. } => "ORDER_VERSION_CONFLICT",
        }
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to connect to {backend}: {message}")]
    ConnectionError { backend: String, message: String },

    #[error("{backend} query error: {message}")]
    QueryError { backend: String, message: String },

    #[error("Transaction error: {message}")]
    TransactionError { message: String },

    /// Stored data does not satisfy the model invariants
    #[error("Data integrity error: {message}")]
    IntegrityError { message: String },

    #[error("Storage lock poisoned: {message}")]
    LockPoisoned { message: String },
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse config{}: {message}", file_suffix(.file))]
    ParseError {
        file: Option<String>,
        message: String,
    },

    #[error("Missing required field '{field}' in {context}")]
    MissingField { field: String, context: String },

    #[error("Invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("IO error: {message}")]
    IoError { message: String },
}

fn file_suffix(file: &Option<String>) -> String {
    file.as_ref()
        .map(|f| format!(" file '{}'", f))
        .unwrap_or_default()
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for CafeError {
    fn from(err: serde_json::Error) -> Self {
        CafeError::Validation(ValidationError::InvalidBody {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for CafeError {
    fn from(err: serde_yaml::Error) -> Self {
        CafeError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

impl From<uuid::Error> for CafeError {
    fn from(err: uuid::Error) -> Self {
        CafeError::Validation(ValidationError::InvalidUuid {
            value: err.to_string(),
        })
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StorageError::ConnectionError {
                    backend: "PostgreSQL".to_string(),
                    message: err.to_string(),
                }
            }
            other => StorageError::QueryError {
                backend: "PostgreSQL".to_string(),
                message: other.to_string(),
            },
        }
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for CafeError {
    fn from(err: sqlx::Error) -> Self {
        CafeError::Storage(err.into())
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for order operations
pub type CafeResult<T> = Result<T, CafeError>;

//! # Error Handling
//!
//! Every fallible operation in the catalog returns [`ApiError`]. The enum maps
//! directly onto HTTP status codes and renders a sanitized JSON body:
//!
//! ```json
//! {"error": "Validation failed", "details": ["price: must not be negative"]}
//! ```
//!
//! Database errors are logged with `tracing` and replaced by a generic message
//! before they reach a client. Unique-constraint violations are the exception:
//! they surface as `409 Conflict` because they are caused by the request, not
//! by the server.
//!
//! ```rust,ignore
//! async fn handler(State(db): State<DatabaseConnection>) -> Result<Json<Category>, ApiError> {
//!     let category = Category::get_one(&db, id).await?;
//!     Ok(Json(category))
//! }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use std::fmt;

use crate::validation::{ValidationError, ValidationErrors};

/// API error type with automatic logging and sanitized responses
#[derive(Debug)]
pub enum ApiError {
    /// 404 Not Found - Referenced entity doesn't exist
    NotFound {
        /// Resource type (e.g., "category", "product")
        resource: String,
        /// Optional ID that wasn't found
        id: Option<String>,
    },

    /// 400 Bad Request - Malformed request that isn't a field validation issue
    BadRequest { message: String },

    /// 409 Conflict - Uniqueness or referential-integrity violation
    Conflict { message: String },

    /// 422 Unprocessable Entity - One or more fields failed validation
    ValidationFailed { errors: Vec<String> },

    /// 500 Internal Server Error - Storage failure (details logged, not exposed)
    Database { message: String, internal: DbErr },

    /// 502 Bad Gateway - A payment or shipping collaborator failed
    ExternalService { service: String, message: String },

    /// 500 Internal Server Error - Anything else
    Internal {
        message: String,
        internal: Option<String>,
    },
}

impl ApiError {
    // ============================================================================
    // Constructors
    // ============================================================================

    pub fn not_found(resource: impl Into<String>, id: Option<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn validation_failed(errors: Vec<String>) -> Self {
        Self::ValidationFailed { errors }
    }

    /// Wrap a storage error. The details are logged but never sent to the user.
    pub fn database(err: DbErr) -> Self {
        Self::Database {
            message: "A database error occurred".to_string(),
            internal: err,
        }
    }

    /// A collaborator (payment processor, shipping provider) rejected or failed a call.
    pub fn external(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>, internal: Option<String>) -> Self {
        Self::Internal {
            message: message.into(),
            internal,
        }
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    /// HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::ValidationFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Database { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ExternalService { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// User-facing error message (sanitized)
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { resource, id } => match id {
                Some(id) => format!("{resource} with ID '{id}' not found"),
                None => format!("{resource} not found"),
            },
            Self::ValidationFailed { errors } => {
                if errors.len() == 1 {
                    errors[0].clone()
                } else {
                    format!("Validation failed: {}", errors.join(", "))
                }
            }
            Self::ExternalService { service, message } => format!("{service}: {message}"),
            Self::BadRequest { message }
            | Self::Conflict { message }
            | Self::Database { message, .. }
            | Self::Internal { message, .. } => message.clone(),
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Database { internal, .. } => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            Self::Internal {
                internal: Some(details),
                ..
            } => {
                tracing::error!(details = %details, "Internal error occurred");
            }
            Self::ExternalService { service, message } => {
                tracing::warn!(service = %service, message = %message, "Collaborator call failed");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "API error"
                );
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();

        let status = self.status_code();
        let response = match &self {
            Self::ValidationFailed { errors } => ErrorResponse {
                error: "Validation failed".to_string(),
                details: Some(errors.clone()),
            },
            _ => ErrorResponse {
                error: self.user_message(),
                details: None,
            },
        };

        (status, Json(response)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// Conversions
// ============================================================================

/// `RecordNotFound` becomes 404, uniqueness and foreign key violations become
/// 409, and everything else is a logged 500.
impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        if let DbErr::RecordNotFound(msg) = &err {
            let resource = msg.split_whitespace().next().unwrap_or("Resource");
            return Self::not_found(resource, None);
        }
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                Self::conflict("A record with the same unique value already exists")
            }
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                Self::conflict("The operation violates a reference to another record")
            }
            _ => Self::database(err),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::validation_failed(errors.errors().iter().map(ToString::to_string).collect())
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        Self::validation_failed(vec![error.to_string()])
    }
}

// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 405 Method Not Allowed - the intake pipeline signals "fill data first"
    // with this code, distinct from generic validation errors
    MethodNotAllowed(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::MethodNotAllowed(_) => 405,
            ApiError::Conflict(_) => 409,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::MethodNotAllowed(msg)
            | ApiError::Conflict(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::MethodNotAllowed(_) => "INCOMPLETE_DATA",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        ApiError::MethodNotAllowed(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert workflow and store errors to ApiError
impl From<crate::services::WorkflowError> for ApiError {
    fn from(err: crate::services::WorkflowError) -> Self {
        use crate::services::WorkflowError;
        match err {
            WorkflowError::NotFound(what) => ApiError::not_found(format!("{} not found", what)),
            WorkflowError::Conflict(msg) => ApiError::conflict(msg),
            WorkflowError::IncompleteData => {
                ApiError::method_not_allowed("Fill data first")
            }
            WorkflowError::Internal(msg) => {
                tracing::error!("workflow internal error: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<crate::services::AuthError> for ApiError {
    fn from(err: crate::services::AuthError) -> Self {
        use crate::services::AuthError;
        match err {
            AuthError::InvalidCredentials => ApiError::unauthorized("Invalid credentials"),
            AuthError::TokenNotFound => ApiError::forbidden("Refresh token not found"),
            AuthError::DuplicateToken => ApiError::conflict("Refresh token already exists"),
            AuthError::DuplicateAdmin => {
                ApiError::conflict("Admin with this username already exists")
            }
            AuthError::AdminNotFound => ApiError::not_found("Admin not found"),
            AuthError::Token(msg) => ApiError::unauthorized(format!("Invalid token: {}", msg)),
            AuthError::Internal(msg) => {
                tracing::error!("auth internal error: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<crate::database::store::StoreError> for ApiError {
    fn from(err: crate::database::store::StoreError) -> Self {
        use crate::database::store::StoreError;
        match err {
            StoreError::NotFound => ApiError::not_found("Record not found"),
            StoreError::Duplicate(column) => {
                ApiError::conflict(format!("Duplicate value for unique column '{}'", column))
            }
            StoreError::ConditionFailed => {
                ApiError::conflict("Record was modified by a concurrent request")
            }
            StoreError::Sqlx(e) => {
                // Don't expose internal SQL errors to clients
                tracing::error!("database error: {}", e);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

pub mod auth_service;
pub mod credentials;
pub mod intake_service;
pub mod promotion_service;

pub use auth_service::{AuthService, ProvisionedAdmin, TokenPair};
pub use intake_service::{IntakeForm, IntakeService};
pub use promotion_service::{PromotionOutcome, PromotionService};

use thiserror::Error;

use crate::database::store::StoreError;

/// Error taxonomy for the intake/promotion workflow. Callers branch on the
/// variant, not on message text.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("intake form has not been filled for this record")]
    IncompleteData,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for WorkflowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => WorkflowError::NotFound("record"),
            StoreError::Duplicate(column) => {
                WorkflowError::Conflict(format!("duplicate value for unique column '{}'", column))
            }
            StoreError::ConditionFailed => {
                WorkflowError::Conflict("record was modified by a concurrent request".to_string())
            }
            StoreError::Sqlx(e) => WorkflowError::Internal(e.to_string()),
        }
    }
}

/// Error taxonomy for authentication and admin provisioning.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("refresh token not found")]
    TokenNotFound,

    #[error("refresh token already exists")]
    DuplicateToken,

    #[error("admin with this username already exists")]
    DuplicateAdmin,

    #[error("admin not found")]
    AdminNotFound,

    #[error("token error: {0}")]
    Token(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AuthError::AdminNotFound,
            StoreError::Duplicate("token") => AuthError::DuplicateToken,
            StoreError::Duplicate(_) => AuthError::DuplicateAdmin,
            StoreError::ConditionFailed => {
                AuthError::Internal("unexpected conditional update failure".to_string())
            }
            StoreError::Sqlx(e) => AuthError::Internal(e.to_string()),
        }
    }
}

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Unified error type for the analytics core.
///
/// Validation and not-found errors surface to the caller and are never
/// retried. External-service errors are logged with context at the call
/// site and rethrown unless an explicit fallback is defined.
#[derive(Error, Debug, Serialize)]
pub enum AnalyticsError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Execution {0} not found")]
    ExecutionNotFound(Uuid),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AnalyticsError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn external(msg: impl Into<String>) -> Self {
        Self::ExternalService(msg.into())
    }

    /// True for caller errors that should not be logged as system faults.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NotFound(_) | Self::InvalidOperation(_)
        )
    }
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

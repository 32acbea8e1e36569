//! Core Error Types
//!
//! Error taxonomy shared by the selection executor, the mutation pipeline
//! and the gateway.

use thiserror::Error;

use crate::model::EntityKind;
use crate::store::StoreError;

/// Core module result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// Missing required field, blank value or value outside an enum
    #[error("Validation error: {0}")]
    Validation(String),

    /// Update on an identity that does not exist
    #[error("Not found: {kind} {id}")]
    NotFound { kind: EntityKind, id: String },

    /// A referenced entity does not exist (strict reference policy only)
    #[error("Dangling reference: {kind} {id} does not exist")]
    DanglingReference { kind: EntityKind, id: String },

    /// Adapter-level failure, propagated unchanged
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CoreError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Create a dangling reference error
    pub fn dangling(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::DanglingReference {
            kind,
            id: id.into(),
        }
    }

    /// Get error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::DanglingReference { .. } => "DANGLING_REFERENCE",
            Self::Store(e) => e.code(),
        }
    }

    /// Get HTTP status code for the transport layer
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound { .. } => 404,
            Self::DanglingReference { .. } => 422,
            Self::Store(StoreError::Unavailable(_)) => 503,
            Self::Store(StoreError::Malformed { .. }) => 500,
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Validation(e.to_string())
    }
}

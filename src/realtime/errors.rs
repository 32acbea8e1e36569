//! # Real-Time Errors
//!
//! Error types for the change notifier.

use thiserror::Error;

/// Result type for notifier operations
pub type NotifierResult<T> = Result<T, NotifierError>;

/// Notifier errors
#[derive(Debug, Clone, Error)]
pub enum NotifierError {
    /// Subscription not found
    #[error("Subscription not found: {0}")]
    SubscriptionNotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl NotifierError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            NotifierError::SubscriptionNotFound(_) => "SUBSCRIPTION_NOT_FOUND",
            NotifierError::Internal(_) => "NOTIFIER_INTERNAL",
        }
    }
}

//! # Store Errors
//!
//! Failures raised by a document store adapter.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Document store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The backing store could not serve the request
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A stored document does not decode into its entity type
    #[error("Malformed document in {collection}: {reason}")]
    Malformed { collection: String, reason: String },
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn malformed(collection: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            collection: collection.into(),
            reason: reason.into(),
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Unavailable(_) => "STORE_UNAVAILABLE",
            StoreError::Malformed { .. } => "STORE_MALFORMED_DOCUMENT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(StoreError::unavailable("down").code(), "STORE_UNAVAILABLE");
        assert_eq!(
            StoreError::malformed("orders", "missing field").code(),
            "STORE_MALFORMED_DOCUMENT"
        );
    }

    #[test]
    fn test_display() {
        let err = StoreError::malformed("orders", "missing field `user`");
        assert_eq!(
            err.to_string(),
            "Malformed document in orders: missing field `user`"
        );
    }
}

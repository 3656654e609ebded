//! Error types for broker operations.

use thiserror::Error;

/// Comprehensive error type for all broker operations
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unsupported operation: {action}")]
    UnsupportedOperation { action: String },

    #[error("Batch size {size} exceeds maximum {max_size}")]
    BatchTooLarge { size: usize, max_size: usize },

    #[error("Queue registry is full ({max_queues} queues)")]
    CapacityExceeded { max_queues: usize },

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BrokerError {
    /// Check if the caller can fix the error by correcting the request.
    ///
    /// Every broker error is recoverable; only registry exhaustion depends on
    /// state the caller does not control directly.
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Validation(_) => true,
            Self::UnsupportedOperation { .. } => true,
            Self::BatchTooLarge { .. } => true,
            Self::CapacityExceeded { .. } => false,
            Self::Serialization(_) => true,
        }
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.code(),
            Self::UnsupportedOperation { .. } => "UnsupportedOperation",
            Self::BatchTooLarge { .. } => "TooManyEntriesInBatchRequest",
            Self::CapacityExceeded { .. } => "QueueLimitExceeded",
            Self::Serialization(_) => "MalformedRequest",
        }
    }
}

/// Validation errors, raised before any queue state is touched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    Required { field: String },

    #[error("Value out of range for {field}: {message}")]
    OutOfRange { field: String, message: String },
}

impl ValidationError {
    pub(crate) fn required(field: &str) -> Self {
        Self::Required {
            field: field.to_string(),
        }
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Required { .. } => "MissingParameter",
            Self::OutOfRange { .. } => "InvalidParameterValue",
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

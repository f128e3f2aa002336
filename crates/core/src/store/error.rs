use thiserror::Error;

/// Errors that can occur during session store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Store operation failed: {0}")]
    OperationFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

use crate::domain::value_objects::{BucketName, ObjectName};

/// Errors that can occur during storage operations
#[derive(Debug, Clone)]
pub enum StorageError {
    /// Object not found
    ObjectNotFound {
        bucket: BucketName,
        name: ObjectName,
    },

    /// Object content could not be decoded as expected
    DecodeError { name: ObjectName, message: String },

    /// Streaming transfer failed; the destination write was aborted
    TransferAborted {
        destination: ObjectName,
        message: String,
    },

    /// Validation error
    ValidationError { message: String },

    /// Infrastructure error with external source
    InfrastructureError {
        message: String,
        source: Option<String>, // Store error as string to allow Clone
    },
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::ObjectNotFound { bucket, name } => {
                write!(f, "Object not found: gs://{}/{}", bucket, name)
            }
            StorageError::DecodeError { name, message } => {
                write!(f, "Failed to decode object '{}': {}", name, message)
            }
            StorageError::TransferAborted {
                destination,
                message,
            } => {
                write!(f, "Transfer to '{}' aborted: {}", destination, message)
            }
            StorageError::ValidationError { message } => {
                write!(f, "Validation error: {}", message)
            }
            StorageError::InfrastructureError { message, .. } => {
                write!(f, "Infrastructure error: {}", message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

//! Error types for object storage operations

use thiserror::Error;

/// Result type for object storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while deleting objects
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Storage rejected our credentials
    #[error("Unauthorized request has been received by Cloud Storage")]
    Unauthorized,

    /// Bucket permissions do not allow this service account to act
    #[error("Cloud Storage denied access, check the bucket permissions for this service account")]
    Forbidden,

    /// Object does not exist
    #[error("{key} not found in bucket {bucket}")]
    NotFound {
        /// Bucket name
        bucket: String,
        /// Object path
        key: String,
    },

    /// Storage did not answer in time
    #[error("Remote timed out")]
    Timeout,

    /// Any other storage failure
    #[error("Cloud Storage error: {0}")]
    Upstream(String),
}

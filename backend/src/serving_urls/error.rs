//! Error types for dynamic serving URL operations

use thiserror::Error;

/// Result type for dynamic serving URL operations
pub type ServingUrlResult<T> = Result<T, ServingUrlError>;

/// Errors reported by the image serving service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServingUrlError {
    /// Serving service may not read the object
    #[error("Image serving access denied, the object may already have been deleted")]
    AccessDenied,

    /// Object does not exist
    #[error("Image serving could not find {key} in bucket {bucket}")]
    NotFound {
        /// Bucket name
        bucket: String,
        /// Object path
        key: String,
    },

    /// Object is not a decodable image
    #[error("{key} is not an image")]
    NotAnImage {
        /// Object path
        key: String,
    },

    /// Image is too large or cannot be transformed
    #[error("Image transformation failed: {0}")]
    Transformation(String),

    /// Serving service did not answer in time
    #[error("Remote timed out")]
    Timeout,

    /// Any other failure
    #[error("Image serving error: {0}")]
    Upstream(String),
}

//! Error types for object key generation and URL signing

use thiserror::Error;

/// Result type for signing operations
pub type SignUrlResult<T> = Result<T, SignUrlError>;

/// Bad or missing input, reported back to the caller with the offending field
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {field}: {message}")]
pub struct ValidationError {
    /// Name of the request parameter that failed validation
    pub field: &'static str,
    /// Human-readable explanation
    pub message: String,
}

impl ValidationError {
    /// Creates a validation error for the given field
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Errors raised by the signing oracle
///
/// None of these are retried by the signer. A misconfigured signing identity
/// does not fix itself between attempts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SigningError {
    /// The oracle could not be reached or returned an unusable response
    #[error("Signing service unavailable: {0}")]
    Unavailable(String),

    /// The oracle refused to sign with this identity
    #[error("Signing request rejected: {0}")]
    Rejected(String),

    /// The oracle did not answer within the configured budget
    #[error("Signing request timed out")]
    Timeout,
}

/// Errors returned by [`crate::UrlSigner`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignUrlError {
    /// Signing request failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Signing oracle failed
    #[error(transparent)]
    Signing(#[from] SigningError),
}

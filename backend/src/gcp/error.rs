//! Error types for Google Cloud API calls

use reqwest::{Response, StatusCode};
use thiserror::Error;

/// Result type for Google Cloud API calls
pub type GcpResult<T> = Result<T, GcpError>;

/// Errors that can occur when talking to Google Cloud APIs
#[derive(Error, Debug)]
pub enum GcpError {
    /// Transport failure, including timeouts
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API answered with a non-success status
    #[error("API returned {status}: {body}")]
    Status {
        /// HTTP status
        status: StatusCode,
        /// Response body, for logs
        body: String,
    },

    /// API answered with something we cannot use
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl GcpError {
    /// Passes successful responses through and turns everything else into `GcpError::Status`
    ///
    /// # Errors
    ///
    /// Returns `GcpError::Status` for non-2xx responses
    pub async fn check(response: Response) -> GcpResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(Self::Status { status, body })
    }

    /// Whether the failure was a timeout on our side or the API's
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Request(e) => e.is_timeout(),
            Self::Status { status, .. } => {
                *status == StatusCode::REQUEST_TIMEOUT || *status == StatusCode::GATEWAY_TIMEOUT
            }
            Self::InvalidResponse(_) => false,
        }
    }

    /// HTTP status returned by the API, if any
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request(_) | Self::InvalidResponse(_) => None,
        }
    }
}

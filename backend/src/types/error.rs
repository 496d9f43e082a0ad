//! Universal error handling for the API

use aide::OperationOutput;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gcs_signing::{SignUrlError, SigningError, ValidationError};
use schemars::JsonSchema;
use serde::Serialize;

use crate::{serving_urls::ServingUrlError, storage::StorageError};

/// API error response envelope
#[derive(Debug, Serialize, JsonSchema)]
pub struct ApiErrorResponse {
    /// Error details
    error: ErrorBody,
}

/// Error body, tagged by `kind`
#[derive(Debug, Serialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ErrorBody {
    /// A request parameter is missing or invalid
    Validation {
        /// Where the parameter is read from
        location: &'static str,
        /// Parameter name
        param: String,
        /// Human-readable error message
        message: String,
        /// Expected type of the parameter
        example: &'static str,
    },
    /// The request could not be completed
    Abort {
        /// Human-readable error message
        message: String,
    },
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// A `422` pointing at the offending query parameter
    pub fn validation(param: impl Into<String>, message: impl Into<String>) -> Self {
        let param = param.into();
        let example = match param.as_str() {
            "expires" => "integer",
            _ => "string",
        };

        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            inner: ApiErrorResponse {
                error: ErrorBody::Validation {
                    location: "query",
                    param,
                    message: message.into(),
                    example,
                },
            },
        }
    }

    /// Any other failure, reported with the given status
    pub fn abort(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                error: ErrorBody::Abort {
                    message: message.into(),
                },
            },
        }
    }

    /// HTTP status of the response
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self.inner.error {
            ErrorBody::Validation { message, .. } | ErrorBody::Abort { message } => message,
        };

        match self.status.as_u16() {
            400..=499 => tracing::warn!("Client error: {} - {message}", self.status),
            500..=599 => tracing::error!("Server error: {} - {message}", self.status),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::validation(err.field, err.message)
    }
}

/// A signing identity that cannot sign is a server misconfiguration
impl From<SigningError> for AppError {
    fn from(err: SigningError) -> Self {
        tracing::error!("URL signing failed: {err}");
        Self::abort(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Unable to sign the storage URL",
        )
    }
}

impl From<SignUrlError> for AppError {
    fn from(err: SignUrlError) -> Self {
        match err {
            SignUrlError::Validation(e) => e.into(),
            SignUrlError::Signing(e) => e.into(),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        let status = match &err {
            StorageError::Unauthorized => StatusCode::UNAUTHORIZED,
            StorageError::Forbidden => StatusCode::FORBIDDEN,
            StorageError::NotFound { .. } => StatusCode::NOT_FOUND,
            StorageError::Timeout => StatusCode::REQUEST_TIMEOUT,
            StorageError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::abort(status, err.to_string())
    }
}

impl From<ServingUrlError> for AppError {
    fn from(err: ServingUrlError) -> Self {
        let status = match &err {
            ServingUrlError::AccessDenied => StatusCode::FORBIDDEN,
            ServingUrlError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServingUrlError::NotAnImage { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ServingUrlError::Transformation(_) => {
                tracing::error!("Image transformation failed, requires investigation: {err}");
                StatusCode::CONFLICT
            }
            ServingUrlError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ServingUrlError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::abort(status, err.to_string())
    }
}

impl OperationOutput for AppError {
    type Inner = ApiErrorResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<ApiErrorResponse>::operation_response(ctx, operation)
    }
}
